use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Void,
    Null,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Number,
    String,
    Object,
    Class(String),
    Array(Box<Type>),
}

impl TypeKind {
    fn has_primitive_form(&self) -> bool {
        matches!(
            self,
            TypeKind::Void
                | TypeKind::Boolean
                | TypeKind::Char
                | TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Float
                | TypeKind::Double
        )
    }

    fn is_number(&self) -> bool {
        matches!(
            self,
            TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Float
                | TypeKind::Double
                | TypeKind::Number
        )
    }

    fn primitive_name(&self) -> Option<&'static str> {
        let name = match self {
            TypeKind::Void => "void",
            TypeKind::Boolean => "boolean",
            TypeKind::Char => "char",
            TypeKind::Byte => "byte",
            TypeKind::Short => "short",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            _ => return None,
        };
        Some(name)
    }

    fn class_name(&self) -> String {
        match self {
            TypeKind::Void => "Void".to_string(),
            TypeKind::Null | TypeKind::Object => "Object".to_string(),
            TypeKind::Boolean => "Boolean".to_string(),
            TypeKind::Char => "Character".to_string(),
            TypeKind::Byte => "Byte".to_string(),
            TypeKind::Short => "Short".to_string(),
            TypeKind::Int => "Integer".to_string(),
            TypeKind::Long => "Long".to_string(),
            TypeKind::Float => "Float".to_string(),
            TypeKind::Double => "Double".to_string(),
            TypeKind::Number => "Number".to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Class(name) => name.clone(),
            TypeKind::Array(element) => format!("{}[]", element),
        }
    }
}

/// A static type as the type checker assigns it: an object class, whether
/// the value is held in its primitive form, and whether it may be null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    kind: TypeKind,
    primitive: bool,
    non_null: bool,
}

impl Type {
    /// Object form of `kind`, nullable.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            primitive: false,
            non_null: false,
        }
    }

    /// Primitive form of `kind`. Kinds without one stay in object form.
    pub fn primitive(kind: TypeKind) -> Self {
        let primitive = kind.has_primitive_form();
        Self {
            kind,
            primitive,
            non_null: primitive,
        }
    }

    pub fn void() -> Self {
        Self::primitive(TypeKind::Void)
    }

    pub fn null() -> Self {
        Self::new(TypeKind::Null)
    }

    pub fn boolean() -> Self {
        Self::primitive(TypeKind::Boolean)
    }

    pub fn char() -> Self {
        Self::primitive(TypeKind::Char)
    }

    pub fn int() -> Self {
        Self::primitive(TypeKind::Int)
    }

    pub fn long() -> Self {
        Self::primitive(TypeKind::Long)
    }

    pub fn float() -> Self {
        Self::primitive(TypeKind::Float)
    }

    pub fn double() -> Self {
        Self::primitive(TypeKind::Double)
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn non_null_string() -> Self {
        Self::string().to_non_null()
    }

    pub fn object() -> Self {
        Self::new(TypeKind::Object)
    }

    pub fn number() -> Self {
        Self::new(TypeKind::Number)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class(name.into()))
    }

    pub fn array(element: Type) -> Self {
        Self::new(TypeKind::Array(Box::new(element)))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive
    }

    pub fn is_non_null(&self) -> bool {
        self.primitive || self.non_null
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn to_non_null(&self) -> Type {
        let mut ty = self.clone();
        ty.non_null = true;
        ty
    }

    pub fn to_nullable(&self) -> Type {
        if self.primitive {
            return self.clone();
        }
        let mut ty = self.clone();
        ty.non_null = false;
        ty
    }

    pub fn has_primitive_peer(&self) -> bool {
        self.kind.has_primitive_form() && self.kind != TypeKind::Void
    }

    pub fn to_primitive(&self) -> Type {
        if self.primitive || !self.has_primitive_peer() {
            return self.clone();
        }
        Self::primitive(self.kind.clone())
    }

    /// Boxed form. Boxing a primitive never yields null.
    pub fn to_non_primitive(&self) -> Type {
        if !self.primitive {
            return self.clone();
        }
        Self {
            kind: self.kind.clone(),
            primitive: false,
            non_null: true,
        }
    }

    pub fn is_number_class(&self) -> bool {
        self.kind.is_number()
    }

    pub fn is_boolean_class(&self) -> bool {
        self.kind == TypeKind::Boolean
    }

    pub fn is_string_class(&self) -> bool {
        self.kind == TypeKind::String
    }

    /// Whether a String value can be stored in this type without a cast.
    pub fn accepts_string(&self) -> bool {
        !self.primitive && matches!(self.kind, TypeKind::String | TypeKind::Object)
    }

    pub fn array_element_type(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Widening relation between object classes: `self` can hold any value
    /// of `other`'s class. Primitive flags and nullability are ignored.
    pub fn class_assignable_from(&self, other: &Type) -> bool {
        let target = class_of(&self.kind);
        let source = class_of(&other.kind);
        if target == source {
            return true;
        }
        match (target, source) {
            (TypeKind::Void, _) | (_, TypeKind::Void) => false,
            (TypeKind::Object, _) => true,
            (TypeKind::Number, source) => source.is_number(),
            (TypeKind::Array(to), TypeKind::Array(from)) => {
                !to.primitive && !from.primitive && to.class_assignable_from(from)
            }
            _ => false,
        }
    }

    /// Whether an array of `other` can be converted element-wise into this
    /// array type.
    pub fn array_convertible_from(&self, other: &Type) -> bool {
        match (self.array_element_type(), other.array_element_type()) {
            (Some(to), Some(from)) => {
                to == from
                    || to.class_assignable_from(from)
                    || (to.is_number_class() && from.is_number_class())
                    || to.accepts_string()
            }
            _ => false,
        }
    }
}

fn class_of(kind: &TypeKind) -> &TypeKind {
    match kind {
        TypeKind::Null => &TypeKind::Object,
        other => other,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primitive {
            if let Some(name) = self.kind.primitive_name() {
                return f.write_str(name);
            }
        }
        if self.kind == TypeKind::Null {
            return f.write_str("null");
        }
        if self.non_null {
            write!(f, "non-null {}", self.kind.class_name())
        } else {
            f.write_str(&self.kind.class_name())
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}
