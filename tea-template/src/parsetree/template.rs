use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::source::SourceInfo;
use crate::types::{Type, TypeKind};

use super::statement::Statement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub info: SourceInfo,
    pub name: String,
}

impl Name {
    pub fn new(info: SourceInfo, name: impl Into<String>) -> Self {
        Self {
            info,
            name: name.into(),
        }
    }
}

/// A type as written in the source, plus the type the checker resolved it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    pub info: SourceInfo,
    pub name: String,
    #[serde(default)]
    dimensions: Option<usize>,
    #[serde(default)]
    ty: Option<Type>,
}

impl TypeName {
    pub fn new(info: SourceInfo, name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            info,
            name: name.into(),
            dimensions: Some(dimensions),
            ty: None,
        }
    }

    /// Type name standing for an already resolved type. Dimensions are
    /// derived from the type.
    pub fn resolved(info: SourceInfo, ty: Type) -> Self {
        let mut base = &ty;
        while let Some(element) = base.array_element_type() {
            base = element;
        }
        Self {
            info,
            name: base.kind().to_string(),
            dimensions: None,
            ty: Some(ty),
        }
    }

    pub fn dimensions(&self) -> usize {
        if let Some(dimensions) = self.dimensions {
            return dimensions;
        }
        let mut count = 0;
        let mut current = self.ty.as_ref();
        while let Some(TypeKind::Array(element)) = current.map(Type::kind) {
            count += 1;
            current = Some(element);
        }
        count
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn set_type(&mut self, ty: Type) {
        self.ty = Some(ty);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub info: SourceInfo,
    pub name: String,
    type_name: TypeName,
    #[serde(default)]
    ty: Option<Type>,
    #[serde(default)]
    field: bool,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    transient: bool,
}

impl Variable {
    pub fn new(info: SourceInfo, name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            info,
            name: name.into(),
            type_name,
            ty: None,
            field: false,
            is_static: false,
            transient: false,
        }
    }

    pub fn typed(info: SourceInfo, name: impl Into<String>, ty: Type) -> Self {
        let mut variable = Self::new(info, name, TypeName::resolved(info, ty.clone()));
        variable.ty = Some(ty);
        variable
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Also replaces the type name so both stay in agreement.
    pub fn set_type(&mut self, ty: Type) {
        self.type_name = TypeName::resolved(self.info, ty.clone());
        self.ty = Some(ty);
    }

    pub fn is_field(&self) -> bool {
        self.field
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn set_field(&mut self, field: bool) {
        self.field = field;
        if !field {
            self.is_static = false;
        }
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.field = true;
        }
    }

    pub fn set_transient(&mut self, transient: bool) {
        self.transient = transient;
    }
}

/// Handle to a resolved function, template or property accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: Option<Type>,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Type>,
    pub return_type: Type,
}

impl MethodRef {
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            declaring_type: None,
            name: name.into(),
            params,
            return_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub info: SourceInfo,
    pub name: Name,
    pub params: Vec<Rc<Variable>>,
    #[serde(default)]
    pub substitution_param: bool,
    pub statement: Option<Statement>,
    #[serde(default)]
    pub return_type: Option<Type>,
}

impl Template {
    pub fn new(
        info: SourceInfo,
        name: Name,
        params: Vec<Rc<Variable>>,
        substitution_param: bool,
        statement: Option<Statement>,
    ) -> Self {
        Self {
            info,
            name,
            params,
            substitution_param,
            statement,
            return_type: None,
        }
    }

    pub fn has_substitution_param(&self) -> bool {
        self.substitution_param
    }
}
