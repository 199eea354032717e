use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::source::SourceInfo;
use crate::types::Type;

use super::conversion::ConversionChain;
use super::statement::{Block, Statement};
use super::template::{MethodRef, Name, TypeName, Variable};
use super::token::Token;
use super::value::{Number, Value};

/// State shared by every expression kind: its span and the conversion chain
/// taking its natural type to the type its context requires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExprMeta {
    pub info: SourceInfo,
    #[serde(default)]
    conversions: ConversionChain,
    #[serde(default)]
    exception_possible: bool,
}

impl ExprMeta {
    pub fn new(info: SourceInfo) -> Self {
        Self {
            info,
            conversions: ConversionChain::new(),
            exception_possible: false,
        }
    }

    pub fn conversions(&self) -> &ConversionChain {
        &self.conversions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(flatten)]
    meta: ExprMeta,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Paren(Box<Expression>),
    NewArray(NewArrayExpression),
    FunctionCall(CallExpression),
    TemplateCall(CallExpression),
    VariableRef(VariableRef),
    Lookup(Lookup),
    ArrayLookup(ArrayLookup),
    Negate(Box<Expression>),
    Not(Box<Expression>),
    Concatenate(BinaryExpression),
    Arithmetic(BinaryExpression),
    Relational(RelationalExpression),
    And(BinaryExpression),
    Or(BinaryExpression),
    NullLiteral,
    BooleanLiteral(bool),
    StringLiteral(String),
    NumberLiteral(Number),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpressionList {
    #[serde(default)]
    pub info: SourceInfo,
    pub expressions: Vec<Expression>,
}

impl ExpressionList {
    pub fn new(info: SourceInfo, expressions: Vec<Expression>) -> Self {
        Self { info, expressions }
    }
}

/// Shape shared by function and template calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub target: Name,
    pub params: ExpressionList,
    #[serde(default)]
    pub initializer: Option<Box<Statement>>,
    #[serde(default)]
    pub substitution: Option<Block>,
    #[serde(default)]
    pub void_permitted: bool,
    #[serde(default)]
    pub method: Option<Rc<MethodRef>>,
}

impl CallExpression {
    pub fn new(target: Name, params: ExpressionList) -> Self {
        Self {
            target,
            params,
            initializer: None,
            substitution: None,
            void_permitted: false,
            method: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: Name,
    #[serde(default)]
    pub variable: Option<Rc<Variable>>,
}

impl VariableRef {
    pub fn new(name: Name, variable: Option<Rc<Variable>>) -> Self {
        Self { name, variable }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub expression: Box<Expression>,
    pub dot: Token,
    pub name: Name,
    #[serde(default)]
    pub read_method: Option<Rc<MethodRef>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLookup {
    pub expression: Box<Expression>,
    pub token: Token,
    pub index: Box<Expression>,
    #[serde(default)]
    pub read_method: Option<Rc<MethodRef>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl BinaryExpression {
    pub fn new(operator: Token, left: Expression, right: Expression) -> Self {
        Self {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationalExpression {
    pub operator: Token,
    pub left: Box<Expression>,
    pub right: RelationalOperand,
}

/// A relational expression compares against a value or tests a type, never
/// both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationalOperand {
    Expression(Box<Expression>),
    Isa(TypeName),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArrayExpression {
    pub elements: ExpressionList,
    #[serde(default)]
    pub associative: bool,
}

impl NewArrayExpression {
    /// Every element is a known value, looking through nested arrays.
    pub fn is_all_constant(&self) -> bool {
        self.elements.expressions.iter().all(|element| match &element.kind {
            ExpressionKind::NewArray(nested) => nested.is_all_constant(),
            _ => element.is_value_known(),
        })
    }
}

impl Expression {
    pub fn new(info: SourceInfo, kind: ExpressionKind) -> Self {
        Self {
            meta: ExprMeta::new(info),
            kind,
        }
    }

    pub fn from_parts(meta: ExprMeta, kind: ExpressionKind) -> Self {
        Self { meta, kind }
    }

    pub fn into_parts(self) -> (ExprMeta, ExpressionKind) {
        (self.meta, self.kind)
    }

    fn literal(info: SourceInfo, kind: ExpressionKind, ty: Type) -> Self {
        let mut expr = Self::new(info, kind);
        expr.reset_type(Some(ty));
        expr
    }

    pub fn null_literal(info: SourceInfo) -> Self {
        Self::literal(info, ExpressionKind::NullLiteral, Type::null())
    }

    pub fn boolean_literal(info: SourceInfo, value: bool) -> Self {
        Self::literal(info, ExpressionKind::BooleanLiteral(value), Type::boolean())
    }

    pub fn string_literal(info: SourceInfo, value: impl Into<String>) -> Self {
        Self::literal(
            info,
            ExpressionKind::StringLiteral(value.into()),
            Type::non_null_string(),
        )
    }

    pub fn number_literal(info: SourceInfo, value: Number) -> Self {
        let ty = value.natural_type();
        Self::literal(info, ExpressionKind::NumberLiteral(value), ty)
    }

    pub fn paren(info: SourceInfo, inner: Expression) -> Self {
        Self::new(info, ExpressionKind::Paren(Box::new(inner)))
    }

    pub fn negate(info: SourceInfo, operand: Expression) -> Self {
        Self::new(info, ExpressionKind::Negate(Box::new(operand)))
    }

    pub fn not(info: SourceInfo, operand: Expression) -> Self {
        Self::new(info, ExpressionKind::Not(Box::new(operand)))
    }

    pub fn concatenate(
        info: SourceInfo,
        operator: Token,
        left: Expression,
        right: Expression,
    ) -> Self {
        Self::new(
            info,
            ExpressionKind::Concatenate(BinaryExpression::new(operator, left, right)),
        )
    }

    pub fn arithmetic(
        info: SourceInfo,
        operator: Token,
        left: Expression,
        right: Expression,
    ) -> Self {
        Self::new(
            info,
            ExpressionKind::Arithmetic(BinaryExpression::new(operator, left, right)),
        )
    }

    pub fn and(info: SourceInfo, operator: Token, left: Expression, right: Expression) -> Self {
        Self::new(info, ExpressionKind::And(BinaryExpression::new(operator, left, right)))
    }

    pub fn or(info: SourceInfo, operator: Token, left: Expression, right: Expression) -> Self {
        Self::new(info, ExpressionKind::Or(BinaryExpression::new(operator, left, right)))
    }

    pub fn relational(
        info: SourceInfo,
        operator: Token,
        left: Expression,
        right: Expression,
    ) -> Self {
        Self::new(
            info,
            ExpressionKind::Relational(RelationalExpression {
                operator,
                left: Box::new(left),
                right: RelationalOperand::Expression(Box::new(right)),
            }),
        )
    }

    pub fn isa(info: SourceInfo, operator: Token, left: Expression, type_name: TypeName) -> Self {
        Self::new(
            info,
            ExpressionKind::Relational(RelationalExpression {
                operator,
                left: Box::new(left),
                right: RelationalOperand::Isa(type_name),
            }),
        )
    }

    pub fn variable_ref(info: SourceInfo, variable: Rc<Variable>) -> Self {
        let name = Name::new(info, variable.name.clone());
        Self::new(
            info,
            ExpressionKind::VariableRef(VariableRef::new(name, Some(variable))),
        )
    }

    pub fn new_array(info: SourceInfo, elements: ExpressionList, associative: bool) -> Self {
        Self::new(
            info,
            ExpressionKind::NewArray(NewArrayExpression {
                elements,
                associative,
            }),
        )
    }

    /// Builder form of [`Expression::set_type`].
    pub fn typed(mut self, ty: Type) -> TreeResult<Self> {
        self.set_type(ty)?;
        Ok(self)
    }

    pub fn info(&self) -> SourceInfo {
        self.meta.info
    }

    pub fn meta(&self) -> &ExprMeta {
        &self.meta
    }

    pub fn ty(&self) -> Option<&Type> {
        match &self.kind {
            ExpressionKind::Paren(inner) => inner.ty(),
            _ => self.meta.conversions.ty(),
        }
    }

    pub fn initial_type(&self) -> Option<&Type> {
        match &self.kind {
            ExpressionKind::Paren(inner) => inner.initial_type(),
            _ => self.meta.conversions.initial_type(),
        }
    }

    /// The reduced conversion chain.
    pub fn conversion_chain(&self) -> ConversionChain {
        match &self.kind {
            ExpressionKind::Paren(inner) => inner.conversion_chain(),
            _ => self.meta.conversions.reduced(),
        }
    }

    fn reset_type(&mut self, ty: Option<Type>) {
        self.meta.conversions = ty.map(ConversionChain::with_type).unwrap_or_default();
        self.meta.exception_possible = false;
    }

    /// Replaces the conversion chain with a single step to `ty`.
    pub fn set_type(&mut self, ty: Type) -> TreeResult<()> {
        if let ExpressionKind::Paren(inner) = &mut self.kind {
            return inner.set_type(ty);
        }

        match self.kind {
            ExpressionKind::NewArray(_) => {
                // Arrays are never null; conversion also retypes the elements.
                self.reset_type(None);
                return self.convert_to(&ty.to_non_null(), false);
            }
            ExpressionKind::NumberLiteral(_) => {
                self.reset_type(Some(ty));
                if self.is_value_known() {
                    let non_null = self.ty().map(Type::to_non_null);
                    self.reset_type(non_null);
                }
            }
            ExpressionKind::Negate(_)
            | ExpressionKind::Not(_)
            | ExpressionKind::Concatenate(_)
            | ExpressionKind::Arithmetic(_)
            | ExpressionKind::Relational(_)
            | ExpressionKind::And(_)
            | ExpressionKind::Or(_) => self.reset_type(Some(ty.to_non_null())),
            _ => self.reset_type(Some(ty)),
        }
        Ok(())
    }

    /// Coerces the expression to `to`, preferring a cast.
    pub fn convert_to_type(&mut self, to: &Type) -> TreeResult<()> {
        self.convert_to(to, true)
    }

    pub fn convert_to(&mut self, to: &Type, prefer_cast: bool) -> TreeResult<()> {
        if let ExpressionKind::Paren(inner) = &mut self.kind {
            return inner.convert_to(to, prefer_cast);
        }

        match self.kind {
            ExpressionKind::NumberLiteral(_) if Type::number().class_assignable_from(to) => {
                if to.is_primitive() {
                    self.set_type(to.clone())
                } else {
                    self.set_type(to.to_primitive())?;
                    self.extend_chain(&to.to_non_null(), prefer_cast)
                }
            }
            ExpressionKind::Not(_)
            | ExpressionKind::And(_)
            | ExpressionKind::Or(_)
            | ExpressionKind::Relational(_)
                if to.is_boolean_class() || to.is_string_class() =>
            {
                // Logical results can be produced directly in these types.
                self.set_type(to.clone())
            }
            ExpressionKind::NewArray(_) => self.convert_new_array(to, prefer_cast),
            _ => self.extend_chain(to, prefer_cast),
        }
    }

    fn extend_chain(&mut self, to: &Type, prefer_cast: bool) -> TreeResult<()> {
        let converted = self
            .meta
            .conversions
            .converted(to, prefer_cast)
            .ok_or_else(|| self.illegal_conversion(to))?;
        self.meta.conversions = converted.chain;
        if converted.exception_possible {
            self.meta.exception_possible = true;
        }
        Ok(())
    }

    fn convert_new_array(&mut self, to: &Type, prefer_cast: bool) -> TreeResult<()> {
        self.extend_chain(to, prefer_cast)?;

        // Converting to a String must leave the elements alone.
        if to.is_string_class() {
            return Ok(());
        }
        let Some(element_type) = to.array_element_type().cloned() else {
            return Ok(());
        };

        self.reset_type(Some(to.clone()));
        if let ExpressionKind::NewArray(array) = &mut self.kind {
            let (start, step) = if array.associative { (1, 2) } else { (0, 1) };
            let null = Type::null();
            for element in array.elements.expressions.iter_mut().skip(start).step_by(step) {
                if element.ty() != Some(&null) {
                    element.convert_to(&element_type, prefer_cast)?;
                }
            }
        }
        Ok(())
    }

    /// Replaces the natural type and replays the existing chain on top of it.
    pub fn set_initial_type(&mut self, ty: Type) -> TreeResult<()> {
        if let ExpressionKind::Paren(inner) = &mut self.kind {
            return inner.set_initial_type(ty);
        }

        let previous = self.meta.conversions.clone();
        match previous.initial_type() {
            Some(initial) if *initial == ty => Ok(()),
            None => self.set_type(ty),
            Some(_) => {
                self.reset_type(Some(ty));
                for step in previous.steps().iter().skip(1) {
                    self.convert_to(step.to_type(), step.is_cast_preferred())?;
                }
                Ok(())
            }
        }
    }

    fn illegal_conversion(&self, to: &Type) -> TreeError {
        TreeError::IllegalConversion {
            from: self
                .ty()
                .map(ToString::to_string)
                .unwrap_or_else(|| "untyped expression".to_string()),
            to: to.clone(),
            info: self.meta.info,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::NullLiteral
                | ExpressionKind::BooleanLiteral(_)
                | ExpressionKind::StringLiteral(_)
                | ExpressionKind::NumberLiteral(_)
        )
    }

    pub fn is_value_known(&self) -> bool {
        match &self.kind {
            ExpressionKind::Paren(inner) => inner.is_value_known(),
            ExpressionKind::NullLiteral
            | ExpressionKind::BooleanLiteral(_)
            | ExpressionKind::StringLiteral(_) => true,
            // A number retyped to a non-numeric class no longer has a usable
            // value.
            ExpressionKind::NumberLiteral(_) => self.ty().is_some_and(|ty| {
                ty.is_number_class() || ty.class_assignable_from(&Type::number())
            }),
            _ => false,
        }
    }

    /// The compile-time value, when [`Expression::is_value_known`].
    pub fn known_value(&self) -> Option<Value> {
        if !self.is_value_known() {
            return None;
        }
        match &self.kind {
            ExpressionKind::Paren(inner) => inner.known_value(),
            ExpressionKind::NullLiteral => Some(Value::Null),
            ExpressionKind::BooleanLiteral(value) => Some(Value::Boolean(*value)),
            ExpressionKind::StringLiteral(value) => Some(Value::String(value.clone())),
            ExpressionKind::NumberLiteral(value) => Some(Value::Number(*value)),
            _ => None,
        }
    }

    pub fn is_exception_possible(&self) -> bool {
        let own = self.meta.exception_possible;
        match &self.kind {
            ExpressionKind::Paren(inner) => own || inner.is_exception_possible(),
            ExpressionKind::Negate(operand) | ExpressionKind::Not(operand) => {
                own || operand_may_throw(operand)
            }
            ExpressionKind::Concatenate(binary)
            | ExpressionKind::Arithmetic(binary)
            | ExpressionKind::And(binary)
            | ExpressionKind::Or(binary) => {
                own || operand_may_throw(&binary.left) || operand_may_throw(&binary.right)
            }
            ExpressionKind::Relational(relational) => {
                own || operand_may_throw(&relational.left)
                    || match &relational.right {
                        RelationalOperand::Expression(right) => operand_may_throw(right),
                        RelationalOperand::Isa(_) => false,
                    }
            }
            ExpressionKind::Lookup(lookup) => {
                own || operand_may_throw(&lookup.expression) || lookup.read_method.is_some()
            }
            ExpressionKind::ArrayLookup(_)
            | ExpressionKind::FunctionCall(_)
            | ExpressionKind::TemplateCall(_) => true,
            ExpressionKind::NewArray(array) => array
                .elements
                .expressions
                .iter()
                .any(Expression::is_exception_possible),
            _ => own,
        }
    }
}

fn operand_may_throw(operand: &Expression) -> bool {
    operand.is_exception_possible() || operand.ty().is_some_and(Type::is_nullable)
}
