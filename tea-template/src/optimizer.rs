//! Constant folding and dead code elimination.
//!
//! One bottom-up pass: every rule sees children that are already folded and
//! the pass does not iterate to a fixpoint.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::{TreeError, TreeResult};
use crate::mutator::{walk_binary, walk_foreach, Mutator};
use crate::parsetree::{
    BinaryExpression, Block, ExprMeta, Expression, ExpressionKind, ForeachStatement, IfStatement,
    Number, RelationalExpression, RelationalOperand, Statement, StatementList, Template,
    TokenKind, Value,
};
use crate::source::SourceInfo;
use crate::types::{Type, TypeKind};

#[derive(Debug, Default)]
pub struct BasicOptimizer {
    folds: usize,
}

impl BasicOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimizes the template's statement tree. Name, parameters and return
    /// type are left as they are.
    pub fn optimize(&mut self, template: Template) -> TreeResult<Template> {
        debug!(template = %template.name.name, "optimizing template");
        let optimized = self.visit_template(template)?;
        debug!(template = %optimized.name.name, folds = self.folds, "optimized template");
        Ok(optimized)
    }

    /// Number of rewrite rules applied so far.
    pub fn folds(&self) -> usize {
        self.folds
    }

    fn applied(&mut self, rule: &'static str, info: SourceInfo) {
        self.folds += 1;
        trace!(rule, %info, "applied fold");
    }

    fn optimize_block(&mut self, block: Block) -> TreeResult<Option<Block>> {
        let initializer = self.mutate_optional_statement(block.initializer)?;
        let statements = self.mutate_statements(block.statements)?;
        let finalizer = self.mutate_optional_statement(block.finalizer)?;

        if statements.is_empty() && initializer.is_none() && finalizer.is_none() {
            self.applied("empty-block", block.info);
            return Ok(None);
        }
        Ok(Some(Block {
            info: block.info,
            statements,
            initializer,
            finalizer,
        }))
    }
}

impl Mutator for BasicOptimizer {
    fn visit_empty(&mut self, info: SourceInfo) -> TreeResult<Option<Statement>> {
        self.applied("empty-statement", info);
        Ok(None)
    }

    fn visit_statement_list(&mut self, list: StatementList) -> TreeResult<Option<Statement>> {
        let mut statements = self.mutate_statements(list.statements)?;
        match statements.len() {
            0 => {
                self.applied("empty-list", list.info);
                Ok(None)
            }
            1 => {
                self.applied("single-statement-list", list.info);
                Ok(statements.pop())
            }
            _ => {
                let info = statements
                    .iter()
                    .map(Statement::info)
                    .fold(SourceInfo::default(), |span, info| SourceInfo::union(&span, &info));
                let info = if info.is_unknown() { list.info } else { info };
                Ok(Some(Statement::List(StatementList::new(info, statements))))
            }
        }
    }

    fn visit_block(&mut self, block: Block) -> TreeResult<Option<Statement>> {
        Ok(self.optimize_block(block)?.map(Statement::Block))
    }

    fn visit_foreach(&mut self, foreach: ForeachStatement) -> TreeResult<Option<Statement>> {
        let mut foreach = walk_foreach(self, foreach)?;

        let bounds = match &foreach.end_range {
            Some(end_range) => (foreach.range.known_value(), end_range.known_value()),
            None => (None, None),
        };
        if let (Some(Value::Number(start)), Some(Value::Number(end))) = bounds {
            if start.as_i32() > end.as_i32() {
                // The loop variable is still assigned, so only the body goes.
                self.applied("empty-range-foreach", foreach.info);
                foreach.body = None;
            }
        }
        Ok(Some(Statement::Foreach(foreach)))
    }

    fn visit_if(&mut self, if_statement: IfStatement) -> TreeResult<Option<Statement>> {
        let info = if_statement.info;
        let mut condition = self.mutate_expression(if_statement.condition)?;

        if condition.ty().is_some_and(Type::is_boolean_class) {
            if let Some(Value::Boolean(value)) = condition.known_value() {
                self.applied("constant-if", info);
                let taken = if value {
                    if_statement.then_part
                } else {
                    if_statement.else_part
                };
                return match taken {
                    Some(block) => Ok(self.optimize_block(block)?.map(Statement::Block)),
                    None => Ok(None),
                };
            }
        }

        let mut then_part = match if_statement.then_part {
            Some(block) => self.optimize_block(block)?,
            None => None,
        };
        let mut else_part = match if_statement.else_part {
            Some(block) => self.optimize_block(block)?,
            None => None,
        };

        if then_part.is_none() && else_part.is_some() {
            self.applied("inverted-if", info);
            then_part = else_part.take();
            condition = negated(condition.info(), condition)?;
        }

        Ok(Some(Statement::If(IfStatement {
            info,
            condition,
            then_part,
            else_part,
            merged_variables: if_statement.merged_variables,
        })))
    }

    fn visit_paren(&mut self, meta: ExprMeta, inner: Box<Expression>) -> TreeResult<Expression> {
        self.applied("paren", meta.info);
        self.visit_expression(*inner)
    }

    fn visit_negate(&mut self, meta: ExprMeta, operand: Box<Expression>) -> TreeResult<Expression> {
        let operand = self.mutate_expression(*operand)?;

        if operand.is_value_known() {
            if let Some(Value::Number(number)) = operand.known_value() {
                self.applied("negate-constant", meta.info);
                return Ok(Expression::number_literal(meta.info, number.negated()));
            }
        }

        let (operand_meta, operand_kind) = operand.into_parts();
        let operand = match operand_kind {
            ExpressionKind::Negate(inner) => {
                self.applied("double-negate", meta.info);
                return Ok(*inner);
            }
            kind => Expression::from_parts(operand_meta, kind),
        };
        Ok(Expression::from_parts(meta, ExpressionKind::Negate(Box::new(operand))))
    }

    fn visit_not(&mut self, meta: ExprMeta, operand: Box<Expression>) -> TreeResult<Expression> {
        let operand = self.mutate_expression(*operand)?;

        if operand.is_value_known() {
            if let Some(Value::Boolean(value)) = operand.known_value() {
                self.applied("not-constant", meta.info);
                return Ok(Expression::boolean_literal(meta.info, !value));
            }
        }

        let (operand_meta, operand_kind) = operand.into_parts();
        let operand = match operand_kind {
            ExpressionKind::Not(inner) => {
                self.applied("double-not", meta.info);
                return Ok(*inner);
            }
            kind => Expression::from_parts(operand_meta, kind),
        };
        Ok(Expression::from_parts(meta, ExpressionKind::Not(Box::new(operand))))
    }

    fn visit_concatenate(
        &mut self,
        meta: ExprMeta,
        binary: BinaryExpression,
    ) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;
        let left_value = binary.left.known_value();
        let right_value = binary.right.known_value();

        if let Some(Value::String(left)) = left_value {
            if let Some(Value::String(right)) = right_value {
                self.applied("concatenate-constants", meta.info);
                return Ok(Expression::string_literal(meta.info, left + &right));
            }
            if left.is_empty() {
                self.applied("concatenate-empty-left", meta.info);
                return Ok(*binary.right);
            }
        } else if let Some(Value::String(right)) = right_value {
            if right.is_empty() {
                self.applied("concatenate-empty-right", meta.info);
                return Ok(*binary.left);
            }
        }

        Ok(Expression::from_parts(meta, ExpressionKind::Concatenate(binary)))
    }

    fn visit_arithmetic(
        &mut self,
        meta: ExprMeta,
        binary: BinaryExpression,
    ) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;

        if meta.conversions().ty().is_some() {
            let values = (binary.left.known_value(), binary.right.known_value());
            if let (Some(Value::Number(left)), Some(Value::Number(right))) = values {
                if let Some(ty) = binary.left.ty().filter(|ty| binary.right.ty() == Some(*ty)) {
                    // Division or remainder by zero stays for the runtime to raise.
                    if let Some(result) = fold_arithmetic(binary.operator.kind, ty, left, right) {
                        self.applied("arithmetic-constants", meta.info);
                        return Ok(Expression::number_literal(meta.info, result));
                    }
                }
            }
        }

        Ok(Expression::from_parts(meta, ExpressionKind::Arithmetic(binary)))
    }

    fn visit_relational(
        &mut self,
        meta: ExprMeta,
        relational: RelationalExpression,
    ) -> TreeResult<Expression> {
        let info = meta.info;
        let operator = relational.operator;
        let left = self.mutate_expression(*relational.left)?;

        let right = match relational.right {
            RelationalOperand::Isa(type_name) => {
                let tested = type_name.ty().ok_or_else(|| {
                    TreeError::malformed("isa type name is unresolved", type_name.info)
                })?;
                let left_type = left
                    .ty()
                    .ok_or_else(|| TreeError::malformed("isa operand is untyped", left.info()))?;
                if tested.class_assignable_from(left_type) {
                    self.applied("isa-widening", info);
                    return Ok(Expression::boolean_literal(info, true));
                }
                return Ok(Expression::from_parts(
                    meta,
                    ExpressionKind::Relational(RelationalExpression {
                        operator,
                        left: Box::new(left),
                        right: RelationalOperand::Isa(type_name),
                    }),
                ));
            }
            RelationalOperand::Expression(right) => self.mutate_expression(*right)?,
        };

        let kind = operator.kind;
        let left_value = left.known_value();
        let right_value = right.known_value();

        if meta.conversions().ty().is_some() {
            let folded = match (&left_value, &right_value) {
                (Some(Value::Number(l)), Some(Value::Number(r))) => left
                    .ty()
                    .filter(|ty| right.ty() == Some(*ty))
                    .and_then(|ty| compare_numbers(kind, ty, *l, *r)),
                (Some(Value::String(l)), Some(Value::String(r))) => {
                    relate(kind, l.encode_utf16().cmp(r.encode_utf16()), Ordering::Equal)
                }
                _ => None,
            };
            if let Some(result) = folded {
                self.applied("compare-constants", info);
                return Ok(Expression::boolean_literal(info, result));
            }
        }

        if is_non_null_boolean(&left) && is_non_null_boolean(&right) {
            let left_bool = left_value.as_ref().and_then(Value::as_bool);
            let right_bool = right_value.as_ref().and_then(Value::as_bool);
            match (left_bool, right_bool) {
                (Some(l), Some(r)) => {
                    if let Some(result) = relate(kind, l, r).filter(|_| is_equality(kind)) {
                        self.applied("compare-booleans", info);
                        return Ok(Expression::boolean_literal(info, result));
                    }
                }
                (Some(known), None) if is_equality(kind) => {
                    self.applied("compare-boolean-left", info);
                    return keep_or_negate(known, kind, info, right);
                }
                (None, Some(known)) if is_equality(kind) => {
                    self.applied("compare-boolean-right", info);
                    return keep_or_negate(known, kind, info, left);
                }
                _ => {}
            }
        }

        let left_is_null = matches!(left_value, Some(Value::Null));
        let right_is_null = matches!(right_value, Some(Value::Null));
        if left_is_null && right_is_null {
            if is_equality(kind) {
                self.applied("compare-nulls", info);
                return Ok(Expression::boolean_literal(info, kind == TokenKind::Eq));
            }
        } else if (left_is_null && is_pure_non_null(&right))
            || (right_is_null && is_pure_non_null(&left))
        {
            if is_equality(kind) {
                self.applied("compare-null-with-non-null", info);
                return Ok(Expression::boolean_literal(info, kind == TokenKind::Ne));
            }
        }

        Ok(Expression::from_parts(
            meta,
            ExpressionKind::Relational(RelationalExpression {
                operator,
                left: Box::new(left),
                right: RelationalOperand::Expression(Box::new(right)),
            }),
        ))
    }

    fn visit_and(&mut self, meta: ExprMeta, binary: BinaryExpression) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;

        if let Some(Value::Boolean(left)) = binary.left.known_value() {
            if left {
                self.applied("and-true-left", meta.info);
                return Ok(*binary.right);
            }
            self.applied("and-false-left", meta.info);
            return Ok(Expression::boolean_literal(meta.info, false));
        }
        // A known false right operand is left for the runtime.
        if let Some(Value::Boolean(true)) = binary.right.known_value() {
            self.applied("and-true-right", meta.info);
            return Ok(*binary.left);
        }

        Ok(Expression::from_parts(meta, ExpressionKind::And(binary)))
    }

    fn visit_or(&mut self, meta: ExprMeta, binary: BinaryExpression) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;

        if let Some(Value::Boolean(left)) = binary.left.known_value() {
            if left {
                self.applied("or-true-left", meta.info);
                return Ok(Expression::boolean_literal(meta.info, true));
            }
            self.applied("or-false-left", meta.info);
            return Ok(*binary.right);
        }
        // A known true right operand is left for the runtime.
        if let Some(Value::Boolean(false)) = binary.right.known_value() {
            self.applied("or-false-right", meta.info);
            return Ok(*binary.left);
        }

        Ok(Expression::from_parts(meta, ExpressionKind::Or(binary)))
    }
}

/// `not expr`, coerced to boolean on both sides of the negation.
fn negated(info: SourceInfo, mut expr: Expression) -> TreeResult<Expression> {
    expr.convert_to_type(&Type::boolean())?;
    let mut not = Expression::not(info, expr);
    not.convert_to_type(&Type::boolean())?;
    Ok(not)
}

/// `true == x` and `false != x` are `x`; the other two forms are `not x`.
fn keep_or_negate(
    known: bool,
    operator: TokenKind,
    info: SourceInfo,
    other: Expression,
) -> TreeResult<Expression> {
    if known == (operator == TokenKind::Eq) {
        Ok(other)
    } else {
        negated(info, other)
    }
}

fn is_equality(operator: TokenKind) -> bool {
    matches!(operator, TokenKind::Eq | TokenKind::Ne)
}

fn is_non_null_boolean(expr: &Expression) -> bool {
    expr.ty()
        .is_some_and(|ty| ty.is_non_null() && ty.is_boolean_class())
}

/// Non-null operands that can be dropped without losing a side effect.
fn is_pure_non_null(expr: &Expression) -> bool {
    expr.ty().is_some_and(Type::is_non_null)
        && (expr.is_literal() || matches!(expr.kind, ExpressionKind::VariableRef(_)))
}

fn relate<T: PartialOrd>(operator: TokenKind, left: T, right: T) -> Option<bool> {
    let result = match operator {
        TokenKind::Eq => left == right,
        TokenKind::Ne => left != right,
        TokenKind::Lt => left < right,
        TokenKind::Gt => left > right,
        TokenKind::Le => left <= right,
        TokenKind::Ge => left >= right,
        _ => return None,
    };
    Some(result)
}

fn compare_numbers(operator: TokenKind, ty: &Type, left: Number, right: Number) -> Option<bool> {
    match ty.kind() {
        TypeKind::Int => relate(operator, left.as_i32(), right.as_i32()),
        TypeKind::Long => relate(operator, left.as_i64(), right.as_i64()),
        TypeKind::Float => relate(operator, left.as_f32(), right.as_f32()),
        TypeKind::Double => relate(operator, left.as_f64(), right.as_f64()),
        _ => None,
    }
}

/// Evaluates `left operator right` in the width `ty` names. `None` when the
/// type is not one of the four arithmetic widths or an integer divisor is
/// zero.
pub fn fold_arithmetic(
    operator: TokenKind,
    ty: &Type,
    left: Number,
    right: Number,
) -> Option<Number> {
    let result = match ty.kind() {
        TypeKind::Int => {
            let (a, b) = (left.as_i32(), right.as_i32());
            Number::Int(match operator {
                TokenKind::Plus => a.wrapping_add(b),
                TokenKind::Minus => a.wrapping_sub(b),
                TokenKind::Mult => a.wrapping_mul(b),
                TokenKind::Div if b != 0 => a.wrapping_div(b),
                TokenKind::Mod if b != 0 => a.wrapping_rem(b),
                _ => return None,
            })
        }
        TypeKind::Long => {
            let (a, b) = (left.as_i64(), right.as_i64());
            Number::Long(match operator {
                TokenKind::Plus => a.wrapping_add(b),
                TokenKind::Minus => a.wrapping_sub(b),
                TokenKind::Mult => a.wrapping_mul(b),
                TokenKind::Div if b != 0 => a.wrapping_div(b),
                TokenKind::Mod if b != 0 => a.wrapping_rem(b),
                _ => return None,
            })
        }
        TypeKind::Float => {
            let (a, b) = (left.as_f32(), right.as_f32());
            Number::Float(match operator {
                TokenKind::Plus => a + b,
                TokenKind::Minus => a - b,
                TokenKind::Mult => a * b,
                TokenKind::Div => a / b,
                TokenKind::Mod => a % b,
                _ => return None,
            })
        }
        TypeKind::Double => {
            let (a, b) = (left.as_f64(), right.as_f64());
            Number::Double(match operator {
                TokenKind::Plus => a + b,
                TokenKind::Minus => a - b,
                TokenKind::Mult => a * b,
                TokenKind::Div => a / b,
                TokenKind::Mod => a % b,
                _ => return None,
            })
        }
        _ => return None,
    };
    Some(result)
}
