//! Read-only passes over a template tree.

use serde::Serialize;

use crate::error::{TreeError, TreeResult};
use crate::parsetree::{
    Block, CallExpression, Expression, ExpressionKind, RelationalExpression, RelationalOperand,
    Statement, Template, VariableRef,
};
use crate::visitor::{self, Visitor};

/// Node totals of a template, used to report what a pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub statements: usize,
    pub expressions: usize,
    pub literals: usize,
}

impl NodeCounts {
    pub fn of(template: &Template) -> Self {
        let mut counter = NodeCounter::default();
        counter.visit_template(template);
        counter.counts
    }

    /// Nodes present in `self` but not in `after`.
    pub fn removed(&self, after: &NodeCounts) -> usize {
        let before = self.statements + self.expressions;
        before.saturating_sub(after.statements + after.expressions)
    }
}

#[derive(Debug, Default)]
pub struct NodeCounter {
    counts: NodeCounts,
}

impl NodeCounter {
    pub fn counts(&self) -> NodeCounts {
        self.counts
    }
}

impl Visitor for NodeCounter {
    fn visit_statement(&mut self, statement: &Statement) {
        // Blocks are counted where every block is visited.
        if !matches!(statement, Statement::Block(_)) {
            self.counts.statements += 1;
        }
        visitor::walk_statement(self, statement);
    }

    fn visit_block(&mut self, block: &Block) {
        self.counts.statements += 1;
        visitor::walk_block(self, block);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        self.counts.expressions += 1;
        if expr.is_literal() {
            self.counts.literals += 1;
        }
        visitor::walk_expression(self, expr);
    }
}

/// Verifies what the tree passes assume of a type-checked template: every
/// expression is typed, every variable reference is bound and every `isa`
/// type name is resolved.
#[derive(Debug, Default)]
pub struct ContractChecker {
    violations: Vec<TreeError>,
}

impl ContractChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// First violation found, if any.
    pub fn check(template: &Template) -> TreeResult<()> {
        let mut checker = Self::new();
        checker.visit_template(template);
        match checker.violations.into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    pub fn violations(&self) -> &[TreeError] {
        &self.violations
    }
}

fn is_void_permitted_call(expr: &Expression) -> bool {
    match &expr.kind {
        ExpressionKind::FunctionCall(call) | ExpressionKind::TemplateCall(call) => {
            call.void_permitted
        }
        _ => false,
    }
}

impl Visitor for ContractChecker {
    fn visit_expression(&mut self, expr: &Expression) {
        if expr.ty().is_none() && !is_void_permitted_call(expr) {
            self.violations
                .push(TreeError::malformed("expression has no type", expr.info()));
        }
        visitor::walk_expression(self, expr);
    }

    fn visit_function_call(&mut self, _expr: &Expression, call: &CallExpression) {
        if call.method.is_none() {
            self.violations.push(TreeError::malformed(
                format!("call to {} is unresolved", call.target.name),
                call.target.info,
            ));
        }
        visitor::walk_call(self, call);
    }

    fn visit_variable_ref(&mut self, reference: &VariableRef) {
        match &reference.variable {
            Some(variable) => self.visit_variable(variable),
            None => self.violations.push(TreeError::malformed(
                format!("variable {} is unbound", reference.name.name),
                reference.name.info,
            )),
        }
    }

    fn visit_relational(&mut self, _expr: &Expression, relational: &RelationalExpression) {
        if let RelationalOperand::Isa(type_name) = &relational.right {
            if type_name.ty().is_none() {
                self.violations.push(TreeError::malformed(
                    format!("isa type {} is unresolved", type_name.name),
                    type_name.info,
                ));
            }
        }
        visitor::walk_relational(self, relational);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::parsetree::{
        ExpressionStatement, Name, Number, Token, TokenKind, TypeName, Variable,
    };
    use crate::source::SourceInfo;
    use crate::types::Type;

    fn info(line: usize) -> SourceInfo {
        SourceInfo::new(line, 0, 4)
    }

    fn template_of(expression: Expression) -> Template {
        let statement = Statement::Expression(ExpressionStatement {
            info: expression.info(),
            expression,
        });
        Template::new(info(1), Name::new(info(1), "t"), Vec::new(), false, Some(statement))
    }

    #[test]
    fn counts_every_statement_and_expression() {
        let plus = Token::new(TokenKind::Plus, info(1));
        let sum = Expression::arithmetic(
            info(1),
            plus,
            Expression::number_literal(info(1), Number::Int(1)),
            Expression::number_literal(info(1), Number::Int(2)),
        );
        let counts = NodeCounts::of(&template_of(sum));
        assert_eq!(
            counts,
            NodeCounts {
                statements: 1,
                expressions: 3,
                literals: 2,
            }
        );
    }

    #[test]
    fn untyped_expression_violates_the_contract() {
        let plus = Token::new(TokenKind::Plus, info(2));
        let sum = Expression::arithmetic(
            info(2),
            plus,
            Expression::number_literal(info(2), Number::Int(1)),
            Expression::number_literal(info(2), Number::Int(2)),
        );
        let err = ContractChecker::check(&template_of(sum)).unwrap_err();
        assert_eq!(err.info(), info(2));
    }

    #[test]
    fn unbound_variable_violates_the_contract() {
        let reference = Expression::new(
            info(3),
            ExpressionKind::VariableRef(VariableRef::new(Name::new(info(3), "x"), None)),
        )
        .typed(Type::int())
        .unwrap();
        let err = ContractChecker::check(&template_of(reference)).unwrap_err();
        assert!(err.to_string().contains("variable x is unbound"));
    }

    #[test]
    fn unresolved_isa_type_violates_the_contract() {
        let variable = Rc::new(Variable::typed(info(4), "x", Type::object()));
        let left = Expression::variable_ref(info(4), variable)
            .typed(Type::object())
            .unwrap();
        let isa = Expression::isa(
            info(4),
            Token::new(TokenKind::Isa, info(4)),
            left,
            TypeName::new(info(4), "Widget", 0),
        )
        .typed(Type::boolean())
        .unwrap();
        let checker_result = ContractChecker::check(&template_of(isa));
        assert!(checker_result
            .unwrap_err()
            .to_string()
            .contains("isa type Widget is unresolved"));
    }

    #[test]
    fn typed_tree_passes() {
        let literal = Expression::string_literal(info(5), "ok");
        assert!(ContractChecker::check(&template_of(literal)).is_ok());
    }
}
