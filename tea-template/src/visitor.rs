//! Read-only traversal of a template tree.
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, which
//! recurses into the node's children. Passes override the methods for the
//! nodes they observe and call the `walk_*` function to keep descending.
//!
//! Children are visited in declaration order: a template's name, parameters
//! and statement; a block's initializer, statements and finalizer; a foreach
//! loop's variable, range, end range, initializer and body; an if
//! statement's condition, then part and else part; a call's parameters,
//! initializer and substitution block; a binary expression's left then right
//! operand.

use crate::parsetree::{
    ArrayLookup, AssignmentStatement, BinaryExpression, Block, CallExpression,
    ExceptionGuardStatement, Expression, ExpressionKind, ExpressionList, ExpressionStatement,
    ForeachStatement, IfStatement, Lookup, Name, NewArrayExpression, Number,
    RelationalExpression, RelationalOperand, ReturnStatement, Statement, StatementList, Template,
    TypeName, Variable, VariableRef,
};
use crate::source::SourceInfo;

pub trait Visitor {
    fn visit_template(&mut self, template: &Template) {
        walk_template(self, template);
    }

    fn visit_name(&mut self, _name: &Name) {}

    fn visit_type_name(&mut self, _type_name: &TypeName) {}

    fn visit_variable(&mut self, variable: &Variable) {
        walk_variable(self, variable);
    }

    fn visit_expression_list(&mut self, list: &ExpressionList) {
        walk_expression_list(self, list);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_empty(&mut self, _info: SourceInfo) {}

    fn visit_statement_list(&mut self, list: &StatementList) {
        walk_statement_list(self, list);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_assignment(&mut self, assignment: &AssignmentStatement) {
        walk_assignment(self, assignment);
    }

    fn visit_break(&mut self, _info: SourceInfo) {}

    fn visit_foreach(&mut self, foreach: &ForeachStatement) {
        walk_foreach(self, foreach);
    }

    fn visit_if(&mut self, if_statement: &IfStatement) {
        walk_if(self, if_statement);
    }

    fn visit_substitution(&mut self, _info: SourceInfo) {}

    fn visit_expression_statement(&mut self, statement: &ExpressionStatement) {
        self.visit_expression(&statement.expression);
    }

    fn visit_return(&mut self, statement: &ReturnStatement) {
        if let Some(expression) = &statement.expression {
            self.visit_expression(expression);
        }
    }

    fn visit_exception_guard(&mut self, guard: &ExceptionGuardStatement) {
        walk_exception_guard(self, guard);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_paren(&mut self, _expr: &Expression, inner: &Expression) {
        self.visit_expression(inner);
    }

    fn visit_new_array(&mut self, _expr: &Expression, array: &NewArrayExpression) {
        self.visit_expression_list(&array.elements);
    }

    fn visit_function_call(&mut self, _expr: &Expression, call: &CallExpression) {
        walk_call(self, call);
    }

    fn visit_template_call(&mut self, _expr: &Expression, call: &CallExpression) {
        walk_call(self, call);
    }

    fn visit_variable_ref(&mut self, reference: &VariableRef) {
        if let Some(variable) = &reference.variable {
            self.visit_variable(variable);
        }
    }

    fn visit_lookup(&mut self, _expr: &Expression, lookup: &Lookup) {
        self.visit_expression(&lookup.expression);
    }

    fn visit_array_lookup(&mut self, _expr: &Expression, lookup: &ArrayLookup) {
        self.visit_expression(&lookup.expression);
        self.visit_expression(&lookup.index);
    }

    fn visit_negate(&mut self, _expr: &Expression, operand: &Expression) {
        self.visit_expression(operand);
    }

    fn visit_not(&mut self, _expr: &Expression, operand: &Expression) {
        self.visit_expression(operand);
    }

    fn visit_concatenate(&mut self, _expr: &Expression, binary: &BinaryExpression) {
        walk_binary(self, binary);
    }

    fn visit_arithmetic(&mut self, _expr: &Expression, binary: &BinaryExpression) {
        walk_binary(self, binary);
    }

    fn visit_relational(&mut self, _expr: &Expression, relational: &RelationalExpression) {
        walk_relational(self, relational);
    }

    fn visit_and(&mut self, _expr: &Expression, binary: &BinaryExpression) {
        walk_binary(self, binary);
    }

    fn visit_or(&mut self, _expr: &Expression, binary: &BinaryExpression) {
        walk_binary(self, binary);
    }

    fn visit_null_literal(&mut self, _expr: &Expression) {}

    fn visit_boolean_literal(&mut self, _expr: &Expression, _value: bool) {}

    fn visit_string_literal(&mut self, _expr: &Expression, _value: &str) {}

    fn visit_number_literal(&mut self, _expr: &Expression, _value: Number) {}
}

pub fn walk_template<V: Visitor + ?Sized>(visitor: &mut V, template: &Template) {
    visitor.visit_name(&template.name);
    for param in &template.params {
        visitor.visit_variable(param);
    }
    if let Some(statement) = &template.statement {
        visitor.visit_statement(statement);
    }
}

pub fn walk_variable<V: Visitor + ?Sized>(visitor: &mut V, variable: &Variable) {
    visitor.visit_type_name(variable.type_name());
}

pub fn walk_expression_list<V: Visitor + ?Sized>(visitor: &mut V, list: &ExpressionList) {
    for expression in &list.expressions {
        visitor.visit_expression(expression);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Empty(info) => visitor.visit_empty(*info),
        Statement::List(list) => visitor.visit_statement_list(list),
        Statement::Block(block) => visitor.visit_block(block),
        Statement::Assignment(assignment) => visitor.visit_assignment(assignment),
        Statement::Break(info) => visitor.visit_break(*info),
        Statement::Foreach(foreach) => visitor.visit_foreach(foreach),
        Statement::If(if_statement) => visitor.visit_if(if_statement),
        Statement::Substitution(info) => visitor.visit_substitution(*info),
        Statement::Expression(statement) => visitor.visit_expression_statement(statement),
        Statement::Return(statement) => visitor.visit_return(statement),
        Statement::ExceptionGuard(guard) => visitor.visit_exception_guard(guard),
    }
}

pub fn walk_statement_list<V: Visitor + ?Sized>(visitor: &mut V, list: &StatementList) {
    for statement in &list.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    if let Some(initializer) = &block.initializer {
        visitor.visit_statement(initializer);
    }
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
    if let Some(finalizer) = &block.finalizer {
        visitor.visit_statement(finalizer);
    }
}

pub fn walk_assignment<V: Visitor + ?Sized>(visitor: &mut V, assignment: &AssignmentStatement) {
    visitor.visit_variable_ref(&assignment.lvalue);
    visitor.visit_expression(&assignment.rvalue);
}

pub fn walk_foreach<V: Visitor + ?Sized>(visitor: &mut V, foreach: &ForeachStatement) {
    visitor.visit_variable_ref(&foreach.loop_variable);
    visitor.visit_expression(&foreach.range);
    if let Some(end_range) = &foreach.end_range {
        visitor.visit_expression(end_range);
    }
    if let Some(initializer) = &foreach.initializer {
        visitor.visit_statement(initializer);
    }
    if let Some(body) = &foreach.body {
        visitor.visit_block(body);
    }
}

pub fn walk_if<V: Visitor + ?Sized>(visitor: &mut V, if_statement: &IfStatement) {
    visitor.visit_expression(&if_statement.condition);
    if let Some(then_part) = &if_statement.then_part {
        visitor.visit_block(then_part);
    }
    if let Some(else_part) = &if_statement.else_part {
        visitor.visit_block(else_part);
    }
}

pub fn walk_exception_guard<V: Visitor + ?Sized>(visitor: &mut V, guard: &ExceptionGuardStatement) {
    if let Some(guarded) = &guard.guarded {
        visitor.visit_statement(guarded);
    }
    if let Some(replacement) = &guard.replacement {
        visitor.visit_statement(replacement);
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match &expr.kind {
        ExpressionKind::Paren(inner) => visitor.visit_paren(expr, inner),
        ExpressionKind::NewArray(array) => visitor.visit_new_array(expr, array),
        ExpressionKind::FunctionCall(call) => visitor.visit_function_call(expr, call),
        ExpressionKind::TemplateCall(call) => visitor.visit_template_call(expr, call),
        ExpressionKind::VariableRef(reference) => visitor.visit_variable_ref(reference),
        ExpressionKind::Lookup(lookup) => visitor.visit_lookup(expr, lookup),
        ExpressionKind::ArrayLookup(lookup) => visitor.visit_array_lookup(expr, lookup),
        ExpressionKind::Negate(operand) => visitor.visit_negate(expr, operand),
        ExpressionKind::Not(operand) => visitor.visit_not(expr, operand),
        ExpressionKind::Concatenate(binary) => visitor.visit_concatenate(expr, binary),
        ExpressionKind::Arithmetic(binary) => visitor.visit_arithmetic(expr, binary),
        ExpressionKind::Relational(relational) => visitor.visit_relational(expr, relational),
        ExpressionKind::And(binary) => visitor.visit_and(expr, binary),
        ExpressionKind::Or(binary) => visitor.visit_or(expr, binary),
        ExpressionKind::NullLiteral => visitor.visit_null_literal(expr),
        ExpressionKind::BooleanLiteral(value) => visitor.visit_boolean_literal(expr, *value),
        ExpressionKind::StringLiteral(value) => visitor.visit_string_literal(expr, value),
        ExpressionKind::NumberLiteral(value) => visitor.visit_number_literal(expr, *value),
    }
}

pub fn walk_call<V: Visitor + ?Sized>(visitor: &mut V, call: &CallExpression) {
    visitor.visit_expression_list(&call.params);
    if let Some(initializer) = &call.initializer {
        visitor.visit_statement(initializer);
    }
    if let Some(substitution) = &call.substitution {
        visitor.visit_block(substitution);
    }
}

pub fn walk_binary<V: Visitor + ?Sized>(visitor: &mut V, binary: &BinaryExpression) {
    visitor.visit_expression(&binary.left);
    visitor.visit_expression(&binary.right);
}

pub fn walk_relational<V: Visitor + ?Sized>(visitor: &mut V, relational: &RelationalExpression) {
    visitor.visit_expression(&relational.left);
    match &relational.right {
        RelationalOperand::Expression(right) => visitor.visit_expression(right),
        RelationalOperand::Isa(type_name) => visitor.visit_type_name(type_name),
    }
}
