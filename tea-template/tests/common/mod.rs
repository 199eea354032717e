#![allow(dead_code)]

use std::rc::Rc;

use tea_template::{
    Block, Expression, ExpressionStatement, IfStatement, Name, Number, ReturnStatement,
    SourceInfo, Statement, Template, Token, TokenKind, Type, Variable,
};

pub fn at(line: usize) -> SourceInfo {
    SourceInfo::new(line, 0, 8)
}

pub fn token(kind: TokenKind) -> Token {
    Token::new(kind, at(1))
}

pub fn int(value: i32) -> Expression {
    Expression::number_literal(at(1), Number::Int(value))
}

pub fn long(value: i64) -> Expression {
    Expression::number_literal(at(1), Number::Long(value))
}

pub fn float(value: f32) -> Expression {
    Expression::number_literal(at(1), Number::Float(value))
}

pub fn double(value: f64) -> Expression {
    Expression::number_literal(at(1), Number::Double(value))
}

pub fn boolean(value: bool) -> Expression {
    Expression::boolean_literal(at(1), value)
}

pub fn string(value: &str) -> Expression {
    Expression::string_literal(at(1), value)
}

pub fn null() -> Expression {
    Expression::null_literal(at(1))
}

pub fn variable(name: &str, ty: Type) -> Rc<Variable> {
    Rc::new(Variable::typed(at(1), name, ty))
}

pub fn var(name: &str, ty: Type) -> Expression {
    let variable = variable(name, ty.clone());
    Expression::variable_ref(at(1), variable)
        .typed(ty)
        .expect("variable type")
}

pub fn arith(kind: TokenKind, left: Expression, right: Expression, ty: Type) -> Expression {
    Expression::arithmetic(at(1), token(kind), left, right)
        .typed(ty)
        .expect("arithmetic type")
}

pub fn rel(kind: TokenKind, left: Expression, right: Expression) -> Expression {
    Expression::relational(at(1), token(kind), left, right)
        .typed(Type::boolean())
        .expect("relational type")
}

pub fn and(left: Expression, right: Expression) -> Expression {
    Expression::and(at(1), token(TokenKind::And), left, right)
        .typed(Type::boolean())
        .expect("and type")
}

pub fn or(left: Expression, right: Expression) -> Expression {
    Expression::or(at(1), token(TokenKind::Or), left, right)
        .typed(Type::boolean())
        .expect("or type")
}

pub fn not(operand: Expression) -> Expression {
    Expression::not(at(1), operand)
        .typed(Type::boolean())
        .expect("not type")
}

pub fn negate(operand: Expression, ty: Type) -> Expression {
    Expression::negate(at(1), operand)
        .typed(ty)
        .expect("negate type")
}

pub fn concat(left: Expression, right: Expression) -> Expression {
    Expression::concatenate(at(1), token(TokenKind::Concat), left, right)
        .typed(Type::non_null_string())
        .expect("concatenate type")
}

pub fn paren(inner: Expression) -> Expression {
    Expression::paren(at(1), inner)
}

pub fn expr_stmt(expression: Expression) -> Statement {
    Statement::Expression(ExpressionStatement {
        info: expression.info(),
        expression,
    })
}

pub fn ret(expression: Expression) -> Statement {
    Statement::Return(ReturnStatement {
        info: expression.info(),
        expression: Some(expression),
    })
}

pub fn block(line: usize, statements: Vec<Statement>) -> Block {
    Block::new(at(line), statements)
}

pub fn if_stmt(
    condition: Expression,
    then_part: Option<Block>,
    else_part: Option<Block>,
) -> Statement {
    Statement::If(IfStatement::new(at(1), condition, then_part, else_part))
}

pub fn template(statement: Statement) -> Template {
    Template::new(at(1), Name::new(at(1), "test"), Vec::new(), false, Some(statement))
}

/// The expression of a template whose body is a single expression statement.
pub fn body_expression(template: &Template) -> &Expression {
    match &template.statement {
        Some(Statement::Expression(statement)) => &statement.expression,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}
