#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tea_template::{
    Block, Expression, ExpressionStatement, IfStatement, Name, Number, ReturnStatement,
    SourceInfo, Statement, StatementList, Template, Token, TokenKind, Type, TypeName,
};

pub fn teac_binary() -> &'static str {
    env!("CARGO_BIN_EXE_teac")
}

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

pub fn run_teac(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(teac_binary())
        .current_dir(workspace_root())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run teac")
}

pub fn at(line: usize) -> SourceInfo {
    SourceInfo::new(line, 2, 9)
}

fn int(value: i32) -> Expression {
    Expression::number_literal(at(2), Number::Int(value))
}

fn statement(expression: Expression) -> Statement {
    Statement::Expression(ExpressionStatement {
        info: expression.info(),
        expression,
    })
}

/// `if 6 * 7 > 40 then "yes" else "no"; return "tea" ~ "time"`, fully typed.
pub fn foldable_template() -> Template {
    let product = Expression::arithmetic(at(2), Token::new(TokenKind::Mult, at(2)), int(6), int(7))
        .typed(Type::int())
        .expect("product type");
    let condition =
        Expression::relational(at(2), Token::new(TokenKind::Gt, at(2)), product, int(40))
            .typed(Type::boolean())
            .expect("condition type");
    let greeting = Expression::concatenate(
        at(4),
        Token::new(TokenKind::Concat, at(4)),
        Expression::string_literal(at(4), "tea"),
        Expression::string_literal(at(4), "time"),
    )
    .typed(Type::non_null_string())
    .expect("greeting type");

    let body = Statement::List(StatementList::new(
        at(1),
        vec![
            Statement::If(IfStatement::new(
                at(2),
                condition,
                Some(Block::new(at(2), vec![statement(Expression::string_literal(at(2), "yes"))])),
                Some(Block::new(at(3), vec![statement(Expression::string_literal(at(3), "no"))])),
            )),
            Statement::Return(ReturnStatement {
                info: at(4),
                expression: Some(greeting),
            }),
        ],
    ));
    Template::new(at(1), Name::new(at(1), "greet"), Vec::new(), false, Some(body))
}

/// A template whose `isa` test names a type nothing resolved.
pub fn unresolved_template() -> Template {
    let tested = Expression::string_literal(at(3), "tea");
    let isa = Expression::isa(
        at(3),
        Token::new(TokenKind::Isa, at(3)),
        tested,
        TypeName::new(at(3), "Kettle", 0),
    )
    .typed(Type::boolean())
    .expect("isa type");
    Template::new(at(1), Name::new(at(1), "broken"), Vec::new(), false, Some(statement(isa)))
}

/// `if false then "never"`: nothing survives folding.
pub fn dead_template() -> Template {
    let never = Block::new(at(5), vec![statement(Expression::string_literal(at(5), "never"))]);
    let body = Statement::If(IfStatement::new(
        at(5),
        Expression::boolean_literal(at(5), false),
        Some(never),
        None,
    ));
    Template::new(at(5), Name::new(at(5), "idle"), Vec::new(), false, Some(body))
}

pub fn write_template(dir: &Path, name: &str, template: &Template) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string(template).expect("serialize template");
    fs::write(&path, json).expect("write template");
    path
}

pub fn read_template(path: &Path) -> Template {
    let json = fs::read_to_string(path).expect("read template");
    serde_json::from_str(&json).expect("parse template")
}
