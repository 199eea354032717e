mod common;

use common::*;
use tea_template::{
    BasicOptimizer, Block, Expression, ExpressionKind, ForeachStatement, Name, Number, SourceInfo,
    Statement, StatementList, Template, Type, VariableRef,
};

fn optimize(statement: Statement) -> Option<Statement> {
    let mut optimizer = BasicOptimizer::new();
    optimizer
        .optimize(template(statement))
        .expect("optimize")
        .statement
}

fn literal_at(line: usize, value: i32) -> Expression {
    Expression::number_literal(at(line), Number::Int(value))
}

fn mark(value: i32) -> Statement {
    expr_stmt(int(value))
}

fn marks(statement: &Statement) -> Vec<i32> {
    fn collect(statement: &Statement, out: &mut Vec<i32>) {
        match statement {
            Statement::Expression(statement) => {
                if let ExpressionKind::NumberLiteral(Number::Int(value)) =
                    statement.expression.kind
                {
                    out.push(value);
                }
            }
            Statement::List(list) => list.statements.iter().for_each(|s| collect(s, out)),
            Statement::Block(block) => block.statements.iter().for_each(|s| collect(s, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    collect(statement, &mut out);
    out
}

#[test]
fn constant_true_condition_keeps_the_then_branch() {
    let statement = if_stmt(
        boolean(true),
        Some(block(2, vec![mark(1)])),
        Some(block(3, vec![mark(2)])),
    );
    let optimized = optimize(statement).expect("then branch survives");
    assert!(matches!(optimized, Statement::Block(_)));
    assert_eq!(marks(&optimized), vec![1]);
}

#[test]
fn constant_false_condition_keeps_the_else_branch() {
    let statement = if_stmt(
        not(boolean(true)),
        Some(block(2, vec![mark(1)])),
        Some(block(3, vec![mark(2)])),
    );
    let optimized = optimize(statement).expect("else branch survives");
    assert_eq!(marks(&optimized), vec![2]);
}

#[test]
fn constant_false_condition_without_else_disappears() {
    let statement = if_stmt(boolean(false), Some(block(2, vec![mark(1)])), None);
    assert_eq!(optimize(statement), None);
}

#[test]
fn empty_then_branch_inverts_the_condition() {
    let statement = if_stmt(
        var("flag", Type::boolean()),
        Some(block(2, vec![Statement::Empty(at(2))])),
        Some(block(3, vec![mark(7)])),
    );
    let optimized = optimize(statement).expect("if survives");
    let Statement::If(if_statement) = optimized else {
        panic!("expected an if statement");
    };
    assert!(if_statement.else_part.is_none());
    let then_part = if_statement.then_part.expect("then part");
    assert_eq!(then_part.info, at(3));
    assert_eq!(marks(&Statement::Block(then_part)), vec![7]);
    match &if_statement.condition.kind {
        ExpressionKind::Not(operand) => {
            assert!(matches!(operand.kind, ExpressionKind::VariableRef(_)))
        }
        other => panic!("expected a negated condition, got {other:?}"),
    }
    assert_eq!(if_statement.condition.ty(), Some(&Type::boolean()));
}

#[test]
fn if_with_unknown_condition_keeps_both_branches() {
    let statement = if_stmt(
        var("flag", Type::boolean()),
        Some(block(2, vec![mark(1)])),
        Some(block(3, vec![mark(2)])),
    );
    let Some(Statement::If(if_statement)) = optimize(statement) else {
        panic!("expected an if statement");
    };
    assert!(if_statement.then_part.is_some());
    assert!(if_statement.else_part.is_some());
}

#[test]
fn empty_statements_and_blocks_are_removed() {
    assert_eq!(optimize(Statement::Empty(at(1))), None);
    assert_eq!(optimize(Statement::Block(Block::empty(at(1)))), None);

    let nested = Statement::Block(block(
        1,
        vec![
            Statement::Empty(at(2)),
            Statement::Block(block(3, vec![Statement::Empty(at(4))])),
        ],
    ));
    assert_eq!(optimize(nested), None);
}

#[test]
fn block_with_an_initializer_is_kept() {
    let mut with_initializer = Block::empty(at(1));
    with_initializer.initializer = Some(Box::new(mark(1)));
    let optimized = optimize(Statement::Block(with_initializer)).expect("block survives");
    let Statement::Block(block) = optimized else {
        panic!("expected a block");
    };
    assert!(block.statements.is_empty());
    assert!(block.initializer.is_some());
}

#[test]
fn single_survivor_replaces_its_list() {
    let list = Statement::List(StatementList::new(
        at(1),
        vec![Statement::Empty(at(1)), mark(9), Statement::Empty(at(3))],
    ));
    let optimized = optimize(list).expect("statement survives");
    assert!(matches!(optimized, Statement::Expression(_)));
    assert_eq!(marks(&optimized), vec![9]);
}

#[test]
fn surviving_list_spans_its_statements() {
    let first = expr_stmt(literal_at(2, 1));
    let second = expr_stmt(literal_at(5, 2));
    let list = Statement::List(StatementList::new(
        SourceInfo::new(1, 0, 100),
        vec![first, Statement::Empty(at(3)), second],
    ));
    let Some(Statement::List(list)) = optimize(list) else {
        panic!("expected a list");
    };
    assert_eq!(list.statements.len(), 2);
    assert_eq!(list.info, SourceInfo::union(&at(2), &at(5)));
}

#[test]
fn surviving_list_keeps_its_own_span_when_statements_have_none() {
    let unplaced = |value| {
        expr_stmt(Expression::number_literal(
            SourceInfo::default(),
            Number::Int(value),
        ))
    };
    let list_info = SourceInfo::new(7, 3, 40);
    let list = Statement::List(StatementList::new(
        list_info,
        vec![unplaced(1), Statement::Empty(at(2)), unplaced(2)],
    ));
    let Some(Statement::List(list)) = optimize(list) else {
        panic!("expected a list");
    };
    assert_eq!(list.statements.len(), 2);
    assert_eq!(list.info, list_info);
}

#[test]
fn foreach_over_an_empty_range_drops_its_body() {
    let loop_variable = VariableRef::new(Name::new(at(1), "i"), Some(variable("i", Type::int())));
    let foreach = |start: i32, end: i32| {
        Statement::Foreach(ForeachStatement {
            info: at(1),
            loop_variable: loop_variable.clone(),
            range: int(start),
            end_range: Some(int(end)),
            reverse: false,
            initializer: None,
            body: Some(block(2, vec![mark(1)])),
        })
    };

    let Some(Statement::Foreach(empty)) = optimize(foreach(5, 1)) else {
        panic!("expected a foreach");
    };
    assert!(empty.body.is_none());

    let Some(Statement::Foreach(full)) = optimize(foreach(1, 5)) else {
        panic!("expected a foreach");
    };
    assert!(full.body.is_some());
}

#[test]
fn template_signature_is_untouched() {
    let params = vec![variable("a", Type::int()), variable("b", Type::string())];
    let mut original = Template::new(
        at(1),
        Name::new(at(1), "signature"),
        params.clone(),
        true,
        Some(Statement::Empty(at(2))),
    );
    original.return_type = Some(Type::non_null_string());

    let mut optimizer = BasicOptimizer::new();
    let optimized = optimizer.optimize(original.clone()).expect("optimize");
    assert_eq!(optimized.name, original.name);
    assert_eq!(optimized.params, params);
    assert!(optimized.has_substitution_param());
    assert_eq!(optimized.return_type, original.return_type);
    assert_eq!(optimized.statement, None);
}

#[test]
fn return_and_break_flow_through_nested_blocks() {
    let returning = Statement::Block(block(1, vec![mark(1), ret(int(2))]));
    assert!(returning.is_return());

    let branches = if_stmt(
        var("flag", Type::boolean()),
        Some(block(2, vec![ret(int(1))])),
        Some(block(3, vec![Statement::Break(at(3))])),
    );
    assert!(!branches.is_return());
    assert!(!branches.is_break());

    let both = if_stmt(
        var("flag", Type::boolean()),
        Some(block(2, vec![ret(int(1))])),
        Some(block(3, vec![ret(int(2))])),
    );
    assert!(both.is_return());
}
