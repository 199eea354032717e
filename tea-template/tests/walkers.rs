mod common;

use common::*;
use tea_template::mutator::{self, Mutator};
use tea_template::visitor::{self, Visitor};
use tea_template::{
    Block, CallExpression, ExceptionGuardStatement, Expression, ExpressionKind, ExpressionList,
    ForeachStatement, Name, Number, NodeCounter, SourceInfo, Statement, StatementList, TokenKind,
    TreeResult, Type, Variable, VariableRef,
};

/// Records every number literal and variable it meets, in visit order.
#[derive(Default)]
struct Recorder {
    seen: Vec<String>,
}

impl Visitor for Recorder {
    fn visit_number_literal(&mut self, _expr: &Expression, value: Number) {
        self.seen.push(value.to_string());
    }

    fn visit_variable(&mut self, variable: &Variable) {
        self.seen.push(variable.name.clone());
        visitor::walk_variable(self, variable);
    }
}

fn record(statement: &Statement) -> Vec<String> {
    let mut recorder = Recorder::default();
    recorder.visit_statement(statement);
    recorder.seen
}

fn loop_ref(name: &str) -> VariableRef {
    VariableRef::new(Name::new(at(1), name), Some(variable(name, Type::int())))
}

#[test]
fn block_visits_initializer_then_statements_then_finalizer() {
    let mut body = block(1, vec![mark(2), mark(3)]);
    body.initializer = Some(Box::new(mark(1)));
    body.finalizer = Some(Box::new(mark(4)));
    assert_eq!(record(&Statement::Block(body)), ["1", "2", "3", "4"]);
}

#[test]
fn if_visits_condition_then_branches() {
    let condition = rel(TokenKind::Lt, int(1), var("limit", Type::int()));
    let statement = if_stmt(
        condition,
        Some(block(2, vec![mark(2)])),
        Some(block(3, vec![mark(3)])),
    );
    assert_eq!(record(&statement), ["1", "limit", "2", "3"]);
}

#[test]
fn foreach_visits_its_parts_in_declaration_order() {
    let statement = Statement::Foreach(ForeachStatement {
        info: at(1),
        loop_variable: loop_ref("i"),
        range: int(1),
        end_range: Some(int(2)),
        reverse: false,
        initializer: Some(Box::new(mark(3))),
        body: Some(block(2, vec![mark(4)])),
    });
    assert_eq!(record(&statement), ["i", "1", "2", "3", "4"]);
}

#[test]
fn call_visits_params_initializer_and_substitution() {
    let call = CallExpression {
        initializer: Some(Box::new(mark(3))),
        substitution: Some(block(2, vec![mark(4)])),
        ..CallExpression::new(
            Name::new(at(1), "print"),
            ExpressionList::new(at(1), vec![int(1), int(2)]),
        )
    };
    let expression = Expression::new(at(1), ExpressionKind::TemplateCall(call));
    assert_eq!(record(&expr_stmt(expression)), ["1", "2", "3", "4"]);
}

#[test]
fn binary_operands_are_visited_left_to_right() {
    let expression = arith(
        TokenKind::Minus,
        arith(TokenKind::Plus, int(1), int(2), Type::int()),
        negate(int(3), Type::int()),
        Type::int(),
    );
    assert_eq!(record(&expr_stmt(expression)), ["1", "2", "3"]);
}

#[test]
fn exception_guard_visits_guarded_then_replacement() {
    let guard = Statement::ExceptionGuard(ExceptionGuardStatement {
        info: at(1),
        guarded: Some(Box::new(mark(1))),
        replacement: Some(Box::new(mark(2))),
    });
    assert_eq!(record(&guard), ["1", "2"]);
}

#[test]
fn template_visits_params_before_the_body() {
    let mut t = template(Statement::List(StatementList::new(
        at(1),
        vec![mark(1), ret(int(2))],
    )));
    t.params = vec![variable("a", Type::int()), variable("b", Type::int())];
    let mut recorder = Recorder::default();
    recorder.visit_template(&t);
    assert_eq!(recorder.seen, ["a", "b", "1", "2"]);
}

#[test]
fn node_counter_sees_every_node() {
    let mut counter = NodeCounter::default();
    let body = if_stmt(
        and(var("flag", Type::boolean()), boolean(true)),
        Some(block(2, vec![mark(1), mark(2)])),
        None,
    );
    counter.visit_statement(&body);
    let counts = counter.counts();
    assert_eq!(counts.statements, 4);
    assert_eq!(counts.expressions, 5);
    assert_eq!(counts.literals, 3);
}

/// Leaves every node as it is.
struct Identity;

impl Mutator for Identity {}

#[test]
fn default_mutator_rebuilds_an_equal_tree() {
    let mut initialized = block(4, vec![Statement::Break(at(4))]);
    initialized.finalizer = Some(Box::new(Statement::Substitution(at(5))));
    let statement = Statement::List(StatementList::new(
        at(1),
        vec![
            Statement::Empty(at(1)),
            if_stmt(
                or(var("flag", Type::boolean()), boolean(false)),
                Some(block(2, vec![mark(1)])),
                Some(block(3, vec![ret(concat(string("a"), string("b")))])),
            ),
            Statement::Foreach(ForeachStatement {
                info: at(4),
                loop_variable: loop_ref("i"),
                range: int(5),
                end_range: Some(int(1)),
                reverse: true,
                initializer: None,
                body: Some(initialized),
            }),
        ],
    ));
    let original = template(statement);
    let rebuilt = Identity.visit_template(original.clone()).expect("identity");
    assert_eq!(rebuilt, original);
}

/// Replaces every reference to `name` with a constant.
struct Inline {
    name: &'static str,
    value: i32,
}

impl Mutator for Inline {
    fn visit_expression(&mut self, expr: Expression) -> TreeResult<Expression> {
        match &expr.kind {
            ExpressionKind::VariableRef(reference) if reference.name.name == self.name => {
                Ok(Expression::number_literal(expr.info(), Number::Int(self.value)))
            }
            _ => mutator::walk_expression(self, expr),
        }
    }
}

#[test]
fn replacement_keeps_the_coercion_of_the_replaced_node() {
    let mut count = var("count", Type::int());
    count.convert_to_type(&Type::non_null_string()).expect("to string");
    let message = concat(string("n="), count);

    let mut inline = Inline {
        name: "count",
        value: 3,
    };
    let rewritten = inline.visit_template(template(expr_stmt(message))).expect("inline");
    let ExpressionKind::Concatenate(binary) = &body_expression(&rewritten).kind else {
        panic!("expected a concatenation");
    };
    assert!(matches!(binary.right.kind, ExpressionKind::NumberLiteral(Number::Int(3))));
    assert_eq!(binary.right.ty(), Some(&Type::non_null_string()));
    assert_eq!(binary.right.initial_type(), Some(&Type::int()));
}

#[test]
fn removed_statement_inside_a_body_leaves_an_empty_block() {
    struct DropBreaks;

    impl Mutator for DropBreaks {
        fn visit_break(&mut self, _info: SourceInfo) -> TreeResult<Option<Statement>> {
            Ok(None)
        }

        fn visit_block(&mut self, block: Block) -> TreeResult<Option<Statement>> {
            let block = mutator::walk_block(self, block)?;
            if block.is_empty() {
                return Ok(None);
            }
            Ok(Some(Statement::Block(block)))
        }
    }

    let statement = if_stmt(
        var("flag", Type::boolean()),
        Some(block(2, vec![Statement::Break(at(2))])),
        None,
    );
    let rewritten = DropBreaks
        .visit_template(template(statement))
        .expect("drop breaks");
    let Some(Statement::If(if_statement)) = rewritten.statement else {
        panic!("expected an if statement");
    };
    let then_part = if_statement.then_part.expect("then part");
    assert!(then_part.is_empty());
    assert_eq!(then_part.info, at(2));
}

fn mark(value: i32) -> Statement {
    expr_stmt(int(value))
}
