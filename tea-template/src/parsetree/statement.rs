use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::source::SourceInfo;

use super::expression::{Expression, VariableRef};
use super::template::Variable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// No-op.
    Empty(SourceInfo),
    List(StatementList),
    Block(Block),
    Assignment(AssignmentStatement),
    Break(SourceInfo),
    Foreach(ForeachStatement),
    If(IfStatement),
    /// Placeholder for the block a caller passes to a template.
    Substitution(SourceInfo),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
    ExceptionGuard(ExceptionGuardStatement),
}

impl Statement {
    pub fn info(&self) -> SourceInfo {
        match self {
            Statement::Empty(info) | Statement::Break(info) | Statement::Substitution(info) => {
                *info
            }
            Statement::List(list) => list.info,
            Statement::Block(block) => block.info,
            Statement::Assignment(assignment) => assignment.info,
            Statement::Foreach(foreach) => foreach.info,
            Statement::If(if_statement) => if_statement.info,
            Statement::Expression(statement) => statement.info,
            Statement::Return(statement) => statement.info,
            Statement::ExceptionGuard(guard) => guard.info,
        }
    }

    /// Control never falls through this statement because it returns.
    pub fn is_return(&self) -> bool {
        match self {
            Statement::Return(_) => true,
            Statement::List(list) => list.statements.last().is_some_and(Statement::is_return),
            Statement::Block(block) => block.statements.last().is_some_and(Statement::is_return),
            Statement::If(if_statement) => if_statement.both_branches(Block::is_return),
            _ => false,
        }
    }

    /// Control never falls through this statement because it breaks.
    pub fn is_break(&self) -> bool {
        match self {
            Statement::Break(_) => true,
            Statement::List(list) => list.statements.last().is_some_and(Statement::is_break),
            Statement::Block(block) => block.statements.last().is_some_and(Statement::is_break),
            Statement::If(if_statement) => if_statement.both_branches(Block::is_break),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementList {
    pub info: SourceInfo,
    pub statements: Vec<Statement>,
}

impl StatementList {
    pub fn new(info: SourceInfo, statements: Vec<Statement>) -> Self {
        Self { info, statements }
    }
}

/// A statement list that may carry statements the type checker injected
/// before and after it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub info: SourceInfo,
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub initializer: Option<Box<Statement>>,
    #[serde(default)]
    pub finalizer: Option<Box<Statement>>,
}

impl Block {
    pub fn new(info: SourceInfo, statements: Vec<Statement>) -> Self {
        Self {
            info,
            statements,
            initializer: None,
            finalizer: None,
        }
    }

    pub fn empty(info: SourceInfo) -> Self {
        Self::new(info, Vec::new())
    }

    /// Block holding just `statement`.
    pub fn wrap(statement: Statement) -> Self {
        Self::new(statement.info(), vec![statement])
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.initializer.is_none() && self.finalizer.is_none()
    }

    pub fn is_return(&self) -> bool {
        self.statements.last().is_some_and(Statement::is_return)
    }

    pub fn is_break(&self) -> bool {
        self.statements.last().is_some_and(Statement::is_break)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStatement {
    pub info: SourceInfo,
    pub lvalue: VariableRef,
    pub rvalue: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeachStatement {
    pub info: SourceInfo,
    pub loop_variable: VariableRef,
    pub range: Expression,
    /// Present for integer range loops.
    #[serde(default)]
    pub end_range: Option<Expression>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub initializer: Option<Box<Statement>>,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub info: SourceInfo,
    pub condition: Expression,
    #[serde(default)]
    pub then_part: Option<Block>,
    #[serde(default)]
    pub else_part: Option<Block>,
    /// Branch locals the type checker unified into the enclosing scope.
    #[serde(default)]
    pub merged_variables: Option<Vec<Rc<Variable>>>,
}

impl IfStatement {
    pub fn new(
        info: SourceInfo,
        condition: Expression,
        then_part: Option<Block>,
        else_part: Option<Block>,
    ) -> Self {
        Self {
            info,
            condition,
            then_part,
            else_part,
            merged_variables: None,
        }
    }

    fn both_branches(&self, test: impl Fn(&Block) -> bool) -> bool {
        match (&self.then_part, &self.else_part) {
            (Some(then_part), Some(else_part)) => test(then_part) && test(else_part),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub info: SourceInfo,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub info: SourceInfo,
    #[serde(default)]
    pub expression: Option<Expression>,
}

/// Runs `guarded`; if it throws, runs `replacement` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionGuardStatement {
    pub info: SourceInfo,
    pub guarded: Option<Box<Statement>>,
    #[serde(default)]
    pub replacement: Option<Box<Statement>>,
}
