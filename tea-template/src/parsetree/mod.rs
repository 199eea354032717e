//! Typed parse tree consumed by the tree passes.

mod conversion;
mod expression;
mod statement;
mod template;
mod token;
mod value;

pub use conversion::{Conversion, ConversionChain, Converted};
pub use expression::{
    ArrayLookup, BinaryExpression, CallExpression, ExprMeta, Expression, ExpressionKind,
    ExpressionList, Lookup, NewArrayExpression, RelationalExpression, RelationalOperand,
    VariableRef,
};
pub use statement::{
    AssignmentStatement, Block, ExceptionGuardStatement, ExpressionStatement, ForeachStatement,
    IfStatement, ReturnStatement, Statement, StatementList,
};
pub use template::{MethodRef, Name, Template, TypeName, Variable};
pub use token::{Token, TokenKind};
pub use value::{Number, Value};
