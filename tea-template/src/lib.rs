mod analysis;
mod compiler;
mod diagnostics;
mod error;
mod optimizer;
mod parsetree;
mod source;
mod types;

pub mod mutator;
pub mod visitor;

pub use crate::analysis::{ContractChecker, NodeCounter, NodeCounts};
pub use crate::compiler::{Compilation, CompileOptions, CompileStats, Compiler};
pub use crate::diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use crate::error::{TreeError, TreeResult};
pub use crate::mutator::Mutator;
pub use crate::optimizer::{fold_arithmetic, BasicOptimizer};
pub use crate::parsetree::{
    ArrayLookup, AssignmentStatement, BinaryExpression, Block, CallExpression, Conversion,
    ConversionChain, Converted, ExceptionGuardStatement, ExprMeta, Expression, ExpressionKind,
    ExpressionList, ExpressionStatement, ForeachStatement, IfStatement, Lookup, MethodRef, Name,
    NewArrayExpression, Number, RelationalExpression, RelationalOperand, ReturnStatement,
    Statement, StatementList, Template, Token, TokenKind, TypeName, Value, Variable, VariableRef,
};
pub use crate::source::SourceInfo;
pub use crate::types::{Type, TypeKind};
pub use crate::visitor::Visitor;
