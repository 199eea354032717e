//! Rewriting traversal of a template tree.
//!
//! Nodes are passed by value and every `visit_*` method returns the node
//! that replaces the visited one. The defaults rebuild each node from its
//! rewritten children, in the same order as [`crate::visitor::Visitor`].
//! Statement visits may return `None` to remove the statement.
//!
//! Passes should descend through [`Mutator::mutate_expression`] and
//! [`Mutator::mutate_block`] rather than the raw visits: the first keeps a
//! replacement expression coerced the way the original was, the second keeps
//! if/foreach/call bodies as blocks.

use std::rc::Rc;

use crate::error::TreeResult;
use crate::parsetree::{
    ArrayLookup, AssignmentStatement, BinaryExpression, Block, CallExpression,
    ExceptionGuardStatement, ExprMeta, Expression, ExpressionKind, ExpressionList,
    ExpressionStatement, ForeachStatement, IfStatement, Lookup, Name, NewArrayExpression, Number,
    RelationalExpression, RelationalOperand, ReturnStatement, Statement, StatementList, Template,
    TypeName, Variable, VariableRef,
};
use crate::source::SourceInfo;

pub trait Mutator {
    fn visit_template(&mut self, template: Template) -> TreeResult<Template> {
        walk_template(self, template)
    }

    fn visit_name(&mut self, name: Name) -> TreeResult<Name> {
        Ok(name)
    }

    fn visit_type_name(&mut self, type_name: TypeName) -> TreeResult<TypeName> {
        Ok(type_name)
    }

    fn visit_variable(&mut self, variable: Rc<Variable>) -> TreeResult<Rc<Variable>> {
        self.visit_type_name(variable.type_name().clone())?;
        Ok(variable)
    }

    fn visit_expression_list(&mut self, list: ExpressionList) -> TreeResult<ExpressionList> {
        let expressions = list
            .expressions
            .into_iter()
            .map(|expression| self.mutate_expression(expression))
            .collect::<TreeResult<Vec<_>>>()?;
        Ok(ExpressionList::new(list.info, expressions))
    }

    fn visit_statement(&mut self, statement: Statement) -> TreeResult<Option<Statement>> {
        walk_statement(self, statement)
    }

    fn visit_empty(&mut self, info: SourceInfo) -> TreeResult<Option<Statement>> {
        Ok(Some(Statement::Empty(info)))
    }

    fn visit_statement_list(&mut self, list: StatementList) -> TreeResult<Option<Statement>> {
        let statements = self.mutate_statements(list.statements)?;
        Ok(Some(Statement::List(StatementList::new(list.info, statements))))
    }

    fn visit_block(&mut self, block: Block) -> TreeResult<Option<Statement>> {
        walk_block(self, block).map(|block| Some(Statement::Block(block)))
    }

    fn visit_assignment(
        &mut self,
        assignment: AssignmentStatement,
    ) -> TreeResult<Option<Statement>> {
        let lvalue = self.visit_variable_ref(assignment.lvalue)?;
        let rvalue = self.mutate_expression(assignment.rvalue)?;
        Ok(Some(Statement::Assignment(AssignmentStatement {
            info: assignment.info,
            lvalue,
            rvalue,
        })))
    }

    fn visit_break(&mut self, info: SourceInfo) -> TreeResult<Option<Statement>> {
        Ok(Some(Statement::Break(info)))
    }

    fn visit_foreach(&mut self, foreach: ForeachStatement) -> TreeResult<Option<Statement>> {
        walk_foreach(self, foreach).map(|foreach| Some(Statement::Foreach(foreach)))
    }

    fn visit_if(&mut self, if_statement: IfStatement) -> TreeResult<Option<Statement>> {
        walk_if(self, if_statement).map(|if_statement| Some(Statement::If(if_statement)))
    }

    fn visit_substitution(&mut self, info: SourceInfo) -> TreeResult<Option<Statement>> {
        Ok(Some(Statement::Substitution(info)))
    }

    fn visit_expression_statement(
        &mut self,
        statement: ExpressionStatement,
    ) -> TreeResult<Option<Statement>> {
        let expression = self.mutate_expression(statement.expression)?;
        Ok(Some(Statement::Expression(ExpressionStatement {
            info: statement.info,
            expression,
        })))
    }

    fn visit_return(&mut self, statement: ReturnStatement) -> TreeResult<Option<Statement>> {
        let expression = statement
            .expression
            .map(|expression| self.mutate_expression(expression))
            .transpose()?;
        Ok(Some(Statement::Return(ReturnStatement {
            info: statement.info,
            expression,
        })))
    }

    fn visit_exception_guard(
        &mut self,
        guard: ExceptionGuardStatement,
    ) -> TreeResult<Option<Statement>> {
        let guarded = self.mutate_optional_statement(guard.guarded)?;
        let replacement = self.mutate_optional_statement(guard.replacement)?;
        Ok(Some(Statement::ExceptionGuard(ExceptionGuardStatement {
            info: guard.info,
            guarded,
            replacement,
        })))
    }

    fn visit_expression(&mut self, expr: Expression) -> TreeResult<Expression> {
        walk_expression(self, expr)
    }

    fn visit_paren(&mut self, meta: ExprMeta, inner: Box<Expression>) -> TreeResult<Expression> {
        let inner = self.mutate_expression(*inner)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Paren(Box::new(inner))))
    }

    fn visit_new_array(
        &mut self,
        meta: ExprMeta,
        array: NewArrayExpression,
    ) -> TreeResult<Expression> {
        let elements = self.visit_expression_list(array.elements)?;
        Ok(Expression::from_parts(
            meta,
            ExpressionKind::NewArray(NewArrayExpression {
                elements,
                associative: array.associative,
            }),
        ))
    }

    fn visit_function_call(
        &mut self,
        meta: ExprMeta,
        call: CallExpression,
    ) -> TreeResult<Expression> {
        let call = walk_call(self, call)?;
        Ok(Expression::from_parts(meta, ExpressionKind::FunctionCall(call)))
    }

    fn visit_template_call(
        &mut self,
        meta: ExprMeta,
        call: CallExpression,
    ) -> TreeResult<Expression> {
        let call = walk_call(self, call)?;
        Ok(Expression::from_parts(meta, ExpressionKind::TemplateCall(call)))
    }

    fn visit_variable_ref(&mut self, reference: VariableRef) -> TreeResult<VariableRef> {
        let variable = reference
            .variable
            .map(|variable| self.visit_variable(variable))
            .transpose()?;
        Ok(VariableRef {
            name: reference.name,
            variable,
        })
    }

    fn visit_lookup(&mut self, meta: ExprMeta, lookup: Lookup) -> TreeResult<Expression> {
        let expression = self.mutate_expression(*lookup.expression)?;
        Ok(Expression::from_parts(
            meta,
            ExpressionKind::Lookup(Lookup {
                expression: Box::new(expression),
                ..lookup
            }),
        ))
    }

    fn visit_array_lookup(
        &mut self,
        meta: ExprMeta,
        lookup: ArrayLookup,
    ) -> TreeResult<Expression> {
        let expression = self.mutate_expression(*lookup.expression)?;
        let index = self.mutate_expression(*lookup.index)?;
        Ok(Expression::from_parts(
            meta,
            ExpressionKind::ArrayLookup(ArrayLookup {
                expression: Box::new(expression),
                token: lookup.token,
                index: Box::new(index),
                read_method: lookup.read_method,
            }),
        ))
    }

    fn visit_negate(&mut self, meta: ExprMeta, operand: Box<Expression>) -> TreeResult<Expression> {
        let operand = self.mutate_expression(*operand)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Negate(Box::new(operand))))
    }

    fn visit_not(&mut self, meta: ExprMeta, operand: Box<Expression>) -> TreeResult<Expression> {
        let operand = self.mutate_expression(*operand)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Not(Box::new(operand))))
    }

    fn visit_concatenate(
        &mut self,
        meta: ExprMeta,
        binary: BinaryExpression,
    ) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Concatenate(binary)))
    }

    fn visit_arithmetic(
        &mut self,
        meta: ExprMeta,
        binary: BinaryExpression,
    ) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Arithmetic(binary)))
    }

    fn visit_relational(
        &mut self,
        meta: ExprMeta,
        relational: RelationalExpression,
    ) -> TreeResult<Expression> {
        let relational = walk_relational(self, relational)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Relational(relational)))
    }

    fn visit_and(&mut self, meta: ExprMeta, binary: BinaryExpression) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;
        Ok(Expression::from_parts(meta, ExpressionKind::And(binary)))
    }

    fn visit_or(&mut self, meta: ExprMeta, binary: BinaryExpression) -> TreeResult<Expression> {
        let binary = walk_binary(self, binary)?;
        Ok(Expression::from_parts(meta, ExpressionKind::Or(binary)))
    }

    fn visit_null_literal(&mut self, meta: ExprMeta) -> TreeResult<Expression> {
        Ok(Expression::from_parts(meta, ExpressionKind::NullLiteral))
    }

    fn visit_boolean_literal(&mut self, meta: ExprMeta, value: bool) -> TreeResult<Expression> {
        Ok(Expression::from_parts(meta, ExpressionKind::BooleanLiteral(value)))
    }

    fn visit_string_literal(&mut self, meta: ExprMeta, value: String) -> TreeResult<Expression> {
        Ok(Expression::from_parts(meta, ExpressionKind::StringLiteral(value)))
    }

    fn visit_number_literal(&mut self, meta: ExprMeta, value: Number) -> TreeResult<Expression> {
        Ok(Expression::from_parts(meta, ExpressionKind::NumberLiteral(value)))
    }

    /// Visits `expr`. When the replacement's type differs from the
    /// original's, the original's conversion chain is replayed onto it.
    fn mutate_expression(&mut self, expr: Expression) -> TreeResult<Expression> {
        let original_type = expr.ty().cloned();
        let chain = expr.conversion_chain();

        let mut replacement = self.visit_expression(expr)?;
        let retyped = match replacement.ty() {
            None => true,
            Some(ty) => original_type.as_ref() != Some(ty),
        };
        if retyped {
            for step in chain.steps() {
                replacement.convert_to(step.to_type(), step.is_cast_preferred())?;
            }
        }
        Ok(replacement)
    }

    /// Visits `block`, keeping the result a block: another statement is
    /// wrapped and a removed block becomes an empty one.
    fn mutate_block(&mut self, block: Block) -> TreeResult<Block> {
        let info = block.info;
        Ok(match self.visit_block(block)? {
            Some(Statement::Block(block)) => block,
            Some(statement) => Block::wrap(statement),
            None => Block::empty(info),
        })
    }

    /// Visits each statement, dropping the removed ones.
    fn mutate_statements(&mut self, statements: Vec<Statement>) -> TreeResult<Vec<Statement>> {
        let mut kept = Vec::with_capacity(statements.len());
        for statement in statements {
            if let Some(statement) = self.visit_statement(statement)? {
                kept.push(statement);
            }
        }
        Ok(kept)
    }

    fn mutate_optional_statement(
        &mut self,
        statement: Option<Box<Statement>>,
    ) -> TreeResult<Option<Box<Statement>>> {
        match statement {
            Some(statement) => Ok(self.visit_statement(*statement)?.map(Box::new)),
            None => Ok(None),
        }
    }
}

pub fn walk_template<M: Mutator + ?Sized>(
    mutator: &mut M,
    template: Template,
) -> TreeResult<Template> {
    let name = mutator.visit_name(template.name)?;
    let params = template
        .params
        .into_iter()
        .map(|param| mutator.visit_variable(param))
        .collect::<TreeResult<Vec<_>>>()?;
    let statement = match template.statement {
        Some(statement) => mutator.visit_statement(statement)?,
        None => None,
    };
    Ok(Template {
        name,
        params,
        statement,
        ..template
    })
}

pub fn walk_statement<M: Mutator + ?Sized>(
    mutator: &mut M,
    statement: Statement,
) -> TreeResult<Option<Statement>> {
    match statement {
        Statement::Empty(info) => mutator.visit_empty(info),
        Statement::List(list) => mutator.visit_statement_list(list),
        Statement::Block(block) => mutator.visit_block(block),
        Statement::Assignment(assignment) => mutator.visit_assignment(assignment),
        Statement::Break(info) => mutator.visit_break(info),
        Statement::Foreach(foreach) => mutator.visit_foreach(foreach),
        Statement::If(if_statement) => mutator.visit_if(if_statement),
        Statement::Substitution(info) => mutator.visit_substitution(info),
        Statement::Expression(statement) => mutator.visit_expression_statement(statement),
        Statement::Return(statement) => mutator.visit_return(statement),
        Statement::ExceptionGuard(guard) => mutator.visit_exception_guard(guard),
    }
}

pub fn walk_block<M: Mutator + ?Sized>(mutator: &mut M, block: Block) -> TreeResult<Block> {
    let initializer = mutator.mutate_optional_statement(block.initializer)?;
    let statements = mutator.mutate_statements(block.statements)?;
    let finalizer = mutator.mutate_optional_statement(block.finalizer)?;
    Ok(Block {
        info: block.info,
        statements,
        initializer,
        finalizer,
    })
}

pub fn walk_foreach<M: Mutator + ?Sized>(
    mutator: &mut M,
    foreach: ForeachStatement,
) -> TreeResult<ForeachStatement> {
    let loop_variable = mutator.visit_variable_ref(foreach.loop_variable)?;
    let range = mutator.mutate_expression(foreach.range)?;
    let end_range = foreach
        .end_range
        .map(|end_range| mutator.mutate_expression(end_range))
        .transpose()?;
    let initializer = mutator.mutate_optional_statement(foreach.initializer)?;
    let body = foreach
        .body
        .map(|body| mutator.mutate_block(body))
        .transpose()?;
    Ok(ForeachStatement {
        info: foreach.info,
        loop_variable,
        range,
        end_range,
        reverse: foreach.reverse,
        initializer,
        body,
    })
}

pub fn walk_if<M: Mutator + ?Sized>(
    mutator: &mut M,
    if_statement: IfStatement,
) -> TreeResult<IfStatement> {
    let condition = mutator.mutate_expression(if_statement.condition)?;
    let then_part = if_statement
        .then_part
        .map(|block| mutator.mutate_block(block))
        .transpose()?;
    let else_part = if_statement
        .else_part
        .map(|block| mutator.mutate_block(block))
        .transpose()?;
    Ok(IfStatement {
        info: if_statement.info,
        condition,
        then_part,
        else_part,
        merged_variables: if_statement.merged_variables,
    })
}

pub fn walk_expression<M: Mutator + ?Sized>(
    mutator: &mut M,
    expr: Expression,
) -> TreeResult<Expression> {
    let (meta, kind) = expr.into_parts();
    match kind {
        ExpressionKind::Paren(inner) => mutator.visit_paren(meta, inner),
        ExpressionKind::NewArray(array) => mutator.visit_new_array(meta, array),
        ExpressionKind::FunctionCall(call) => mutator.visit_function_call(meta, call),
        ExpressionKind::TemplateCall(call) => mutator.visit_template_call(meta, call),
        ExpressionKind::VariableRef(reference) => {
            let reference = mutator.visit_variable_ref(reference)?;
            Ok(Expression::from_parts(meta, ExpressionKind::VariableRef(reference)))
        }
        ExpressionKind::Lookup(lookup) => mutator.visit_lookup(meta, lookup),
        ExpressionKind::ArrayLookup(lookup) => mutator.visit_array_lookup(meta, lookup),
        ExpressionKind::Negate(operand) => mutator.visit_negate(meta, operand),
        ExpressionKind::Not(operand) => mutator.visit_not(meta, operand),
        ExpressionKind::Concatenate(binary) => mutator.visit_concatenate(meta, binary),
        ExpressionKind::Arithmetic(binary) => mutator.visit_arithmetic(meta, binary),
        ExpressionKind::Relational(relational) => mutator.visit_relational(meta, relational),
        ExpressionKind::And(binary) => mutator.visit_and(meta, binary),
        ExpressionKind::Or(binary) => mutator.visit_or(meta, binary),
        ExpressionKind::NullLiteral => mutator.visit_null_literal(meta),
        ExpressionKind::BooleanLiteral(value) => mutator.visit_boolean_literal(meta, value),
        ExpressionKind::StringLiteral(value) => mutator.visit_string_literal(meta, value),
        ExpressionKind::NumberLiteral(value) => mutator.visit_number_literal(meta, value),
    }
}

pub fn walk_call<M: Mutator + ?Sized>(
    mutator: &mut M,
    call: CallExpression,
) -> TreeResult<CallExpression> {
    let params = mutator.visit_expression_list(call.params)?;
    let initializer = mutator.mutate_optional_statement(call.initializer)?;
    let substitution = call
        .substitution
        .map(|block| mutator.mutate_block(block))
        .transpose()?;
    Ok(CallExpression {
        target: call.target,
        params,
        initializer,
        substitution,
        void_permitted: call.void_permitted,
        method: call.method,
    })
}

pub fn walk_binary<M: Mutator + ?Sized>(
    mutator: &mut M,
    binary: BinaryExpression,
) -> TreeResult<BinaryExpression> {
    let left = mutator.mutate_expression(*binary.left)?;
    let right = mutator.mutate_expression(*binary.right)?;
    Ok(BinaryExpression::new(binary.operator, left, right))
}

pub fn walk_relational<M: Mutator + ?Sized>(
    mutator: &mut M,
    relational: RelationalExpression,
) -> TreeResult<RelationalExpression> {
    let left = mutator.mutate_expression(*relational.left)?;
    let right = match relational.right {
        RelationalOperand::Expression(right) => {
            RelationalOperand::Expression(Box::new(mutator.mutate_expression(*right)?))
        }
        RelationalOperand::Isa(type_name) => {
            RelationalOperand::Isa(mutator.visit_type_name(type_name)?)
        }
    };
    Ok(RelationalExpression {
        operator: relational.operator,
        left: Box::new(left),
        right,
    })
}
