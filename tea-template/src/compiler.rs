use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use crate::analysis::{ContractChecker, NodeCounts};
use crate::diagnostics::Diagnostics;
use crate::error::TreeError;
use crate::optimizer::BasicOptimizer;
use crate::parsetree::Template;

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub optimize: bool,
    pub check_contract: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            check_contract: true,
        }
    }
}

/// Node statistics of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompileStats {
    pub before: NodeCounts,
    pub after: NodeCounts,
    pub folds: usize,
}

impl CompileStats {
    pub fn removed(&self) -> usize {
        self.before.removed(&self.after)
    }
}

pub struct Compilation {
    pub template: Template,
    pub stats: CompileStats,
}

pub struct Compiler {
    diagnostics: Diagnostics,
    options: CompileOptions,
    internal_errors: usize,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            options,
            internal_errors: 0,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn internal_errors(&self) -> usize {
        self.internal_errors
    }

    pub fn optimize(&mut self, template: Template) -> Result<Compilation> {
        let before = NodeCounts::of(&template);
        debug!(
            template = %template.name.name,
            statements = before.statements,
            expressions = before.expressions,
            "compiling template"
        );

        if self.options.check_contract {
            if let Err(err) = ContractChecker::check(&template) {
                self.record_internal_error(&err);
                bail!("Template {} violates the tree contract", template.name.name);
            }
        }

        let name = template.name.name.clone();
        let had_body = template.statement.is_some();
        let (template, folds) = if self.options.optimize {
            let mut optimizer = BasicOptimizer::new();
            match optimizer.optimize(template) {
                Ok(optimized) => (optimized, optimizer.folds()),
                Err(err) => {
                    self.record_internal_error(&err);
                    bail!("Optimizing template {name} failed");
                }
            }
        } else {
            (template, 0)
        };

        if had_body && template.statement.is_none() {
            self.diagnostics.push_warning_with_span(
                format!("template {name} has no effect once constants are folded"),
                Some(template.info),
            );
        }

        let after = NodeCounts::of(&template);
        let stats = CompileStats {
            before,
            after,
            folds,
        };
        debug!(
            template = %name,
            folds,
            removed = stats.removed(),
            "compiled template"
        );
        Ok(Compilation { template, stats })
    }

    fn record_internal_error(&mut self, err: &TreeError) {
        self.internal_errors += 1;
        let info = err.info();
        let span = if info.is_unknown() { None } else { Some(info) };
        self.diagnostics
            .push_error_with_span(format!("internal compiler error: {err}"), span);
    }
}
