use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tea_template::{
    CompileOptions, CompileStats, Compiler, Diagnostic, DiagnosticLevel, NodeCounts, Template,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "teac",
    version,
    about = "Optimize type-checked Tea template trees.",
    long_about = "Load a type-checked template tree serialized as JSON, fold its constants, \
                  drop dead code and write the optimized tree back as JSON."
)]
struct Cli {
    /// Path to a template tree in JSON form.
    input: PathBuf,

    /// Destination for the optimized tree (defaults to stdout).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Skip constant folding and dead code elimination.
    #[arg(long)]
    no_optimize: bool,

    /// Skip verifying that the tree is fully typed and bound.
    #[arg(long)]
    no_check: bool,

    /// Print node counts before and after optimizing.
    #[arg(long)]
    stats: bool,

    /// Log each pass and every applied fold.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            optimize: !self.no_optimize,
            check_contract: !self.no_check,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose.
    let default = if verbose { "tea_template=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let template = read_template(&cli.input)?;
    let mut compiler = Compiler::new(cli.compile_options());

    let compilation = match compiler.optimize(template) {
        Ok(compilation) => compilation,
        Err(err) => {
            print_diagnostics(&cli.input, compiler.diagnostics().entries());
            return Err(err.context("Compilation failed"));
        }
    };
    print_diagnostics(&cli.input, compiler.diagnostics().entries());

    if cli.stats {
        print_stats(&compilation.stats);
    }

    let json = serde_json::to_string_pretty(&compilation.template)
        .context("Failed to serialize the optimized tree")?;
    match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), "wrote optimized tree");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn read_template(path: &Path) -> Result<Template> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a template tree", path.display()))
}

fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("Diagnostics:");
    for diagnostic in diagnostics {
        print_diagnostic(path, diagnostic);
    }
}

fn print_diagnostic(path: &Path, diagnostic: &Diagnostic) {
    let (level_label, level_marker) = match diagnostic.level {
        DiagnosticLevel::Error => ("error", "  -"),
        DiagnosticLevel::Warning => ("warning", "  ~"),
    };
    eprintln!("{} {}: {}", level_marker, level_label, diagnostic.message);
    if let Some(span) = diagnostic.span {
        eprintln!("     --> {}:{}:{}", path.display(), span.line, span.start);
    }
}

fn print_stats(stats: &CompileStats) {
    let row = |label: &str, pick: fn(&NodeCounts) -> usize| {
        eprintln!(
            "{label:>12}: {} -> {}",
            pick(&stats.before),
            pick(&stats.after)
        );
    };
    row("statements", |counts| counts.statements);
    row("expressions", |counts| counts.expressions);
    row("literals", |counts| counts.literals);
    eprintln!("{:>12}: {}", "folds", stats.folds);
    eprintln!("{:>12}: {}", "removed", stats.removed());
}
