// cli/indent.rs — `sharpdent indent` subcommand
//
// Reads a C# file and prints the indentation decision for one line, the
// same answer the server would give for a newline typed there.

use std::path::PathBuf;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::indentation::{
    compute_indentation_cancellable, resolve_column, FormattingOptions, IndentationDecision,
    ProjectionContext,
};
use crate::perf::TimingGuard;
use crate::syntax::{ParseOptions, SyntaxTree};
use crate::text;

/// Parsed arguments for the `indent` subcommand.
#[derive(Debug)]
pub struct IndentArgs {
    pub path: PathBuf,
    /// One-based line number, as printed by editors.
    pub line: u32,
    pub indent_unit: u32,
    pub tab_size: u32,
    pub use_tabs: bool,
    pub base_indentation: Option<u32>,
    pub symbols: Vec<String>,
}

/// Parse `indent` arguments from the remaining CLI args.
///
/// Expected usage:
/// `sharpdent indent <path> --line N [--unit U] [--tab-size T] [--tabs] [--base B] [--symbol S]...`
pub fn parse_args(args: &mut impl Iterator<Item = String>) -> Result<IndentArgs, String> {
    let mut path: Option<PathBuf> = None;
    let mut line: Option<u32> = None;
    let mut indent_unit = 4;
    let mut tab_size = 4;
    let mut use_tabs = false;
    let mut base_indentation = None;
    let mut symbols = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--line" => line = Some(number(args, "--line")?),
            "--unit" => indent_unit = number(args, "--unit")?,
            "--tab-size" => tab_size = number(args, "--tab-size")?,
            "--tabs" => use_tabs = true,
            "--base" => base_indentation = Some(number(args, "--base")?),
            "--symbol" => symbols.push(
                args.next()
                    .ok_or_else(|| "--symbol requires a name".to_string())?,
            ),
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag: '{}'", other));
            }
            _ => {
                if path.is_some() {
                    return Err("Multiple paths provided; expected exactly one".to_string());
                }
                path = Some(PathBuf::from(arg));
            }
        }
    }

    let path = path.ok_or_else(|| "Missing required <path> argument".to_string())?;
    let line = line.ok_or_else(|| "Missing required --line argument".to_string())?;
    if line == 0 {
        return Err("--line is one-based; expected at least 1".to_string());
    }

    Ok(IndentArgs {
        path,
        line,
        indent_unit,
        tab_size,
        use_tabs,
        base_indentation,
        symbols,
    })
}

fn number(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32, String> {
    let value = args
        .next()
        .ok_or_else(|| format!("{} requires a number", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, value))
}

/// Runs the subcommand and returns the line to print.
pub fn run(args: &IndentArgs) -> anyhow::Result<String> {
    let options = FormattingOptions::new(args.indent_unit, args.tab_size, args.use_tabs)
        .context("Invalid formatting options")?;
    let source = text::read_source(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let parse_options = ParseOptions {
        preprocessor_symbols: args.symbols.clone(),
    };

    let _guard = TimingGuard::new("indent");
    let tree = SyntaxTree::parse_with(&source, &parse_options);
    describe(&tree, args.line, &options, args.base_indentation)
}

/// Formats the decision for one-based `line` of `tree`.
pub fn describe(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    base_indentation: Option<u32>,
) -> anyhow::Result<String> {
    let index = line.saturating_sub(1);
    let projection = base_indentation.map(|base_indentation| ProjectionContext { base_indentation });
    let decision = compute_indentation_cancellable(
        tree,
        index,
        options,
        projection.as_ref(),
        &CancellationToken::new(),
    )
    .with_context(|| format!("Cannot indent line {}", line))?;

    let summary = match decision {
        IndentationDecision::Follow {
            anchor_line,
            extra_units,
        } => format!("follow line {} +{}", anchor_line.index + 1, extra_units),
        other => other.kind_name().to_string(),
    };
    Ok(match resolve_column(tree, index, &decision, options) {
        Some(column) => format!("line {}: {} -> column {}", line, summary, column),
        None => format!("line {}: no opinion", line),
    })
}
