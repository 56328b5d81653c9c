//
// handlers.rs
//
// Request handlers that turn engine decisions into LSP responses. Handlers
// take a tree snapshot rather than the world state so they can run on a
// blocking thread while edits continue to arrive.
//

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::*;

use crate::config::IndentSettings;
use crate::indentation::{
    compute_indentation_cancellable, format_indentation, resolve_column, FormattingOptions,
    IndentError, IndentStyle, IndentationDecision, ProjectionContext,
};
use crate::perf::TimingGuard;
use crate::syntax::SyntaxTree;

// ============================================================================
// On Type Formatting (Indentation)
// ============================================================================

pub fn on_type_formatting(
    tree: &SyntaxTree,
    settings: &IndentSettings,
    params: &DocumentOnTypeFormattingParams,
    cancel: &CancellationToken,
) -> Option<Vec<TextEdit>> {
    let _guard = TimingGuard::with_threshold("on_type_formatting", 20);
    let line = params.text_document_position.position.line;
    let line_text = tree.line_text(line)?;

    match params.ch.as_str() {
        "\n" => {}
        // Only re-indent a closing brace that starts its line
        "}" if line_text.trim_start().starts_with('}') => {}
        other => {
            log::trace!("Ignoring trigger {:?} on line {}", other, line);
            return None;
        }
    }

    let options = settings.formatting_options(Some(&params.options));
    let column = match settings.indent_style {
        IndentStyle::None => return None,
        IndentStyle::Block => block_column(tree, line, &options)?,
        IndentStyle::Smart => match smart_column(tree, line, &options, None, cancel) {
            Ok(Some(column)) => column,
            Ok(None) => block_column(tree, line, &options)?,
            Err(e) => {
                log::debug!("No indentation for line {}: {}", line, e);
                return None;
            }
        },
    };

    let edit = format_indentation(line, column, &options, line_text);
    let existing = &line_text[..line_text.len() - line_text.trim_start().len()];
    if edit.new_text == existing {
        return None;
    }
    Some(vec![edit])
}

/// Engine column for `line`; `Ok(None)` when the engine has no opinion.
fn smart_column(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    projection: Option<&ProjectionContext>,
    cancel: &CancellationToken,
) -> Result<Option<u32>, IndentError> {
    let decision = compute_indentation_cancellable(tree, line, options, projection, cancel)?;
    log::debug!("Line {} decided {:?}", line, decision);
    Ok(resolve_column(tree, line, &decision, options))
}

/// Indentation of the previous non-blank line.
fn block_column(tree: &SyntaxTree, line: u32, options: &FormattingOptions) -> Option<u32> {
    let previous = tree.previous_non_blank(line)?;
    Some(tree.indentation_width(previous, options.tab_size()))
}

// ============================================================================
// sharpdent/indentation
// ============================================================================

pub const INDENTATION_METHOD: &str = "sharpdent/indentation";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentationParams {
    pub text_document: TextDocumentIdentifier,
    pub line: u32,
    /// Column of the island's top level when the document is a projected
    /// buffer embedded in a host file.
    #[serde(default)]
    pub base_indentation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentationResult {
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_units: Option<u32>,
}

/// Raw engine decision for one line, plus the column it resolves to.
pub fn indentation(
    tree: &SyntaxTree,
    settings: &IndentSettings,
    params: &IndentationParams,
    cancel: &CancellationToken,
) -> Result<IndentationResult, IndentError> {
    let options = settings.formatting_options(None);
    let projection = params
        .base_indentation
        .map(|base_indentation| ProjectionContext { base_indentation });
    let decision =
        compute_indentation_cancellable(tree, params.line, &options, projection.as_ref(), cancel)?;

    let (anchor_line, extra_units) = match decision {
        IndentationDecision::Follow {
            anchor_line,
            extra_units,
        } => (Some(anchor_line.index), Some(extra_units)),
        _ => (None, None),
    };
    Ok(IndentationResult {
        decision: decision.kind_name().to_string(),
        column: resolve_column(tree, params.line, &decision, &options),
        anchor_line,
        extra_units,
    })
}
