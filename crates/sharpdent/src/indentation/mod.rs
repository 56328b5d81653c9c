//! C# Smart Indentation Module
//!
//! Decides where the caret should land on a line after the user presses
//! Enter (or types a closing brace) by inspecting the syntax tree around the
//! line. The engine is a pure function of `(tree, line, options, projection)`;
//! the language server and the command-line probe only adapt its decisions.
//!
//! # Architecture
//!
//! - `locator`: finds the anchor token for a line and decides trivial lines
//! - `classifier`: maps the anchor (and the line's first token) to a `Category`
//! - `rules`: the category → anchor/offset table
//! - `engine`: effective starts, decisions, column resolution and island projection
//! - `formatter`: LSP `TextEdit` generation for a resolved column

use tower_lsp::lsp_types::DocumentOnTypeFormattingOptions;

mod classifier;
mod decision;
mod engine;
mod formatter;
mod locator;
mod options;
mod rules;

pub use decision::{IndentError, IndentationDecision};
pub use engine::{compute_indentation, compute_indentation_cancellable, resolve_column};
pub use formatter::{format_indentation, generate_whitespace};
pub use options::{FormattingOptions, IndentStyle, OptionsError, ProjectionContext};
pub use rules::{rule, AnchorRule, Category, Rule};

/// Returns the LSP capability options for on-type formatting.
///
/// Registers trigger characters:
/// - `\n`: place the new line
/// - `}`: re-place a closing brace typed at the start of a line
pub fn on_type_formatting_capability() -> DocumentOnTypeFormattingOptions {
    DocumentOnTypeFormattingOptions {
        first_trigger_character: "\n".to_string(),
        more_trigger_character: Some(vec!["}".to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::on_type_formatting_capability;

    #[test]
    fn test_on_type_formatting_capability_registration() {
        let capability = on_type_formatting_capability();

        assert_eq!(
            capability.first_trigger_character, "\n",
            "first_trigger_character should be newline"
        );

        let more = capability.more_trigger_character.expect("should have more triggers");
        assert_eq!(more, vec!["}".to_string()]);
    }
}
