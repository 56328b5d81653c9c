//! TextEdit generation for C# smart indentation.
//!
//! Replaces a line's leading whitespace with whitespace for the resolved
//! column, so the client's own auto-indent is overwritten rather than added to.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

use super::options::FormattingOptions;

/// Builds the edit that sets `line` (whose text is `line_text`) to `target_column`.
///
/// The range starts at character 0 and covers the existing leading
/// whitespace. Whitespace characters are all in the Basic Multilingual Plane,
/// so the char count equals the UTF-16 length LSP positions use.
pub fn format_indentation(
    line: u32,
    target_column: u32,
    options: &FormattingOptions,
    line_text: &str,
) -> TextEdit {
    let existing_ws_len = line_text
        .chars()
        .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
        .count();

    TextEdit {
        range: Range {
            start: Position { line, character: 0 },
            end: Position {
                line,
                character: existing_ws_len as u32,
            },
        },
        new_text: generate_whitespace(target_column, options),
    }
}

/// Whitespace reaching `target_column`: spaces only, or whole tab stops
/// followed by spaces for the remainder when tabs are enabled.
pub fn generate_whitespace(target_column: u32, options: &FormattingOptions) -> String {
    if !options.use_tabs() {
        return " ".repeat(target_column as usize);
    }
    let tab_size = options.tab_size();
    let mut result = "\t".repeat((target_column / tab_size) as usize);
    result.push_str(&" ".repeat((target_column % tab_size) as usize));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spaces(tab_size: u32) -> FormattingOptions {
        FormattingOptions::new(4, tab_size, false).unwrap()
    }

    fn tabs(tab_size: u32) -> FormattingOptions {
        FormattingOptions::new(4, tab_size, true).unwrap()
    }

    #[test]
    fn test_generate_whitespace_spaces() {
        assert_eq!(generate_whitespace(0, &spaces(4)), "");
        assert_eq!(generate_whitespace(2, &spaces(4)), "  ");
        assert_eq!(generate_whitespace(8, &spaces(2)), "        ");
    }

    #[test]
    fn test_generate_whitespace_tabs_with_remainder() {
        assert_eq!(generate_whitespace(4, &tabs(4)), "\t");
        assert_eq!(generate_whitespace(6, &tabs(4)), "\t  ");
        assert_eq!(generate_whitespace(3, &tabs(4)), "   ");
        assert_eq!(generate_whitespace(16, &tabs(8)), "\t\t");
    }

    #[test]
    fn test_format_indentation_replaces_existing() {
        let edit = format_indentation(3, 8, &spaces(4), "    Console.WriteLine();");
        assert_eq!(edit.range.start, Position::new(3, 0));
        assert_eq!(edit.range.end, Position::new(3, 4));
        assert_eq!(edit.new_text, "        ");
    }

    #[test]
    fn test_format_indentation_blank_and_empty_lines() {
        let edit = format_indentation(0, 4, &spaces(4), "");
        assert_eq!(edit.range.end.character, 0);
        assert_eq!(edit.new_text, "    ");

        let edit = format_indentation(1, 0, &spaces(4), "  \t \r\n");
        assert_eq!(edit.range.end.character, 4);
        assert_eq!(edit.new_text, "");
    }

    #[test]
    fn test_format_indentation_mixed_whitespace_in_tab_mode() {
        let edit = format_indentation(2, 12, &tabs(4), "\t  }");
        assert_eq!(edit.range.end.character, 3);
        assert_eq!(edit.new_text, "\t\t\t");
    }

    #[test]
    fn test_format_indentation_keeps_non_ascii_content() {
        let edit = format_indentation(0, 4, &spaces(4), "  var é = 1;");
        assert_eq!(edit.range.end.character, 2);
    }

    proptest! {
        #[test]
        fn prop_generated_whitespace_has_target_width(column in 0u32..200, tab_size in 1u32..16, use_tabs: bool) {
            let options = FormattingOptions::new(4, tab_size, use_tabs).unwrap();
            let text = generate_whitespace(column, &options);
            let width: u32 = text
                .chars()
                .map(|c| if c == '\t' { tab_size } else { 1 })
                .sum();
            prop_assert_eq!(width, column);
            if !use_tabs {
                prop_assert!(!text.contains('\t'));
            }
        }
    }
}
