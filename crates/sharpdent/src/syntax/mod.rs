//
// syntax/mod.rs
//
// Lossless C# syntax trees and the line table of their source snapshot.
//

mod kind;
mod lexer;
mod parser;
mod preprocessor;

use rowan::{GreenNode, TextSize};

pub use kind::{CSharpLanguage, SyntaxKind};

pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;

/// Options affecting how a snapshot is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Symbols considered defined before the first `#define`.
    pub preprocessor_symbols: Vec<String>,
}

/// One physical line of a snapshot; `end` excludes the line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextLine {
    pub index: u32,
    pub start: usize,
    pub end: usize,
}

/// An immutable parse of one text snapshot.
///
/// Only the green tree is stored, so the value is `Send + Sync`; red
/// handles are created on demand by [`SyntaxTree::root`].
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    text: String,
    line_starts: Vec<usize>,
}

impl SyntaxTree {
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Self {
        let green = parser::parse(
            text,
            options.preprocessor_symbols.iter().map(String::as_str),
        );
        Self {
            green,
            text: text.to_string(),
            line_starts: line_starts(text),
        }
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines; an empty snapshot has one empty line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    pub fn line(&self, index: u32) -> Option<TextLine> {
        let i = index as usize;
        let start = *self.line_starts.get(i)?;
        let mut end = match self.line_starts.get(i + 1) {
            Some(&next) => next,
            None => self.text.len(),
        };
        let bytes = self.text.as_bytes();
        if end > start && bytes[end - 1] == b'\n' {
            end -= 1;
        }
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        Some(TextLine { index, start, end })
    }

    pub fn line_text(&self, index: u32) -> Option<&str> {
        let line = self.line(index)?;
        self.text.get(line.start..line.end)
    }

    /// Line containing byte `offset`; offsets past the end map to the last line.
    pub fn line_of_offset(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i as u32,
            Err(i) => i.saturating_sub(1) as u32,
        }
    }

    /// Byte offset of the first non-blank character, or `None` for a blank line.
    pub fn first_non_whitespace(&self, index: u32) -> Option<usize> {
        let line = self.line(index)?;
        let text = &self.text[line.start..line.end];
        text.find(|c: char| !c.is_whitespace())
            .map(|offset| line.start + offset)
    }

    pub fn is_blank(&self, index: u32) -> bool {
        self.first_non_whitespace(index).is_none()
    }

    /// Nearest line above `index` with any non-blank character.
    pub fn previous_non_blank(&self, index: u32) -> Option<u32> {
        (0..index.min(self.line_count())).rev().find(|&i| !self.is_blank(i))
    }

    /// Width of the leading whitespace of a line, with tabs expanded.
    pub fn indentation_width(&self, index: u32, tab_size: u32) -> u32 {
        let Some(line) = self.line(index) else {
            return 0;
        };
        let text = &self.text[line.start..line.end];
        let leading = text.len() - text.trim_start().len();
        visual_width(&text[..leading], tab_size)
    }

    /// Visual column of byte `offset` within its line.
    pub fn column_of_offset(&self, offset: usize, tab_size: u32) -> u32 {
        let offset = offset.min(self.text.len());
        let start = self.line_starts[self.line_of_offset(offset) as usize];
        self.text
            .get(start..offset)
            .map_or(0, |prefix| visual_width(prefix, tab_size))
    }

    /// The token covering `offset`, preferring the one starting there.
    pub(crate) fn token_at(&self, offset: usize) -> Option<SyntaxToken> {
        let root = self.root();
        if offset >= self.text.len() {
            return root.last_token();
        }
        root.token_at_offset(TextSize::from(offset as u32)).right_biased()
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                i += 2;
                starts.push(i);
            }
            b'\r' | b'\n' => {
                i += 1;
                starts.push(i);
            }
            _ => i += 1,
        }
    }
    starts
}

fn visual_width(text: &str, tab_size: u32) -> u32 {
    let tab_size = tab_size.max(1);
    text.chars().fold(0u32, |column, c| {
        if c == '\t' {
            column + tab_size - column % tab_size
        } else {
            column + 1
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_table() {
        let tree = SyntaxTree::parse("a\r\nb\rc\n\n");
        assert_eq!(tree.line_count(), 5);
        assert_eq!(tree.line_text(0), Some("a"));
        assert_eq!(tree.line_text(1), Some("b"));
        assert_eq!(tree.line_text(2), Some("c"));
        assert_eq!(tree.line_text(4), Some(""));
        assert_eq!(tree.line(5), None);
        assert_eq!(tree.line_of_offset(0), 0);
        assert_eq!(tree.line_of_offset(3), 1);
        assert_eq!(tree.line_of_offset(100), 4);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let tree = SyntaxTree::parse("");
        assert_eq!(tree.line_count(), 1);
        assert!(tree.is_blank(0));
    }

    #[test]
    fn test_indentation_width_expands_tabs() {
        let tree = SyntaxTree::parse("\t  x\n  \tx\n    \n");
        assert_eq!(tree.indentation_width(0, 4), 6);
        assert_eq!(tree.indentation_width(1, 4), 4);
        assert_eq!(tree.indentation_width(2, 4), 4);
        assert_eq!(tree.column_of_offset(3, 4), 6);
    }

    #[test]
    fn test_first_non_whitespace() {
        let tree = SyntaxTree::parse("class C\n    {\n");
        assert_eq!(tree.first_non_whitespace(1), Some(12));
        assert_eq!(tree.first_non_whitespace(2), None);
    }

    #[test]
    fn test_preprocessor_symbols_select_branch() {
        let text = "#if DEBUG\nint a;\n#else\nint b;\n#endif\n";
        let with = SyntaxTree::parse_with(
            text,
            &ParseOptions {
                preprocessor_symbols: vec!["DEBUG".into()],
            },
        );
        let disabled = |tree: &SyntaxTree| {
            tree.root()
                .descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .find(|t| t.kind() == SyntaxKind::DisabledText)
                .map(|t| t.text().to_string())
        };
        assert_eq!(disabled(&with).as_deref(), Some("int b;\n"));
        assert_eq!(disabled(&SyntaxTree::parse(text)).as_deref(), Some("int a;\n"));
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyntaxTree>();
    }
}
