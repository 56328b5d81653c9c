//! Line Locator.
//!
//! Maps a target line to the token that governs it: the last significant
//! token ending at or before the line's first non-blank character. Lines
//! that need no structural decision (empty documents, directives, literal
//! zones, comment continuations) are decided here directly.

use rowan::{NodeOrToken, TextSize, TokenAtOffset};
use tokio_util::sync::CancellationToken;

use super::decision::IndentError;
use super::rules::{Category, Classification};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree, TextLine};

/// Result of locating a target line.
#[derive(Debug, Clone)]
pub(super) enum Located {
    Decided(Classification),
    Anchored {
        anchor: SyntaxToken,
        first: Option<SyntaxToken>,
    },
}

/// Facts about the target line shared with the classifier.
#[derive(Debug, Clone, Copy)]
pub(super) struct LineContext {
    pub prev_content_line: Option<u32>,
}

pub(super) fn check(cancel: &CancellationToken) -> Result<(), IndentError> {
    if cancel.is_cancelled() {
        log::debug!("indentation cancelled");
        return Err(IndentError::Cancelled);
    }
    Ok(())
}

pub(super) fn locate(
    tree: &SyntaxTree,
    target: TextLine,
    cancel: &CancellationToken,
) -> Result<(Located, LineContext), IndentError> {
    let mut context = LineContext {
        prev_content_line: None,
    };
    if tree.text().is_empty() {
        return Ok((decided(Classification::bare(Category::EmptyDocument)), context));
    }
    if target.index > 0 && in_literal_zone(tree, target.start) {
        return Ok((decided(Classification::bare(Category::LiteralZone)), context));
    }

    let first_offset = tree.first_non_whitespace(target.index);
    let leading = first_offset.and_then(|offset| token_starting_at(tree, offset));
    if leading.as_ref().map(|t| t.kind()) == Some(SyntaxKind::Directive) {
        return Ok((decided(Classification::bare(Category::Directive)), context));
    }

    let Some(prev) = previous_content_line(tree, target.index, cancel)? else {
        return Ok((
            decided(Classification::bare(Category::NoPrecedingContent)),
            context,
        ));
    };
    context.prev_content_line = Some(prev);

    let first = leading.filter(|t| !t.kind().is_trivia());
    let closes_block = first.as_ref().map(|t| t.kind()) == Some(SyntaxKind::RBrace);
    if prev + 1 == target.index && !closes_block && is_comment_only(tree, prev) {
        return Ok((
            decided(Classification::line(Category::CommentContinuation, prev)),
            context,
        ));
    }

    let limit = first_offset.unwrap_or(target.start);
    match last_token_ending_by(tree, limit, cancel)? {
        Some(anchor) => Ok((Located::Anchored { anchor, first }, context)),
        None => {
            log::debug!("line {}: no anchor token, following line {}", target.index, prev);
            Ok((
                decided(Classification::line(Category::PrecedingLine, prev)),
                context,
            ))
        }
    }
}

fn decided(classification: Classification) -> Located {
    Located::Decided(classification)
}

/// Disabled text, multi-line comments and multi-line strings covering `offset`.
fn in_literal_zone(tree: &SyntaxTree, offset: usize) -> bool {
    let len = tree.text().len();
    let covers = |token: &SyntaxToken| {
        let start = token_start(token);
        let end = token_end(token);
        match token.kind() {
            SyntaxKind::DisabledText => (start <= offset && offset < end) || (offset == end && end == len),
            SyntaxKind::MultiLineComment => start < offset && offset <= end,
            kind if kind.is_string_literal() => start < offset && offset <= end,
            _ => false,
        }
    };
    let root = tree.root();
    if offset >= len {
        return root.last_token().is_some_and(|t| covers(&t));
    }
    match root.token_at_offset(TextSize::from(offset as u32)) {
        TokenAtOffset::None => false,
        TokenAtOffset::Single(token) => covers(&token),
        TokenAtOffset::Between(left, right) => covers(&left) || covers(&right),
    }
}

/// Nearest line above `line` holding content; blank, directive and disabled
/// lines are skipped.
fn previous_content_line(
    tree: &SyntaxTree,
    line: u32,
    cancel: &CancellationToken,
) -> Result<Option<u32>, IndentError> {
    for candidate in (0..line).rev() {
        check(cancel)?;
        let Some(offset) = tree.first_non_whitespace(candidate) else {
            continue;
        };
        let kind = tree.token_at(offset).map(|t| t.kind());
        if matches!(
            kind,
            Some(SyntaxKind::Directive) | Some(SyntaxKind::DisabledText)
        ) {
            continue;
        }
        return Ok(Some(candidate));
    }
    Ok(None)
}

/// The line holds nothing but comments.
fn is_comment_only(tree: &SyntaxTree, line: u32) -> bool {
    let (Some(text_line), Some(offset)) = (tree.line(line), tree.first_non_whitespace(line)) else {
        return false;
    };
    let mut token = tree.token_at(offset);
    let mut seen_comment = false;
    while let Some(current) = token {
        if token_start(&current) >= text_line.end {
            break;
        }
        match current.kind() {
            kind if kind.is_comment() => seen_comment = true,
            SyntaxKind::Whitespace | SyntaxKind::Newline => {}
            _ => return false,
        }
        token = current.next_token();
    }
    seen_comment
}

/// Last significant token whose span ends at or before `limit`.
fn last_token_ending_by(
    tree: &SyntaxTree,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Option<SyntaxToken>, IndentError> {
    let mut token = tree.token_at(limit);
    while let Some(current) = token {
        check(cancel)?;
        if !current.kind().is_trivia() && token_end(&current) <= limit {
            return Ok(Some(current));
        }
        token = current.prev_token();
    }
    Ok(None)
}

fn token_starting_at(tree: &SyntaxTree, offset: usize) -> Option<SyntaxToken> {
    tree.token_at(offset).filter(|t| token_start(t) == offset)
}

// ----------------------------------------------------------------------
// Token helpers shared with the classifier and the engine
// ----------------------------------------------------------------------

pub(super) fn token_start(token: &SyntaxToken) -> usize {
    usize::from(token.text_range().start())
}

pub(super) fn token_end(token: &SyntaxToken) -> usize {
    usize::from(token.text_range().end())
}

pub(super) fn line_of(tree: &SyntaxTree, token: &SyntaxToken) -> u32 {
    tree.line_of_offset(token_start(token))
}

pub(super) fn is_first_on_line(tree: &SyntaxTree, token: &SyntaxToken) -> bool {
    tree.first_non_whitespace(line_of(tree, token)) == Some(token_start(token))
}

pub(super) fn prev_significant(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.prev_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        current = t.prev_token();
    }
    None
}

pub(super) fn next_significant(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.next_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        current = t.next_token();
    }
    None
}

pub(super) fn first_significant(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|t| !t.kind().is_trivia())
}

/// First significant token of a construct, ignoring leading attribute lists.
pub(super) fn start_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) if n.kind() == SyntaxKind::AttributeList => {}
            NodeOrToken::Node(n) => {
                if let Some(token) = first_significant(&n) {
                    return Some(token);
                }
            }
            NodeOrToken::Token(t) if !t.kind().is_trivia() => return Some(t),
            NodeOrToken::Token(_) => {}
        }
    }
    first_significant(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate_line(text: &str, line: u32) -> (Located, LineContext) {
        let tree = SyntaxTree::parse(text);
        let target = tree.line(line).unwrap();
        locate(&tree, target, &CancellationToken::new()).unwrap()
    }

    fn category(located: &Located) -> Option<Category> {
        match located {
            Located::Decided(c) => Some(c.category),
            Located::Anchored { .. } => None,
        }
    }

    #[test]
    fn test_empty_document() {
        let (located, _) = locate_line("", 0);
        assert_eq!(category(&located), Some(Category::EmptyDocument));
    }

    #[test]
    fn test_directive_line() {
        let (located, _) = locate_line("class C\n{\n#region A\n}", 2);
        assert_eq!(category(&located), Some(Category::Directive));
    }

    #[test]
    fn test_literal_zones() {
        let (located, _) = locate_line("var s = @\"a\n  b\n\";", 1);
        assert_eq!(category(&located), Some(Category::LiteralZone));
        let (located, _) = locate_line("/* a\n  b */\nx;", 1);
        assert_eq!(category(&located), Some(Category::LiteralZone));
        let (located, _) = locate_line("#if false\nint a;\n#endif\n", 1);
        assert_eq!(category(&located), Some(Category::LiteralZone));
        let (located, _) = locate_line("/* a */\nx;", 1);
        assert_ne!(category(&located), Some(Category::LiteralZone));
    }

    #[test]
    fn test_anchor_is_last_token_before_line() {
        let (located, context) = locate_line("class C\n{\n    int x; // note\n\n}", 3);
        let Located::Anchored { anchor, first } = located else {
            panic!("expected an anchor");
        };
        assert_eq!(anchor.kind(), SyntaxKind::Semicolon);
        assert!(first.is_none());
        assert_eq!(context.prev_content_line, Some(2));
    }

    #[test]
    fn test_comment_directly_above() {
        let (located, _) = locate_line("class C\n{\n    // note\n\n}", 3);
        assert_eq!(category(&located), Some(Category::CommentContinuation));
        let (located, _) = locate_line("class C\n{\n    // note\n}", 3);
        assert_eq!(category(&located), None);
    }

    #[test]
    fn test_only_directives_above() {
        let (located, _) = locate_line("#region A\n\n#endregion\n\n", 3);
        assert_eq!(category(&located), Some(Category::NoPrecedingContent));
    }

    #[test]
    fn test_start_token_skips_attributes() {
        let tree = SyntaxTree::parse("class C\n{\n    [Obsolete]\n    public void M() { }\n}");
        let method = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDecl)
            .unwrap();
        assert_eq!(start_token(&method).unwrap().kind(), SyntaxKind::PublicKw);
        assert_eq!(first_significant(&method).unwrap().kind(), SyntaxKind::LBracket);
    }
}
