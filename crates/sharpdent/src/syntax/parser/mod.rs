//
// parser/mod.rs
//
// Error-tolerant recursive-descent parser producing a lossless rowan green tree.
//
// The parser never fails: unexpected tokens are wrapped in `Error` nodes and
// missing tokens are simply absent. Trivia is flushed before a node starts, so
// every node begins at its first significant token.
//

mod expressions;
mod items;
mod statements;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::kind::SyntaxKind;
use super::lexer::{self, Token};

/// Maximum nesting of recursive constructs before input is consumed flat.
const MAX_DEPTH: u32 = 256;

pub(crate) fn parse<'a>(text: &str, symbols: impl IntoIterator<Item = &'a str>) -> GreenNode {
    let tokens = lexer::tokenize(text, symbols);
    let mut parser = Parser::new(text, &tokens);
    parser.compilation_unit();
    parser.finish()
}

pub(super) struct Parser<'t> {
    text: &'t str,
    tokens: &'t [Token],
    /// Indices into `tokens` of the non-trivia tokens.
    significant: Vec<usize>,
    /// Whether a line break precedes each significant token.
    line_break_before: Vec<bool>,
    cursor: usize,
    emitted: usize,
    builder: GreenNodeBuilder<'static>,
    depth: u32,
    query_depth: u32,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str, tokens: &'t [Token]) -> Self {
        let mut significant = Vec::new();
        let mut line_break_before = Vec::new();
        let mut saw_break = false;
        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                SyntaxKind::Newline => saw_break = true,
                SyntaxKind::MultiLineComment | SyntaxKind::DisabledText
                    if text[token.range.clone()].contains(['\n', '\r']) =>
                {
                    saw_break = true
                }
                kind if kind.is_trivia() => {}
                _ => {
                    significant.push(index);
                    line_break_before.push(saw_break);
                    saw_break = false;
                }
            }
        }
        Self {
            text,
            tokens,
            significant,
            line_break_before,
            cursor: 0,
            emitted: 0,
            builder: GreenNodeBuilder::new(),
            depth: 0,
            query_depth: 0,
        }
    }

    fn finish(mut self) -> GreenNode {
        while self.emitted < self.tokens.len() {
            self.emit(self.emitted);
        }
        self.builder.finish_node();
        self.builder.finish()
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    fn nth(&self, n: usize) -> SyntaxKind {
        self.significant
            .get(self.cursor + n)
            .map_or(SyntaxKind::Eof, |&i| self.tokens[i].kind)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn nth_text(&self, n: usize) -> &'t str {
        self.significant
            .get(self.cursor + n)
            .map_or("", |&i| &self.text[self.tokens[i].range.clone()])
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.cursor >= self.significant.len()
    }

    /// Current token is the identifier `word` (a contextual keyword).
    fn at_contextual(&self, word: &str) -> bool {
        self.nth_contextual(0, word)
    }

    fn nth_contextual(&self, n: usize, word: &str) -> bool {
        self.nth(n) == SyntaxKind::Ident && self.nth_text(n) == word
    }

    fn nth_line_break_before(&self, n: usize) -> bool {
        self.line_break_before
            .get(self.cursor + n)
            .copied()
            .unwrap_or(true)
    }

    /// Token `n` starts exactly where token `n - 1` ends.
    fn nth_adjacent(&self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        match (
            self.significant.get(self.cursor + n - 1),
            self.significant.get(self.cursor + n),
        ) {
            (Some(&a), Some(&b)) => self.tokens[a].range.end == self.tokens[b].range.start,
            _ => false,
        }
    }

    /// The last consumed token is a string or char literal without its
    /// closing quote.
    fn previous_literal_unterminated(&self) -> bool {
        let Some(&index) = self
            .cursor
            .checked_sub(1)
            .and_then(|i| self.significant.get(i))
        else {
            return false;
        };
        let token = &self.tokens[index];
        let text = &self.text[token.range.clone()];
        match token.kind {
            SyntaxKind::StringLiteral => !is_closed_literal(text, '"'),
            SyntaxKind::CharLiteral => !is_closed_literal(text, '\''),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    fn emit(&mut self, index: usize) {
        let token = &self.tokens[index];
        self.builder
            .token(token.kind.into(), &self.text[token.range.clone()]);
        self.emitted = index + 1;
    }

    fn flush_trivia(&mut self) {
        let until = self
            .significant
            .get(self.cursor)
            .copied()
            .unwrap_or(self.tokens.len());
        while self.emitted < until {
            self.emit(self.emitted);
        }
    }

    fn bump(&mut self) {
        let kind = self.current();
        self.bump_as(kind);
    }

    /// Consume the current token, recording it as `kind`.
    fn bump_as(&mut self, kind: SyntaxKind) {
        let Some(&index) = self.significant.get(self.cursor) else {
            return;
        };
        self.flush_trivia();
        let token = &self.tokens[index];
        self.builder.token(kind.into(), &self.text[token.range.clone()]);
        self.emitted = index + 1;
        self.cursor += 1;
    }

    /// Consume `count` adjacent tokens as one token of `kind` (`>` `>` as `>>`).
    fn bump_joined(&mut self, count: usize, kind: SyntaxKind) {
        let (Some(&first), Some(&last)) = (
            self.significant.get(self.cursor),
            self.significant.get(self.cursor + count - 1),
        ) else {
            return;
        };
        self.flush_trivia();
        let range = self.tokens[first].range.start..self.tokens[last].range.end;
        self.builder.token(kind.into(), &self.text[range]);
        self.emitted = last + 1;
        self.cursor += count;
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    /// Wrap the current token in an `Error` node.
    fn error_bump(&mut self) {
        self.start(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Enter a nested construct; `false` once the nesting limit is reached.
    fn enter(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.leave_many(1);
    }

    /// Left-nested chains (`a + b + c`, `a.b.c`) deepen the tree once per
    /// operator without recursing, so each wrap takes a level too.
    fn leave_many(&mut self, levels: u32) {
        self.depth = self.depth.saturating_sub(levels);
    }

    // ------------------------------------------------------------------
    // Speculative scanning (no tree output)
    // ------------------------------------------------------------------

    /// Scan a type starting at lookahead `i`; returns the lookahead index after it.
    fn scan_type(&self, i: usize) -> Option<usize> {
        self.scan_type_inner(i, 0)
    }

    fn scan_type_inner(&self, mut i: usize, depth: u32) -> Option<usize> {
        if depth > 16 {
            return None;
        }
        let kind = self.nth(i);
        if kind == SyntaxKind::LParen {
            // Tuple type: (T a, U b)
            i += 1;
            let mut elements = 0;
            loop {
                i = self.scan_type_inner(i, depth + 1)?;
                if self.nth(i) == SyntaxKind::Ident {
                    i += 1;
                }
                elements += 1;
                match self.nth(i) {
                    SyntaxKind::Comma => i += 1,
                    SyntaxKind::RParen if elements > 1 => {
                        i += 1;
                        break;
                    }
                    _ => return None,
                }
            }
        } else if kind.is_predefined_type() {
            i += 1;
        } else if kind == SyntaxKind::Ident {
            i = self.scan_name(i, depth)?;
        } else {
            return None;
        }

        loop {
            match self.nth(i) {
                SyntaxKind::Question | SyntaxKind::Star => i += 1,
                SyntaxKind::LBracket
                    if matches!(self.nth(i + 1), SyntaxKind::RBracket | SyntaxKind::Comma) =>
                {
                    i += 1;
                    while self.nth(i) == SyntaxKind::Comma {
                        i += 1;
                    }
                    if self.nth(i) != SyntaxKind::RBracket {
                        return None;
                    }
                    i += 1;
                }
                _ => break,
            }
        }
        Some(i)
    }

    /// `A.B<C>::D` style names.
    fn scan_name(&self, mut i: usize, depth: u32) -> Option<usize> {
        loop {
            if self.nth(i) != SyntaxKind::Ident {
                return None;
            }
            i += 1;
            if self.nth(i) == SyntaxKind::Lt {
                if let Some(next) = self.scan_type_arguments(i, depth + 1) {
                    i = next;
                }
            }
            if matches!(self.nth(i), SyntaxKind::Dot | SyntaxKind::ColonColon)
                && self.nth(i + 1) == SyntaxKind::Ident
            {
                i += 1;
                continue;
            }
            return Some(i);
        }
    }

    /// `<T, U>` at lookahead `i`; returns the index after `>`.
    fn scan_type_arguments(&self, i: usize, depth: u32) -> Option<usize> {
        if self.nth(i) != SyntaxKind::Lt {
            return None;
        }
        let mut i = i + 1;
        // Open generic `Dictionary<,>`
        while self.nth(i) == SyntaxKind::Comma {
            i += 1;
        }
        if self.nth(i) == SyntaxKind::Gt {
            return Some(i + 1);
        }
        loop {
            i = self.scan_type_inner(i, depth + 1)?;
            match self.nth(i) {
                SyntaxKind::Comma => i += 1,
                SyntaxKind::Gt => return Some(i + 1),
                _ => return None,
            }
        }
    }

    /// Whether `<` at lookahead `i` opens a type argument list in an expression.
    fn type_arguments_follow(&self, i: usize) -> bool {
        let Some(after) = self.scan_type_arguments(i, 0) else {
            return false;
        };
        matches!(
            self.nth(after),
            SyntaxKind::LParen
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::RBrace
                | SyntaxKind::Colon
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::Dot
                | SyntaxKind::QuestionDot
                | SyntaxKind::Question
                | SyntaxKind::EqEq
                | SyntaxKind::BangEq
                | SyntaxKind::Pipe
                | SyntaxKind::Caret
                | SyntaxKind::AmpAmp
                | SyntaxKind::PipePipe
                | SyntaxKind::Amp
                | SyntaxKind::LBracket
                | SyntaxKind::Eof
        )
    }

    /// Lookahead index of the token after the bracket group opened at `i`.
    fn skip_balanced(&self, i: usize) -> Option<usize> {
        let mut depth = 0u32;
        let mut j = i;
        for _ in 0..4096 {
            match self.nth(j) {
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(j + 1);
                    }
                }
                SyntaxKind::Semicolon | SyntaxKind::Eof => return None,
                _ => {}
            }
            j += 1;
        }
        None
    }
}

/// `text` ends with a `quote` that is not escaped and is not the opening one.
fn is_closed_literal(text: &str, quote: char) -> bool {
    let Some(body) = text.strip_suffix(quote) else {
        return false;
    };
    if body.is_empty() {
        return false;
    }
    let escapes = body.bytes().rev().take_while(|&b| b == b'\\').count();
    escapes % 2 == 0
}
