//
// lexer.rs
//
// Lossless C# tokenizer. Every byte of input belongs to exactly one token, so
// concatenating token texts reproduces the source. Inactive preprocessor
// branches are emitted as a single `DisabledText` token per region.
//

use std::ops::Range;

use super::kind::{keyword, SyntaxKind};
use super::preprocessor::{directive_name, Preprocessor};

const MAX_STRING_NESTING: u32 = 64;

/// A token with its byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

/// Tokenize `text`, evaluating conditional directives against `symbols`.
pub(crate) fn tokenize<'a>(text: &str, symbols: impl IntoIterator<Item = &'a str>) -> Vec<Token> {
    let mut lexer = Lexer {
        src: text,
        pos: 0,
        tokens: Vec::new(),
        at_line_start: true,
        pending_directive: false,
        string_nesting: 0,
        pp: Preprocessor::new(symbols),
    };
    lexer.run();
    lexer.tokens
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    at_line_start: bool,
    pending_directive: bool,
    /// Interpolated strings currently open inside holes.
    string_nesting: u32,
    pp: Preprocessor,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            let start = self.pos;
            let kind = self.next_kind();
            debug_assert!(self.pos > start, "lexer must always make progress");
            self.tokens.push(Token {
                kind,
                range: start..self.pos,
            });

            match kind {
                SyntaxKind::Whitespace => {}
                SyntaxKind::Newline => {
                    self.at_line_start = true;
                    if std::mem::take(&mut self.pending_directive) && !self.pp.is_active() {
                        self.skip_disabled();
                    }
                }
                SyntaxKind::Directive => {
                    self.pp.directive(&self.src[start..self.pos]);
                    self.pending_directive = true;
                    self.at_line_start = false;
                }
                _ => self.at_line_start = false,
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn bump_char(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_to_line_end(&mut self) {
        let end = self
            .rest()
            .find(['\n', '\r'])
            .map_or(self.src.len(), |i| self.pos + i);
        self.pos = end;
    }

    /// Consume whole lines of an inactive branch, stopping before the directive
    /// that can end it (`#elif`, `#else` or `#endif` at nesting depth zero).
    fn skip_disabled(&mut self) {
        let start = self.pos;
        let mut depth = 0u32;
        while self.pos < self.src.len() {
            let rest = self.rest();
            let line_len = rest.find(['\n', '\r']).unwrap_or(rest.len());
            match directive_name(&rest[..line_len]) {
                Some("if") => depth += 1,
                Some("endif") if depth == 0 => break,
                Some("endif") => depth -= 1,
                Some("elif") | Some("else") if depth == 0 => break,
                _ => {}
            }
            self.pos += line_len;
            if rest[line_len..].starts_with("\r\n") {
                self.pos += 2;
            } else if line_len < rest.len() {
                self.pos += 1;
            }
        }
        if self.pos > start {
            self.tokens.push(Token {
                kind: SyntaxKind::DisabledText,
                range: start..self.pos,
            });
        }
    }

    fn next_kind(&mut self) -> SyntaxKind {
        let Some(c) = self.peek() else {
            return SyntaxKind::Eof;
        };

        match c {
            '\r' => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
                SyntaxKind::Newline
            }
            '\n' => {
                self.pos += 1;
                SyntaxKind::Newline
            }
            c if is_whitespace(c) => {
                self.eat_while(is_whitespace);
                SyntaxKind::Whitespace
            }
            '#' if self.at_line_start => {
                self.skip_to_line_end();
                SyntaxKind::Directive
            }
            '/' if self.peek_byte(1) == Some(b'/') => {
                let doc = self.rest().starts_with("///") && !self.rest().starts_with("////");
                self.skip_to_line_end();
                if doc {
                    SyntaxKind::DocComment
                } else {
                    SyntaxKind::SingleLineComment
                }
            }
            '/' if self.peek_byte(1) == Some(b'*') => {
                self.pos = match self.src[self.pos + 2..].find("*/") {
                    Some(i) => self.pos + 2 + i + 2,
                    None => self.src.len(),
                };
                SyntaxKind::MultiLineComment
            }
            '"' => self.string_like(),
            '@' | '$' => match self.prefixed_literal() {
                Some(kind) => kind,
                None if c == '@' && self.peek_byte(1).is_some_and(|b| is_ident_start_byte(b)) => {
                    self.pos += 1;
                    self.eat_while(is_ident_continue);
                    SyntaxKind::Ident
                }
                None => {
                    self.pos += 1;
                    SyntaxKind::Unknown
                }
            },
            '\'' => {
                self.char_literal();
                SyntaxKind::CharLiteral
            }
            c if c.is_ascii_digit() => {
                self.number();
                SyntaxKind::NumericLiteral
            }
            '.' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.number();
                SyntaxKind::NumericLiteral
            }
            c if is_ident_start(c) => {
                let start = self.pos;
                self.eat_while(is_ident_continue);
                keyword(&self.src[start..self.pos]).unwrap_or(SyntaxKind::Ident)
            }
            _ => self.punctuation(),
        }
    }

    fn punctuation(&mut self) -> SyntaxKind {
        use SyntaxKind::*;
        const TABLE: &[(&str, SyntaxKind)] = &[
            ("??=", QuestionQuestionEq),
            ("<<=", LtLtEq),
            ("??", QuestionQuestion),
            ("?.", QuestionDot),
            ("::", ColonColon),
            ("..", DotDot),
            ("++", PlusPlus),
            ("--", MinusMinus),
            ("&&", AmpAmp),
            ("||", PipePipe),
            ("==", EqEq),
            ("!=", BangEq),
            ("<=", LtEq),
            (">=", GtEq),
            ("+=", PlusEq),
            ("-=", MinusEq),
            ("*=", StarEq),
            ("/=", SlashEq),
            ("%=", PercentEq),
            ("&=", AmpEq),
            ("|=", PipeEq),
            ("^=", CaretEq),
            ("<<", LtLt),
            ("=>", FatArrow),
            ("->", Arrow),
            ("{", LBrace),
            ("}", RBrace),
            ("(", LParen),
            (")", RParen),
            ("[", LBracket),
            ("]", RBracket),
            (";", Semicolon),
            (",", Comma),
            (".", Dot),
            (":", Colon),
            ("?", Question),
            ("+", Plus),
            ("-", Minus),
            ("*", Star),
            ("/", Slash),
            ("%", Percent),
            ("&", Amp),
            ("|", Pipe),
            ("^", Caret),
            ("!", Bang),
            ("~", Tilde),
            ("=", Eq),
            ("<", Lt),
            (">", Gt),
        ];

        let rest = self.rest();
        for (text, kind) in TABLE {
            if !rest.starts_with(text) {
                continue;
            }
            // `?.5` is a conditional followed by a number.
            if *kind == QuestionDot && rest.as_bytes().get(2).is_some_and(u8::is_ascii_digit) {
                continue;
            }
            self.pos += text.len();
            return *kind;
        }
        self.bump_char();
        Unknown
    }

    fn char_literal(&mut self) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(c) if c != '\n' && c != '\r') {
                        self.bump_char();
                    }
                }
                '\'' => {
                    self.pos += 1;
                    return;
                }
                '\n' | '\r' => return,
                _ => self.bump_char(),
            }
        }
    }

    fn number(&mut self) {
        let rest = self.rest().as_bytes();
        if rest.len() > 1 && rest[0] == b'0' && matches!(rest[1], b'x' | b'X' | b'b' | b'B') {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let sign = usize::from(matches!(self.peek_byte(1), Some(b'+' | b'-')));
                if self.peek_byte(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1 + sign;
                    self.eat_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        }
        self.eat_while(|c| c.is_ascii_alphabetic());
    }

    /// Literals introduced by `@` or `$`: verbatim, interpolated and raw strings.
    fn prefixed_literal(&mut self) -> Option<SyntaxKind> {
        let bytes = self.rest().as_bytes();
        let dollars = bytes.iter().take_while(|&&b| b == b'$').count();
        let mut i = dollars;
        let mut verbatim = false;
        if bytes.get(i) == Some(&b'@') {
            verbatim = true;
            i += 1;
        }
        let mut more_dollars = 0;
        if dollars == 0 && verbatim {
            more_dollars = bytes[i..].iter().take_while(|&&b| b == b'$').count();
            i += more_dollars;
        }
        if bytes.get(i) != Some(&b'"') || (dollars == 0 && !verbatim) {
            return None;
        }
        let interpolated = dollars + more_dollars > 0;
        if !verbatim && bytes[i..].starts_with(b"\"\"\"") {
            self.pos += i;
            self.raw_string();
            return Some(SyntaxKind::RawStringLiteral);
        }
        self.pos += i + 1;
        match (interpolated, verbatim) {
            (false, _) => {
                self.verbatim_body();
                Some(SyntaxKind::VerbatimStringLiteral)
            }
            (true, verbatim) => {
                self.string_nesting += 1;
                self.interpolated_body(verbatim);
                self.string_nesting -= 1;
                Some(SyntaxKind::InterpolatedStringLiteral)
            }
        }
    }

    fn string_like(&mut self) -> SyntaxKind {
        if self.rest().starts_with("\"\"\"") {
            self.raw_string();
            SyntaxKind::RawStringLiteral
        } else {
            self.pos += 1;
            self.regular_body();
            SyntaxKind::StringLiteral
        }
    }

    /// Body of `"..."` after the opening quote; stops at an unescaped quote or line end.
    fn regular_body(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(c) if c != '\n' && c != '\r') {
                        self.bump_char();
                    }
                }
                '"' => {
                    self.pos += 1;
                    return;
                }
                '\n' | '\r' => return,
                _ => self.bump_char(),
            }
        }
    }

    /// Body of `@"..."` after the opening quote; `""` is an escaped quote.
    fn verbatim_body(&mut self) {
        while let Some(c) = self.peek() {
            if c == '"' {
                self.pos += 1;
                if self.peek() == Some('"') {
                    self.pos += 1;
                    continue;
                }
                return;
            }
            self.bump_char();
        }
    }

    /// Body of `$"..."` or `$@"..."` after the opening quote. Holes may nest
    /// braces and string literals.
    fn interpolated_body(&mut self, verbatim: bool) {
        let mut depth = 0u32;
        while let Some(c) = self.peek() {
            match c {
                '{' if depth == 0 && self.peek_byte(1) == Some(b'{') => self.pos += 2,
                '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                // Past the nesting limit, quotes inside holes are plain text.
                '"' | '@' | '$' if depth > 0 && self.string_nesting >= MAX_STRING_NESTING => {
                    self.pos += 1
                }
                '"' if depth > 0 => {
                    if self.prefixed_literal().is_none() {
                        self.string_like();
                    }
                }
                '@' | '$' if depth > 0 => {
                    if self.prefixed_literal().is_none() {
                        self.pos += 1;
                    }
                }
                '\'' if depth > 0 => self.char_literal(),
                '"' => {
                    self.pos += 1;
                    if verbatim && self.peek() == Some('"') {
                        self.pos += 1;
                        continue;
                    }
                    return;
                }
                '\\' if !verbatim && depth == 0 => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(c) if c != '\n' && c != '\r') {
                        self.bump_char();
                    }
                }
                '\n' | '\r' if !verbatim && depth == 0 => return,
                _ => self.bump_char(),
            }
        }
    }

    /// A raw string `"""..."""`: closes at the first run of at least as many quotes.
    fn raw_string(&mut self) {
        let quotes = self.rest().bytes().take_while(|&b| b == b'"').count();
        self.pos += quotes;
        let fence = "\"".repeat(quotes);
        match self.rest().find(&fence) {
            Some(i) => {
                self.pos += i;
                let closing = self.rest().bytes().take_while(|&b| b == b'"').count();
                self.pos += closing;
            }
            None => self.pos = self.src.len(),
        }
    }
}

fn is_whitespace(c: char) -> bool {
    c != '\n' && c != '\r' && c.is_whitespace()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_start_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || b >= 0x80
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
