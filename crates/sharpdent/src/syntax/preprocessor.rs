//
// preprocessor.rs
//
// Conditional-compilation state for the lexer: tracks #if/#elif/#else/#endif
// nesting and #define/#undef so inactive branches can be lexed as disabled text.
//

use std::collections::HashSet;

const MAX_EXPRESSION_DEPTH: u32 = 64;

#[derive(Debug, Clone, Copy)]
struct Branch {
    parent_active: bool,
    taken: bool,
    active: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Preprocessor {
    symbols: HashSet<String>,
    stack: Vec<Branch>,
}

/// The directive keyword of a directive line, e.g. `"elif"` for `  #  elif DEBUG`.
pub(crate) fn directive_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

impl Preprocessor {
    pub(crate) fn new<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            symbols: symbols.into_iter().map(str::to_string).collect(),
            stack: Vec::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.stack.last().map_or(true, |branch| branch.active)
    }

    /// Apply one directive line (including the leading `#`).
    pub(crate) fn directive(&mut self, line: &str) {
        let Some(name) = directive_name(line) else {
            return;
        };
        let body = line.trim_start()[1..].trim_start()[name.len()..].trim();
        let body = body.split("//").next().unwrap_or("").trim();

        match name {
            "if" => {
                let parent_active = self.is_active();
                let cond = parent_active && self.evaluate(body);
                self.stack.push(Branch {
                    parent_active,
                    taken: cond,
                    active: cond,
                });
            }
            "elif" => {
                let cond = self.evaluate(body);
                if let Some(branch) = self.stack.last_mut() {
                    if branch.taken || !branch.parent_active {
                        branch.active = false;
                    } else {
                        branch.active = cond;
                        branch.taken = cond;
                    }
                }
            }
            "else" => {
                if let Some(branch) = self.stack.last_mut() {
                    branch.active = branch.parent_active && !branch.taken;
                    branch.taken = true;
                }
            }
            "endif" => {
                self.stack.pop();
            }
            "define" if self.is_active() => {
                if !body.is_empty() {
                    self.symbols.insert(body.to_string());
                }
            }
            "undef" if self.is_active() => {
                self.symbols.remove(body);
            }
            _ => {}
        }
    }

    fn evaluate(&self, expr: &str) -> bool {
        let tokens = tokenize_condition(expr);
        let mut eval = Evaluator {
            tokens: &tokens,
            pos: 0,
            symbols: &self.symbols,
            depth: 0,
        };
        eval.or_expr()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondToken<'a> {
    Symbol(&'a str),
    Not,
    And,
    Or,
    EqEq,
    NotEq,
    LParen,
    RParen,
}

fn tokenize_condition(expr: &str) -> Vec<CondToken<'_>> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &expr[i..];
        let (token, width) = match bytes[i] {
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            b'(' => (CondToken::LParen, 1),
            b')' => (CondToken::RParen, 1),
            b'!' if rest.starts_with("!=") => (CondToken::NotEq, 2),
            b'!' => (CondToken::Not, 1),
            b'&' if rest.starts_with("&&") => (CondToken::And, 2),
            b'|' if rest.starts_with("||") => (CondToken::Or, 2),
            b'=' if rest.starts_with("==") => (CondToken::EqEq, 2),
            c if c == b'_' || c.is_ascii_alphanumeric() || c >= 0x80 => {
                let end = rest
                    .find(|c: char| !(c == '_' || c.is_alphanumeric()))
                    .unwrap_or(rest.len());
                (CondToken::Symbol(&rest[..end]), end)
            }
            _ => break,
        };
        tokens.push(token);
        i += width;
    }
    tokens
}

struct Evaluator<'a, 't> {
    tokens: &'t [CondToken<'a>],
    pos: usize,
    symbols: &'t HashSet<String>,
    depth: u32,
}

impl Evaluator<'_, '_> {
    fn peek(&self) -> Option<&CondToken<'_>> {
        self.tokens.get(self.pos)
    }

    fn or_expr(&mut self) -> bool {
        let mut value = self.and_expr();
        while self.peek() == Some(&CondToken::Or) {
            self.pos += 1;
            let rhs = self.and_expr();
            value = value || rhs;
        }
        value
    }

    fn and_expr(&mut self) -> bool {
        let mut value = self.equality();
        while self.peek() == Some(&CondToken::And) {
            self.pos += 1;
            let rhs = self.equality();
            value = value && rhs;
        }
        value
    }

    fn equality(&mut self) -> bool {
        let mut value = self.unary();
        loop {
            match self.peek() {
                Some(CondToken::EqEq) => {
                    self.pos += 1;
                    value = value == self.unary();
                }
                Some(CondToken::NotEq) => {
                    self.pos += 1;
                    value = value != self.unary();
                }
                _ => return value,
            }
        }
    }

    fn unary(&mut self) -> bool {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return false;
        }
        self.depth += 1;
        let value = match self.tokens.get(self.pos).cloned() {
            Some(CondToken::Not) => {
                self.pos += 1;
                !self.unary()
            }
            Some(CondToken::LParen) => {
                self.pos += 1;
                let value = self.or_expr();
                if self.peek() == Some(&CondToken::RParen) {
                    self.pos += 1;
                }
                value
            }
            Some(CondToken::Symbol(name)) => {
                self.pos += 1;
                match name {
                    "true" => true,
                    "false" => false,
                    _ => self.symbols.contains(name),
                }
            }
            _ => false,
        };
        self.depth -= 1;
        value
    }
}
