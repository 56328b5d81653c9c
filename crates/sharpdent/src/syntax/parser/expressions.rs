//
// parser/expressions.rs
//
// Pratt expression parser, patterns and query expressions.
//

use super::items::is_reserved_keyword;
use super::Parser;
use crate::syntax::SyntaxKind;

/// Binding power of prefix operators and casts; tighter than every binary operator.
const PREFIX_BP: u8 = 32;
/// Relational operands of patterns bind at shift level.
const SHIFT_BP: u8 = 22;

const QUERY_CLAUSE_KEYWORDS: &[&str] = &[
    "from", "where", "select", "group", "orderby", "join", "let", "into",
];

#[derive(Debug, Clone, Copy)]
enum Infix {
    /// Assignment; the operator spans `width` tokens.
    Assign(usize),
    Conditional,
    /// Binary operator with right binding power and token width.
    Binary(u8, usize),
    Is,
    As,
    Switch,
    With,
}

impl Parser<'_> {
    pub(super) fn expr(&mut self) {
        self.expr_bp(0);
    }

    pub(super) fn at_expression_start(&self) -> bool {
        let kind = self.current();
        kind.is_literal()
            || kind.is_predefined_type()
            || matches!(
                kind,
                SyntaxKind::Ident
                    | SyntaxKind::LParen
                    | SyntaxKind::LBracket
                    | SyntaxKind::NewKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::BaseKw
                    | SyntaxKind::TypeofKw
                    | SyntaxKind::SizeofKw
                    | SyntaxKind::DefaultKw
                    | SyntaxKind::CheckedKw
                    | SyntaxKind::UncheckedKw
                    | SyntaxKind::DelegateKw
                    | SyntaxKind::StackallocKw
                    | SyntaxKind::ThrowKw
                    | SyntaxKind::RefKw
                    | SyntaxKind::Plus
                    | SyntaxKind::Minus
                    | SyntaxKind::Bang
                    | SyntaxKind::Tilde
                    | SyntaxKind::PlusPlus
                    | SyntaxKind::MinusMinus
                    | SyntaxKind::Amp
                    | SyntaxKind::Star
                    | SyntaxKind::Caret
                    | SyntaxKind::DotDot
            )
    }

    fn expr_bp(&mut self, min_bp: u8) {
        if !self.enter() {
            self.error_bump();
            return;
        }
        if self.at_lambda() {
            self.lambda();
            self.leave();
            return;
        }
        let cp = self.checkpoint();
        if !self.unary() {
            self.leave();
            return;
        }
        let mut wraps = 0;
        while let Some((left_bp, infix)) = self.infix() {
            if left_bp < min_bp || !self.enter() {
                break;
            }
            wraps += 1;
            match infix {
                Infix::Assign(width) => {
                    self.start_at(cp, SyntaxKind::Assignment);
                    self.bump_operator(width, SyntaxKind::GtGtEq);
                    if self.at(SyntaxKind::LBrace) {
                        self.initializer();
                    } else {
                        self.expr_bp(1);
                    }
                    self.finish_node();
                }
                Infix::Conditional => {
                    self.start_at(cp, SyntaxKind::Conditional);
                    self.bump();
                    self.expr_bp(0);
                    if self.eat(SyntaxKind::Colon) {
                        self.expr_bp(3);
                    }
                    self.finish_node();
                }
                Infix::Binary(right_bp, width) => {
                    self.start_at(cp, SyntaxKind::Binary);
                    self.bump_operator(width, SyntaxKind::GtGt);
                    self.expr_bp(right_bp);
                    self.finish_node();
                }
                Infix::Is => {
                    self.start_at(cp, SyntaxKind::Binary);
                    self.bump();
                    self.pattern();
                    self.finish_node();
                }
                Infix::As => {
                    self.start_at(cp, SyntaxKind::Binary);
                    self.bump();
                    self.ty();
                    self.finish_node();
                }
                Infix::Switch => {
                    self.start_at(cp, SyntaxKind::SwitchExpr);
                    self.switch_expression_body();
                    self.finish_node();
                }
                Infix::With => {
                    self.start_at(cp, SyntaxKind::Binary);
                    self.bump();
                    self.initializer();
                    self.finish_node();
                }
            }
        }
        self.leave_many(wraps + 1);
    }

    fn bump_operator(&mut self, width: usize, fused: SyntaxKind) {
        if width > 1 {
            self.bump_joined(width, fused);
        } else {
            self.bump();
        }
    }

    fn infix(&self) -> Option<(u8, Infix)> {
        let adjacent_gt = self.at(SyntaxKind::Gt) && self.nth_adjacent(1);
        let op = match self.current() {
            SyntaxKind::Eq
            | SyntaxKind::PlusEq
            | SyntaxKind::MinusEq
            | SyntaxKind::StarEq
            | SyntaxKind::SlashEq
            | SyntaxKind::PercentEq
            | SyntaxKind::AmpEq
            | SyntaxKind::PipeEq
            | SyntaxKind::CaretEq
            | SyntaxKind::LtLtEq
            | SyntaxKind::QuestionQuestionEq => (2, Infix::Assign(1)),
            SyntaxKind::Gt if adjacent_gt && self.nth(1) == SyntaxKind::GtEq => {
                (2, Infix::Assign(2))
            }
            SyntaxKind::Question => (4, Infix::Conditional),
            SyntaxKind::QuestionQuestion => (6, Infix::Binary(5, 1)),
            SyntaxKind::PipePipe => (8, Infix::Binary(9, 1)),
            SyntaxKind::AmpAmp => (10, Infix::Binary(11, 1)),
            SyntaxKind::Pipe => (12, Infix::Binary(13, 1)),
            SyntaxKind::Caret => (14, Infix::Binary(15, 1)),
            SyntaxKind::Amp => (16, Infix::Binary(17, 1)),
            SyntaxKind::EqEq | SyntaxKind::BangEq => (18, Infix::Binary(19, 1)),
            SyntaxKind::Gt if adjacent_gt && self.nth(1) == SyntaxKind::Gt => {
                (22, Infix::Binary(23, 2))
            }
            SyntaxKind::Lt | SyntaxKind::Gt | SyntaxKind::LtEq | SyntaxKind::GtEq => {
                (20, Infix::Binary(21, 1))
            }
            SyntaxKind::IsKw => (20, Infix::Is),
            SyntaxKind::AsKw => (20, Infix::As),
            SyntaxKind::LtLt => (22, Infix::Binary(23, 1)),
            SyntaxKind::Plus | SyntaxKind::Minus => (24, Infix::Binary(25, 1)),
            SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => {
                (26, Infix::Binary(27, 1))
            }
            SyntaxKind::DotDot => (28, Infix::Binary(29, 1)),
            SyntaxKind::SwitchKw if self.nth(1) == SyntaxKind::LBrace => (30, Infix::Switch),
            SyntaxKind::Ident
                if self.at_contextual("with") && self.nth(1) == SyntaxKind::LBrace =>
            {
                (30, Infix::With)
            }
            _ => return None,
        };
        Some(op)
    }

    /// Prefix operators, casts, then a primary with its postfix chain.
    fn unary(&mut self) -> bool {
        match self.current() {
            SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Bang
            | SyntaxKind::Tilde
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::Amp
            | SyntaxKind::Star
            | SyntaxKind::Caret
            | SyntaxKind::RefKw
            | SyntaxKind::ThrowKw => {
                self.start(SyntaxKind::Prefix);
                self.bump();
                self.expr_bp(PREFIX_BP);
                self.finish_node();
                true
            }
            SyntaxKind::DotDot => {
                self.start(SyntaxKind::Prefix);
                self.bump();
                if self.at_expression_start() {
                    self.expr_bp(29);
                }
                self.finish_node();
                true
            }
            SyntaxKind::Ident if self.at_await_operator() => {
                self.start(SyntaxKind::Prefix);
                self.bump();
                self.expr_bp(PREFIX_BP);
                self.finish_node();
                true
            }
            SyntaxKind::LParen if self.at_cast() => {
                self.start(SyntaxKind::Cast);
                self.bump();
                self.ty();
                self.eat(SyntaxKind::RParen);
                self.expr_bp(PREFIX_BP);
                self.finish_node();
                true
            }
            _ => {
                let cp = self.checkpoint();
                if !self.primary() {
                    return false;
                }
                self.postfix(cp);
                true
            }
        }
    }

    fn at_await_operator(&self) -> bool {
        if !self.at_contextual("await") {
            return false;
        }
        let next = self.nth(1);
        next.is_literal()
            || matches!(
                next,
                SyntaxKind::Ident
                    | SyntaxKind::LParen
                    | SyntaxKind::NewKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::BaseKw
                    | SyntaxKind::Bang
                    | SyntaxKind::Minus
            )
    }

    /// `(Type)operand`
    fn at_cast(&self) -> bool {
        let Some(end) = self.scan_type(1) else {
            return false;
        };
        if self.nth(end) != SyntaxKind::RParen {
            return false;
        }
        if (1..end).any(|i| self.nth(i).is_predefined_type()) {
            return true;
        }
        let next = self.nth(end + 1);
        next.is_literal()
            || matches!(
                next,
                SyntaxKind::Ident | SyntaxKind::LParen | SyntaxKind::Bang | SyntaxKind::Tilde
            )
            || (is_reserved_keyword(next)
                && !matches!(
                    next,
                    SyntaxKind::AsKw | SyntaxKind::IsKw | SyntaxKind::SwitchKw
                ))
    }

    fn primary(&mut self) -> bool {
        let kind = self.current();
        match kind {
            _ if kind.is_literal() => {
                self.start(SyntaxKind::Literal);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::Ident if self.at_query() => self.query_expression(),
            SyntaxKind::Ident => self.name(),
            SyntaxKind::ThisKw | SyntaxKind::BaseKw => {
                self.start(SyntaxKind::Name);
                self.bump();
                self.finish_node();
            }
            _ if kind.is_predefined_type() => {
                self.start(SyntaxKind::Name);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::LParen => self.paren_or_tuple(),
            SyntaxKind::NewKw => self.creation(),
            SyntaxKind::StackallocKw => {
                self.start(SyntaxKind::ArrayCreation);
                self.bump();
                self.ty();
                if self.at(SyntaxKind::LBracket) {
                    self.bracketed_argument_list();
                }
                if self.at(SyntaxKind::LBrace) {
                    self.initializer();
                }
                self.finish_node();
            }
            SyntaxKind::TypeofKw
            | SyntaxKind::SizeofKw
            | SyntaxKind::DefaultKw
            | SyntaxKind::CheckedKw
            | SyntaxKind::UncheckedKw => {
                self.start(SyntaxKind::KeywordExpr);
                self.bump();
                if self.eat(SyntaxKind::LParen) {
                    if matches!(kind, SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw) {
                        self.expr();
                    } else {
                        self.ty();
                    }
                    self.eat(SyntaxKind::RParen);
                }
                self.finish_node();
            }
            SyntaxKind::DelegateKw => {
                self.start(SyntaxKind::AnonymousMethod);
                self.bump();
                if self.at(SyntaxKind::LParen) {
                    self.parameter_list();
                }
                if self.at(SyntaxKind::LBrace) {
                    self.block();
                }
                self.finish_node();
            }
            SyntaxKind::LBracket => {
                self.start(SyntaxKind::CollectionExpr);
                self.bump();
                self.element_list(SyntaxKind::RBracket);
                self.eat(SyntaxKind::RBracket);
                self.finish_node();
            }
            _ => return false,
        }
        true
    }

    /// Identifier with optional type arguments.
    fn name(&mut self) {
        self.start(SyntaxKind::Name);
        self.bump();
        if self.at(SyntaxKind::Lt) && self.type_arguments_follow(0) {
            self.type_argument_list();
        }
        self.finish_node();
    }

    fn type_argument_list(&mut self) {
        self.start(SyntaxKind::TypeArgumentList);
        self.bump();
        loop {
            if self.at(SyntaxKind::Gt) || (!self.ty() && !self.at(SyntaxKind::Comma)) {
                break;
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(SyntaxKind::Gt);
        self.finish_node();
    }

    fn postfix(&mut self, cp: rowan::Checkpoint) {
        let mut wraps = 0;
        loop {
            if !self.at_postfix_operator() || !self.enter() {
                break;
            }
            wraps += 1;
            match self.current() {
                SyntaxKind::Dot | SyntaxKind::QuestionDot | SyntaxKind::Arrow | SyntaxKind::ColonColon => {
                    self.start_at(cp, SyntaxKind::MemberAccess);
                    self.bump();
                    if self.at(SyntaxKind::Ident) && !self.at_query_keyword_on_new_line() {
                        self.name();
                    }
                    self.finish_node();
                }
                SyntaxKind::LParen => {
                    self.start_at(cp, SyntaxKind::Invocation);
                    self.argument_list();
                    self.finish_node();
                }
                SyntaxKind::LBracket => {
                    self.start_at(cp, SyntaxKind::ElementAccess);
                    self.bracketed_argument_list();
                    self.finish_node();
                }
                SyntaxKind::Question
                    if self.nth(1) == SyntaxKind::LBracket && self.nth_adjacent(1) =>
                {
                    self.start_at(cp, SyntaxKind::ElementAccess);
                    self.bump();
                    self.bracketed_argument_list();
                    self.finish_node();
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus | SyntaxKind::Bang => {
                    self.start_at(cp, SyntaxKind::Postfix);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
        self.leave_many(wraps);
    }

    fn at_postfix_operator(&self) -> bool {
        match self.current() {
            SyntaxKind::Dot
            | SyntaxKind::QuestionDot
            | SyntaxKind::Arrow
            | SyntaxKind::ColonColon
            | SyntaxKind::LParen
            | SyntaxKind::LBracket
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::Bang => true,
            SyntaxKind::Question => self.nth(1) == SyntaxKind::LBracket && self.nth_adjacent(1),
            _ => false,
        }
    }

    /// A query clause keyword starting a new line ends a dangling member access.
    fn at_query_keyword_on_new_line(&self) -> bool {
        self.query_depth > 0
            && self.nth_line_break_before(0)
            && QUERY_CLAUSE_KEYWORDS.contains(&self.nth_text(0))
    }

    pub(super) fn argument_list(&mut self) {
        self.start(SyntaxKind::ArgumentList);
        self.bump();
        self.arguments(SyntaxKind::RParen);
        self.eat(SyntaxKind::RParen);
        self.finish_node();
    }

    pub(super) fn bracketed_argument_list(&mut self) {
        self.start(SyntaxKind::BracketedArgumentList);
        self.bump();
        self.arguments(SyntaxKind::RBracket);
        self.eat(SyntaxKind::RBracket);
        self.finish_node();
    }

    fn arguments(&mut self, close: SyntaxKind) {
        loop {
            if self.at(close) {
                break;
            }
            let named = self.at(SyntaxKind::Ident) && self.nth(1) == SyntaxKind::Colon;
            let modifier = matches!(
                self.current(),
                SyntaxKind::RefKw | SyntaxKind::OutKw | SyntaxKind::InKw
            );
            if !named && !modifier && !self.at_expression_start() {
                break;
            }
            self.start(SyntaxKind::Argument);
            if named {
                self.bump();
                self.bump();
            }
            if matches!(self.current(), SyntaxKind::OutKw | SyntaxKind::InKw)
                || (self.at(SyntaxKind::RefKw) && self.declaration_expression_follows(1))
            {
                self.bump();
            }
            if self.declaration_expression_follows(0) {
                self.start(SyntaxKind::DeclarationExpr);
                self.ty();
                self.eat(SyntaxKind::Ident);
                self.finish_node();
            } else if self.at_expression_start() {
                self.expr();
            }
            self.finish_node();
            if self.eat(SyntaxKind::Comma) {
                continue;
            }
            // A string cut off at the line end swallowed the comma after it;
            // the list goes on with the next line.
            if !(self.previous_literal_unterminated() && self.nth_line_break_before(0)) {
                break;
            }
        }
    }

    /// `out var x` / `out int x`
    fn declaration_expression_follows(&self, i: usize) -> bool {
        self.scan_type(i).is_some_and(|j| {
            self.nth(j) == SyntaxKind::Ident
                && matches!(self.nth(j + 1), SyntaxKind::Comma | SyntaxKind::RParen)
        })
    }

    fn paren_or_tuple(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        let mut kind = SyntaxKind::Paren;
        loop {
            if self.at(SyntaxKind::RParen) || !self.at_expression_start() {
                break;
            }
            self.start(SyntaxKind::Argument);
            if self.at(SyntaxKind::Ident) && self.nth(1) == SyntaxKind::Colon {
                kind = SyntaxKind::Tuple;
                self.bump();
                self.bump();
            }
            self.expr();
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            kind = SyntaxKind::Tuple;
        }
        self.eat(SyntaxKind::RParen);
        self.start_at(cp, kind);
        self.finish_node();
    }

    fn creation(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        let kind = match self.current() {
            SyntaxKind::LBrace => {
                self.bump();
                self.element_list(SyntaxKind::RBrace);
                self.eat(SyntaxKind::RBrace);
                SyntaxKind::AnonymousObject
            }
            SyntaxKind::LBracket => {
                // new[] { ... }
                self.bump();
                while self.eat(SyntaxKind::Comma) {}
                self.eat(SyntaxKind::RBracket);
                if self.at(SyntaxKind::LBrace) {
                    self.initializer();
                }
                SyntaxKind::ArrayCreation
            }
            _ => {
                let array_type = self
                    .scan_type(0)
                    .is_some_and(|end| self.nth(end - 1) == SyntaxKind::RBracket);
                self.ty();
                let mut kind = if array_type {
                    SyntaxKind::ArrayCreation
                } else {
                    SyntaxKind::ObjectCreation
                };
                if self.at(SyntaxKind::LBracket) {
                    kind = SyntaxKind::ArrayCreation;
                    self.bracketed_argument_list();
                    while self.at(SyntaxKind::LBracket)
                        && matches!(self.nth(1), SyntaxKind::RBracket | SyntaxKind::Comma)
                    {
                        self.bump();
                        while self.eat(SyntaxKind::Comma) {}
                        self.eat(SyntaxKind::RBracket);
                    }
                } else if self.at(SyntaxKind::LParen) {
                    self.argument_list();
                }
                if self.at(SyntaxKind::LBrace) {
                    self.initializer();
                }
                kind
            }
        };
        self.start_at(cp, kind);
        self.finish_node();
    }

    /// `{ a, b = c, { nested } }`
    pub(super) fn initializer(&mut self) {
        if !self.enter() {
            self.error_bump();
            return;
        }
        self.start(SyntaxKind::Initializer);
        self.bump();
        self.element_list(SyntaxKind::RBrace);
        self.eat(SyntaxKind::RBrace);
        self.finish_node();
        self.leave();
    }

    fn element_list(&mut self, close: SyntaxKind) {
        loop {
            if self.at(close) {
                break;
            }
            if self.at(SyntaxKind::LBrace) {
                self.initializer();
            } else if self.at_expression_start() {
                self.expr();
            } else {
                break;
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Lambdas
    // ------------------------------------------------------------------

    fn at_lambda(&self) -> bool {
        let mut i = 0;
        if self.at_contextual("async")
            && matches!(self.nth(1), SyntaxKind::Ident | SyntaxKind::LParen | SyntaxKind::StaticKw)
        {
            i = 1;
        }
        if self.nth(i) == SyntaxKind::StaticKw {
            i += 1;
        }
        match self.nth(i) {
            SyntaxKind::Ident => self.nth(i + 1) == SyntaxKind::FatArrow,
            SyntaxKind::LParen => self
                .skip_balanced(i)
                .is_some_and(|after| self.nth(after) == SyntaxKind::FatArrow),
            _ => false,
        }
    }

    fn lambda(&mut self) {
        self.start(SyntaxKind::Lambda);
        if self.at_contextual("async") && self.nth(1) != SyntaxKind::FatArrow {
            self.bump();
        }
        self.eat(SyntaxKind::StaticKw);
        if self.at(SyntaxKind::Ident) {
            self.start(SyntaxKind::Parameter);
            self.bump();
            self.finish_node();
        } else {
            self.parameter_list();
        }
        self.eat(SyntaxKind::FatArrow);
        if self.at(SyntaxKind::LBrace) {
            self.block();
        } else if self.at_expression_start() {
            self.expr();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // switch expressions and patterns
    // ------------------------------------------------------------------

    fn switch_expression_body(&mut self) {
        self.bump();
        self.bump();
        loop {
            if self.at(SyntaxKind::RBrace) || self.at_eof() {
                break;
            }
            let before = self.cursor;
            self.start(SyntaxKind::SwitchExprArm);
            self.pattern();
            if self.at_contextual("when") {
                self.bump_as(SyntaxKind::WhenKw);
                if self.at_expression_start() {
                    self.expr();
                }
            }
            if self.eat(SyntaxKind::FatArrow) && self.at_expression_start() {
                self.expr();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) || self.cursor == before {
                break;
            }
        }
        self.eat(SyntaxKind::RBrace);
    }

    pub(super) fn pattern(&mut self) {
        self.start(SyntaxKind::Pattern);
        self.pattern_or();
        self.finish_node();
    }

    fn pattern_or(&mut self) {
        self.pattern_and();
        while self.at_contextual("or") {
            self.bump();
            self.pattern_and();
        }
    }

    fn pattern_and(&mut self) {
        self.pattern_not();
        while self.at_contextual("and") {
            self.bump();
            self.pattern_not();
        }
    }

    fn pattern_not(&mut self) {
        while self.at_contextual("not") {
            self.bump();
        }
        if !self.enter() {
            self.error_bump();
            return;
        }
        self.primary_pattern();
        self.leave();
    }

    fn at_designation(&self, i: usize) -> bool {
        self.nth(i) == SyntaxKind::Ident
            && !matches!(self.nth_text(i), "and" | "or" | "when" | "not")
    }

    fn primary_pattern(&mut self) {
        match self.current() {
            SyntaxKind::LParen => {
                self.subpatterns(SyntaxKind::RParen);
                if self.at(SyntaxKind::LBrace) {
                    self.subpatterns(SyntaxKind::RBrace);
                }
                if self.at_designation(0) {
                    self.bump();
                }
            }
            SyntaxKind::LBrace => {
                self.subpatterns(SyntaxKind::RBrace);
                if self.at_designation(0) {
                    self.bump();
                }
            }
            SyntaxKind::LBracket => self.subpatterns(SyntaxKind::RBracket),
            SyntaxKind::Lt | SyntaxKind::Gt | SyntaxKind::LtEq | SyntaxKind::GtEq => {
                self.bump();
                self.expr_bp(SHIFT_BP);
            }
            SyntaxKind::DotDot => {
                self.bump();
                if self.at_designation(0) || self.at(SyntaxKind::LBracket) {
                    self.primary_pattern();
                }
            }
            SyntaxKind::Ident if self.at_contextual("var") => {
                self.bump();
                if self.at(SyntaxKind::LParen) {
                    self.subpatterns(SyntaxKind::RParen);
                } else if self.at_designation(0) {
                    self.bump();
                }
            }
            _ => {
                let typed = self.scan_type(0).is_some_and(|end| {
                    self.at_designation(end)
                        || matches!(self.nth(end), SyntaxKind::LBrace | SyntaxKind::LParen)
                });
                if typed {
                    self.ty();
                    if matches!(self.current(), SyntaxKind::LParen | SyntaxKind::LBrace) {
                        self.primary_pattern();
                    } else {
                        self.bump();
                    }
                } else if self.at_expression_start() {
                    self.expr_bp(SHIFT_BP);
                }
            }
        }
    }

    /// `( p, name: p )`, `{ Prop: p }` or `[ p, .. ]`.
    fn subpatterns(&mut self, close: SyntaxKind) {
        self.bump();
        loop {
            if self.at(close) || self.at_eof() {
                break;
            }
            let before = self.cursor;
            while self.at(SyntaxKind::Ident)
                && matches!(self.nth(1), SyntaxKind::Colon | SyntaxKind::Dot)
                && self.property_name_follows()
            {
                self.bump();
                self.bump();
            }
            self.pattern_or();
            if !self.eat(SyntaxKind::Comma) || self.cursor == before {
                break;
            }
        }
        self.eat(close);
    }

    /// `A.B.C:` in an extended property pattern.
    fn property_name_follows(&self) -> bool {
        let mut i = 0;
        while self.nth(i) == SyntaxKind::Ident {
            match self.nth(i + 1) {
                SyntaxKind::Colon => return true,
                SyntaxKind::Dot => i += 2,
                _ => return false,
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Query expressions
    // ------------------------------------------------------------------

    fn at_query(&self) -> bool {
        if !self.at_contextual("from") {
            return false;
        }
        let next = self.nth(1);
        if next != SyntaxKind::Ident && !next.is_predefined_type() {
            return false;
        }
        !matches!(
            self.nth(2),
            SyntaxKind::Eq
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::RParen
                | SyntaxKind::Dot
                | SyntaxKind::LParen
                | SyntaxKind::FatArrow
        )
    }

    fn query_expression(&mut self) {
        self.start(SyntaxKind::QueryExpr);
        self.query_depth += 1;
        self.from_clause();
        self.query_body();
        self.query_depth -= 1;
        self.finish_node();
    }

    fn query_body(&mut self) {
        self.start(SyntaxKind::QueryBody);
        loop {
            match self.nth_text(0) {
                _ if self.current() != SyntaxKind::Ident => break,
                "from" => self.from_clause(),
                "where" => self.simple_clause(SyntaxKind::WhereClause, SyntaxKind::WhereKw),
                "select" => self.simple_clause(SyntaxKind::SelectClause, SyntaxKind::SelectKw),
                "let" => self.let_clause(),
                "orderby" => self.orderby_clause(),
                "join" => self.join_clause(),
                "group" => self.group_clause(),
                "into" => {
                    self.start(SyntaxKind::QueryContinuation);
                    self.bump_as(SyntaxKind::IntoKw);
                    self.eat(SyntaxKind::Ident);
                    self.query_body();
                    self.finish_node();
                    break;
                }
                _ => break,
            }
        }
        self.finish_node();
    }

    fn clause_operand(&mut self) {
        if self.at_expression_start() && !self.at_clause_keyword() {
            self.expr();
        }
    }

    fn at_clause_keyword(&self) -> bool {
        let text = self.nth_text(0);
        self.at(SyntaxKind::Ident) && text != "from" && QUERY_CLAUSE_KEYWORDS.contains(&text)
    }

    fn from_clause(&mut self) {
        self.start(SyntaxKind::FromClause);
        self.bump_as(SyntaxKind::FromKw);
        let typed = self
            .scan_type(0)
            .is_some_and(|end| self.nth(end) == SyntaxKind::Ident && self.nth_text(end) != "in");
        if typed {
            self.ty();
        }
        self.eat(SyntaxKind::Ident);
        if self.eat(SyntaxKind::InKw) {
            self.clause_operand();
        }
        self.finish_node();
    }

    fn simple_clause(&mut self, node: SyntaxKind, keyword: SyntaxKind) {
        self.start(node);
        self.bump_as(keyword);
        self.clause_operand();
        self.finish_node();
    }

    fn let_clause(&mut self) {
        self.start(SyntaxKind::LetClause);
        self.bump_as(SyntaxKind::LetKw);
        self.eat(SyntaxKind::Ident);
        if self.eat(SyntaxKind::Eq) {
            self.clause_operand();
        }
        self.finish_node();
    }

    fn orderby_clause(&mut self) {
        self.start(SyntaxKind::OrderByClause);
        self.bump_as(SyntaxKind::OrderbyKw);
        loop {
            if !self.at_expression_start() || self.at_clause_keyword() {
                break;
            }
            self.start(SyntaxKind::Ordering);
            self.expr();
            if self.at_contextual("ascending") {
                self.bump_as(SyntaxKind::AscendingKw);
            } else if self.at_contextual("descending") {
                self.bump_as(SyntaxKind::DescendingKw);
            }
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    fn join_clause(&mut self) {
        self.start(SyntaxKind::JoinClause);
        self.bump_as(SyntaxKind::JoinKw);
        let typed = self
            .scan_type(0)
            .is_some_and(|end| self.nth(end) == SyntaxKind::Ident && self.nth_text(end) != "in");
        if typed {
            self.ty();
        }
        self.eat(SyntaxKind::Ident);
        if self.eat(SyntaxKind::InKw) {
            self.clause_operand();
        }
        if self.at_contextual("on") {
            self.bump_as(SyntaxKind::OnKw);
            self.clause_operand();
        }
        if self.at_contextual("equals") {
            self.bump_as(SyntaxKind::EqualsKw);
            self.clause_operand();
        }
        if self.at_contextual("into") {
            self.bump_as(SyntaxKind::IntoKw);
            self.eat(SyntaxKind::Ident);
        }
        self.finish_node();
    }

    fn group_clause(&mut self) {
        self.start(SyntaxKind::GroupClause);
        self.bump_as(SyntaxKind::GroupKw);
        if !self.at_contextual("by") {
            self.clause_operand();
        }
        if self.at_contextual("by") {
            self.bump_as(SyntaxKind::ByKw);
            self.clause_operand();
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{count, has, tree};
    use crate::syntax::{SyntaxKind, SyntaxNode};

    fn statement(text: &str) -> SyntaxNode {
        tree(&format!("class C\n{{\n    void M()\n    {{\n        {text}\n    }}\n}}\n"))
    }

    fn first(root: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
        root.descendants().find(|n| n.kind() == kind).unwrap()
    }

    #[test]
    fn test_precedence() {
        let root = statement("x = a + b * c;");
        let assignment = first(&root, SyntaxKind::Assignment);
        let binary = first(&assignment, SyntaxKind::Binary);
        assert_eq!(binary.text().to_string(), "a + b * c");
        assert_eq!(count(&binary, SyntaxKind::Binary), 2);
    }

    #[test]
    fn test_shift_is_fused_from_two_greater_thans() {
        let root = statement("x = a >> 2;\ny >>= 1;\nList<List<int>> z = null;");
        let tokens: Vec<_> = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| t.kind())
            .collect();
        assert!(tokens.contains(&SyntaxKind::GtGt));
        assert!(tokens.contains(&SyntaxKind::GtGtEq));
        assert_eq!(count(&root, SyntaxKind::LocalDeclStmt), 1);
    }

    #[test]
    fn test_generic_invocation_versus_comparison() {
        let root = statement("Foo<int,\n    int>(4, 2);");
        assert!(has(&root, SyntaxKind::TypeArgumentList));

        let root = statement("var b = i < n && j > m;");
        assert!(!has(&root, SyntaxKind::TypeArgumentList));
    }

    #[test]
    fn test_calls_and_arguments() {
        let root = statement("M(\n    a: 1,\n    b: 1);");
        assert_eq!(count(&root, SyntaxKind::Argument), 2);
        let root = statement("Try(out var x, ref y, in z);");
        assert!(has(&root, SyntaxKind::DeclarationExpr));
    }

    #[test]
    fn test_unterminated_string_argument_keeps_the_list_open() {
        let root = statement("var s = string.Format(\n    \",\n    0,\n    42);");
        let list = first(&root, SyntaxKind::ArgumentList);
        assert_eq!(count(&list, SyntaxKind::Argument), 3);
        assert!(!has(&root, SyntaxKind::Error));

        // A closed string still needs its comma
        let root = statement("M(\"a\"\n    b);");
        let list = first(&root, SyntaxKind::ArgumentList);
        assert_eq!(count(&list, SyntaxKind::Argument), 1);
    }

    #[test]
    fn test_lambdas_and_anonymous_methods() {
        let root = statement("using (var v = new FooClass(() =>\n{\n}))\n{\n}");
        assert!(has(&root, SyntaxKind::Lambda));
        let root = statement("Run(async x => await x, (a, b) => a + b, delegate { });");
        assert_eq!(count(&root, SyntaxKind::Lambda), 2);
        assert!(has(&root, SyntaxKind::AnonymousMethod));
    }

    #[test]
    fn test_creation_forms() {
        let root = statement("var a = new int[1];\nvar b = new int[] { 1, 2 };\nvar c = new List<int> { 1 };\nvar d = new { A = 1 };\nvar e = new[] { 1 };\nC f = new();");
        assert_eq!(count(&root, SyntaxKind::ArrayCreation), 3);
        assert_eq!(count(&root, SyntaxKind::ObjectCreation), 2);
        assert_eq!(count(&root, SyntaxKind::AnonymousObject), 1);
        assert_eq!(count(&root, SyntaxKind::Initializer), 3);
    }

    #[test]
    fn test_casts_and_parentheses() {
        let root = statement("var a = (int)x + (b) + (Foo)y;\nvar t = (1, 2);");
        assert_eq!(count(&root, SyntaxKind::Cast), 2);
        assert_eq!(count(&root, SyntaxKind::Paren), 1);
        assert_eq!(count(&root, SyntaxKind::Tuple), 1);
    }

    #[test]
    fn test_query_expression() {
        let root = statement("var q = from string s in args\n        where s == null\n        orderby s descending\n        group s by s.Length into g\n        select g;");
        let query = first(&root, SyntaxKind::QueryExpr);
        for kind in [
            SyntaxKind::FromClause,
            SyntaxKind::WhereClause,
            SyntaxKind::OrderByClause,
            SyntaxKind::GroupClause,
            SyntaxKind::QueryContinuation,
            SyntaxKind::SelectClause,
        ] {
            assert!(has(&query, kind), "missing {kind:?}");
        }
    }

    #[test]
    fn test_dangling_member_access_stops_before_clause() {
        let root = statement("var q = from string s in args.\n        b.c.\n\n        where s == null\n        select s;");
        assert!(has(&root, SyntaxKind::WhereClause));
    }

    #[test]
    fn test_from_without_query_is_a_name() {
        let root = tree("var q = from\n");
        assert!(!has(&root, SyntaxKind::QueryExpr));
    }

    #[test]
    fn test_switch_expression_and_patterns() {
        let root = statement(
            "var r = x switch { > 0 and < 10 => 1, Point { X: 0 } p => 2, (1, _) => 3, [1, ..] => 4, not null => 5, _ => 0 };\nif (o is int n && n > 0) { }",
        );
        assert!(has(&root, SyntaxKind::SwitchExpr));
        assert_eq!(count(&root, SyntaxKind::SwitchExprArm), 6);
        assert_eq!(count(&root, SyntaxKind::Pattern), 7);
    }

    #[test]
    fn test_interpolated_and_verbatim_strings_are_literals() {
        let root = statement("var s = $\"{a} and {\"b\"}\" + @\"c\"\"d\";");
        assert_eq!(count(&root, SyntaxKind::Literal), 2);
    }
}
