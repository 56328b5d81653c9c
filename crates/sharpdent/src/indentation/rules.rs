//! Category → anchor/offset table.
//!
//! Every construct the classifier recognises maps to exactly one [`Rule`].
//! The table is data: it says where to measure from and how many units to
//! add, never how to find the construct.

use crate::syntax::SyntaxToken;

/// Indentation-relevant situations a target line can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    EmptyDocument,
    NoPrecedingContent,
    Directive,
    LiteralZone,
    CommentContinuation,
    PrecedingLine,
    BlockBody,
    ExpressionBlockBody,
    BlockCloser,
    ExpressionBlockCloser,
    BodyOpener,
    ExpressionBraceOpener,
    SwitchLabel,
    ClauseAlignment,
    ClosingDelimiter,
    SwitchSectionBody,
    EmbeddedStatement,
    DeclarationHeader,
    EmbeddedStatementEnd,
    TryBlockEnd,
    TopLevel,
    HangingList,
    /// Arguments of `: this(` / `: base(` when the colon leads its line.
    HangingInitializerList,
    ListElement,
    AttributeEnd,
    LambdaBody,
    QueryClause,
    QueryOperand,
    ContinuationLine,
    StatementContinuation,
    HangingCallCloser,
    Unattributed,
}

/// Where the measurement starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRule {
    /// Column the anchor token would get if it began its own line.
    EffectiveStart,
    /// Literal indentation of the line holding the anchor.
    LineOf,
    /// Visual column of the anchor token itself.
    TokenColumn,
    /// Column 0 of the document (or the island's top level).
    FileStart,
    /// Column 0 even inside an island.
    Margin,
    Inherit,
    NoOpinion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub anchor: AnchorRule,
    pub units: u32,
}

const fn at(anchor: AnchorRule, units: u32) -> Rule {
    Rule { anchor, units }
}

pub const fn rule(category: Category) -> Rule {
    use AnchorRule::*;
    match category {
        Category::EmptyDocument | Category::NoPrecedingContent | Category::TopLevel => {
            at(FileStart, 0)
        }
        Category::Directive => at(Margin, 0),
        Category::LiteralZone => at(Inherit, 0),
        Category::CommentContinuation
        | Category::PrecedingLine
        | Category::ClosingDelimiter
        | Category::ListElement
        | Category::ContinuationLine
        | Category::ExpressionBlockCloser => at(LineOf, 0),
        Category::ExpressionBlockBody | Category::HangingList => at(LineOf, 1),
        Category::BlockBody
        | Category::SwitchLabel
        | Category::SwitchSectionBody
        | Category::EmbeddedStatement
        | Category::DeclarationHeader
        | Category::LambdaBody
        | Category::StatementContinuation => at(EffectiveStart, 1),
        Category::BlockCloser
        | Category::BodyOpener
        | Category::ExpressionBraceOpener
        | Category::ClauseAlignment
        | Category::EmbeddedStatementEnd
        | Category::TryBlockEnd
        | Category::AttributeEnd => at(EffectiveStart, 0),
        Category::QueryClause => at(TokenColumn, 0),
        Category::QueryOperand | Category::HangingInitializerList => at(TokenColumn, 1),
        Category::HangingCallCloser | Category::Unattributed => at(NoOpinion, 0),
    }
}

/// What a category is measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Token(SyntaxToken),
    Line(u32),
    None,
}

/// Output of the locator and classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub anchor: Anchor,
}

impl Classification {
    pub fn new(category: Category, anchor: Anchor) -> Self {
        Self { category, anchor }
    }

    pub fn token(category: Category, token: SyntaxToken) -> Self {
        Self::new(category, Anchor::Token(token))
    }

    pub fn line(category: Category, line: u32) -> Self {
        Self::new(category, Anchor::Line(line))
    }

    pub fn bare(category: Category) -> Self {
        Self::new(category, Anchor::None)
    }
}
