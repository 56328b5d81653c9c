//! Construct Classifier.
//!
//! Given the anchor token `T` (last significant token before the target line)
//! and the line's own first token `F`, decide which [`Category`] applies. The
//! first token wins when it is a closer, an opener or a clause keyword; the
//! anchor decides everything else. Walks up the tree are plain loops that
//! check the cancellation token on every step.

use tokio_util::sync::CancellationToken;

use super::decision::IndentError;
use super::locator::{
    check, first_significant, is_first_on_line, line_of, next_significant, prev_significant,
    start_token, token_start,
};
use super::rules::{Category, Classification};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree};

/// Where the line being classified starts.
#[derive(Debug, Clone, Copy)]
pub(super) struct Site {
    /// Offset of the line's first non-blank character (or the line start).
    pub offset: usize,
    /// Nearest content line above, when classifying a real target line.
    pub prev_line: Option<u32>,
}

pub(super) struct Classifier<'a> {
    tree: &'a SyntaxTree,
    cancel: &'a CancellationToken,
}

impl<'a> Classifier<'a> {
    pub fn new(tree: &'a SyntaxTree, cancel: &'a CancellationToken) -> Self {
        Self { tree, cancel }
    }

    pub fn classify(
        &self,
        anchor: &SyntaxToken,
        first: Option<&SyntaxToken>,
        site: Site,
    ) -> Result<Classification, IndentError> {
        if let Some(first) = first {
            if let Some(classification) = self.classify_first(first, site)? {
                return Ok(classification);
            }
        }
        self.classify_anchor(anchor, site)
    }

    // ------------------------------------------------------------------
    // Rules keyed on the line's first token
    // ------------------------------------------------------------------

    fn classify_first(
        &self,
        first: &SyntaxToken,
        site: Site,
    ) -> Result<Option<Classification>, IndentError> {
        let Some(parent) = first.parent() else {
            return Ok(None);
        };
        let classification = match first.kind() {
            SyntaxKind::RBrace => {
                if let Some(line) = site.prev_line {
                    if self.line_inside_call(line)? {
                        return Ok(Some(Classification::bare(Category::HangingCallCloser)));
                    }
                }
                let Some(open) = opener(&parent, SyntaxKind::LBrace) else {
                    return Ok(None);
                };
                if is_expression_brace(&parent) && !is_first_on_line(self.tree, &open) {
                    Classification::token(Category::ExpressionBlockCloser, open)
                } else {
                    Classification::token(Category::BlockCloser, self.block_base(&open))
                }
            }
            SyntaxKind::RParen | SyntaxKind::RBracket if has_content_after(self.tree, first) => {
                let open_kind = if first.kind() == SyntaxKind::RParen {
                    SyntaxKind::LParen
                } else {
                    SyntaxKind::LBracket
                };
                let Some(open) = opener(&parent, open_kind) else {
                    return Ok(None);
                };
                Classification::line(Category::ClosingDelimiter, line_of(self.tree, &open))
            }
            SyntaxKind::LBrace => {
                if is_expression_brace(&parent) {
                    match self.host_start(&parent)? {
                        Some(start) => Classification::token(Category::ExpressionBraceOpener, start),
                        None => return Ok(None),
                    }
                } else {
                    match brace_owner(&parent).and_then(|owner| start_token(&owner)) {
                        Some(start) => Classification::token(Category::BodyOpener, start),
                        None => return Ok(None),
                    }
                }
            }
            SyntaxKind::CaseKw | SyntaxKind::DefaultKw if parent.kind() == SyntaxKind::SwitchLabel => {
                let open = parent
                    .ancestors()
                    .find(|n| n.kind() == SyntaxKind::SwitchBlock)
                    .and_then(|block| opener(&block, SyntaxKind::LBrace));
                match open {
                    Some(open) => Classification::token(Category::SwitchLabel, self.block_base(&open)),
                    None => return Ok(None),
                }
            }
            SyntaxKind::ElseKw if parent.kind() == SyntaxKind::ElseClause => {
                match parent.parent().and_then(|if_stmt| start_token(&if_stmt)) {
                    Some(start) => Classification::token(Category::ClauseAlignment, start),
                    None => return Ok(None),
                }
            }
            SyntaxKind::CatchKw | SyntaxKind::FinallyKw
                if matches!(
                    parent.kind(),
                    SyntaxKind::CatchClause | SyntaxKind::FinallyClause
                ) =>
            {
                match parent.parent().and_then(|try_stmt| start_token(&try_stmt)) {
                    Some(start) => Classification::token(Category::ClauseAlignment, start),
                    None => return Ok(None),
                }
            }
            SyntaxKind::IfKw
                if parent.kind() == SyntaxKind::IfStmt
                    && parent.parent().map(|p| p.kind()) == Some(SyntaxKind::ElseClause) =>
            {
                match prev_significant(first).filter(|t| t.kind() == SyntaxKind::ElseKw) {
                    Some(else_kw) => Classification::token(Category::ClauseAlignment, else_kw),
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(classification))
    }

    /// The first token of `line` sits in an argument list that is not itself
    /// inside a block, statement or declaration nested in that list.
    fn line_inside_call(&self, line: u32) -> Result<bool, IndentError> {
        let Some(offset) = self.tree.first_non_whitespace(line) else {
            return Ok(false);
        };
        let Some(token) = self.tree.token_at(offset) else {
            return Ok(false);
        };
        let mut node = token.parent();
        while let Some(current) = node {
            check(self.cancel)?;
            let kind = current.kind();
            if kind == SyntaxKind::ArgumentList {
                return Ok(true);
            }
            if kind == SyntaxKind::Block || kind.is_statement() || kind.is_declaration() {
                return Ok(false);
            }
            node = current.parent();
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Rules keyed on the anchor token
    // ------------------------------------------------------------------

    fn classify_anchor(&self, t: &SyntaxToken, site: Site) -> Result<Classification, IndentError> {
        let Some(parent) = t.parent() else {
            return Ok(Classification::line(
                Category::ContinuationLine,
                line_of(self.tree, t),
            ));
        };
        let kind = parent.kind();
        let classification = match t.kind() {
            SyntaxKind::LBrace => {
                if is_expression_brace(&parent) {
                    Classification::token(Category::ExpressionBlockBody, t.clone())
                } else {
                    Classification::token(Category::BlockBody, self.block_base(t))
                }
            }
            SyntaxKind::RBrace => self.after_close_brace(&parent, t, site)?,
            SyntaxKind::Semicolon if kind == SyntaxKind::ForStmt => self.continuation(t, site)?,
            SyntaxKind::Semicolon => self.after_statement(&parent, t)?,
            SyntaxKind::Comma if is_list_node(kind) => match self.list_element(&parent, t) {
                Some(classification) => classification,
                None => self.continuation(t, site)?,
            },
            SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::Lt
                if (is_list_node(kind) || kind == SyntaxKind::Paren)
                    && list_opener(&parent).as_ref() == Some(t) =>
            {
                self.hanging_list(t.clone())
            }
            SyntaxKind::Colon if kind == SyntaxKind::SwitchLabel => {
                match first_significant(&parent) {
                    Some(label) => Classification::token(Category::SwitchSectionBody, label),
                    None => self.continuation(t, site)?,
                }
            }
            SyntaxKind::Colon if kind == SyntaxKind::LabeledStmt => {
                self.container_content(parent.parent(), t)?
            }
            SyntaxKind::RParen => self.after_close_paren(&parent, t, site)?,
            SyntaxKind::ElseKw
            | SyntaxKind::DoKw
            | SyntaxKind::TryKw
            | SyntaxKind::FinallyKw
            | SyntaxKind::CatchKw => Classification::token(Category::EmbeddedStatement, t.clone()),
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw | SyntaxKind::UnsafeKw
                if matches!(kind, SyntaxKind::CheckedStmt | SyntaxKind::UnsafeStmt) =>
            {
                Classification::token(Category::EmbeddedStatement, t.clone())
            }
            SyntaxKind::RBracket if kind == SyntaxKind::AttributeList => {
                match first_significant(&parent) {
                    Some(open) => Classification::token(Category::AttributeEnd, open),
                    None => self.continuation(t, site)?,
                }
            }
            SyntaxKind::FatArrow if kind == SyntaxKind::Lambda => match start_token(&parent) {
                Some(start) => Classification::token(Category::LambdaBody, start),
                None => self.continuation(t, site)?,
            },
            SyntaxKind::FatArrow if kind == SyntaxKind::ArrowClause => {
                match parent.parent().and_then(|member| start_token(&member)) {
                    Some(start) => Classification::token(Category::DeclarationHeader, start),
                    None => self.continuation(t, site)?,
                }
            }
            _ => self.continuation(t, site)?,
        };
        log::trace!(
            "anchor {:?}@{} -> {:?}",
            t.kind(),
            token_start(t),
            classification.category
        );
        Ok(classification)
    }

    fn after_close_brace(
        &self,
        container: &SyntaxNode,
        t: &SyntaxToken,
        site: Site,
    ) -> Result<Classification, IndentError> {
        match container.kind() {
            SyntaxKind::Block => {
                let Some(parent) = container.parent() else {
                    return self.after_statement(container, t);
                };
                match parent.kind() {
                    SyntaxKind::TryStmt => Ok(self.try_block_end(&parent, t)),
                    SyntaxKind::CatchClause => match parent.parent() {
                        Some(try_stmt) => Ok(self.try_block_end(&try_stmt, t)),
                        None => self.continuation(t, site),
                    },
                    SyntaxKind::FinallyClause => match parent.parent() {
                        Some(try_stmt) => self.after_statement(&try_stmt, t),
                        None => self.continuation(t, site),
                    },
                    SyntaxKind::Lambda | SyntaxKind::AnonymousMethod => self.continuation(t, site),
                    SyntaxKind::CheckedStmt | SyntaxKind::UnsafeStmt => {
                        self.after_statement(&parent, t)
                    }
                    kind if kind.is_declaration() || kind == SyntaxKind::LocalFunctionStmt => {
                        self.after_statement(&parent, t)
                    }
                    kind if kind.is_statement()
                        || matches!(
                            kind,
                            SyntaxKind::ElseClause
                                | SyntaxKind::Block
                                | SyntaxKind::SwitchSection
                                | SyntaxKind::CompilationUnit
                                | SyntaxKind::LabeledStmt
                        ) =>
                    {
                        self.after_statement(container, t)
                    }
                    _ => self.continuation(t, site),
                }
            }
            SyntaxKind::TypeBody
            | SyntaxKind::NamespaceBody
            | SyntaxKind::EnumBody
            | SyntaxKind::AccessorList
            | SyntaxKind::SwitchBlock => match container.parent() {
                Some(owner) => self.after_statement(&owner, t),
                None => self.continuation(t, site),
            },
            _ => self.continuation(t, site),
        }
    }

    fn try_block_end(&self, try_stmt: &SyntaxNode, t: &SyntaxToken) -> Classification {
        match start_token(try_stmt) {
            Some(start) => Classification::token(Category::TryBlockEnd, start),
            None => Classification::line(Category::ContinuationLine, line_of(self.tree, t)),
        }
    }

    fn after_close_paren(
        &self,
        parent: &SyntaxNode,
        t: &SyntaxToken,
        site: Site,
    ) -> Result<Classification, IndentError> {
        let header = match parent.kind() {
            SyntaxKind::IfStmt
            | SyntaxKind::WhileStmt
            | SyntaxKind::ForStmt
            | SyntaxKind::ForeachStmt
            | SyntaxKind::UsingStmt
            | SyntaxKind::LockStmt
            | SyntaxKind::FixedStmt
            | SyntaxKind::SwitchStmt => {
                start_token(parent).map(|s| Classification::token(Category::EmbeddedStatement, s))
            }
            SyntaxKind::CatchDecl => parent
                .parent()
                .and_then(|clause| start_token(&clause))
                .map(|s| Classification::token(Category::EmbeddedStatement, s)),
            SyntaxKind::ParameterList => parent
                .parent()
                .filter(|decl| {
                    matches!(
                        decl.kind(),
                        SyntaxKind::MethodDecl | SyntaxKind::LocalFunctionStmt | SyntaxKind::TypeDecl
                    )
                })
                .and_then(|decl| start_token(&decl))
                .map(|s| Classification::token(Category::DeclarationHeader, s)),
            _ => None,
        };
        match header {
            Some(classification) => Ok(classification),
            None => self.continuation(t, site),
        }
    }

    /// A completed statement or member: its owning embedded-statement chain
    /// collapses to the outermost owner, otherwise the enclosing container's
    /// content rule applies.
    fn after_statement(&self, node: &SyntaxNode, t: &SyntaxToken) -> Result<Classification, IndentError> {
        let mut current = node.clone();
        let mut owner = None;
        while let Some(parent) = current.parent() {
            check(self.cancel)?;
            match parent.kind() {
                SyntaxKind::IfStmt
                | SyntaxKind::WhileStmt
                | SyntaxKind::ForStmt
                | SyntaxKind::ForeachStmt
                | SyntaxKind::UsingStmt
                | SyntaxKind::LockStmt
                | SyntaxKind::FixedStmt
                | SyntaxKind::DoStmt => {
                    owner = Some(parent.clone());
                    current = parent;
                }
                SyntaxKind::ElseClause => match parent.parent() {
                    Some(if_stmt) => {
                        owner = Some(if_stmt.clone());
                        current = if_stmt;
                    }
                    None => break,
                },
                SyntaxKind::LabeledStmt | SyntaxKind::Error => current = parent,
                _ => break,
            }
        }
        if let Some(start) = owner.as_ref().and_then(start_token) {
            return Ok(Classification::token(Category::EmbeddedStatementEnd, start));
        }
        self.container_content(current.parent(), t)
    }

    /// Placement of a new member or statement directly inside `container`.
    fn container_content(
        &self,
        container: Option<SyntaxNode>,
        t: &SyntaxToken,
    ) -> Result<Classification, IndentError> {
        let mut node = container;
        while let Some(current) = node.clone() {
            check(self.cancel)?;
            if current.kind() != SyntaxKind::Error {
                break;
            }
            node = current.parent();
        }
        let fallback = Classification::line(Category::ContinuationLine, line_of(self.tree, t));
        let Some(container) = node else {
            return Ok(Classification::bare(Category::TopLevel));
        };
        let classification = match container.kind() {
            SyntaxKind::CompilationUnit => Classification::bare(Category::TopLevel),
            SyntaxKind::Block
                if matches!(
                    container.parent().map(|p| p.kind()),
                    Some(SyntaxKind::Lambda | SyntaxKind::AnonymousMethod)
                ) =>
            {
                match opener(&container, SyntaxKind::LBrace) {
                    Some(open) => Classification::token(Category::ExpressionBlockBody, open),
                    None => fallback,
                }
            }
            SyntaxKind::Block
            | SyntaxKind::TypeBody
            | SyntaxKind::NamespaceBody
            | SyntaxKind::EnumBody
            | SyntaxKind::AccessorList
            | SyntaxKind::SwitchBlock => match opener(&container, SyntaxKind::LBrace) {
                Some(open) => Classification::token(Category::BlockBody, self.block_base(&open)),
                None => fallback,
            },
            SyntaxKind::SwitchSection => match first_significant(&container) {
                Some(label) => Classification::token(Category::SwitchSectionBody, label),
                None => fallback,
            },
            _ => fallback,
        };
        Ok(classification)
    }

    /// After a comma inside a list: align with the last element that began
    /// its own line, otherwise hang off the opener.
    fn list_element(&self, list: &SyntaxNode, comma: &SyntaxToken) -> Option<Classification> {
        let open = list_opener(list);
        let comma_start = token_start(comma);
        let open_end = open.as_ref().map_or(0, |o| usize::from(o.text_range().end()));
        let elements: Vec<SyntaxNode> = list
            .children()
            .filter(|child| {
                let start = usize::from(child.text_range().start());
                start >= open_end && start < comma_start
            })
            .collect();
        for element in elements.iter().rev() {
            if let Some(token) = first_significant(element) {
                if is_first_on_line(self.tree, &token) {
                    return Some(Classification::line(
                        Category::ListElement,
                        line_of(self.tree, &token),
                    ));
                }
            }
        }
        open.map(|open| self.hanging_list(open))
    }

    /// Elements hang one unit past the opener's line. A constructor
    /// initializer whose colon starts the line hangs them off `this`/`base`.
    fn hanging_list(&self, open: SyntaxToken) -> Classification {
        let keyword = open
            .parent()
            .and_then(|list| list.parent())
            .filter(|owner| owner.kind() == SyntaxKind::ConstructorInitializer)
            .and_then(|owner| first_significant(&owner))
            .filter(|colon| colon.kind() == SyntaxKind::Colon && is_first_on_line(self.tree, colon))
            .and_then(|colon| next_significant(&colon))
            .filter(|keyword| matches!(keyword.kind(), SyntaxKind::ThisKw | SyntaxKind::BaseKw));
        match keyword {
            Some(keyword) => Classification::token(Category::HangingInitializerList, keyword),
            None => Classification::token(Category::HangingList, open),
        }
    }

    /// Fallback for tokens in the middle of a construct.
    fn continuation(&self, t: &SyntaxToken, site: Site) -> Result<Classification, IndentError> {
        let t_line = line_of(self.tree, t);
        let mut saw_error = false;
        let mut node = t.parent();
        while let Some(current) = node {
            check(self.cancel)?;
            let kind = current.kind();
            match kind {
                SyntaxKind::Error => saw_error = true,
                SyntaxKind::QueryExpr => return Ok(self.query_position(&current, t, t_line)),
                SyntaxKind::CompilationUnit
                | SyntaxKind::Block
                | SyntaxKind::TypeBody
                | SyntaxKind::NamespaceBody
                | SyntaxKind::EnumBody
                | SyntaxKind::AccessorList
                | SyntaxKind::SwitchBlock
                | SyntaxKind::SwitchSection => break,
                _ => {}
            }
            if is_list_node(kind) || kind == SyntaxKind::Paren {
                if let Some(open) = list_opener(&current) {
                    if line_of(self.tree, &open) == t_line && is_open(&current, &open, site.offset) {
                        return Ok(self.hanging_list(open));
                    }
                }
            }
            if is_host(kind) {
                return Ok(match start_token(&current) {
                    Some(start) if line_of(self.tree, &start) == t_line => {
                        Classification::token(Category::StatementContinuation, start)
                    }
                    _ => Classification::line(Category::ContinuationLine, t_line),
                });
            }
            node = current.parent();
        }
        if saw_error {
            log::debug!("anchor {:?} inside unparsed code, no opinion", t.kind());
            Ok(Classification::bare(Category::Unattributed))
        } else {
            Ok(Classification::line(Category::ContinuationLine, t_line))
        }
    }

    fn query_position(&self, query: &SyntaxNode, t: &SyntaxToken, t_line: u32) -> Classification {
        let Some(from) = first_significant(query) else {
            return Classification::line(Category::ContinuationLine, t_line);
        };
        if line_of(self.tree, &from) != t_line {
            return Classification::line(Category::ContinuationLine, t_line);
        }
        let wants_operand = is_query_keyword(t.kind())
            || (t.kind() == SyntaxKind::Eq
                && t.parent().map(|p| p.kind()) == Some(SyntaxKind::LetClause));
        if wants_operand {
            Classification::token(Category::QueryOperand, from)
        } else {
            Classification::token(Category::QueryClause, from)
        }
    }

    /// Start of the statement or declaration hosting an expression brace.
    fn host_start(&self, node: &SyntaxNode) -> Result<Option<SyntaxToken>, IndentError> {
        let mut current = node.parent();
        while let Some(candidate) = current {
            check(self.cancel)?;
            if is_host(candidate.kind()) {
                return Ok(start_token(&candidate));
            }
            current = candidate.parent();
        }
        Ok(None)
    }

    /// The token a block's contents are measured from: the `{` when it starts
    /// a line, otherwise the construct owning the block.
    fn block_base(&self, open: &SyntaxToken) -> SyntaxToken {
        if is_first_on_line(self.tree, open) {
            return open.clone();
        }
        open.parent()
            .and_then(|container| brace_owner(&container))
            .and_then(|owner| start_token(&owner))
            .unwrap_or_else(|| open.clone())
    }
}

fn is_host(kind: SyntaxKind) -> bool {
    kind.is_statement()
        || kind.is_declaration()
        || matches!(
            kind,
            SyntaxKind::SwitchLabel
                | SyntaxKind::CatchClause
                | SyntaxKind::ElseClause
                | SyntaxKind::FinallyClause
        )
}

fn is_list_node(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ArgumentList
            | SyntaxKind::BracketedArgumentList
            | SyntaxKind::ParameterList
            | SyntaxKind::TypeArgumentList
            | SyntaxKind::TypeParameterList
            | SyntaxKind::EnumBody
            | SyntaxKind::Initializer
            | SyntaxKind::AnonymousObject
            | SyntaxKind::CollectionExpr
            | SyntaxKind::Tuple
            | SyntaxKind::SwitchExpr
            | SyntaxKind::AttributeList
    )
}

fn is_query_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::FromKw
            | SyntaxKind::WhereKw
            | SyntaxKind::SelectKw
            | SyntaxKind::GroupKw
            | SyntaxKind::ByKw
            | SyntaxKind::OrderbyKw
            | SyntaxKind::JoinKw
            | SyntaxKind::LetKw
            | SyntaxKind::OnKw
            | SyntaxKind::EqualsKw
            | SyntaxKind::IntoKw
            | SyntaxKind::InKw
    )
}

/// Braces that belong to an expression rather than a statement body.
fn is_expression_brace(container: &SyntaxNode) -> bool {
    match container.kind() {
        SyntaxKind::Initializer
        | SyntaxKind::AnonymousObject
        | SyntaxKind::SwitchExpr
        | SyntaxKind::Pattern
        | SyntaxKind::CollectionExpr => true,
        SyntaxKind::Block => matches!(
            container.parent().map(|p| p.kind()),
            Some(SyntaxKind::Lambda | SyntaxKind::AnonymousMethod)
        ),
        _ => false,
    }
}

/// The construct whose header a brace-delimited body belongs to.
fn brace_owner(container: &SyntaxNode) -> Option<SyntaxNode> {
    let parent = container.parent()?;
    match container.kind() {
        SyntaxKind::Block => match parent.kind() {
            SyntaxKind::Block
            | SyntaxKind::SwitchSection
            | SyntaxKind::CompilationUnit
            | SyntaxKind::LabeledStmt
            | SyntaxKind::Error
            | SyntaxKind::Lambda
            | SyntaxKind::AnonymousMethod => None,
            _ => Some(parent),
        },
        SyntaxKind::TypeBody
        | SyntaxKind::NamespaceBody
        | SyntaxKind::EnumBody
        | SyntaxKind::AccessorList
        | SyntaxKind::SwitchBlock => Some(parent),
        _ => None,
    }
}

/// First direct child token of `kind`.
fn opener(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|child| child.into_token())
        .find(|token| token.kind() == kind)
}

fn list_opener(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|child| child.into_token())
        .find(|token| {
            matches!(
                token.kind(),
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace | SyntaxKind::Lt
            )
        })
}

fn closer_kind(open: SyntaxKind) -> SyntaxKind {
    match open {
        SyntaxKind::LParen => SyntaxKind::RParen,
        SyntaxKind::LBracket => SyntaxKind::RBracket,
        SyntaxKind::LBrace => SyntaxKind::RBrace,
        _ => SyntaxKind::Gt,
    }
}

/// The list is still open at `offset`: its closer is missing or comes later.
fn is_open(list: &SyntaxNode, open: &SyntaxToken, offset: usize) -> bool {
    let close = closer_kind(open.kind());
    list.children_with_tokens()
        .filter_map(|child| child.into_token())
        .filter(|token| token.kind() == close)
        .last()
        .map_or(true, |token| token_start(&token) >= offset)
}

/// Another significant token follows on the same line.
fn has_content_after(tree: &SyntaxTree, token: &SyntaxToken) -> bool {
    next_significant(token).is_some_and(|next| line_of(tree, &next) == line_of(tree, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indentation::locator::{locate, Located};
    use crate::indentation::rules::Anchor;

    fn classify_line(text: &str, line: u32) -> Classification {
        let tree = SyntaxTree::parse(text);
        let cancel = CancellationToken::new();
        let target = tree.line(line).unwrap();
        let (located, context) = locate(&tree, target, &cancel).unwrap();
        match located {
            Located::Decided(classification) => classification,
            Located::Anchored { anchor, first } => {
                let site = Site {
                    offset: tree.first_non_whitespace(line).unwrap_or(target.start),
                    prev_line: context.prev_content_line,
                };
                Classifier::new(&tree, &cancel)
                    .classify(&anchor, first.as_ref(), site)
                    .unwrap()
            }
        }
    }

    fn anchor_text(classification: &Classification) -> Option<String> {
        match &classification.anchor {
            Anchor::Token(token) => Some(token.text().to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_block_body_after_open_brace() {
        let c = classify_line("class C\n{\n\n}", 2);
        assert_eq!(c.category, Category::BlockBody);
        assert_eq!(anchor_text(&c).as_deref(), Some("{"));
    }

    #[test]
    fn test_close_brace_measures_from_owner() {
        let c = classify_line("class C {\n    int x;\n}", 2);
        assert_eq!(c.category, Category::BlockCloser);
        assert_eq!(anchor_text(&c).as_deref(), Some("class"));
    }

    #[test]
    fn test_embedded_statement_after_if_header() {
        let c = classify_line("class C { void M() {\n    if (x)\n\n} }", 2);
        assert_eq!(c.category, Category::EmbeddedStatement);
        assert_eq!(anchor_text(&c).as_deref(), Some("if"));
    }

    #[test]
    fn test_statement_after_embedded_chain() {
        let c = classify_line("class C { void M() {\n    if (a)\n        if (b)\n            x();\n\n} }", 4);
        assert_eq!(c.category, Category::EmbeddedStatementEnd);
        assert_eq!(anchor_text(&c).as_deref(), Some("if"));
    }

    #[test]
    fn test_else_aligns_with_if() {
        let c = classify_line("class C { void M() {\n    if (a)\n        x();\n    else\n} }", 3);
        assert_eq!(c.category, Category::ClauseAlignment);
    }

    #[test]
    fn test_comma_follows_previous_element() {
        let c = classify_line("class C { void M() {\n    M(\n        a: 1,\n\n} }", 3);
        assert_eq!(c.category, Category::ListElement);
        assert_eq!(c.anchor, Anchor::Line(2));
    }

    #[test]
    fn test_leading_colon_initializer_hangs_off_keyword() {
        let c = classify_line("class C\n{\n    C()\n        : base(\n\n}", 4);
        assert_eq!(c.category, Category::HangingInitializerList);
        assert_eq!(anchor_text(&c).as_deref(), Some("base"));

        let c = classify_line("class C\n{\n    C() : base(\n\n}", 3);
        assert_eq!(c.category, Category::HangingList);
    }

    #[test]
    fn test_open_paren_hangs_list() {
        let c = classify_line("class C { void M() {\n    M(\n\n} }", 2);
        assert_eq!(c.category, Category::HangingList);
        assert_eq!(anchor_text(&c).as_deref(), Some("("));
    }

    #[test]
    fn test_closing_brace_after_hanging_call() {
        let c = classify_line("class c\n{\n    void M()\n    {\n        M(\n            a: 1,\n            b: 1);\n    }\n}", 7);
        assert_eq!(c.category, Category::HangingCallCloser);
    }

    #[test]
    fn test_switch_label_and_section_body() {
        let text = "class C { void M() {\n    switch (x)\n    {\n        case 1:\n\n    }\n} }";
        let c = classify_line(text, 4);
        assert_eq!(c.category, Category::SwitchSectionBody);
        assert_eq!(anchor_text(&c).as_deref(), Some("case"));
    }

    #[test]
    fn test_query_clause_alignment() {
        let text = "class C { void M() {\n    var q = from a in b\n\n} }";
        let c = classify_line(text, 2);
        assert_eq!(c.category, Category::QueryClause);
        assert_eq!(anchor_text(&c).as_deref(), Some("from"));
    }

    #[test]
    fn test_statement_continuation() {
        let c = classify_line("class C { void M() {\n    var x = a +\n\n} }", 2);
        assert_eq!(c.category, Category::StatementContinuation);
        assert_eq!(anchor_text(&c).as_deref(), Some("var"));
    }

    #[test]
    fn test_top_level_after_using() {
        let c = classify_line("using System;\n\n", 1);
        assert_eq!(c.category, Category::TopLevel);
    }

    #[test]
    fn test_attribute_end() {
        let c = classify_line("class Program\n{\n    [Attr]\n\n}\n", 3);
        assert_eq!(c.category, Category::AttributeEnd);
    }

    #[test]
    fn test_cancelled_walk() {
        let tree = SyntaxTree::parse("class C { void M() {\n    var x = a +\n\n} }");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let token = tree.token_at(tree.line(1).unwrap().end - 1).unwrap();
        let site = Site {
            offset: tree.line(2).unwrap().start,
            prev_line: Some(1),
        };
        let result = Classifier::new(&tree, &cancel).classify(&token, None, site);
        assert_eq!(result, Err(IndentError::Cancelled));
    }
}
