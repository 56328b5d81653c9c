//
// parser/items.rs
//
// Compilation units, namespaces, type declarations and their members.
//

use super::Parser;
use crate::syntax::SyntaxKind;

/// What a member declaration turns out to be, decided by lookahead before any
/// tokens are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MemberShape {
    Type,
    Enum,
    Delegate,
    Event,
    Constructor,
    Destructor,
    Operator,
    Indexer,
    Method,
    Property,
    Field,
    Incomplete,
}

const CONTEXTUAL_MODIFIERS: &[&str] = &["partial", "async", "required", "file", "scoped"];

pub(super) fn is_reserved_keyword(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::AbstractKw && kind <= SyntaxKind::WhileKw
}

impl Parser<'_> {
    pub(super) fn compilation_unit(&mut self) {
        // Leading trivia belongs to the root, not to the first member.
        self.builder.start_node(SyntaxKind::CompilationUnit.into());
        self.namespace_members(false);
    }

    fn namespace_members(&mut self, in_body: bool) {
        loop {
            if self.at_eof() || (in_body && self.at(SyntaxKind::RBrace)) {
                break;
            }
            let before = self.cursor;
            match self.current() {
                SyntaxKind::ExternKw if self.nth_contextual(1, "alias") => self.extern_alias(),
                SyntaxKind::UsingKw if self.at_using_directive() => self.using_directive(),
                SyntaxKind::Ident
                    if self.at_contextual("global") && self.nth(1) == SyntaxKind::UsingKw =>
                {
                    self.using_directive()
                }
                SyntaxKind::NamespaceKw => self.namespace_decl(),
                _ => match self.member_shape(false) {
                    Some(
                        MemberShape::Type
                        | MemberShape::Enum
                        | MemberShape::Delegate
                        | MemberShape::Incomplete,
                    ) => self.member(false),
                    _ => self.statement(),
                },
            }
            if self.cursor == before {
                self.error_bump();
            }
        }
    }

    fn at_using_directive(&self) -> bool {
        match self.nth(1) {
            SyntaxKind::LParen => false,
            // `using var x = ...;`
            SyntaxKind::Ident => self.nth(2) != SyntaxKind::Ident,
            _ => true,
        }
    }

    fn extern_alias(&mut self) {
        self.start(SyntaxKind::ExternAlias);
        self.bump();
        self.bump();
        self.eat(SyntaxKind::Ident);
        self.eat(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn using_directive(&mut self) {
        self.start(SyntaxKind::UsingDirective);
        if self.at_contextual("global") {
            self.bump();
        }
        self.bump();
        self.eat(SyntaxKind::StaticKw);
        if self.at(SyntaxKind::Ident) && self.nth(1) == SyntaxKind::Eq {
            self.bump();
            self.bump();
        }
        self.qualified_name();
        self.eat(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// A namespace or type name, tolerating a trailing `.` still being typed.
    fn qualified_name(&mut self) {
        self.ty();
        if self.at(SyntaxKind::Dot) {
            self.bump();
        }
    }

    fn namespace_decl(&mut self) {
        if !self.enter() {
            self.error_bump();
            return;
        }
        self.start(SyntaxKind::NamespaceDecl);
        self.bump();
        self.qualified_name();
        if self.at(SyntaxKind::Semicolon) {
            // File-scoped: the members that follow stay in the compilation unit.
            self.bump();
        } else if self.at(SyntaxKind::LBrace) {
            self.start(SyntaxKind::NamespaceBody);
            self.bump();
            self.namespace_members(true);
            self.eat(SyntaxKind::RBrace);
            self.finish_node();
            self.eat(SyntaxKind::Semicolon);
        }
        self.finish_node();
        self.leave();
    }

    // ------------------------------------------------------------------
    // Member lookahead
    // ------------------------------------------------------------------

    fn nth_contextual_modifier(&self, i: usize) -> bool {
        if self.nth(i) != SyntaxKind::Ident || !CONTEXTUAL_MODIFIERS.contains(&self.nth_text(i)) {
            return false;
        }
        let next = self.nth(i + 1);
        next == SyntaxKind::Ident || next.is_modifier() || is_reserved_keyword(next)
    }

    fn nth_new_modifier(&self, i: usize) -> bool {
        let next = self.nth(i + 1);
        if next.is_modifier()
            || matches!(
                next,
                SyntaxKind::ClassKw
                    | SyntaxKind::StructKw
                    | SyntaxKind::InterfaceKw
                    | SyntaxKind::EnumKw
                    | SyntaxKind::DelegateKw
                    | SyntaxKind::EventKw
                    | SyntaxKind::VoidKw
            )
        {
            return true;
        }
        self.scan_type(i + 1).is_some_and(|j| {
            matches!(
                self.nth(j),
                SyntaxKind::Ident | SyntaxKind::ThisKw | SyntaxKind::OperatorKw
            )
        })
    }

    /// Skip attribute lists and modifiers; returns the lookahead index after
    /// them and whether any were present.
    fn scan_member_prefix(&self) -> (usize, bool) {
        let mut i = 0;
        let mut any = false;
        loop {
            let kind = self.nth(i);
            if kind == SyntaxKind::LBracket {
                match self.skip_balanced(i) {
                    Some(next) => i = next,
                    None => return (i, any),
                }
            } else if kind == SyntaxKind::NewKw {
                if !self.nth_new_modifier(i) {
                    return (i, any);
                }
                i += 1;
            } else if kind == SyntaxKind::UnsafeKw && self.nth(i + 1) == SyntaxKind::LBrace {
                return (i, any);
            } else if kind.is_modifier() || self.nth_contextual_modifier(i) {
                i += 1;
            } else {
                return (i, any);
            }
            any = true;
        }
    }

    pub(super) fn member_shape(&self, in_type: bool) -> Option<MemberShape> {
        let (i, any) = self.scan_member_prefix();
        let shape = match self.nth(i) {
            SyntaxKind::ClassKw | SyntaxKind::StructKw | SyntaxKind::InterfaceKw => {
                MemberShape::Type
            }
            SyntaxKind::Ident
                if self.nth_contextual(i, "record")
                    && matches!(
                        self.nth(i + 1),
                        SyntaxKind::Ident | SyntaxKind::ClassKw | SyntaxKind::StructKw
                    ) =>
            {
                MemberShape::Type
            }
            SyntaxKind::EnumKw => MemberShape::Enum,
            SyntaxKind::DelegateKw
                if !matches!(self.nth(i + 1), SyntaxKind::LParen | SyntaxKind::LBrace) =>
            {
                MemberShape::Delegate
            }
            SyntaxKind::EventKw => MemberShape::Event,
            SyntaxKind::Tilde if in_type => MemberShape::Destructor,
            SyntaxKind::Ident if in_type && self.nth(i + 1) == SyntaxKind::LParen => {
                MemberShape::Constructor
            }
            SyntaxKind::ImplicitKw | SyntaxKind::ExplicitKw => MemberShape::Operator,
            SyntaxKind::Ident if !in_type && !any && self.nth_contextual(i, "await") => {
                return None;
            }
            _ => match self.scan_type(i) {
                Some(j) => match self.nth(j) {
                    SyntaxKind::ThisKw => MemberShape::Indexer,
                    SyntaxKind::OperatorKw => MemberShape::Operator,
                    SyntaxKind::Ident => {
                        let after = self.scan_name(j, 0).unwrap_or(j + 1);
                        match self.nth(after) {
                            SyntaxKind::LParen => MemberShape::Method,
                            SyntaxKind::LBrace | SyntaxKind::FatArrow if in_type => {
                                MemberShape::Property
                            }
                            _ => MemberShape::Field,
                        }
                    }
                    _ if any => MemberShape::Incomplete,
                    _ => return None,
                },
                None if any => MemberShape::Incomplete,
                None => return None,
            },
        };
        Some(shape)
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    pub(super) fn member(&mut self, in_type: bool) {
        let Some(shape) = self.member_shape(in_type) else {
            return;
        };
        if !self.enter() {
            self.error_bump();
            return;
        }
        let kind = match shape {
            MemberShape::Type => SyntaxKind::TypeDecl,
            MemberShape::Enum => SyntaxKind::EnumDecl,
            MemberShape::Delegate => SyntaxKind::DelegateDecl,
            MemberShape::Event => SyntaxKind::EventDecl,
            MemberShape::Constructor
            | MemberShape::Destructor
            | MemberShape::Operator
            | MemberShape::Method => SyntaxKind::MethodDecl,
            MemberShape::Indexer => SyntaxKind::IndexerDecl,
            MemberShape::Property => SyntaxKind::PropertyDecl,
            MemberShape::Field => SyntaxKind::FieldDecl,
            MemberShape::Incomplete => SyntaxKind::IncompleteMember,
        };
        self.start(kind);
        self.attribute_lists();
        self.modifiers();
        match shape {
            MemberShape::Type => self.type_decl_rest(),
            MemberShape::Enum => self.enum_decl_rest(),
            MemberShape::Delegate => self.delegate_decl_rest(),
            MemberShape::Event => self.event_decl_rest(),
            MemberShape::Constructor => {
                self.bump();
                self.parameter_list();
                if self.at(SyntaxKind::Colon) {
                    self.constructor_initializer();
                }
                self.member_body();
            }
            MemberShape::Destructor => {
                self.bump();
                self.eat(SyntaxKind::Ident);
                self.parameter_list();
                self.member_body();
            }
            MemberShape::Operator => self.operator_rest(),
            MemberShape::Indexer => {
                self.ty();
                self.bump();
                self.bracketed_parameter_list();
                self.property_body();
            }
            MemberShape::Method => self.method_rest(),
            MemberShape::Property => {
                self.ty();
                self.member_name();
                self.property_body();
            }
            MemberShape::Field => {
                self.start(SyntaxKind::VariableDeclaration);
                self.ty();
                self.variable_declarators();
                self.finish_node();
                self.eat(SyntaxKind::Semicolon);
            }
            MemberShape::Incomplete => {}
        }
        self.finish_node();
        self.leave();
    }

    pub(super) fn attribute_lists(&mut self) {
        while self.at(SyntaxKind::LBracket) {
            self.start(SyntaxKind::AttributeList);
            self.bump();
            let target = self.current();
            if (target == SyntaxKind::Ident || is_reserved_keyword(target))
                && self.nth(1) == SyntaxKind::Colon
            {
                self.bump();
                self.bump();
            }
            loop {
                match self.current() {
                    SyntaxKind::Ident => {
                        self.start(SyntaxKind::Attribute);
                        self.ty();
                        if self.at(SyntaxKind::LParen) {
                            self.argument_list();
                        }
                        self.finish_node();
                    }
                    SyntaxKind::Comma => self.bump(),
                    _ => break,
                }
            }
            self.eat(SyntaxKind::RBracket);
            self.finish_node();
        }
    }

    pub(super) fn modifiers(&mut self) {
        loop {
            let kind = self.current();
            if kind == SyntaxKind::NewKw && !self.nth_new_modifier(0) {
                break;
            }
            if kind == SyntaxKind::UnsafeKw && self.nth(1) == SyntaxKind::LBrace {
                break;
            }
            if kind.is_modifier() || self.nth_contextual_modifier(0) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn type_decl_rest(&mut self) {
        if self.at_contextual("record") {
            self.bump_as(SyntaxKind::RecordKw);
            if !self.eat(SyntaxKind::ClassKw) {
                self.eat(SyntaxKind::StructKw);
            }
        } else {
            self.bump();
        }
        self.eat(SyntaxKind::Ident);
        self.type_parameter_list();
        if self.at(SyntaxKind::LParen) {
            self.parameter_list();
        }
        self.base_list();
        self.constraint_clauses();
        if self.at(SyntaxKind::LBrace) {
            self.type_body();
        }
        self.eat(SyntaxKind::Semicolon);
    }

    fn type_body(&mut self) {
        self.start(SyntaxKind::TypeBody);
        self.bump();
        loop {
            if self.at_eof() || self.at(SyntaxKind::RBrace) {
                break;
            }
            let before = self.cursor;
            if self.member_shape(true).is_some() {
                self.member(true);
            } else {
                self.statement();
            }
            if self.cursor == before {
                self.error_bump();
            }
        }
        self.eat(SyntaxKind::RBrace);
        self.finish_node();
    }

    fn enum_decl_rest(&mut self) {
        self.bump();
        self.eat(SyntaxKind::Ident);
        self.base_list();
        if self.at(SyntaxKind::LBrace) {
            self.start(SyntaxKind::EnumBody);
            self.bump();
            loop {
                if self.at_eof() || self.at(SyntaxKind::RBrace) {
                    break;
                }
                let before = self.cursor;
                if matches!(self.current(), SyntaxKind::Ident | SyntaxKind::LBracket) {
                    self.start(SyntaxKind::EnumMember);
                    self.attribute_lists();
                    self.eat(SyntaxKind::Ident);
                    if self.at(SyntaxKind::Eq) {
                        self.equals_value_clause();
                    }
                    self.finish_node();
                }
                self.eat(SyntaxKind::Comma);
                if self.cursor == before {
                    self.error_bump();
                }
            }
            self.eat(SyntaxKind::RBrace);
            self.finish_node();
        }
        self.eat(SyntaxKind::Semicolon);
    }

    fn delegate_decl_rest(&mut self) {
        self.bump();
        self.ty();
        self.eat(SyntaxKind::Ident);
        self.type_parameter_list();
        if self.at(SyntaxKind::LParen) {
            self.parameter_list();
        }
        self.constraint_clauses();
        self.eat(SyntaxKind::Semicolon);
    }

    fn event_decl_rest(&mut self) {
        self.bump();
        self.ty();
        let accessors = self.scan_name(0, 0).is_some_and(|after| self.nth(after) == SyntaxKind::LBrace);
        if accessors {
            self.member_name();
            self.accessor_list();
        } else {
            self.start(SyntaxKind::VariableDeclaration);
            self.variable_declarators();
            self.finish_node();
            self.eat(SyntaxKind::Semicolon);
        }
    }

    fn operator_rest(&mut self) {
        if matches!(self.current(), SyntaxKind::ImplicitKw | SyntaxKind::ExplicitKw) {
            self.bump();
            self.eat(SyntaxKind::OperatorKw);
            self.ty();
        } else {
            self.ty();
            self.eat(SyntaxKind::OperatorKw);
            if self.at(SyntaxKind::Gt) && self.nth(1) == SyntaxKind::Gt && self.nth_adjacent(1) {
                self.bump_joined(2, SyntaxKind::GtGt);
            } else if !self.at(SyntaxKind::LParen) && !self.at_eof() {
                self.bump();
            }
        }
        self.parameter_list();
        self.member_body();
    }

    /// Return type, name, type parameters, parameters, constraints and body.
    pub(super) fn method_rest(&mut self) {
        self.ty();
        self.member_name();
        self.type_parameter_list();
        self.parameter_list();
        self.constraint_clauses();
        self.member_body();
    }

    /// `Name` or an explicit interface name `IFoo.Name`.
    fn member_name(&mut self) {
        if !self.eat(SyntaxKind::Ident) {
            return;
        }
        while self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Ident {
            self.bump();
            self.bump();
        }
    }

    fn property_body(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => {
                self.accessor_list();
                if self.at(SyntaxKind::Eq) {
                    self.equals_value_clause();
                    self.eat(SyntaxKind::Semicolon);
                }
            }
            SyntaxKind::FatArrow => {
                self.arrow_clause();
                self.eat(SyntaxKind::Semicolon);
            }
            _ => {}
        }
    }

    fn accessor_list(&mut self) {
        self.start(SyntaxKind::AccessorList);
        self.bump();
        loop {
            if self.at_eof() || self.at(SyntaxKind::RBrace) {
                break;
            }
            let before = self.cursor;
            self.accessor();
            if self.cursor == before {
                self.error_bump();
            }
        }
        self.eat(SyntaxKind::RBrace);
        self.finish_node();
    }

    fn accessor(&mut self) {
        let keyword = match self.nth_text(self.accessor_keyword_offset()) {
            "get" => SyntaxKind::GetKw,
            "set" => SyntaxKind::SetKw,
            "init" => SyntaxKind::InitKw,
            "add" => SyntaxKind::AddKw,
            "remove" => SyntaxKind::RemoveKw,
            _ => return,
        };
        self.start(SyntaxKind::AccessorDecl);
        self.attribute_lists();
        self.modifiers();
        self.bump_as(keyword);
        self.member_body();
        self.finish_node();
    }

    fn accessor_keyword_offset(&self) -> usize {
        let mut i = 0;
        loop {
            match self.nth(i) {
                SyntaxKind::LBracket => match self.skip_balanced(i) {
                    Some(next) => i = next,
                    None => return i,
                },
                kind if kind.is_modifier() => i += 1,
                _ => return i,
            }
        }
    }

    /// Block, expression body or `;`.
    pub(super) fn member_body(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.block(),
            SyntaxKind::FatArrow => {
                self.arrow_clause();
                self.eat(SyntaxKind::Semicolon);
            }
            SyntaxKind::Semicolon => self.bump(),
            _ => {}
        }
    }

    fn arrow_clause(&mut self) {
        self.start(SyntaxKind::ArrowClause);
        self.bump();
        if self.at_expression_start() {
            self.expr();
        }
        self.finish_node();
    }

    fn constructor_initializer(&mut self) {
        self.start(SyntaxKind::ConstructorInitializer);
        self.bump();
        if matches!(self.current(), SyntaxKind::ThisKw | SyntaxKind::BaseKw) {
            self.bump();
        }
        if self.at(SyntaxKind::LParen) {
            self.argument_list();
        }
        self.finish_node();
    }

    fn base_list(&mut self) {
        if !self.at(SyntaxKind::Colon) {
            return;
        }
        self.start(SyntaxKind::BaseList);
        self.bump();
        loop {
            if !self.ty() {
                break;
            }
            if self.at(SyntaxKind::LParen) {
                self.argument_list();
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    pub(super) fn type_parameter_list(&mut self) {
        if !self.at(SyntaxKind::Lt) {
            return;
        }
        self.start(SyntaxKind::TypeParameterList);
        self.bump();
        loop {
            if !matches!(
                self.current(),
                SyntaxKind::Ident | SyntaxKind::LBracket | SyntaxKind::InKw | SyntaxKind::OutKw
            ) {
                break;
            }
            self.start(SyntaxKind::TypeParameter);
            self.attribute_lists();
            if matches!(self.current(), SyntaxKind::InKw | SyntaxKind::OutKw) {
                self.bump();
            }
            self.eat(SyntaxKind::Ident);
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(SyntaxKind::Gt);
        self.finish_node();
    }

    pub(super) fn constraint_clauses(&mut self) {
        while self.at_contextual("where")
            && self.nth(1) == SyntaxKind::Ident
            && self.nth(2) == SyntaxKind::Colon
        {
            self.start(SyntaxKind::ConstraintClause);
            self.bump_as(SyntaxKind::WhereKw);
            self.bump();
            self.bump();
            loop {
                match self.current() {
                    SyntaxKind::NewKw => {
                        self.bump();
                        self.eat(SyntaxKind::LParen);
                        self.eat(SyntaxKind::RParen);
                    }
                    SyntaxKind::ClassKw | SyntaxKind::StructKw | SyntaxKind::DefaultKw => {
                        self.bump();
                        self.eat(SyntaxKind::Question);
                    }
                    _ => {
                        if !self.ty() {
                            break;
                        }
                    }
                }
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.finish_node();
        }
    }

    pub(super) fn parameter_list(&mut self) {
        if self.at(SyntaxKind::LParen) {
            self.parameters(SyntaxKind::RParen);
        }
    }

    fn bracketed_parameter_list(&mut self) {
        if self.at(SyntaxKind::LBracket) {
            self.parameters(SyntaxKind::RBracket);
        }
    }

    fn parameters(&mut self, close: SyntaxKind) {
        self.start(SyntaxKind::ParameterList);
        self.bump();
        loop {
            if self.at(close) || !self.at_parameter_start() {
                break;
            }
            self.start(SyntaxKind::Parameter);
            self.attribute_lists();
            while matches!(
                self.current(),
                SyntaxKind::RefKw
                    | SyntaxKind::OutKw
                    | SyntaxKind::InKw
                    | SyntaxKind::ParamsKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::ReadonlyKw
            ) || self.nth_contextual_modifier(0)
            {
                self.bump();
            }
            self.ty();
            self.eat(SyntaxKind::Ident);
            if self.at(SyntaxKind::Eq) {
                self.equals_value_clause();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.eat(close);
        self.finish_node();
    }

    fn at_parameter_start(&self) -> bool {
        let kind = self.current();
        kind.is_predefined_type()
            || matches!(
                kind,
                SyntaxKind::Ident
                    | SyntaxKind::LBracket
                    | SyntaxKind::LParen
                    | SyntaxKind::RefKw
                    | SyntaxKind::OutKw
                    | SyntaxKind::InKw
                    | SyntaxKind::ParamsKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::ReadonlyKw
            )
    }

    pub(super) fn equals_value_clause(&mut self) {
        self.start(SyntaxKind::EqualsValueClause);
        self.bump();
        if self.at(SyntaxKind::LBrace) {
            self.initializer();
        } else if self.at_expression_start() {
            self.expr();
        }
        self.finish_node();
    }

    /// `a = 1, b, c = 2`
    pub(super) fn variable_declarators(&mut self) {
        loop {
            self.start(SyntaxKind::VariableDeclarator);
            self.eat(SyntaxKind::Ident);
            if self.at(SyntaxKind::LBracket) {
                self.bracketed_argument_list();
            }
            if self.at(SyntaxKind::Eq) {
                self.equals_value_clause();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    /// A type at the cursor, emitted as one flat `Type` node.
    pub(super) fn ty(&mut self) -> bool {
        let Some(end) = self.scan_type(0) else {
            return false;
        };
        self.start(SyntaxKind::Type);
        let target = self.cursor + end;
        while self.cursor < target {
            self.bump();
        }
        self.finish_node();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{count, has, tree};
    use crate::syntax::SyntaxKind;

    #[test]
    fn test_using_directives() {
        let root = tree("using System;\nusing static System.Math;\nglobal using IO = System.IO;\nusing System.\n");
        assert_eq!(count(&root, SyntaxKind::UsingDirective), 4);
    }

    #[test]
    fn test_using_statement_at_top_level() {
        let root = tree("using (var f = Open()) { }\nusing var g = Open();\n");
        assert_eq!(count(&root, SyntaxKind::UsingStmt), 2);
        assert!(!has(&root, SyntaxKind::UsingDirective));
    }

    #[test]
    fn test_block_and_file_scoped_namespaces() {
        let root = tree("namespace A.B\n{\n    class C { }\n}\n");
        assert!(has(&root, SyntaxKind::NamespaceBody));
        assert!(has(&root, SyntaxKind::TypeDecl));

        let root = tree("namespace A;\nclass C { }\n");
        let ns = root
            .children()
            .find(|n| n.kind() == SyntaxKind::NamespaceDecl)
            .unwrap();
        assert!(!has(&ns, SyntaxKind::TypeDecl));
    }

    #[test]
    fn test_members() {
        let root = tree(
            "class C<T> : Base, IFoo where T : class, new()\n{\n    [Obsolete]\n    public C(int x) : base(x) { }\n    ~C() { }\n    int field = 1, other;\n    public string Name { get; private set; } = \"\";\n    public int this[int i] => i;\n    public event EventHandler Changed;\n    public static C operator +(C a, C b) => a;\n    public static implicit operator int(C c) => 0;\n    void M<U>(ref U u, params int[] rest) where U : struct { }\n    enum E { A, B = 2, }\n    delegate void D(int x);\n}\n",
        );
        assert_eq!(count(&root, SyntaxKind::MethodDecl), 5);
        assert_eq!(count(&root, SyntaxKind::FieldDecl), 1);
        assert_eq!(count(&root, SyntaxKind::PropertyDecl), 1);
        assert_eq!(count(&root, SyntaxKind::IndexerDecl), 1);
        assert_eq!(count(&root, SyntaxKind::EventDecl), 1);
        assert_eq!(count(&root, SyntaxKind::EnumMember), 2);
        assert_eq!(count(&root, SyntaxKind::DelegateDecl), 1);
        assert_eq!(count(&root, SyntaxKind::ConstraintClause), 2);
        assert_eq!(count(&root, SyntaxKind::ConstructorInitializer), 1);
        assert_eq!(count(&root, SyntaxKind::AccessorDecl), 2);
    }

    #[test]
    fn test_partial_member_headers() {
        let root = tree("class C\n{\n    public static string Name\n");
        assert!(has(&root, SyntaxKind::FieldDecl));

        let root = tree("class C\n{\n    public string Names\n    {\n        get\n");
        let accessor = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::AccessorDecl)
            .unwrap();
        assert_eq!(accessor.first_token().unwrap().kind(), SyntaxKind::GetKw);
    }

    #[test]
    fn test_attribute_without_member() {
        let root = tree("class Program\n{\n    [Attr]\n\n}\n");
        let incomplete = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::IncompleteMember)
            .unwrap();
        assert!(has(&incomplete, SyntaxKind::AttributeList));
    }

    #[test]
    fn test_top_level_method_is_local_function() {
        let root = tree("int fact(int x)\n{\n    return x;\n}\n");
        assert!(has(&root, SyntaxKind::LocalFunctionStmt));
        assert!(!has(&root, SyntaxKind::MethodDecl));
    }

    #[test]
    fn test_records() {
        let root = tree("public record Point(int X, int Y);\nrecord struct P { }\n");
        assert_eq!(count(&root, SyntaxKind::TypeDecl), 2);
        assert!(root
            .descendants_with_tokens()
            .any(|e| e.kind() == SyntaxKind::RecordKw));
    }
}
