//
// parser/statements.rs
//
// Statements, blocks and switch sections.
//

use super::items::MemberShape;
use super::Parser;
use crate::syntax::SyntaxKind;

impl Parser<'_> {
    /// Parse one statement. Produces nothing when the current token cannot
    /// start a statement; callers decide how to recover.
    pub(super) fn statement(&mut self) {
        if !self.enter() {
            self.error_bump();
            return;
        }
        self.statement_inner();
        self.leave();
    }

    fn statement_inner(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.block(),
            SyntaxKind::Semicolon => {
                self.start(SyntaxKind::EmptyStmt);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::IfKw => self.if_stmt(),
            SyntaxKind::WhileKw => self.header_stmt(SyntaxKind::WhileStmt),
            SyntaxKind::LockKw => self.header_stmt(SyntaxKind::LockStmt),
            SyntaxKind::DoKw => self.do_stmt(),
            SyntaxKind::ForKw => self.for_stmt(),
            SyntaxKind::ForeachKw => self.foreach_stmt(),
            SyntaxKind::UsingKw => self.using_stmt(),
            SyntaxKind::FixedKw => self.fixed_stmt(),
            SyntaxKind::SwitchKw => self.switch_stmt(),
            SyntaxKind::TryKw => self.try_stmt(),
            SyntaxKind::ReturnKw => self.keyword_stmt(SyntaxKind::ReturnStmt),
            SyntaxKind::ThrowKw => self.keyword_stmt(SyntaxKind::ThrowStmt),
            SyntaxKind::BreakKw => self.keyword_stmt(SyntaxKind::BreakStmt),
            SyntaxKind::ContinueKw => self.keyword_stmt(SyntaxKind::ContinueStmt),
            SyntaxKind::GotoKw => {
                self.start(SyntaxKind::GotoStmt);
                self.bump();
                if matches!(self.current(), SyntaxKind::CaseKw | SyntaxKind::DefaultKw) {
                    self.bump();
                }
                if self.at_expression_start() {
                    self.expr();
                }
                self.eat(SyntaxKind::Semicolon);
                self.finish_node();
            }
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw if self.nth(1) == SyntaxKind::LBrace => {
                self.start(SyntaxKind::CheckedStmt);
                self.bump();
                self.block();
                self.finish_node();
            }
            SyntaxKind::UnsafeKw if self.nth(1) == SyntaxKind::LBrace => {
                self.start(SyntaxKind::UnsafeStmt);
                self.bump();
                self.block();
                self.finish_node();
            }
            SyntaxKind::Ident
                if self.at_contextual("yield")
                    && matches!(self.nth(1), SyntaxKind::ReturnKw | SyntaxKind::BreakKw) =>
            {
                self.start(SyntaxKind::YieldStmt);
                self.bump_as(SyntaxKind::YieldKw);
                self.bump();
                if self.at_expression_start() {
                    self.expr();
                }
                self.eat(SyntaxKind::Semicolon);
                self.finish_node();
            }
            SyntaxKind::Ident if self.at_contextual("await") && self.nth(1) == SyntaxKind::ForeachKw => {
                self.foreach_stmt()
            }
            SyntaxKind::Ident if self.at_contextual("await") && self.nth(1) == SyntaxKind::UsingKw => {
                self.using_stmt()
            }
            SyntaxKind::Ident if self.nth(1) == SyntaxKind::Colon => self.labeled_stmt(),
            _ => self.declaration_or_expression_stmt(),
        }
    }

    pub(super) fn block(&mut self) {
        self.start(SyntaxKind::Block);
        self.bump();
        self.statements_until_close();
        self.eat(SyntaxKind::RBrace);
        self.finish_node();
    }

    fn statements_until_close(&mut self) {
        loop {
            if self.at_eof() || self.at(SyntaxKind::RBrace) {
                break;
            }
            let before = self.cursor;
            self.statement();
            if self.cursor == before {
                self.error_bump();
            }
        }
    }

    /// The statement governed by `if`, `while`, `else`, ... which may be absent
    /// while the user is still typing.
    fn embedded(&mut self) {
        if self.at_eof() || self.at(SyntaxKind::RBrace) {
            return;
        }
        self.statement();
    }

    fn paren_condition(&mut self) {
        if self.eat(SyntaxKind::LParen) {
            if self.at_expression_start() {
                self.expr();
            }
            self.eat(SyntaxKind::RParen);
        }
    }

    fn if_stmt(&mut self) {
        self.start(SyntaxKind::IfStmt);
        self.bump();
        self.paren_condition();
        self.embedded();
        if self.at(SyntaxKind::ElseKw) {
            self.start(SyntaxKind::ElseClause);
            self.bump();
            self.embedded();
            self.finish_node();
        }
        self.finish_node();
    }

    /// `while (...) stmt` and `lock (...) stmt`.
    fn header_stmt(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        self.paren_condition();
        self.embedded();
        self.finish_node();
    }

    fn do_stmt(&mut self) {
        self.start(SyntaxKind::DoStmt);
        self.bump();
        if !self.at(SyntaxKind::WhileKw) {
            self.embedded();
        }
        if self.eat(SyntaxKind::WhileKw) {
            self.paren_condition();
        }
        self.eat(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn for_stmt(&mut self) {
        self.start(SyntaxKind::ForStmt);
        self.bump();
        if self.eat(SyntaxKind::LParen) {
            if self.at_local_declaration() {
                self.local_variable_declaration();
            } else {
                self.expression_list();
            }
            self.eat(SyntaxKind::Semicolon);
            if self.at_expression_start() {
                self.expr();
            }
            self.eat(SyntaxKind::Semicolon);
            self.expression_list();
            self.eat(SyntaxKind::RParen);
        }
        self.embedded();
        self.finish_node();
    }

    fn expression_list(&mut self) {
        while self.at_expression_start() {
            self.expr();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    fn foreach_stmt(&mut self) {
        self.start(SyntaxKind::ForeachStmt);
        if self.at_contextual("await") {
            self.bump();
        }
        self.bump();
        if self.eat(SyntaxKind::LParen) {
            if self.ty() {
                if self.at(SyntaxKind::LParen) {
                    // var (a, b)
                    self.expr();
                } else {
                    self.eat(SyntaxKind::Ident);
                }
            }
            self.eat(SyntaxKind::InKw);
            if self.at_expression_start() {
                self.expr();
            }
            self.eat(SyntaxKind::RParen);
        }
        self.embedded();
        self.finish_node();
    }

    fn using_stmt(&mut self) {
        self.start(SyntaxKind::UsingStmt);
        if self.at_contextual("await") {
            self.bump();
        }
        self.bump();
        if self.eat(SyntaxKind::LParen) {
            if self.at_local_declaration() {
                self.local_variable_declaration();
            } else if self.at_expression_start() {
                self.expr();
            }
            self.eat(SyntaxKind::RParen);
            self.embedded();
        } else {
            // using var x = ...;
            self.local_variable_declaration();
            self.eat(SyntaxKind::Semicolon);
        }
        self.finish_node();
    }

    fn fixed_stmt(&mut self) {
        self.start(SyntaxKind::FixedStmt);
        self.bump();
        if self.eat(SyntaxKind::LParen) {
            self.local_variable_declaration();
            self.eat(SyntaxKind::RParen);
        }
        self.embedded();
        self.finish_node();
    }

    fn keyword_stmt(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        if self.at_expression_start() {
            self.expr();
        }
        self.eat(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn labeled_stmt(&mut self) {
        self.start(SyntaxKind::LabeledStmt);
        self.bump();
        self.bump();
        if !self.at_eof() && !self.at(SyntaxKind::RBrace) && !self.at_switch_label() {
            self.statement();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // switch
    // ------------------------------------------------------------------

    fn switch_stmt(&mut self) {
        self.start(SyntaxKind::SwitchStmt);
        self.bump();
        self.paren_condition();
        if self.at(SyntaxKind::LBrace) {
            self.switch_block();
        }
        self.finish_node();
    }

    fn at_switch_label(&self) -> bool {
        self.at(SyntaxKind::CaseKw)
            || (self.at(SyntaxKind::DefaultKw) && self.nth(1) == SyntaxKind::Colon)
    }

    fn switch_block(&mut self) {
        self.start(SyntaxKind::SwitchBlock);
        self.bump();
        loop {
            if self.at_eof() || self.at(SyntaxKind::RBrace) {
                break;
            }
            let before = self.cursor;
            if self.at_switch_label() {
                self.switch_section();
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

    fn switch_section(&mut self) {
        self.start(SyntaxKind::SwitchSection);
        while self.at_switch_label() {
            self.switch_label();
        }
        loop {
            if self.at_eof() || self.at(SyntaxKind::RBrace) || self.at_switch_label() {
                break;
            }
            let before = self.cursor;
            self.statement();
            if self.cursor == before {
                self.error_bump();
            }
        }
        self.finish_node();
    }

    fn switch_label(&mut self) {
        self.start(SyntaxKind::SwitchLabel);
        if self.at(SyntaxKind::DefaultKw) {
            self.bump();
        } else {
            self.bump();
            if !self.at(SyntaxKind::Colon) {
                self.pattern();
            }
            if self.at_contextual("when") {
                self.bump_as(SyntaxKind::WhenKw);
                if self.at_expression_start() {
                    self.expr();
                }
            }
        }
        self.eat(SyntaxKind::Colon);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // try
    // ------------------------------------------------------------------

    fn try_stmt(&mut self) {
        self.start(SyntaxKind::TryStmt);
        self.bump();
        if self.at(SyntaxKind::LBrace) {
            self.block();
        }
        while self.at(SyntaxKind::CatchKw) {
            self.start(SyntaxKind::CatchClause);
            self.bump();
            if self.at(SyntaxKind::LParen) {
                self.start(SyntaxKind::CatchDecl);
                self.bump();
                self.ty();
                self.eat(SyntaxKind::Ident);
                self.eat(SyntaxKind::RParen);
                self.finish_node();
            }
            if self.at_contextual("when") {
                self.bump_as(SyntaxKind::WhenKw);
                self.paren_condition();
            }
            if self.at(SyntaxKind::LBrace) {
                self.block();
            }
            self.finish_node();
        }
        if self.at(SyntaxKind::FinallyKw) {
            self.start(SyntaxKind::FinallyClause);
            self.bump();
            if self.at(SyntaxKind::LBrace) {
                self.block();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Declarations and expression statements
    // ------------------------------------------------------------------

    /// `Type name` followed by something that only a declaration allows.
    fn at_local_declaration(&self) -> bool {
        let Some(j) = self.scan_type(0) else {
            return false;
        };
        if self.nth(j) != SyntaxKind::Ident {
            return false;
        }
        if self.at_contextual("await") && j == 1 {
            return false;
        }
        matches!(
            self.nth(j + 1),
            SyntaxKind::Eq
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::RParen
                | SyntaxKind::RBrace
                | SyntaxKind::InKw
                | SyntaxKind::LBracket
                | SyntaxKind::Eof
        ) || self.nth_line_break_before(j + 1)
    }

    fn local_variable_declaration(&mut self) {
        self.start(SyntaxKind::VariableDeclaration);
        self.ty();
        self.variable_declarators();
        self.finish_node();
    }

    fn declaration_or_expression_stmt(&mut self) {
        let shape = if self.at(SyntaxKind::LBracket) {
            None
        } else {
            self.member_shape(false)
        };
        match shape {
            Some(MemberShape::Method) => return self.local_function(),
            Some(MemberShape::Field)
                if self.current().is_modifier() || self.at_local_declaration() =>
            {
                return self.local_declaration_stmt()
            }
            Some(
                MemberShape::Type
                | MemberShape::Enum
                | MemberShape::Delegate
                | MemberShape::Incomplete,
            ) => return self.member(false),
            _ => {}
        }
        if self.at_expression_start() {
            self.start(SyntaxKind::ExprStmt);
            self.expr();
            self.eat(SyntaxKind::Semicolon);
            self.finish_node();
        }
    }

    fn local_function(&mut self) {
        self.start(SyntaxKind::LocalFunctionStmt);
        self.attribute_lists();
        self.modifiers();
        self.method_rest();
        self.finish_node();
    }

    fn local_declaration_stmt(&mut self) {
        self.start(SyntaxKind::LocalDeclStmt);
        self.modifiers();
        self.local_variable_declaration();
        self.eat(SyntaxKind::Semicolon);
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{count, has, tree};
    use crate::syntax::SyntaxKind;

    fn body(statements: &str) -> String {
        format!("class C\n{{\n    void M()\n    {{\n{statements}\n    }}\n}}\n")
    }

    #[test]
    fn test_statement_kinds() {
        let root = tree(&body(
            "int a = 1, b;\nif (a > 0) a++; else { b = 2; }\nwhile (true) break;\ndo a--; while (a > 0);\nfor (int i = 0; i < 10; i++) continue;\nforeach (var x in xs) { }\nusing (var f = Open()) { }\nlock (o) { }\nreturn a;\nthrow new E();\ngoto done;\ndone: ;\nyield return 1;\nchecked { }\nunsafe { }\n;",
        ));
        for kind in [
            SyntaxKind::LocalDeclStmt,
            SyntaxKind::IfStmt,
            SyntaxKind::ElseClause,
            SyntaxKind::WhileStmt,
            SyntaxKind::DoStmt,
            SyntaxKind::ForStmt,
            SyntaxKind::ForeachStmt,
            SyntaxKind::UsingStmt,
            SyntaxKind::LockStmt,
            SyntaxKind::ReturnStmt,
            SyntaxKind::ThrowStmt,
            SyntaxKind::GotoStmt,
            SyntaxKind::LabeledStmt,
            SyntaxKind::YieldStmt,
            SyntaxKind::CheckedStmt,
            SyntaxKind::UnsafeStmt,
            SyntaxKind::EmptyStmt,
        ] {
            assert!(has(&root, kind), "missing {kind:?}");
        }
        assert!(!has(&root, SyntaxKind::Error));
    }

    #[test]
    fn test_nested_embedded_statements() {
        let root = tree(&body("if (true)\n    if (true)\n        if (true)\n            args = null;"));
        assert_eq!(count(&root, SyntaxKind::IfStmt), 3);
        let inner = root
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::IfStmt)
            .last()
            .unwrap();
        assert!(has(&inner, SyntaxKind::ExprStmt));
    }

    #[test]
    fn test_missing_embedded_statement() {
        let root = tree("class C\n{\n    void M()\n    {\n        if (true) // Test\n\n    }\n}\n");
        let if_stmt = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::IfStmt)
            .unwrap();
        assert!(!has(&if_stmt, SyntaxKind::ExprStmt));
        assert!(!has(&root, SyntaxKind::Error));
    }

    #[test]
    fn test_switch_sections_group_labels() {
        let root = tree(&body(
            "switch (i)\n{\n    case 1:\n    case 2:\n        int i2 = 10;\n        break;\n    case int n when n > 4:\n    default:\n        break;\n}",
        ));
        assert_eq!(count(&root, SyntaxKind::SwitchSection), 2);
        assert_eq!(count(&root, SyntaxKind::SwitchLabel), 4);
        assert!(root
            .descendants_with_tokens()
            .any(|e| e.kind() == SyntaxKind::WhenKw));
    }

    #[test]
    fn test_labels() {
        let root = tree(&body("Label:\n    Console.WriteLine(1);\nEmpty:\n"));
        assert_eq!(count(&root, SyntaxKind::LabeledStmt), 2);
        let first = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::LabeledStmt)
            .unwrap();
        assert!(has(&first, SyntaxKind::ExprStmt));
    }

    #[test]
    fn test_try_catch_finally() {
        let root = tree(&body(
            "try { } catch (IOException e) when (e != null) { } catch { } finally { }",
        ));
        assert_eq!(count(&root, SyntaxKind::CatchClause), 2);
        assert_eq!(count(&root, SyntaxKind::CatchDecl), 1);
        assert!(has(&root, SyntaxKind::FinallyClause));
    }

    #[test]
    fn test_local_function_and_await() {
        let root = tree(&body("async Task Run() { await Task.Delay(1); }\nawait x;\nawait foreach (var i in xs) { }"));
        assert!(has(&root, SyntaxKind::LocalFunctionStmt));
        assert!(!has(&root, SyntaxKind::LocalDeclStmt));
        assert!(has(&root, SyntaxKind::ForeachStmt));
    }

    #[test]
    fn test_declaration_versus_expression() {
        let root = tree(&body("a.b = c;\nFoo<int, int>(4, 2);\nList<int> xs = new();\nx ? y : z;"));
        assert_eq!(count(&root, SyntaxKind::LocalDeclStmt), 1);
        assert_eq!(count(&root, SyntaxKind::ExprStmt), 3);
    }
}
