//! Grammar productions.
//!
//! One `parse_*` method per non-terminal, implemented as an extension of
//! `Parser`. Each method pushes a branch named after its non-terminal and
//! appends matched tokens as leaves, so the CST mirrors the grammar
//! derivation exactly (including nested right-recursive `StatementList` and
//! `CharList` chains with empty nodes for the ε productions).

use super::core::Parser;
use super::cst::SyntaxKind;
use super::cst::token_sets::{BOOL_OPS, STMT_FIRST, TYPE_KEYWORDS};

impl Parser<'_> {
    /// `Program → Block $`
    ///
    /// A missing `$` at end of input is tolerated here; the lexer has
    /// already warned about it.
    pub(super) fn parse_program(&mut self) {
        self.start_node(SyntaxKind::Program);
        self.parse_block();

        match self.peek() {
            SyntaxKind::Eop => {
                self.bump();
            }
            SyntaxKind::Error => {} // end of input, warned by the lexer
            _ => self.error_expected(SyntaxKind::Eop.label()),
        }

        self.eat_trivia();
        self.finish_node();
    }

    /// `Block → { StatementList }`
    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::Block);
        self.expect(SyntaxKind::BraceOpen);
        self.parse_statement_list();
        self.expect(SyntaxKind::BraceClose);
        self.finish_node();
    }

    /// `StatementList → Statement StatementList | ε`
    fn parse_statement_list(&mut self) {
        self.start_node(SyntaxKind::StatementList);

        let kind = self.peek();
        if STMT_FIRST.contains(kind) {
            self.parse_statement();
            self.parse_statement_list();
        } else if !matches!(
            kind,
            SyntaxKind::BraceClose | SyntaxKind::Eop | SyntaxKind::Error
        ) {
            // A token that cannot start a statement: report it, consume it,
            // and keep scanning the list.
            self.error_expected("statement");
            self.bump_error();
            self.parse_statement_list();
        }

        self.finish_node();
    }

    /// `Statement → PrintStmt | AssignStmt | VarDecl | WhileStmt | IfStmt | Block`
    ///
    /// Callers guarantee the current token is in the statement FIRST set.
    fn parse_statement(&mut self) {
        self.start_node(SyntaxKind::Statement);
        match self.peek() {
            SyntaxKind::KwPrint => self.parse_print_statement(),
            SyntaxKind::Ident => self.parse_assignment_statement(),
            k if TYPE_KEYWORDS.contains(k) => self.parse_var_decl(),
            SyntaxKind::KwWhile => self.parse_while_statement(),
            SyntaxKind::KwIf => self.parse_if_statement(),
            _ => self.parse_block(),
        }
        self.finish_node();
    }

    /// `PrintStmt → print ( Expr )`
    fn parse_print_statement(&mut self) {
        self.start_node(SyntaxKind::PrintStatement);
        self.expect(SyntaxKind::KwPrint);
        self.expect(SyntaxKind::ParenOpen);
        self.parse_expr();
        self.expect(SyntaxKind::ParenClose);
        self.finish_node();
    }

    /// `AssignStmt → Id = Expr`
    fn parse_assignment_statement(&mut self) {
        self.start_node(SyntaxKind::AssignmentStatement);
        self.parse_id();
        self.expect(SyntaxKind::Assign);
        self.parse_expr();
        self.finish_node();
    }

    /// `VarDecl → Type Id`
    fn parse_var_decl(&mut self) {
        self.start_node(SyntaxKind::VarDecl);
        if self.at_set(TYPE_KEYWORDS) {
            self.bump();
        } else {
            self.error_expected("type");
        }
        self.parse_id();
        self.finish_node();
    }

    /// `WhileStmt → while BooleanExpr Block`
    fn parse_while_statement(&mut self) {
        self.start_node(SyntaxKind::WhileStatement);
        self.expect(SyntaxKind::KwWhile);
        self.parse_boolean_expr();
        self.parse_block();
        self.finish_node();
    }

    /// `IfStmt → if BooleanExpr Block`
    fn parse_if_statement(&mut self) {
        self.start_node(SyntaxKind::IfStatement);
        self.expect(SyntaxKind::KwIf);
        self.parse_boolean_expr();
        self.parse_block();
        self.finish_node();
    }

    /// `Expr → IntExpr | StringExpr | BooleanExpr | Id`
    fn parse_expr(&mut self) {
        self.start_node(SyntaxKind::Expr);
        match self.peek() {
            SyntaxKind::Digit => self.parse_int_expr(),
            SyntaxKind::Quote => self.parse_string_expr(),
            SyntaxKind::ParenOpen | SyntaxKind::KwTrue | SyntaxKind::KwFalse => {
                self.parse_boolean_expr()
            }
            SyntaxKind::Ident => self.parse_id(),
            _ => self.error_expected("expression"),
        }
        self.finish_node();
    }

    /// `IntExpr → digit + Expr | digit`
    fn parse_int_expr(&mut self) {
        self.start_node(SyntaxKind::IntExpr);
        self.expect(SyntaxKind::Digit);
        if self.peek() == SyntaxKind::Plus {
            self.bump();
            self.parse_expr();
        }
        self.finish_node();
    }

    /// `StringExpr → " CharList "`
    ///
    /// Spaces inside the quotes arrive as `Char` tokens, not trivia, so the
    /// chain consumes them like any other character.
    fn parse_string_expr(&mut self) {
        self.start_node(SyntaxKind::StringExpr);
        self.expect(SyntaxKind::Quote);
        self.parse_char_list();
        self.expect(SyntaxKind::Quote);
        self.finish_node();
    }

    /// `CharList → char CharList | ε`
    fn parse_char_list(&mut self) {
        self.start_node(SyntaxKind::CharList);
        if self.at(SyntaxKind::Char) {
            self.bump();
            self.parse_char_list();
        }
        self.finish_node();
    }

    /// `BooleanExpr → ( Expr boolop Expr ) | boolval`
    fn parse_boolean_expr(&mut self) {
        self.start_node(SyntaxKind::BooleanExpr);
        match self.peek() {
            SyntaxKind::ParenOpen => {
                self.bump();
                self.parse_expr();
                if self.at_set(BOOL_OPS) {
                    self.bump();
                } else {
                    self.error_expected("boolean operator");
                }
                self.parse_expr();
                self.expect(SyntaxKind::ParenClose);
            }
            SyntaxKind::KwTrue | SyntaxKind::KwFalse => {
                self.bump();
            }
            _ => self.error_expected("boolean value"),
        }
        self.finish_node();
    }

    /// `Id → char`
    fn parse_id(&mut self) {
        self.start_node(SyntaxKind::Id);
        self.expect(SyntaxKind::Ident);
        self.finish_node();
    }
}
