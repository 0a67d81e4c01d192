//! CST-to-AST rewriting with scope, type, and use/init checking.
//!
//! A single recursive descent over the CST builds the AST and the scope
//! tree at the same time. The grammar wrappers (`Statement`, `Expr`, `Id`,
//! `StatementList`) produce no AST nodes; `CharList` chains collapse into
//! one string-literal leaf. Checks run as each construct's node is built,
//! and a post-pass over the finished scope tree adds the never-initialized
//! and never-used warnings.

use crate::diagnostics::{Diagnostics, Stage};
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken, Token};

use super::ast::{Ast, AstId, AstKind};
use super::symbol_table::{ScopeId, SymbolTable, VarType};

/// Output of semantic analysis for one program.
#[derive(Debug)]
pub struct Analysis {
    pub ast: Ast,
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

/// Analyzes one parsed program. `tokens` is the lexer's output for the same
/// source; AST leaves link back to it for diagnostic positions.
pub fn analyze(root: &SyntaxNode, tokens: &[Token]) -> Analysis {
    let mut analyzer = Analyzer {
        tokens,
        ast: Ast::new(),
        symbols: SymbolTable::new(),
        scope: None,
        diag: Diagnostics::new(),
    };

    if let Some(block) = child_node(root, SyntaxKind::Block) {
        analyzer.build_block(&block, None);
        analyzer.post_pass();
    }

    Analysis {
        ast: analyzer.ast,
        symbols: analyzer.symbols,
        diagnostics: analyzer.diag,
    }
}

struct Analyzer<'s> {
    tokens: &'s [Token],
    ast: Ast,
    symbols: SymbolTable,
    scope: Option<ScopeId>,
    diag: Diagnostics,
}

impl Analyzer<'_> {
    fn current_scope(&self) -> ScopeId {
        self.scope.expect("statement outside any block")
    }

    /// Maps a CST token back to the lexer token carrying line/column.
    fn source_token(&self, token: &SyntaxToken) -> Token {
        let start = token.text_range().start();
        let index = self
            .tokens
            .binary_search_by_key(&start, |t| t.span.start())
            .expect("CST token originates from the lexed stream");
        self.tokens[index]
    }

    fn build_block(&mut self, block: &SyntaxNode, parent: Option<AstId>) -> AstId {
        let enclosing = self.scope;
        let scope = self.symbols.open_scope(enclosing);
        self.scope = Some(scope);
        self.diag.debug(
            Stage::Analyzer,
            format!("Entering scope {}", self.symbols.label(scope)),
        );

        let block_id = self.ast.push_branch(AstKind::Block, parent);
        if let Some(list) = child_node(block, SyntaxKind::StatementList) {
            self.build_statement_list(&list, block_id);
        }

        self.scope = enclosing;
        block_id
    }

    fn build_statement_list(&mut self, list: &SyntaxNode, block: AstId) {
        for child in list.children() {
            match child.kind() {
                SyntaxKind::Statement => self.build_statement(&child, block),
                SyntaxKind::StatementList => self.build_statement_list(&child, block),
                _ => {}
            }
        }
    }

    fn build_statement(&mut self, statement: &SyntaxNode, block: AstId) {
        let Some(inner) = statement.children().next() else {
            return;
        };
        match inner.kind() {
            SyntaxKind::PrintStatement => self.build_print(&inner, block),
            SyntaxKind::AssignmentStatement => self.build_assignment(&inner, block),
            SyntaxKind::VarDecl => self.build_declaration(&inner, block),
            SyntaxKind::WhileStatement => self.build_loop(&inner, block, AstKind::While),
            SyntaxKind::IfStatement => self.build_loop(&inner, block, AstKind::If),
            SyntaxKind::Block => {
                self.build_block(&inner, Some(block));
            }
            _ => {}
        }
    }

    /// `PrintStatement` → `Print(expr)`. An identifier operand is resolved
    /// and marked used.
    fn build_print(&mut self, print: &SyntaxNode, block: AstId) {
        let print_id = self.ast.push_branch(AstKind::Print, Some(block));
        let Some(expr) = child_node(print, SyntaxKind::Expr) else {
            return;
        };
        let Some(value) = self.build_expr(&expr, print_id) else {
            return;
        };

        if self.ast.kind(value) == AstKind::Ident
            && let Some(scope) = self.resolve_ident(value)
        {
            self.mark_used(value, scope);
        }
    }

    /// `AssignmentStatement` → `Assign(id, expr)`. The target must resolve
    /// and the right-hand side's type must match its declared type; on
    /// success the target is marked initialized.
    fn build_assignment(&mut self, assignment: &SyntaxNode, block: AstId) {
        let assign_id = self.ast.push_branch(AstKind::Assign, Some(block));
        let Some(target) = child_node(assignment, SyntaxKind::Id)
            .and_then(|id| self.build_ident(&id, assign_id))
        else {
            return;
        };
        let value = child_node(assignment, SyntaxKind::Expr)
            .and_then(|expr| self.build_expr(&expr, assign_id));

        let target_scope = self.resolve_ident(target);

        // A bare identifier on the right-hand side still has to resolve.
        if let Some(value) = value
            && self.ast.kind(value) == AstKind::Ident
        {
            self.resolve_ident(value);
        }

        let Some(target_scope) = target_scope else {
            return;
        };

        let target_name = self.ast.text(target).to_string();
        let target_type = self
            .symbols
            .symbol(target_scope, &target_name)
            .expect("resolved symbol exists")
            .ty;

        if let Some(value) = value
            && let Some(value_type) = self.type_of(value)
            && value_type != target_type
        {
            let token = self.ast.token(target).expect("identifier leaf has a token");
            let message = match self.ast.kind(value) {
                AstKind::Ident => format!(
                    "Type mismatch: Assigning {} value [{}] to {} variable [{}]",
                    value_type,
                    self.ast.text(value),
                    target_type,
                    target_name
                ),
                kind if kind.is_leaf() => format!(
                    "Type mismatch: Assigning {} literal [{}] to {} variable [{}]",
                    value_type,
                    self.ast.text(value),
                    target_type,
                    target_name
                ),
                _ => format!(
                    "Type mismatch: Assigning {} value to {} variable [{}]",
                    value_type, target_type, target_name
                ),
            };
            self.diag
                .error(Stage::Analyzer, message)
                .at(token.pos())
                .span(token.span)
                .emit();
        }

        self.symbols
            .symbol_mut(target_scope, &target_name)
            .expect("resolved symbol exists")
            .initialized = true;
    }

    /// `VarDecl` → `Declare(type, id)`. A collision in the current scope is
    /// a redeclaration error.
    fn build_declaration(&mut self, decl: &SyntaxNode, block: AstId) {
        let declare_id = self.ast.push_branch(AstKind::Declare, Some(block));

        let Some(type_token) = find_token(decl, |k| {
            matches!(
                k,
                SyntaxKind::KwInt | SyntaxKind::KwString | SyntaxKind::KwBoolean
            )
        }) else {
            return;
        };
        let type_source = self.source_token(&type_token);
        self.ast.push_leaf(
            AstKind::TypeName,
            declare_id,
            type_source,
            type_token.text(),
        );

        let Some(ident) = child_node(decl, SyntaxKind::Id)
            .and_then(|id| self.build_ident(&id, declare_id))
        else {
            return;
        };

        let name = self.ast.text(ident).to_string();
        let token = self.ast.token(ident).expect("identifier leaf has a token");
        let ty = VarType::from_keyword(type_source.kind);
        let scope = self.current_scope();

        match self.symbols.declare(scope, &name, ty, token.pos(), token.span) {
            Ok(()) => {
                self.diag.debug(
                    Stage::Analyzer,
                    format!(
                        "Declared variable {} of type {} in scope {}",
                        name,
                        ty,
                        self.symbols.label(scope)
                    ),
                );
            }
            Err((_, first_span)) => {
                self.diag
                    .error(
                        Stage::Analyzer,
                        format!("Redeclared variable [{}]", name),
                    )
                    .at(token.pos())
                    .span(token.span)
                    .related_to("first declared here", first_span)
                    .emit();
            }
        }
    }

    /// `If`/`While` → branch with the condition and the nested block.
    fn build_loop(&mut self, statement: &SyntaxNode, block: AstId, kind: AstKind) {
        let branch = self.ast.push_branch(kind, Some(block));
        if let Some(cond) = child_node(statement, SyntaxKind::BooleanExpr) {
            self.build_boolean_expr(&cond, branch);
        }
        if let Some(body) = child_node(statement, SyntaxKind::Block) {
            self.build_block(&body, Some(branch));
        }
    }

    /// Unwraps an `Expr` node into the AST node of its single alternative.
    fn build_expr(&mut self, expr: &SyntaxNode, parent: AstId) -> Option<AstId> {
        let inner = expr.children().next()?;
        match inner.kind() {
            SyntaxKind::IntExpr => self.build_int_expr(&inner, parent),
            SyntaxKind::StringExpr => Some(self.build_string_expr(&inner, parent)),
            SyntaxKind::BooleanExpr => self.build_boolean_expr(&inner, parent),
            SyntaxKind::Id => self.build_ident(&inner, parent),
            _ => None,
        }
    }

    /// `digit + Expr` → `Add(digit, expr)`; a bare digit is a leaf.
    fn build_int_expr(&mut self, int_expr: &SyntaxNode, parent: AstId) -> Option<AstId> {
        let digit_token = find_token(int_expr, |k| k == SyntaxKind::Digit)?;
        let digit_source = self.source_token(&digit_token);

        let Some(rest) = child_node(int_expr, SyntaxKind::Expr) else {
            return Some(self.ast.push_leaf(
                AstKind::IntLiteral,
                parent,
                digit_source,
                digit_token.text(),
            ));
        };

        let add_id = self.ast.push_branch(AstKind::Add, Some(parent));
        self.ast.push_leaf(
            AstKind::IntLiteral,
            add_id,
            digit_source,
            digit_token.text(),
        );
        let rhs = self.build_expr(&rest, add_id);
        self.check_add(rhs);
        Some(add_id)
    }

    /// Collapses the `CharList` chain into one string-literal leaf. The
    /// representative token is the first character's (or the opening quote
    /// for the empty string).
    fn build_string_expr(&mut self, string_expr: &SyntaxNode, parent: AstId) -> AstId {
        let mut text = String::new();
        let mut first: Option<SyntaxToken> = None;

        for element in string_expr.descendants_with_tokens() {
            if let Some(token) = element.as_token()
                && token.kind() == SyntaxKind::Char
            {
                if first.is_none() {
                    first = Some(token.clone());
                }
                text.push_str(token.text());
            }
        }

        let representative = first
            .or_else(|| find_token(string_expr, |k| k == SyntaxKind::Quote))
            .expect("string expression starts with a quote");
        let token = self.source_token(&representative);
        self.ast.push_leaf(AstKind::StringLiteral, parent, token, text)
    }

    /// `(Expr op Expr)` → `IsEq`/`IsNotEq`; a bare boolval is a leaf.
    fn build_boolean_expr(&mut self, bool_expr: &SyntaxNode, parent: AstId) -> Option<AstId> {
        if let Some(literal) =
            find_token(bool_expr, |k| matches!(k, SyntaxKind::KwTrue | SyntaxKind::KwFalse))
        {
            let token = self.source_token(&literal);
            return Some(
                self.ast
                    .push_leaf(AstKind::BoolLiteral, parent, token, literal.text()),
            );
        }

        let op = find_token(bool_expr, |k| matches!(k, SyntaxKind::EqEq | SyntaxKind::NotEq))?;
        let kind = if op.kind() == SyntaxKind::EqEq {
            AstKind::IsEq
        } else {
            AstKind::IsNotEq
        };

        let branch = self.ast.push_branch(kind, Some(parent));
        let mut exprs = bool_expr.children().filter(|n| n.kind() == SyntaxKind::Expr);
        let lhs = exprs.next().and_then(|e| self.build_expr(&e, branch));
        let rhs = exprs.next().and_then(|e| self.build_expr(&e, branch));
        self.check_comparison(lhs, rhs);
        Some(branch)
    }

    fn build_ident(&mut self, id: &SyntaxNode, parent: AstId) -> Option<AstId> {
        let token = find_token(id, |k| k == SyntaxKind::Ident)?;
        let source = self.source_token(&token);
        Some(
            self.ast
                .push_leaf(AstKind::Ident, parent, source, token.text()),
        )
    }

    /// Both operands of `Add` must be `int`. The first is a digit literal
    /// by construction; identifier seconds are resolved and marked used.
    fn check_add(&mut self, rhs: Option<AstId>) {
        let Some(rhs) = rhs else { return };

        if self.ast.kind(rhs) == AstKind::Ident {
            let Some(scope) = self.resolve_ident(rhs) else {
                return;
            };
            self.mark_used(rhs, scope);
        }

        if let Some(ty) = self.type_of(rhs)
            && ty != VarType::Int
            && let Some(token) = self.ast.representative_token(rhs)
        {
            self.diag
                .error(
                    Stage::Analyzer,
                    format!("Type mismatch: Using {} in int expression", ty),
                )
                .at(token.pos())
                .span(token.span)
                .emit();
        }
    }

    /// Operands of a comparison must have equal types (int, string, or
    /// boolean); identifier operands are resolved and marked used.
    fn check_comparison(&mut self, lhs: Option<AstId>, rhs: Option<AstId>) {
        for operand in [lhs, rhs].into_iter().flatten() {
            if self.ast.kind(operand) == AstKind::Ident
                && let Some(scope) = self.resolve_ident(operand)
            {
                self.mark_used(operand, scope);
            }
        }

        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return;
        };
        if let (Some(lt), Some(rt)) = (self.type_of(lhs), self.type_of(rhs))
            && lt != rt
            && let Some(token) = self.ast.representative_token(lhs)
        {
            self.diag
                .error(
                    Stage::Analyzer,
                    format!("Type mismatch: Comparing {} to {}", lt, rt),
                )
                .at(token.pos())
                .span(token.span)
                .emit();
        }
    }

    /// Resolves an identifier leaf, reporting `Use of undeclared variable`
    /// when the parent walk finds nothing.
    fn resolve_ident(&mut self, id: AstId) -> Option<ScopeId> {
        let name = self.ast.text(id);
        let scope = self.symbols.resolve(self.current_scope(), name);
        if scope.is_none() {
            let token = self.ast.token(id).expect("identifier leaf has a token");
            self.diag
                .error(
                    Stage::Analyzer,
                    format!("Use of undeclared variable '{}'", self.ast.text(id)),
                )
                .at(token.pos())
                .span(token.span)
                .emit();
        }
        scope
    }

    /// Marks a resolved identifier used, warning when its value is read
    /// before anything was assigned.
    fn mark_used(&mut self, id: AstId, scope: ScopeId) {
        let name = self.ast.text(id).to_string();
        let symbol = self
            .symbols
            .symbol_mut(scope, &name)
            .expect("resolved symbol exists");
        symbol.used = true;

        if !symbol.initialized {
            let token = self.ast.token(id).expect("identifier leaf has a token");
            self.diag
                .warning(
                    Stage::Analyzer,
                    format!("Variable [{}] is used before being initialized", name),
                )
                .at(token.pos())
                .span(token.span)
                .emit();
        }
    }

    /// Type of an AST node, totally determined by its shape and leaves.
    /// Unresolved identifiers yield `None`; the undeclared error is
    /// reported where the identifier is checked.
    fn type_of(&self, id: AstId) -> Option<VarType> {
        match self.ast.kind(id) {
            AstKind::IntLiteral | AstKind::Add => Some(VarType::Int),
            AstKind::BoolLiteral | AstKind::IsEq | AstKind::IsNotEq => Some(VarType::Boolean),
            AstKind::StringLiteral => Some(VarType::String),
            AstKind::Ident => {
                let name = self.ast.text(id);
                let scope = self.symbols.resolve(self.current_scope(), name)?;
                Some(self.symbols.symbol(scope, name)?.ty)
            }
            _ => None,
        }
    }

    /// Walks the finished scope tree: declared-but-never-initialized and
    /// initialized-but-never-used warnings. A symbol used while
    /// uninitialized was already warned at the use site.
    fn post_pass(&mut self) {
        let mut warnings = Vec::new();
        for scope in self.symbols.scopes() {
            for (name, symbol) in self.symbols.symbols(scope) {
                if !symbol.initialized && !symbol.used {
                    warnings.push((
                        format!("Variable [{}] is declared but never initialized", name),
                        symbol.declared_at,
                        symbol.declared_span,
                    ));
                } else if symbol.initialized && !symbol.used {
                    warnings.push((
                        format!("Variable [{}] is initialized but never used", name),
                        symbol.declared_at,
                        symbol.declared_span,
                    ));
                }
            }
        }
        for (message, at, span) in warnings {
            self.diag
                .warning(Stage::Analyzer, message)
                .at(at)
                .span(span)
                .emit();
        }
    }
}

fn child_node(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|n| n.kind() == kind)
}

fn find_token(node: &SyntaxNode, pred: impl Fn(SyntaxKind) -> bool) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| pred(t.kind()))
}
