//! Abstract syntax tree over a reduced node vocabulary.
//!
//! Nodes live in an arena and are addressed by [`AstId`] index handles:
//! parent back-references plus ordered child lists, no pointer cycles.
//! Leaves carry the representative lexer token (for diagnostics) and their
//! text — the lexeme, or the collapsed content for string literals.

use std::fmt::Write as _;

use crate::parser::Token;

/// Index handle into the AST arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstId(u32);

impl AstId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    Block,
    Declare,
    Assign,
    Print,
    If,
    While,
    Add,
    IsEq,
    IsNotEq,
    // Leaves
    TypeName,
    Ident,
    IntLiteral,
    BoolLiteral,
    StringLiteral,
}

impl AstKind {
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            AstKind::TypeName
                | AstKind::Ident
                | AstKind::IntLiteral
                | AstKind::BoolLiteral
                | AstKind::StringLiteral
        )
    }

    /// Comparison and addition branches evaluate to a value.
    pub fn is_operator(self) -> bool {
        matches!(self, AstKind::Add | AstKind::IsEq | AstKind::IsNotEq)
    }
}

#[derive(Debug)]
struct AstNode {
    kind: AstKind,
    parent: Option<AstId>,
    children: Vec<AstId>,
    token: Option<Token>,
    text: String,
}

/// The arena. The first pushed node is the root block.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The root block. Only valid once at least one node was pushed.
    pub fn root(&self) -> AstId {
        assert!(!self.nodes.is_empty(), "AST has no root yet");
        AstId(0)
    }

    pub fn push_branch(&mut self, kind: AstKind, parent: Option<AstId>) -> AstId {
        debug_assert!(!kind.is_leaf());
        self.push_node(AstNode {
            kind,
            parent,
            children: Vec::new(),
            token: None,
            text: String::new(),
        })
    }

    pub fn push_leaf(
        &mut self,
        kind: AstKind,
        parent: AstId,
        token: Token,
        text: impl Into<String>,
    ) -> AstId {
        debug_assert!(kind.is_leaf());
        self.push_node(AstNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            token: Some(token),
            text: text.into(),
        })
    }

    fn push_node(&mut self, node: AstNode) -> AstId {
        let id = AstId(self.nodes.len() as u32);
        if let Some(parent) = node.parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn kind(&self, id: AstId) -> AstKind {
        self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: AstId) -> Option<AstId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: AstId) -> &[AstId] {
        &self.nodes[id.index()].children
    }

    /// nth child; internal invariant that it exists.
    pub fn child(&self, id: AstId, n: usize) -> AstId {
        self.nodes[id.index()].children[n]
    }

    pub fn token(&self, id: AstId) -> Option<Token> {
        self.nodes[id.index()].token
    }

    pub fn text(&self, id: AstId) -> &str {
        &self.nodes[id.index()].text
    }

    /// Token of the leftmost leaf under `id`; the position a branch node is
    /// reported at.
    pub fn representative_token(&self, id: AstId) -> Option<Token> {
        let node = &self.nodes[id.index()];
        if let Some(token) = node.token {
            return Some(token);
        }
        node.children
            .iter()
            .find_map(|&child| self.representative_token(child))
    }

    /// Two-space-indented dump: branches by kind name, leaves as
    /// `Kind "text"`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if !self.nodes.is_empty() {
            self.format_node(self.root(), 0, &mut out);
        }
        out
    }

    fn format_node(&self, id: AstId, indent: usize, out: &mut String) {
        let node = &self.nodes[id.index()];
        let prefix = "  ".repeat(indent);
        if node.kind.is_leaf() {
            let _ = writeln!(out, "{}{:?} {:?}", prefix, node.kind, node.text);
        } else {
            let _ = writeln!(out, "{}{:?}", prefix, node.kind);
            for &child in &node.children {
                self.format_node(child, indent + 1, out);
            }
        }
    }
}
