//! Concrete syntax tree dump.

use std::fmt::Write;

use rowan::NodeOrToken;

use super::cst::SyntaxNode;

/// Renders the tree with two-space indentation: nodes by kind name, tokens
/// as `Kind "text"`. Trivia is skipped unless `with_trivia` is used.
pub fn dump(root: &SyntaxNode) -> String {
    let mut out = String::new();
    format_node(root, 0, false, &mut out).expect("String write never fails");
    out
}

pub fn dump_with_trivia(root: &SyntaxNode) -> String {
    let mut out = String::new();
    format_node(root, 0, true, &mut out).expect("String write never fails");
    out
}

fn format_node(
    node: &SyntaxNode,
    indent: usize,
    trivia: bool,
    w: &mut impl Write,
) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_node(&n, indent + 1, trivia, w)?,
            NodeOrToken::Token(t) => {
                if trivia || !t.kind().is_trivia() {
                    let child_prefix = "  ".repeat(indent + 1);
                    writeln!(w, "{}{:?} {:?}", child_prefix, t.kind(), t.text())?;
                }
            }
        }
    }
    Ok(())
}
