//! Parser state machine and low-level operations.

use rowan::{GreenNode, GreenNodeBuilder};

use super::cst::{SyntaxKind, SyntaxNode, TokenSet};
use super::lexer::{Token, token_text};
use crate::diagnostics::{Diagnostics, LineCol, Stage};

#[derive(Debug)]
pub struct ParseResult {
    pub root: SyntaxNode,
    pub diagnostics: Diagnostics,
}

/// Predictive recursive-descent parser building a lossless CST.
///
/// Trivia tokens (whitespace, comments, garbage) are buffered and flushed as
/// leading trivia when the next node or token is appended, which gives
/// predictable trivia attachment without backtracking. A failed `expect`
/// records a diagnostic but does not consume: parsing continues from the
/// same token and further errors may cascade.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    /// Position just past the last character, for end-of-input messages.
    end: LineCol,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>, end: LineCol) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            end,
        }
    }

    pub fn parse(mut self) -> ParseResult {
        self.parse_program();
        let root = SyntaxNode::new_root(self.finish());
        ParseResult {
            root,
            diagnostics: self.diagnostics,
        }
    }

    fn finish(&mut self) -> GreenNode {
        self.drain_trivia();
        std::mem::replace(&mut self.builder, GreenNodeBuilder::new()).finish()
    }

    /// Returns `Error` at end of input (acts as sentinel).
    pub(super) fn current(&self) -> SyntaxKind {
        self.tokens
            .get(self.pos)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(super) fn current_pos(&self) -> LineCol {
        self.current_token().map_or(self.end, Token::pos)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Current significant kind; trivia is buffered along the way.
    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.current()
    }

    pub(super) fn at_set(&mut self, set: TokenSet) -> bool {
        set.contains(self.peek())
    }

    fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(super) fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn bump(&mut self) {
        assert!(!self.eof(), "bump called at end of input");

        self.drain_trivia();
        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// `match` of the grammar: on success append a leaf and advance, on
    /// mismatch record the error and leave the token for the caller.
    pub(super) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_expected(kind.label());
        false
    }

    /// Records `EXPECTED [what] BUT FOUND [found]` at the current position.
    pub(super) fn error_expected(&mut self, what: &str) {
        let message = match self.current_token() {
            Some(token) => format!(
                "EXPECTED [{}] BUT FOUND [{}] with value '{}'",
                what,
                token.kind.label(),
                token_text(self.source, token)
            ),
            None => format!("EXPECTED [{}] BUT FOUND [end of input]", what),
        };
        let pos = self.current_pos();
        let span = self.current_token().map(|t| t.span);
        let mut builder = self.diagnostics.error(Stage::Parser, message).at(pos);
        if let Some(span) = span {
            builder = builder.span(span);
        }
        builder.emit();
    }

    /// Consumes the offending token wrapped in an `Error` node so the parse
    /// makes progress past junk inside a statement list.
    pub(super) fn bump_error(&mut self) {
        if self.eof() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }
}
