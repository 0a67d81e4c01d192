//! Lexer and parser for finch programs.
//!
//! # Architecture
//!
//! The parser produces a lossless concrete syntax tree via Rowan's green
//! tree builder, fed by span-based tokens from a Logos lexer:
//!
//! - Zero-copy lexing: tokens carry spans and positions, text is sliced from
//!   the source only when building tree nodes
//! - Quoted literals and comments are consumed by Logos callbacks, then
//!   re-shaped by the lexer wrapper (per-character string tokens, unpaired
//!   delimiter diagnostics)
//! - Trivia buffering: whitespace/comments collected, then attached as
//!   leading trivia of the next node
//! - No panic-mode recovery: a failed `expect` reports and leaves the token
//!   in place; only unstartable statements are consumed into `Error` nodes

mod core;
mod cst;
mod grammar;
mod lexer;
pub mod printer;


pub use core::{ParseResult, Parser};
pub use cst::{FinchLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet, token_sets};
pub use lexer::{LexedProgram, Token, dump_tokens, lex, token_text};
