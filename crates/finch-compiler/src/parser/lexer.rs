//! Lexer for finch source programs.
//!
//! Logos recognizes the raw token classes; this wrapper re-shapes its
//! output: quoted literals are split into per-character tokens, comment and
//! string termination is checked, unrecognized characters become `Garbage`
//! trivia, and every token is stamped with its 1-based line/column. The
//! line and column counters are owned by the lex loop; nothing global.

use logos::Logos;
use rowan::TextRange;
use std::fmt::Write as _;
use std::ops::Range;

use super::cst::SyntaxKind;
use crate::diagnostics::{Diagnostics, LineCol, Stage};

/// Token: kind + span + 1-based position. The lexeme is sliced from the
/// source via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: SyntaxKind, span: TextRange, line: u32, column: u32) -> Self {
        Self {
            kind,
            span,
            line,
            column,
        }
    }

    pub fn pos(&self) -> LineCol {
        LineCol::new(self.line, self.column)
    }
}

/// Output of lexing one program.
#[derive(Debug)]
pub struct LexedProgram {
    pub tokens: Vec<Token>,
    pub diagnostics: Diagnostics,
    /// Position just past the last character, for end-of-input messages.
    pub end: LineCol,
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[Range::<usize>::from(token.span)]
}

/// Tokenizes one program.
///
/// Every accepted character maps to exactly one emitted token; whitespace
/// and comments are kept as trivia so the CST stays lossless. A program
/// whose last significant token is not `$` draws a warning.
pub fn lex(source: &str) -> LexedProgram {
    let mut tokens = Vec::new();
    let mut diagnostics = Diagnostics::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut line = 1u32;
    let mut column = 1u32;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = &source[span.clone()];
        let start = LineCol::new(line, column);

        match result {
            Ok(SyntaxKind::StringLiteral) => {
                split_string_literal(text, span.start, start, &mut tokens, &mut diagnostics);
            }
            Ok(SyntaxKind::BlockComment) => {
                if !is_terminated_comment(text) {
                    diagnostics
                        .warning(Stage::Lexer, "Unterminated comment")
                        .at(start)
                        .span(range_to_text_range(span.clone()))
                        .emit();
                }
                tokens.push(Token::new(
                    SyntaxKind::BlockComment,
                    range_to_text_range(span),
                    start.line,
                    start.column,
                ));
            }
            Ok(SyntaxKind::CommentClose) => {
                diagnostics
                    .error(Stage::Lexer, "Unmatched */ outside of a comment")
                    .at(start)
                    .span(range_to_text_range(span.clone()))
                    .emit();
                tokens.push(Token::new(
                    SyntaxKind::CommentClose,
                    range_to_text_range(span),
                    start.line,
                    start.column,
                ));
            }
            Ok(kind) => {
                tokens.push(Token::new(
                    kind,
                    range_to_text_range(span),
                    start.line,
                    start.column,
                ));
            }
            Err(()) => {
                diagnostics
                    .error(Stage::Lexer, format!("Unrecognized token '{}'", text))
                    .at(start)
                    .span(range_to_text_range(span.clone()))
                    .emit();
                tokens.push(Token::new(
                    SyntaxKind::Garbage,
                    range_to_text_range(span),
                    start.line,
                    start.column,
                ));
            }
        }

        advance_position(&mut line, &mut column, text);
    }

    let last_significant = tokens.iter().rev().find(|t| !t.kind.is_trivia());
    if let Some(token) = last_significant
        && token.kind != SyntaxKind::Eop
    {
        diagnostics
            .warning(Stage::Lexer, "Program does not end with \"$\"")
            .at(LineCol::new(line, column))
            .emit();
    }

    LexedProgram {
        tokens,
        diagnostics,
        end: LineCol::new(line, column),
    }
}

/// Splits a matched string literal into `Quote` + `Char`* + `Quote`,
/// reporting characters outside `[a-z ]` and a missing closing quote.
/// String literals never span lines, so columns advance by one per
/// character.
fn split_string_literal(
    text: &str,
    offset: usize,
    start: LineCol,
    tokens: &mut Vec<Token>,
    diagnostics: &mut Diagnostics,
) {
    let terminated = text.len() >= 2 && text.ends_with('"');
    let content = if terminated {
        &text[1..text.len() - 1]
    } else {
        &text[1..]
    };

    tokens.push(Token::new(
        SyntaxKind::Quote,
        range_to_text_range(offset..offset + 1),
        start.line,
        start.column,
    ));

    let mut column = start.column + 1;
    for (i, c) in content.char_indices() {
        let span = offset + 1 + i..offset + 1 + i + c.len_utf8();
        let kind = if c.is_ascii_lowercase() || c == ' ' {
            SyntaxKind::Char
        } else {
            diagnostics
                .error(
                    Stage::Lexer,
                    format!("Unrecognized token '{}' in string literal", c),
                )
                .at(LineCol::new(start.line, column))
                .span(range_to_text_range(span.clone()))
                .emit();
            SyntaxKind::Garbage
        };
        tokens.push(Token::new(
            kind,
            range_to_text_range(span),
            start.line,
            column,
        ));
        column += 1;
    }

    if terminated {
        tokens.push(Token::new(
            SyntaxKind::Quote,
            range_to_text_range(offset + text.len() - 1..offset + text.len()),
            start.line,
            column,
        ));
    } else {
        diagnostics
            .error(Stage::Lexer, "Unterminated string literal")
            .at(start)
            .span(range_to_text_range(offset..offset + 1))
            .emit();
    }
}

fn is_terminated_comment(text: &str) -> bool {
    text.len() >= 4 && text.ends_with("*/")
}

/// Advances the owned line/column counters over `text`. `\n`, `\r\n` and a
/// lone `\r` each count as one line break (comments may span several).
fn advance_position(line: &mut u32, column: &mut u32, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                *line += 1;
                *column = 1;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                *line += 1;
                *column = 1;
            }
            _ => *column += 1,
        }
    }
}

/// One line per significant token: `Kind "lexeme" (line:column)`.
/// Used by tests and verbose dumps.
pub fn dump_tokens(source: &str, tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.kind.is_trivia() {
            continue;
        }
        let _ = writeln!(
            out,
            "{:?} {:?} ({}:{})",
            token.kind,
            token_text(source, token),
            token.line,
            token.column
        );
    }
    out
}
