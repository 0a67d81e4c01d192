//! Syntax kinds shared by the lexer and the concrete syntax tree.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition; node kinds lack
//! token/regex attributes. `FinchLang` implements Rowan's `Language` trait
//! for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST`
/// sentinel. `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
///
/// Logos resolves by maximal munch, so multi-character keywords win over the
/// single-character identifier class by length alone, and `==` wins over `=`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("{")]
    BraceOpen = 0,

    #[token("}")]
    BraceClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("+")]
    Plus,

    #[token("=")]
    Assign,

    /// `$` end-of-program marker.
    #[token("$")]
    Eop,

    #[token("print")]
    KwPrint,

    #[token("while")]
    KwWhile,

    #[token("if")]
    KwIf,

    #[token("int")]
    KwInt,

    #[token("string")]
    KwString,

    #[token("boolean")]
    KwBoolean,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    /// Single-character identifier.
    #[regex("[a-z]")]
    Ident,

    #[regex("[0-9]")]
    Digit,

    /// Whole quoted literal, consumed through the closing quote, end of
    /// line, or end of input. Split by the lexer wrapper into
    /// `Quote` + `Char`* + `Quote`.
    #[token("\"", lex_string)]
    #[doc(hidden)]
    StringLiteral, // Lexer-internal only

    Quote,
    /// One character of string content (`[a-z]` or space).
    Char,

    #[regex("[ \t]+")]
    Whitespace,

    #[token("\r\n")]
    #[token("\n")]
    #[token("\r")]
    Newline,

    /// `/* ... */`, consumed through the closing `*/` or end of input.
    /// Newlines inside still advance the line counter.
    #[token("/*", lex_block_comment)]
    BlockComment,

    /// `*/` with no opening `/*`.
    #[token("*/")]
    CommentClose,

    /// Unrecognized character, kept in the tree as trivia.
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Program,
    Block,
    StatementList,
    Statement,
    PrintStatement,
    AssignmentStatement,
    VarDecl,
    WhileStatement,
    IfStatement,
    Expr,
    IntExpr,
    StringExpr,
    BooleanExpr,
    Id,
    CharList,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

/// Consumes a quoted literal up to the closing quote. An end of line or end
/// of input before the quote leaves the literal unterminated; the wrapper
/// detects this by the missing closing quote.
fn lex_string(lex: &mut logos::Lexer<'_, SyntaxKind>) -> bool {
    let rem = lex.remainder();
    for (i, c) in rem.char_indices() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return true;
            }
            '\n' | '\r' => {
                lex.bump(i);
                return true;
            }
            _ => {}
        }
    }
    lex.bump(rem.len());
    true
}

/// Consumes a block comment through `*/`. At end of input the comment is
/// unterminated; the wrapper detects this by the missing terminator.
fn lex_block_comment(lex: &mut logos::Lexer<'_, SyntaxKind>) -> bool {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(rem.len()),
    }
    true
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Whitespace | Newline | BlockComment | CommentClose | Garbage
        )
    }

    /// Human-readable label used in `EXPECTED [..] BUT FOUND [..]` messages.
    pub fn label(self) -> &'static str {
        match self {
            BraceOpen => "{",
            BraceClose => "}",
            ParenOpen => "(",
            ParenClose => ")",
            EqEq => "==",
            NotEq => "!=",
            Plus => "+",
            Assign => "=",
            Eop => "$",
            KwPrint => "print",
            KwWhile => "while",
            KwIf => "if",
            KwInt => "int",
            KwString => "string",
            KwBoolean => "boolean",
            KwTrue => "true",
            KwFalse => "false",
            Ident => "identifier",
            Digit => "digit",
            Quote => "\"",
            Char => "character",
            Error => "end of input",
            _ => "unrecognized text",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FinchLang {}

impl Language for FinchLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<FinchLang>;
pub type SyntaxToken = rowan::SyntaxToken<FinchLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of Statement.
    pub const STMT_FIRST: TokenSet = TokenSet::new(&[
        KwPrint, Ident, KwInt, KwString, KwBoolean, KwWhile, KwIf, BraceOpen,
    ]);

    /// Keywords naming a declared type.
    pub const TYPE_KEYWORDS: TokenSet = TokenSet::new(&[KwInt, KwString, KwBoolean]);

    /// `==` and `!=`.
    pub const BOOL_OPS: TokenSet = TokenSet::new(&[EqEq, NotEq]);
}
