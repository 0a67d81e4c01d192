//! Diagnostic message types and related structures.

use rowan::TextRange;

/// Severity level of a diagnostic.
///
/// `Debug` lines are gated by the verbose flag at render time; `Info` and
/// above always print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.pad(text)
    }
}

/// Pipeline stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Analyzer,
    CodeGen,
    Compiler,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexer => write!(f, "Lexer"),
            Stage::Parser => write!(f, "Parser"),
            Stage::Analyzer => write!(f, "Analyzer"),
            Stage::CodeGen => write!(f, "Code Gen"),
            Stage::Compiler => write!(f, "Compiler"),
        }
    }
}

/// A 1-based line/column position in a program source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// Related location information for a diagnostic (e.g. the first
/// declaration site of a redeclared variable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// A single diagnostic: stage, severity, message text, and (when
/// position-bearing) the source position and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) stage: Stage,
    pub(crate) severity: Severity,
    pub(crate) message: String,
    pub(crate) pos: Option<LineCol>,
    pub(crate) span: Option<TextRange>,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(stage: Stage, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity,
            message: message.into(),
            pos: None,
            span: None,
            related: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn pos(&self) -> Option<LineCol> {
        self.pos
    }

    pub fn span(&self) -> Option<TextRange> {
        self.span
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<8}{} - {}", self.severity, self.stage, self.message)?;
        if let Some(pos) = self.pos {
            write!(f, " at {}", pos)?;
        }
        Ok(())
    }
}
