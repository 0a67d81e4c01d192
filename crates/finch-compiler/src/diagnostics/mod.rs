//! Compiler diagnostics infrastructure.
//!
//! Diagnostics are collected per program in discovery order and rendered
//! once per stage boundary. Each message carries its originating stage and
//! a severity; position-bearing messages additionally carry a 1-based
//! line/column and a byte span into the program source.

mod message;
mod printer;


use rowan::TextRange;

pub use message::{DiagnosticMessage, LineCol, RelatedInfo, Severity, Stage};
pub use printer::DiagnosticsPrinter;

/// Ordered collection of diagnostic messages for one program.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

/// Builder for constructing a diagnostic message.
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn report(
        &mut self,
        stage: Stage,
        severity: Severity,
        msg: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            message: DiagnosticMessage::new(stage, severity, msg),
            diagnostics: self,
        }
    }

    pub fn error(&mut self, stage: Stage, msg: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(stage, Severity::Error, msg)
    }

    pub fn warning(&mut self, stage: Stage, msg: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(stage, Severity::Warning, msg)
    }

    pub fn info(&mut self, stage: Stage, msg: impl Into<String>) {
        self.report(stage, Severity::Info, msg).emit();
    }

    pub fn debug(&mut self, stage: Stage, msg: impl Into<String>) {
        self.report(stage, Severity::Debug, msg).emit();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    /// Appends all messages of `other`, preserving discovery order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Attaches the 1-based source position rendered as ` at (line:column)`.
    pub fn at(mut self, pos: LineCol) -> Self {
        self.message.pos = Some(pos);
        self
    }

    /// Attaches the byte span used by the snippet renderer.
    pub fn span(mut self, span: TextRange) -> Self {
        self.message.span = Some(span);
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, range: TextRange) -> Self {
        self.message.related.push(RelatedInfo::new(range, msg));
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
