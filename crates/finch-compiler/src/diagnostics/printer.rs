//! Renderers for the diagnostic stream.
//!
//! The plain renderer produces the canonical per-line format
//! `<LEVEL><padding><STAGE> - <message>[ at (line:column)]` with DEBUG lines
//! gated by the verbose flag. The snippet renderer draws errors and warnings
//! as annotated source excerpts.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::Severity;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    verbose: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            verbose: false,
        }
    }

    /// Include DEBUG lines in the plain rendering.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Source text for the snippet renderer.
    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// Renders the plain line-per-message stream.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for diag in self.diagnostics.iter() {
            if diag.severity() == Severity::Debug && !self.verbose {
                continue;
            }
            writeln!(w, "{}", diag)?;
        }
        Ok(())
    }

    /// Renders errors and warnings as annotated source snippets.
    /// Requires a source set via [`DiagnosticsPrinter::source`]; messages
    /// without a span are skipped.
    pub fn render_snippets(&self) -> String {
        let Some(source) = self.source else {
            return String::new();
        };

        let renderer = Renderer::plain();
        let mut out = String::new();

        for diag in self.diagnostics.iter() {
            if diag.severity() < Severity::Warning {
                continue;
            }
            let Some(span) = diag.span() else {
                continue;
            };

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(adjust_range(span, source.len()))
                    .label(diag.message()),
            );
            for related in &diag.related {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(related.range, source.len()))
                        .label(&related.message),
                );
            }

            let level = match diag.severity() {
                Severity::Error => Level::ERROR,
                _ => Level::WARNING,
            };
            let report: Vec<Group> = vec![level.primary_title(diag.message()).element(snippet)];

            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&renderer.render(&report));
            out.push('\n');
        }

        out
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}
