use std::io;

use crate::span::Span;

/// A lowering diagnostic.
///
/// `Internal` diagnostics abort the compilation unit; they mean the tree
/// reaching this pass has a shape the front end should have rejected or
/// that lowering does not handle. `Error` diagnostics abandon a single
/// statement and lowering carries on with the next one.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Internal,
    Error,
    Warning,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: String, span: Span) -> Self {
        Self {
            severity,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn internal(message: String, span: Span) -> Self {
        Self::with_severity(Severity::Internal, message, span)
    }

    pub fn error(message: String, span: Span) -> Self {
        Self::with_severity(Severity::Error, message, span)
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self::with_severity(Severity::Warning, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Point the diagnostic at `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Internal
    }

    /// True for anything that fails the compilation (internal or user error).
    pub fn is_error(&self) -> bool {
        self.severity != Severity::Warning
    }

    /// Write the diagnostic as an ariadne report.
    pub fn render_to<W: io::Write>(&self, filename: &str, source: &str, out: W) -> io::Result<()> {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let (kind, color) = match self.severity {
            Severity::Internal => (
                ReportKind::Custom("Internal error", Color::Magenta),
                Color::Magenta,
            ),
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish().write((filename, Source::from(source)), out)
    }

    /// Render the diagnostic to stderr.
    pub fn render(&self, filename: &str, source: &str) -> io::Result<()> {
        self.render_to(filename, source, io::stderr())
    }
}

/// Render a list of diagnostics to stderr, stopping at the first I/O failure.
pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    filename: &str,
    source: &str,
) -> io::Result<()> {
    for diag in diagnostics {
        diag.render(filename, source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_is_fatal() {
        let d = Diagnostic::internal("unsupported binary operator '!='".to_string(), Span::dummy());
        assert_eq!(d.severity, Severity::Internal);
        assert!(d.is_fatal());
        assert!(d.is_error());
    }

    #[test]
    fn test_error_is_not_fatal() {
        let d = Diagnostic::error("emit argument is not a header".to_string(), Span::new(4, 9));
        assert!(!d.is_fatal());
        assert!(d.is_error());
        assert_eq!(d.span.range(), 4..9);
    }

    #[test]
    fn test_warning_is_not_error() {
        let d = Diagnostic::warning("register read dropped".to_string(), Span::dummy());
        assert!(!d.is_error());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::error("bad".to_string(), Span::dummy())
            .with_note("first".to_string())
            .with_help("try a header".to_string())
            .with_note("second".to_string());
        assert_eq!(d.notes, vec!["first", "second"]);
        assert_eq!(d.help.as_deref(), Some("try a header"));
    }

    #[test]
    fn test_render_to_buffer_mentions_message() {
        let source = "pkt.emit(a + b);\n";
        let d = Diagnostic::error("emit argument is not a header".to_string(), Span::new(9, 14))
            .with_help("pass a header or header field".to_string());
        let mut buf = Vec::new();
        d.render_to("main.p4", source, &mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("emit argument is not a header"));
    }

    #[test]
    fn test_render_internal_to_buffer() {
        let source = "x = a != b;\n";
        let d = Diagnostic::internal("unsupported binary operator '!='".to_string(), Span::new(4, 10));
        let mut buf = Vec::new();
        d.render_to("main.p4", source, &mut buf).unwrap();
        assert!(String::from_utf8_lossy(&buf).contains("Internal error"));
    }
}
