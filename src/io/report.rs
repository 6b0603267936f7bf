use crate::core::diagnostics::Diagnostic;
use std::io::Write;

/// Sink for validation diagnostics. The core emits; the sink formats.
pub trait ReportWriter {
    fn write_error(&mut self, diagnostic: &Diagnostic);
    fn write_warning(&mut self, diagnostic: &Diagnostic);
}

/// Writes one line per diagnostic to standard output.
#[derive(Debug, Default)]
pub struct StdoutReportWriter;

impl ReportWriter for StdoutReportWriter {
    fn write_error(&mut self, diagnostic: &Diagnostic) {
        println!("{diagnostic}");
    }

    fn write_warning(&mut self, diagnostic: &Diagnostic) {
        println!("{diagnostic} (warning)");
    }
}

/// Writes one line per diagnostic to any `io::Write`.
pub struct TextReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(writer: W) -> Self {
        TextReportWriter { writer }
    }

    fn write_line(&mut self, diagnostic: &Diagnostic, suffix: &str) {
        if let Err(error) = writeln!(self.writer, "{diagnostic}{suffix}") {
            log::error!("Failed to write report entry: {error}");
        }
    }
}

impl<W: Write> ReportWriter for TextReportWriter<W> {
    fn write_error(&mut self, diagnostic: &Diagnostic) {
        self.write_line(diagnostic, "");
    }

    fn write_warning(&mut self, diagnostic: &Diagnostic) {
        self.write_line(diagnostic, " (warning)");
    }
}

/// Keeps diagnostics in memory; used by tests and library callers that
/// post-process findings themselves.
#[derive(Debug, Default)]
pub struct CollectingReportWriter {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ReportWriter for CollectingReportWriter {
    fn write_error(&mut self, diagnostic: &Diagnostic) {
        self.errors.push(diagnostic.clone());
    }

    fn write_warning(&mut self, diagnostic: &Diagnostic) {
        self.warnings.push(diagnostic.clone());
    }
}
