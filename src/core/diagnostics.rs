use thiserror::Error;

/// Channel a diagnostic is reported through. Warnings never affect the
/// process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Count(i64),
}

/// Column context attached to body diagnostics so consumers can filter
/// without parsing messages.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContext {
    pub column: String,
    pub value: Option<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MetaSection,
    HeaderSection,
    BodySection,
    Chromosome,
    Position,
    Id,
    ReferenceAllele,
    AlternateAlleles,
    Quality,
    Filter,
    Info,
    Format,
    SamplesField,
    NoMetaDefinition,
}

/// A single validation finding. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: u64,
    pub message: String,
    pub severity: Severity,
    pub field: Option<FieldContext>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: u64, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            line,
            message: message.into(),
            severity: Severity::Error,
            field: None,
        }
    }

    pub fn meta_section(line: u64, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MetaSection, line, message)
    }

    pub fn header_section(line: u64, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::HeaderSection, line, message)
    }

    pub fn body_section(line: u64, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::BodySection, line, message)
    }

    pub fn with_field(mut self, column: impl Into<String>, value: Option<FieldValue>) -> Self {
        self.field = Some(FieldContext {
            column: column.into(),
            value,
        });
        self
    }

    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_message() {
        let diagnostic = Diagnostic::meta_section(3, "Metadata value contains a line break");
        assert_eq!(
            diagnostic.to_string(),
            "Line 3: Metadata value contains a line break"
        );
    }

    #[test]
    fn diagnostics_default_to_errors() {
        let diagnostic = Diagnostic::new(DiagnosticKind::Position, 10, "bad position");
        assert!(diagnostic.is_error());
        assert!(!diagnostic.as_warning().is_error());
    }

    #[test]
    fn with_field_attaches_column_context() {
        let diagnostic = Diagnostic::new(DiagnosticKind::Filter, 7, "undeclared filter")
            .with_field("FILTER", Some(FieldValue::Text("q10".to_string())));
        let field = diagnostic.field.expect("field context should be set");
        assert_eq!(field.column, "FILTER");
        assert_eq!(field.value, Some(FieldValue::Text("q10".to_string())));
    }
}
