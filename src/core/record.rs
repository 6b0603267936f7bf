use crate::core::{
    diagnostics::{Diagnostic, DiagnosticKind, FieldValue},
    source::{Source, Version},
};
use std::{collections::HashSet, rc::Rc};

/// Shape class of one alternate allele relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Snv,
    Mnv,
    Indel,
    Structural,
    NoVariation,
    Other,
}

/// Decoded columns of one data line, before structural validation.
#[derive(Debug, Clone, Default)]
pub struct RecordFields {
    pub chromosome: String,
    pub position: u64,
    pub ids: Vec<String>,
    pub reference_allele: String,
    pub alternate_alleles: Vec<String>,
    pub quality: Option<f64>,
    pub filters: Vec<String>,
    pub info: Vec<(String, String)>,
    pub format: Vec<String>,
    pub samples: Vec<String>,
}

/// One validated data line. Construction applies the structural checks
/// in column order; the first failure aborts with its column's
/// diagnostic kind.
#[derive(Debug, Clone)]
pub struct Record {
    pub line: u64,
    pub chromosome: String,
    pub position: u64,
    pub ids: Vec<String>,
    pub reference_allele: String,
    pub alternate_alleles: Vec<String>,
    pub types: Vec<RecordType>,
    pub quality: Option<f64>,
    pub filters: Vec<String>,
    pub info: Vec<(String, String)>,
    pub format: Vec<String>,
    pub samples: Vec<String>,
    pub source: Rc<Source>,
}

impl Record {
    pub fn new(line: u64, fields: RecordFields, source: Rc<Source>) -> Result<Self, Diagnostic> {
        let types = fields
            .alternate_alleles
            .iter()
            .map(|alternate| classify_alternate(&fields.reference_allele, alternate))
            .collect();

        let record = Record {
            line,
            chromosome: fields.chromosome,
            // position is unsigned by construction; zero is legal here
            // and judged by the optional policy
            position: fields.position,
            ids: fields.ids,
            reference_allele: fields.reference_allele,
            alternate_alleles: fields.alternate_alleles,
            types,
            quality: fields.quality,
            filters: fields.filters,
            info: fields.info,
            format: fields.format,
            samples: fields.samples,
            source,
        };

        record.check_chromosome()?;
        record.check_ids()?;
        record.check_reference_allele()?;
        record.check_alternate_alleles()?;
        record.check_quality()?;
        record.check_format()?;
        record.check_samples()?;
        Ok(record)
    }

    fn body_error(&self, kind: DiagnosticKind, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(kind, self.line, message)
    }

    fn check_chromosome(&self) -> Result<(), Diagnostic> {
        if self.chromosome.contains(char::is_whitespace) {
            return Err(self
                .body_error(
                    DiagnosticKind::Chromosome,
                    "Chromosome must not contain whitespace",
                )
                .with_field("CHROM", Some(FieldValue::Text(self.chromosome.clone()))));
        }
        if self.chromosome.contains(':') {
            return Err(self
                .body_error(
                    DiagnosticKind::Chromosome,
                    "Chromosome must not contain colons",
                )
                .with_field("CHROM", Some(FieldValue::Text(self.chromosome.clone()))));
        }
        Ok(())
    }

    fn check_ids(&self) -> Result<(), Diagnostic> {
        for id in &self.ids {
            if id.contains(char::is_whitespace) {
                return Err(self
                    .body_error(DiagnosticKind::Id, "ID must not contain whitespace")
                    .with_field("ID", Some(FieldValue::Text(id.clone()))));
            }
        }

        if self.source.version == Version::V43 {
            let mut seen = HashSet::new();
            for id in &self.ids {
                if !seen.insert(id.as_str()) {
                    return Err(self
                        .body_error(DiagnosticKind::Id, "ID must not have duplicate values")
                        .with_field("ID", Some(FieldValue::Text(id.clone()))));
                }
            }
        }
        Ok(())
    }

    fn check_reference_allele(&self) -> Result<(), Diagnostic> {
        if self.reference_allele.is_empty() {
            return Err(self.body_error(
                DiagnosticKind::ReferenceAllele,
                "Reference allele must not be empty",
            ));
        }
        if !self
            .reference_allele
            .chars()
            .all(|c| matches!(c, 'A' | 'C' | 'G' | 'T' | 'N'))
        {
            return Err(self
                .body_error(
                    DiagnosticKind::ReferenceAllele,
                    "Reference allele contains characters other than A, C, G, T or N",
                )
                .with_field(
                    "REF",
                    Some(FieldValue::Text(self.reference_allele.clone())),
                ));
        }
        Ok(())
    }

    fn check_alternate_alleles(&self) -> Result<(), Diagnostic> {
        if self.alternate_alleles.is_empty() {
            return Err(self.body_error(
                DiagnosticKind::AlternateAlleles,
                "Alternate alleles must not be empty",
            ));
        }
        for alternate in &self.alternate_alleles {
            if *alternate == self.reference_allele {
                return Err(self
                    .body_error(
                        DiagnosticKind::AlternateAlleles,
                        "Alternate alleles must not match the reference allele",
                    )
                    .with_field("ALT", Some(FieldValue::Text(alternate.clone()))));
            }
        }
        Ok(())
    }

    fn check_quality(&self) -> Result<(), Diagnostic> {
        if let Some(quality) = self.quality {
            if quality < 0.0 {
                return Err(self
                    .body_error(
                        DiagnosticKind::Quality,
                        "Quality must be equal to or greater than zero",
                    )
                    .with_field("QUAL", Some(FieldValue::Text(quality.to_string()))));
            }
        }
        Ok(())
    }

    fn check_format(&self) -> Result<(), Diagnostic> {
        if self.source.version == Version::V43 {
            let mut seen = HashSet::new();
            for field in &self.format {
                if !seen.insert(field.as_str()) {
                    return Err(self
                        .body_error(
                            DiagnosticKind::Format,
                            "FORMAT must not have duplicate fields",
                        )
                        .with_field("FORMAT", Some(FieldValue::Text(field.clone()))));
                }
            }
        }

        if self.format.iter().any(|field| field == "GT")
            && self.format.first().map(String::as_str) != Some("GT")
        {
            return Err(self
                .body_error(
                    DiagnosticKind::Format,
                    "GT must be the first field in the FORMAT column",
                )
                .with_field("FORMAT", None));
        }
        Ok(())
    }

    fn check_samples(&self) -> Result<(), Diagnostic> {
        if self.samples.len() != self.source.samples.len() {
            return Err(self.body_error(
                DiagnosticKind::BodySection,
                "The number of samples must match those listed in the header line",
            ));
        }
        for (index, sample) in self.samples.iter().enumerate() {
            let subfields = sample.split(':').count();
            if subfields > self.format.len() {
                return Err(self
                    .body_error(
                        DiagnosticKind::SamplesField,
                        format!(
                            "Sample #{} has more fields than specified in the FORMAT column",
                            index + 1
                        ),
                    )
                    .with_field(
                        "FORMAT",
                        Some(FieldValue::Count(self.format.len() as i64)),
                    ));
            }
        }
        Ok(())
    }
}

fn classify_alternate(reference: &str, alternate: &str) -> RecordType {
    if alternate.starts_with('<') {
        RecordType::Structural
    } else if alternate == "." || alternate == "*" {
        RecordType::NoVariation
    } else if alternate.is_empty() || reference.is_empty() {
        RecordType::Other
    } else if alternate.len() == reference.len() {
        if reference.len() == 1 {
            RecordType::Snv
        } else {
            RecordType::Mnv
        }
    } else {
        RecordType::Indel
    }
}
