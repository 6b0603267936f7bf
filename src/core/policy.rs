use crate::core::{
    diagnostics::{Diagnostic, DiagnosticKind, FieldValue},
    meta_entry::MetaEntry,
    parsing_state::{MetaCategory, ParsingState},
    record::{Record, RecordType},
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;

/// Alternate alleles of the form `<SOME_ALT_ID>`.
static SYMBOLIC_ALT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z0-9:_]+)>$").unwrap());

/// Cross-validates records against accumulated header state and global
/// invariants. Stateless apart from configuration; per-file memoization
/// lives in [`ParsingState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptionalPolicy {
    /// Promote a configured-vs-observed ploidy mismatch from Warning to
    /// Error.
    pub ploidy_mismatch_is_error: bool,
}

impl ValidateOptionalPolicy {
    pub fn new(ploidy_mismatch_is_error: bool) -> Self {
        ValidateOptionalPolicy {
            ploidy_mismatch_is_error,
        }
    }

    /// Run once, after the header is complete.
    pub fn optional_check_meta_section(&self, state: &ParsingState) -> Vec<Diagnostic> {
        if !state.source.meta_entries.contains("reference") {
            return vec![Diagnostic::meta_section(
                state.n_lines,
                "A valid 'reference' entry is not listed in the meta section",
            )];
        }
        Vec::new()
    }

    /// Run per record. Checks are independent: a failing check does not
    /// suppress the ones after it.
    pub fn optional_check_body_entry(
        &self,
        state: &mut ParsingState,
        record: &Record,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        // All samples should have the same ploidy
        self.check_body_entry_ploidy(state, record, &mut diagnostics);

        // Position zero should only be used for telomeres
        self.check_body_entry_position_zero(state, record, &mut diagnostics);

        // The standard separator is semi-colon, commas are accepted but
        // most probably a mistake
        self.check_body_entry_id_commas(state, record, &mut diagnostics);

        // Reference and alternate alleles in indels should share the
        // first nucleotide
        self.check_body_entry_reference_alternate_matching(state, record, &mut diagnostics);

        // The chromosome/contig should be described in the meta section
        self.check_contig_meta(state, record, &mut diagnostics);

        // Alternate alleles of the form <SOME_ALT> should be described
        // in the meta section
        self.check_alternate_allele_meta(state, record, &mut diagnostics);

        // Filters should be described in the meta section
        self.check_filter_meta(state, record, &mut diagnostics);

        // Info fields should be described in the meta section
        self.check_info_meta(state, record, &mut diagnostics);

        // Format fields should be described in the meta section
        self.check_format_meta(state, record, &mut diagnostics);

        diagnostics
    }

    /// Run once, after the body is complete. No checks currently.
    pub fn optional_check_body_section(&self, _state: &ParsingState) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn check_body_entry_ploidy(
        &self,
        state: &ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if record.format.first().map(String::as_str) != Some("GT") {
            return;
        }

        let mut ploidy = 0;
        for (index, sample) in record.samples.iter().enumerate() {
            let genotype = sample.split(':').next().unwrap_or(sample);
            let alleles = genotype.split(['|', '/']).count();
            if ploidy > 0 {
                if alleles != ploidy {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::SamplesField,
                            state.n_lines,
                            format!(
                                "Sample #{} has {} allele(s), but {} were found in others",
                                index + 1,
                                alleles,
                                ploidy
                            ),
                        )
                        .with_field("GT", Some(FieldValue::Count(ploidy as i64))),
                    );
                    return;
                }
            } else {
                ploidy = alleles;
            }
        }

        let provided_ploidy = state.source.ploidy.ploidy_for(&record.chromosome) as usize;
        if provided_ploidy != ploidy {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::SamplesField,
                state.n_lines,
                format!(
                    "The specified ploidy for contig \"{}\" was {}, which doesn't match the genotypes, which show ploidy {}",
                    record.chromosome, provided_ploidy, ploidy
                ),
            )
            .with_field("GT", Some(FieldValue::Count(provided_ploidy as i64)));
            diagnostics.push(if self.ploidy_mismatch_is_error {
                diagnostic
            } else {
                diagnostic.as_warning()
            });
        }
    }

    fn check_body_entry_position_zero(
        &self,
        state: &ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if record.position == 0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Position,
                state.n_lines,
                "Position zero should only be used to reference a telomere",
            ));
        }
    }

    fn check_body_entry_id_commas(
        &self,
        state: &ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for id in &record.ids {
            if id.contains(',') {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Id,
                    state.n_lines,
                    "Comma found in the ID column; if used as separator, please replace it with semi-colon",
                ));
                return;
            }
        }
    }

    fn check_body_entry_reference_alternate_matching(
        &self,
        state: &ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for (alternate, record_type) in record.alternate_alleles.iter().zip(&record.types) {
            if *record_type == RecordType::Indel
                && alternate.chars().next() != record.reference_allele.chars().next()
            {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ReferenceAllele,
                    state.n_lines,
                    "Reference and alternate alleles do not share the first nucleotide",
                ));
                return;
            }
        }
    }

    fn check_contig_meta(
        &self,
        state: &mut ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let chromosome = record.chromosome.clone();
        self.check_meta_definition(state, MetaCategory::Contig, &chromosome, "CHROM", diagnostics, || {
            format!("Chromosome/contig '{chromosome}' is not described in a 'contig' meta description")
        });
    }

    fn check_alternate_allele_meta(
        &self,
        state: &mut ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for alternate in &record.alternate_alleles {
            if !alternate.starts_with('<') {
                continue;
            }
            let Some(alt_id) = SYMBOLIC_ALT_RE
                .captures(alternate)
                .and_then(|captures| captures.get(1))
                .map(|id| id.as_str().to_string())
            else {
                continue;
            };
            self.check_meta_definition(state, MetaCategory::Alt, &alt_id, "ALT", diagnostics, || {
                format!("Alternate '<{alt_id}>' is not listed in a valid meta-data ALT entry")
            });
        }
    }

    fn check_filter_meta(
        &self,
        state: &mut ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for filter in &record.filters {
            // PASS and missing data need no declaration
            if filter == "PASS" || filter == "." {
                continue;
            }
            self.check_meta_definition(state, MetaCategory::Filter, filter, "FILTER", diagnostics, || {
                format!("Filter '{filter}' is not listed in a valid meta-data FILTER entry")
            });
        }
    }

    fn check_info_meta(
        &self,
        state: &mut ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for (id, _) in &record.info {
            if id == "." {
                continue;
            }
            self.check_meta_definition(state, MetaCategory::Info, id, "INFO", diagnostics, || {
                format!("Info '{id}' is not listed in a valid meta-data INFO entry")
            });
        }
    }

    fn check_format_meta(
        &self,
        state: &mut ParsingState,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for field in &record.format {
            self.check_meta_definition(state, MetaCategory::Format, field, "FORMAT", diagnostics, || {
                format!("Format '{field}' is not listed in a valid meta-data FORMAT entry")
            });
        }
    }

    /// Shared memoized lookup: the first sighting of an id scans the
    /// header's entries for that category; later sightings short-circuit
    /// in O(1). The first miss emits exactly one diagnostic per file.
    fn check_meta_definition(
        &self,
        state: &mut ParsingState,
        category: MetaCategory,
        id: &str,
        column: &str,
        diagnostics: &mut Vec<Diagnostic>,
        message: impl FnOnce() -> String,
    ) {
        if state.is_well_defined_meta(category, id) || state.is_undefined_meta(category, id) {
            return;
        }

        let source = Rc::clone(&state.source);
        if is_record_subfield_in_header(id, source.meta_entries.get(category.tag())) {
            state.add_well_defined_meta(category, id);
        } else {
            state.add_undefined_meta(category, id);
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::NoMetaDefinition, state.n_lines, message())
                    .with_field(column, Some(FieldValue::Text(id.to_string()))),
            );
        }
    }
}

fn is_record_subfield_in_header(id: &str, entries: &[MetaEntry]) -> bool {
    entries.iter().any(|entry| {
        entry
            .key_values()
            .and_then(|map| map.get("ID"))
            .map(String::as_str)
            == Some(id)
    })
}
