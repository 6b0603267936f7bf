use crate::{
    cli::CheckArgs,
    core::{
        diagnostics::{Diagnostic, Severity},
        meta_entry::{MetaEntry, MetaValue},
        parsing_state::ParsingState,
        policy::ValidateOptionalPolicy,
        record::Record,
        source::{Ploidy, Source, Version},
    },
    io::{
        readers::open_vcf_reader,
        report::{ReportWriter, StdoutReportWriter, TextReportWriter},
        tokenizer::{self, LineKind},
    },
    utils::util::Result,
};
use std::{fs::File, io::BufRead, path::Path, rc::Rc};

/// Error/warning tallies for one validation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    fn absorb(&mut self, other: ValidationSummary) {
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

pub fn check(args: CheckArgs) -> Result<ValidationSummary> {
    let vcf_paths = args.process_vcf_paths()?;
    let ploidy = Ploidy::new(args.ploidy, args.ploidy_overrides());
    let policy = ValidateOptionalPolicy::new(args.strict_ploidy);

    let mut report: Box<dyn ReportWriter> = match args.report.as_ref() {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| crate::vcx_error!("Failed to create report file {path}: {e}"))?;
            Box::new(TextReportWriter::new(file))
        }
        None => Box::new(StdoutReportWriter),
    };

    let mut summary = ValidationSummary::default();
    for path in &vcf_paths {
        log::info!("Validating {}", path.display());
        let file_summary = check_file(path, &ploidy, &policy, report.as_mut())?;
        log::info!(
            "{}: {} error(s), {} warning(s)",
            path.display(),
            file_summary.errors,
            file_summary.warnings
        );
        summary.absorb(file_summary);
    }
    Ok(summary)
}

fn emit(report: &mut dyn ReportWriter, summary: &mut ValidationSummary, diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Error => {
            report.write_error(diagnostic);
            summary.errors += 1;
        }
        Severity::Warning => {
            report.write_warning(diagnostic);
            summary.warnings += 1;
        }
    }
}

fn parse_fileformat(line: &str) -> Option<(Version, &str)> {
    let value = line.strip_prefix("##fileformat=")?;
    Version::from_fileformat(value).map(|version| (version, value))
}

/// Validates one file from start to finish. Diagnostics go to the
/// report sink; the returned error covers I/O failures only.
pub fn check_file(
    path: &Path,
    ploidy: &Ploidy,
    policy: &ValidateOptionalPolicy,
    report: &mut dyn ReportWriter,
) -> Result<ValidationSummary> {
    let (reader, format) = open_vcf_reader(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut summary = ValidationSummary::default();
    let mut lines = reader.lines();

    // Nothing is checkable until the version is known, so the
    // fileformat declaration must come first.
    let first_line = match lines.next() {
        Some(line) => {
            line.map_err(|e| crate::vcx_error!("Error reading line 1 of {}: {e}", path.display()))?
        }
        None => {
            emit(
                report,
                &mut summary,
                &Diagnostic::meta_section(1, "The file is empty; a fileformat declaration is required"),
            );
            return Ok(summary);
        }
    };
    let Some((version, fileformat)) = parse_fileformat(first_line.trim_end_matches('\r')) else {
        emit(
            report,
            &mut summary,
            &Diagnostic::meta_section(
                1,
                "The first line must be a valid ##fileformat declaration (VCFv4.1, VCFv4.2 or VCFv4.3)",
            ),
        );
        return Ok(summary);
    };
    log::debug!("{name}: detected {version}");

    let mut source = Source::new(name, format, version, ploidy.clone());
    match MetaEntry::new(1, "fileformat", MetaValue::Plain(fileformat.to_string()), &source) {
        Ok(entry) => source.meta_entries.append(entry),
        Err(diagnostic) => emit(report, &mut summary, &diagnostic),
    }

    let mut builder = Some(source);
    let mut state: Option<ParsingState> = None;
    let mut n_lines: u64 = 1;

    for line in lines {
        n_lines += 1;
        let line = line
            .map_err(|e| crate::vcx_error!("Error reading line {n_lines} of {}: {e}", path.display()))?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let kind = tokenizer::classify_line(line);

        // A data section without a #CHROM line is reported once, then
        // records are still validated against the header seen so far.
        if kind == LineKind::Body && state.is_none() {
            emit(
                report,
                &mut summary,
                &Diagnostic::header_section(n_lines, "The data section starts without a header line"),
            );
            if let Some(source) = builder.take() {
                state = Some(close_header(source, n_lines, policy, report, &mut summary));
            }
        }

        match kind {
            LineKind::Meta => match builder.as_mut() {
                Some(source) => match tokenizer::parse_meta_line(n_lines, line) {
                    Ok((id, value)) => match MetaEntry::new(n_lines, id, value, source) {
                        Ok(entry) => source.meta_entries.append(entry),
                        Err(diagnostic) => emit(report, &mut summary, &diagnostic),
                    },
                    Err(diagnostic) => emit(report, &mut summary, &diagnostic),
                },
                None => emit(
                    report,
                    &mut summary,
                    &Diagnostic::meta_section(n_lines, "Meta line found after the header line"),
                ),
            },
            LineKind::Header => match builder.take() {
                Some(mut source) => {
                    match tokenizer::parse_header_line(n_lines, line) {
                        Ok(samples) => source.samples = samples,
                        Err(diagnostic) => emit(report, &mut summary, &diagnostic),
                    }
                    state = Some(close_header(source, n_lines, policy, report, &mut summary));
                }
                None => emit(
                    report,
                    &mut summary,
                    &Diagnostic::header_section(n_lines, "Duplicate header line"),
                ),
            },
            LineKind::Body => {
                if let Some(state) = state.as_mut() {
                    state.n_lines = n_lines;
                    match tokenizer::parse_body_line(n_lines, line) {
                        Err(diagnostic) => emit(report, &mut summary, &diagnostic),
                        Ok(fields) => {
                            match Record::new(n_lines, fields, Rc::clone(&state.source)) {
                                Err(diagnostic) => emit(report, &mut summary, &diagnostic),
                                Ok(record) => {
                                    for diagnostic in
                                        policy.optional_check_body_entry(state, &record)
                                    {
                                        emit(report, &mut summary, &diagnostic);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    match state.as_mut() {
        Some(state) => {
            state.n_lines = n_lines;
            for diagnostic in policy.optional_check_body_section(state) {
                emit(report, &mut summary, &diagnostic);
            }
        }
        None => {
            // The file ended while still inside the meta section
            emit(
                report,
                &mut summary,
                &Diagnostic::header_section(n_lines, "The header line is missing"),
            );
            if let Some(source) = builder.take() {
                close_header(source, n_lines, policy, report, &mut summary);
            }
        }
    }

    Ok(summary)
}

/// Freezes the source at the end of the header phase and runs the
/// meta-section policy against it.
fn close_header(
    source: Source,
    n_lines: u64,
    policy: &ValidateOptionalPolicy,
    report: &mut dyn ReportWriter,
    summary: &mut ValidationSummary,
) -> ParsingState {
    let mut state = ParsingState::new(Rc::new(source));
    state.n_lines = n_lines;
    for diagnostic in policy.optional_check_meta_section(&state) {
        emit(report, summary, &diagnostic);
    }
    state
}
