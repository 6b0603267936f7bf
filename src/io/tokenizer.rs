//! Splits raw VCF lines into the pieces the validation core consumes:
//! meta lines into `(id, MetaValue)`, the column header into a sample
//! list, and data lines into typed [`RecordFields`].

use crate::core::{
    diagnostics::{Diagnostic, DiagnosticKind, FieldValue},
    meta_entry::MetaValue,
    record::RecordFields,
};
use std::collections::BTreeMap;

const MANDATORY_COLUMNS: [&str; 8] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
];

/// Kind of a raw line, decided before any parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Meta,
    Header,
    Body,
}

pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with("##") {
        LineKind::Meta
    } else if line.starts_with('#') {
        LineKind::Header
    } else {
        LineKind::Body
    }
}

/// `##id=value` into `(id, MetaValue)`; `##id` alone is a bare tag.
/// Values wrapped in `<...>` are parsed as quote-aware key-value maps.
pub fn parse_meta_line(line_number: u64, line: &str) -> Result<(String, MetaValue), Diagnostic> {
    let content = line.strip_prefix("##").ok_or_else(|| {
        Diagnostic::meta_section(line_number, "Meta line does not start with '##'")
    })?;

    let Some((id, value)) = content.split_once('=') else {
        if content.is_empty() {
            return Err(Diagnostic::meta_section(line_number, "Meta line has an empty tag"));
        }
        return Ok((content.to_string(), MetaValue::NoValue));
    };
    if id.is_empty() {
        return Err(Diagnostic::meta_section(line_number, "Meta line has an empty tag"));
    }

    if value.starts_with('<') && value.ends_with('>') && value.len() >= 2 {
        let map = parse_key_values(line_number, &value[1..value.len() - 1])?;
        Ok((id.to_string(), MetaValue::KeyValue(map)))
    } else {
        Ok((id.to_string(), MetaValue::Plain(value.to_string())))
    }
}

fn parse_key_values(
    line_number: u64,
    content: &str,
) -> Result<BTreeMap<String, String>, Diagnostic> {
    let mut map = BTreeMap::new();
    for item in split_quoted(content, ',') {
        let Some((key, value)) = item.split_once('=') else {
            return Err(Diagnostic::meta_section(
                line_number,
                format!("Metadata field is not in 'key=value' format: '{item}'"),
            ));
        };
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        if map.insert(key.to_string(), value.to_string()).is_some() {
            return Err(Diagnostic::meta_section(
                line_number,
                format!("Metadata contains a duplicate field: '{key}'"),
            ));
        }
    }
    Ok(map)
}

/// Splits on `separator`, ignoring separators inside double quotes.
fn split_quoted(content: &str, separator: char) -> Vec<&str> {
    let mut items = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, c) in content.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            items.push(&content[start..index]);
            start = index + separator.len_utf8();
        }
    }
    items.push(&content[start..]);
    items
}

/// Validates the `#CHROM` column header and extracts the sample names.
pub fn parse_header_line(line_number: u64, line: &str) -> Result<Vec<String>, Diagnostic> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < MANDATORY_COLUMNS.len() || columns[..8] != MANDATORY_COLUMNS {
        return Err(Diagnostic::header_section(
            line_number,
            "The header line does not start with the mandatory columns: #CHROM, POS, ID, REF, ALT, QUAL, FILTER and INFO",
        ));
    }
    match columns.get(8) {
        None => Ok(Vec::new()),
        Some(&"FORMAT") => {
            let samples: Vec<String> = columns[9..].iter().map(|s| s.to_string()).collect();
            if samples.is_empty() {
                return Err(Diagnostic::header_section(
                    line_number,
                    "A FORMAT column requires at least one sample column",
                ));
            }
            Ok(samples)
        }
        Some(_) => Err(Diagnostic::header_section(
            line_number,
            "The ninth column of the header line must be FORMAT",
        )),
    }
}

/// Splits one data line into typed columns. Numeric parse failures map
/// to the column's own diagnostic kind.
pub fn parse_body_line(line_number: u64, line: &str) -> Result<RecordFields, Diagnostic> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 8 {
        return Err(Diagnostic::body_section(
            line_number,
            format!(
                "The data line has {} columns, but at least 8 are required",
                columns.len()
            ),
        ));
    }
    if columns.len() == 9 {
        return Err(Diagnostic::body_section(
            line_number,
            "A FORMAT column must be followed by at least one sample column",
        ));
    }

    let position = columns[1].parse::<u64>().map_err(|_| {
        Diagnostic::new(
            DiagnosticKind::Position,
            line_number,
            format!("Position '{}' is not an unsigned integer", columns[1]),
        )
        .with_field("POS", Some(FieldValue::Text(columns[1].to_string())))
    })?;

    let quality = match columns[5] {
        "." => None,
        value => Some(value.parse::<f64>().map_err(|_| {
            Diagnostic::new(
                DiagnosticKind::Quality,
                line_number,
                format!("Quality '{value}' is not a number"),
            )
            .with_field("QUAL", Some(FieldValue::Text(value.to_string())))
        })?),
    };

    let ids = if columns[2] == "." {
        Vec::new()
    } else {
        columns[2].split(';').map(str::to_string).collect()
    };

    let (format, samples) = if columns.len() > 8 {
        (
            columns[8].split(':').map(str::to_string).collect(),
            columns[9..].iter().map(|s| s.to_string()).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(RecordFields {
        chromosome: columns[0].to_string(),
        position,
        ids,
        reference_allele: columns[3].to_string(),
        alternate_alleles: columns[4].split(',').map(str::to_string).collect(),
        quality,
        filters: columns[6].split(';').map(str::to_string).collect(),
        info: parse_info(columns[7]),
        format,
        samples,
    })
}

fn parse_info(column: &str) -> Vec<(String, String)> {
    if column == "." {
        return vec![(".".to_string(), ".".to_string())];
    }
    column
        .split(';')
        .map(|item| match item.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            // flags carry no value
            None => (item.to_string(), String::new()),
        })
        .collect()
}
