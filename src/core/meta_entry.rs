use crate::core::{
    diagnostics::Diagnostic,
    predefined::{self, TagTable},
    source::Source,
};
use std::collections::BTreeMap;

/// Value of a `##` header line: a bare tag, a scalar, or a `<K=V,...>` map.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    NoValue,
    Plain(String),
    KeyValue(BTreeMap<String, String>),
}

/// One validated header line. Construction fails with a MetaSection
/// diagnostic if the value violates the per-tag schema.
#[derive(Debug, Clone)]
pub struct MetaEntry {
    pub line: u64,
    pub id: String,
    pub value: MetaValue,
}

impl PartialEq for MetaEntry {
    /// `line` is informational and excluded from equality.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.value == other.value
    }
}

impl MetaEntry {
    pub fn new(
        line: u64,
        id: impl Into<String>,
        value: MetaValue,
        source: &Source,
    ) -> Result<Self, Diagnostic> {
        let entry = MetaEntry {
            line,
            id: id.into(),
            value,
        };
        entry.check_value(source)?;
        Ok(entry)
    }

    /// The `<K=V,...>` map of this entry, if it has one.
    pub fn key_values(&self) -> Option<&BTreeMap<String, String>> {
        match &self.value {
            MetaValue::KeyValue(map) => Some(map),
            _ => None,
        }
    }

    fn check_value(&self, source: &Source) -> Result<(), Diagnostic> {
        match &self.value {
            MetaValue::NoValue => Ok(()),
            MetaValue::Plain(value) => self.check_plain(value),
            MetaValue::KeyValue(map) => self.check_key_values(map, source),
        }
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::meta_section(self.line, message)
    }

    fn check_plain(&self, value: &str) -> Result<(), Diagnostic> {
        if value.contains('\n') {
            return Err(self.error("Metadata value contains a line break"));
        }
        Ok(())
    }

    fn check_key_values(
        &self,
        map: &BTreeMap<String, String>,
        source: &Source,
    ) -> Result<(), Diagnostic> {
        match self.id.as_str() {
            "ALT" => self.check_alt(map),
            "contig" => self.check_contig(map),
            "FILTER" => self.check_filter(map),
            "FORMAT" => self.check_format(map, source),
            "INFO" => self.check_info(map, source),
            "SAMPLE" => self.check_sample(map),
            // assembly, PEDIGREE, pedigreeDB and unknown tags carry no
            // keyed schema beyond being well-formed maps
            _ => Ok(()),
        }
    }

    fn require_keys(&self, map: &BTreeMap<String, String>, keys: &[&str]) -> Result<(), Diagnostic> {
        for key in keys {
            if !map.contains_key(*key) {
                return Err(self.error(format!(
                    "{} metadata does not contain a field called '{}'",
                    self.id, key
                )));
            }
        }
        Ok(())
    }

    fn check_alt(&self, map: &BTreeMap<String, String>) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID", "Description"])?;

        // The ID prefix (up to the first colon) names the SV class
        let id_field = map.get("ID").map(String::as_str).unwrap_or("");
        let prefix = id_field.split(':').next().unwrap_or(id_field);
        match prefix {
            "DEL" | "INS" | "DUP" | "INV" | "CNV" => Ok(()),
            _ => Err(self.error("ALT metadata ID does not begin with DEL/INS/DUP/INV/CNV")),
        }
    }

    fn check_contig(&self, map: &BTreeMap<String, String>) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID"])
    }

    fn check_filter(&self, map: &BTreeMap<String, String>) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID", "Description"])
    }

    fn check_sample(&self, map: &BTreeMap<String, String>) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID"])
    }

    fn check_number(&self, map: &BTreeMap<String, String>) -> Result<(), Diagnostic> {
        let number = map.get("Number").map(String::as_str).unwrap_or("");
        if number.chars().all(|c| c.is_ascii_digit())
            || matches!(number, "A" | "R" | "G" | ".")
        {
            return Ok(());
        }
        Err(self.error(format!(
            "{} metadata Number is not a number, A, R, G or dot",
            self.id
        )))
    }

    fn check_format(
        &self,
        map: &BTreeMap<String, String>,
        source: &Source,
    ) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID", "Number", "Type", "Description"])?;
        self.check_number(map)?;

        match map.get("Type").map(String::as_str) {
            Some("Integer" | "Float" | "Character" | "String") => {}
            _ => {
                return Err(
                    self.error("FORMAT metadata Type is not a Integer, Float, Character or String")
                );
            }
        }

        let table = predefined::format_table(source.version);
        self.check_predefined_tag("FORMAT", "Type", map, table)?;
        self.check_predefined_tag("FORMAT", "Number", map, table)
    }

    fn check_info(
        &self,
        map: &BTreeMap<String, String>,
        source: &Source,
    ) -> Result<(), Diagnostic> {
        self.require_keys(map, &["ID", "Number", "Type", "Description"])?;
        self.check_number(map)?;

        match map.get("Type").map(String::as_str) {
            Some("Integer" | "Float" | "Flag" | "Character" | "String") => {}
            _ => {
                return Err(self.error(
                    "INFO metadata Type is not a Integer, Float, Flag, Character or String",
                ));
            }
        }

        let table = predefined::info_table(source.version);
        self.check_predefined_tag("INFO", "Type", map, table)?;
        self.check_predefined_tag("INFO", "Number", map, table)
    }

    fn check_predefined_tag(
        &self,
        tag_field: &str,
        key_field: &str,
        map: &BTreeMap<String, String>,
        tags: &TagTable,
    ) -> Result<(), Diagnostic> {
        let (Some(id), Some(provided)) = (map.get("ID"), map.get(key_field)) else {
            return Ok(());
        };
        if let Some((expected_type, expected_number)) = tags.get(id.as_str()) {
            let expected = if key_field == "Type" {
                expected_type
            } else {
                expected_number
            };
            if *expected != "." && *expected != provided.as_str() {
                return Err(self.error(format!(
                    "{tag_field} {id} metadata {key_field} is not {expected}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::{InputFormat, Ploidy, Version};
    use std::collections::HashMap;

    fn test_source(version: Version) -> Source {
        Source::new(
            "meta_entry_test.vcf",
            InputFormat::VCF,
            version,
            Ploidy::new(2, HashMap::new()),
        )
    }

    fn key_values(pairs: &[(&str, &str)]) -> MetaValue {
        MetaValue::KeyValue(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn no_value_entries_are_unchecked() {
        let source = test_source(Version::V41);
        assert!(MetaEntry::new(1, "phasing", MetaValue::NoValue, &source).is_ok());
    }

    #[test]
    fn plain_value_rejects_line_breaks() {
        let source = test_source(Version::V41);
        let err = MetaEntry::new(
            2,
            "reference",
            MetaValue::Plain("file://x\ny".to_string()),
            &source,
        )
        .unwrap_err();
        assert_eq!(err.message, "Metadata value contains a line break");
        assert_eq!(err.line, 2);

        assert!(
            MetaEntry::new(
                2,
                "reference",
                MetaValue::Plain("file://x".to_string()),
                &source
            )
            .is_ok()
        );
    }

    #[test]
    fn alt_requires_id_and_description() {
        let source = test_source(Version::V41);
        let err = MetaEntry::new(3, "ALT", key_values(&[("Description", "Deletion")]), &source)
            .unwrap_err();
        assert_eq!(
            err.message,
            "ALT metadata does not contain a field called 'ID'"
        );

        let err =
            MetaEntry::new(3, "ALT", key_values(&[("ID", "DEL")]), &source).unwrap_err();
        assert_eq!(
            err.message,
            "ALT metadata does not contain a field called 'Description'"
        );
    }

    #[test]
    fn alt_id_prefix_must_name_an_sv_class() {
        let source = test_source(Version::V41);
        assert!(
            MetaEntry::new(
                3,
                "ALT",
                key_values(&[("ID", "DEL:ME:ALU"), ("Description", "ALU deletion")]),
                &source
            )
            .is_ok()
        );

        let err = MetaEntry::new(
            3,
            "ALT",
            key_values(&[("ID", "TRA"), ("Description", "Translocation")]),
            &source,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "ALT metadata ID does not begin with DEL/INS/DUP/INV/CNV"
        );
    }

    #[test]
    fn contig_requires_id() {
        let source = test_source(Version::V42);
        assert!(MetaEntry::new(4, "contig", key_values(&[("ID", "chr1")]), &source).is_ok());
        let err =
            MetaEntry::new(4, "contig", key_values(&[("length", "1000")]), &source).unwrap_err();
        assert_eq!(
            err.message,
            "contig metadata does not contain a field called 'ID'"
        );
    }

    #[test]
    fn filter_requires_id_and_description() {
        let source = test_source(Version::V41);
        let err =
            MetaEntry::new(5, "FILTER", key_values(&[("ID", "q10")]), &source).unwrap_err();
        assert_eq!(
            err.message,
            "FILTER metadata does not contain a field called 'Description'"
        );
    }

    #[test]
    fn format_number_must_be_count_or_symbol() {
        let source = test_source(Version::V41);
        for number in ["0", "12", "A", "R", "G", "."] {
            assert!(
                MetaEntry::new(
                    6,
                    "FORMAT",
                    key_values(&[
                        ("ID", "XX"),
                        ("Number", number),
                        ("Type", "String"),
                        ("Description", "Custom"),
                    ]),
                    &source
                )
                .is_ok()
            );
        }

        let err = MetaEntry::new(
            6,
            "FORMAT",
            key_values(&[
                ("ID", "XX"),
                ("Number", "B"),
                ("Type", "String"),
                ("Description", "Custom"),
            ]),
            &source,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "FORMAT metadata Number is not a number, A, R, G or dot"
        );
    }

    #[test]
    fn format_type_excludes_flag() {
        let source = test_source(Version::V41);
        let err = MetaEntry::new(
            7,
            "FORMAT",
            key_values(&[
                ("ID", "XX"),
                ("Number", "1"),
                ("Type", "Flag"),
                ("Description", "Custom"),
            ]),
            &source,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "FORMAT metadata Type is not a Integer, Float, Character or String"
        );
    }

    #[test]
    fn predefined_format_tags_pin_type_and_number() {
        let source = test_source(Version::V41);
        assert!(
            MetaEntry::new(
                8,
                "FORMAT",
                key_values(&[
                    ("ID", "GT"),
                    ("Number", "1"),
                    ("Type", "String"),
                    ("Description", "Genotype"),
                ]),
                &source
            )
            .is_ok()
        );

        let err = MetaEntry::new(
            8,
            "FORMAT",
            key_values(&[
                ("ID", "GT"),
                ("Number", "1"),
                ("Type", "Integer"),
                ("Description", "Genotype"),
            ]),
            &source,
        )
        .unwrap_err();
        assert_eq!(err.message, "FORMAT GT metadata Type is not String");

        let err = MetaEntry::new(
            8,
            "FORMAT",
            key_values(&[
                ("ID", "GT"),
                ("Number", "2"),
                ("Type", "String"),
                ("Description", "Genotype"),
            ]),
            &source,
        )
        .unwrap_err();
        assert_eq!(err.message, "FORMAT GT metadata Number is not 1");
    }

    #[test]
    fn predefined_info_tags_pin_number() {
        let source = test_source(Version::V42);
        let err = MetaEntry::new(
            9,
            "INFO",
            key_values(&[
                ("ID", "AC"),
                ("Number", "1"),
                ("Type", "Integer"),
                ("Description", "Allele count"),
            ]),
            &source,
        )
        .unwrap_err();
        assert_eq!(err.message, "INFO AC metadata Number is not A");
    }

    #[test]
    fn unconstrained_table_cells_accept_anything() {
        // SB is unconstrained in v4.1/v4.2 but pinned to Integer/4 in v4.3
        let entry = key_values(&[
            ("ID", "SB"),
            ("Number", "9"),
            ("Type", "String"),
            ("Description", "Strand bias"),
        ]);

        let source = test_source(Version::V41);
        assert!(MetaEntry::new(10, "INFO", entry.clone(), &source).is_ok());

        let source = test_source(Version::V43);
        let err = MetaEntry::new(10, "INFO", entry, &source).unwrap_err();
        assert_eq!(err.message, "INFO SB metadata Type is not Integer");
    }

    #[test]
    fn sample_requires_id() {
        let source = test_source(Version::V43);
        let err = MetaEntry::new(
            11,
            "SAMPLE",
            key_values(&[("Description", "Patient")]),
            &source,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "SAMPLE metadata does not contain a field called 'ID'"
        );
    }

    #[test]
    fn pedigree_entries_have_no_keyed_schema() {
        let source = test_source(Version::V43);
        assert!(
            MetaEntry::new(12, "PEDIGREE", key_values(&[("Child", "C1")]), &source).is_ok()
        );
        assert!(
            MetaEntry::new(12, "pedigreeDB", key_values(&[("url", "db")]), &source).is_ok()
        );
    }

    #[test]
    fn equality_ignores_the_line_number() {
        let source = test_source(Version::V41);
        let a = MetaEntry::new(1, "contig", key_values(&[("ID", "chr1")]), &source).unwrap();
        let b = MetaEntry::new(99, "contig", key_values(&[("ID", "chr1")]), &source).unwrap();
        let c = MetaEntry::new(1, "contig", key_values(&[("ID", "chr2")]), &source).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
