use crate::core::meta_entry::MetaEntry;
use std::{collections::HashMap, fmt, ops::BitOr};

/// VCF specification version a file declares in its `##fileformat` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V41,
    V42,
    V43,
}

impl Version {
    /// Parses the value of a `##fileformat=` declaration.
    pub fn from_fileformat(value: &str) -> Option<Self> {
        match value {
            "VCFv4.1" => Some(Version::V41),
            "VCFv4.2" => Some(Version::V42),
            "VCFv4.3" => Some(Version::V43),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V41 => write!(f, "VCFv4.1"),
            Version::V42 => write!(f, "VCFv4.2"),
            Version::V43 => write!(f, "VCFv4.3"),
        }
    }
}

/// Bitset describing how the input was delivered. Informational only;
/// validation logic does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFormat(u8);

impl InputFormat {
    pub const VCF: InputFormat = InputFormat(0b001);
    pub const GZIP: InputFormat = InputFormat(0b010);
    pub const BGZIP: InputFormat = InputFormat(0b100);

    pub const fn empty() -> Self {
        InputFormat(0)
    }

    pub const fn contains(self, flag: InputFormat) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for InputFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        InputFormat(self.0 | rhs.0)
    }
}

/// Expected allele count per sample, with per-contig overrides
/// (e.g., 1 on Y in males).
#[derive(Debug, Clone)]
pub struct Ploidy {
    default_ploidy: u32,
    overrides: HashMap<String, u32>,
}

impl Ploidy {
    pub fn new(default_ploidy: u32, overrides: HashMap<String, u32>) -> Self {
        Ploidy {
            default_ploidy,
            overrides,
        }
    }

    pub fn ploidy_for(&self, contig: &str) -> u32 {
        self.overrides
            .get(contig)
            .copied()
            .unwrap_or(self.default_ploidy)
    }
}

/// Meta entries keyed by tag id. A tag is usually declared many times,
/// once per declared ID, so each key holds an ordered list.
#[derive(Debug, Clone, Default)]
pub struct MetaEntries {
    entries: HashMap<String, Vec<MetaEntry>>,
}

impl MetaEntries {
    pub fn append(&mut self, entry: MetaEntry) {
        self.entries.entry(entry.id.clone()).or_default().push(entry);
    }

    pub fn get(&self, id: &str) -> &[MetaEntry] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Description of one VCF file. Mutable while the header streams in;
/// frozen behind an `Rc` before the first record is built. Entries are
/// only ever appended, never removed.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub format: InputFormat,
    pub version: Version,
    pub ploidy: Ploidy,
    pub meta_entries: MetaEntries,
    pub samples: Vec<String>,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        format: InputFormat,
        version: Version,
        ploidy: Ploidy,
    ) -> Self {
        Source {
            name: name.into(),
            format,
            version,
            ploidy,
            meta_entries: MetaEntries::default(),
            samples: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::meta_entry::MetaValue;

    #[test]
    fn meta_entries_keep_one_ordered_list_per_tag() {
        let mut entries = MetaEntries::default();
        assert!(entries.is_empty());

        for contig in ["chr1", "chr2"] {
            entries.append(MetaEntry {
                line: 1,
                id: "contig".to_string(),
                value: MetaValue::KeyValue(
                    [("ID".to_string(), contig.to_string())].into_iter().collect(),
                ),
            });
        }
        entries.append(MetaEntry {
            line: 3,
            id: "reference".to_string(),
            value: MetaValue::Plain("file://genome.fa".to_string()),
        });

        assert!(entries.contains("contig"));
        assert!(!entries.contains("FILTER"));
        assert_eq!(entries.get("contig").len(), 2);
        assert_eq!(entries.get("FILTER").len(), 0);
        assert_eq!(entries.len(), 3);

        let ids: Vec<_> = entries
            .get("contig")
            .iter()
            .filter_map(|e| e.key_values().and_then(|m| m.get("ID")).cloned())
            .collect();
        assert_eq!(ids, vec!["chr1".to_string(), "chr2".to_string()]);
    }

    #[test]
    fn ploidy_lookup_prefers_overrides() {
        let ploidy = Ploidy::new(2, HashMap::from([("Y".to_string(), 1)]));
        assert_eq!(ploidy.ploidy_for("chr1"), 2);
        assert_eq!(ploidy.ploidy_for("Y"), 1);
    }

    #[test]
    fn input_format_flags_combine() {
        let format = InputFormat::VCF | InputFormat::BGZIP;
        assert!(format.contains(InputFormat::VCF));
        assert!(format.contains(InputFormat::BGZIP));
        assert!(!format.contains(InputFormat::GZIP));
        assert!(!InputFormat::empty().contains(InputFormat::VCF));
    }

    #[test]
    fn version_parses_fileformat_declarations() {
        assert_eq!(Version::from_fileformat("VCFv4.1"), Some(Version::V41));
        assert_eq!(Version::from_fileformat("VCFv4.2"), Some(Version::V42));
        assert_eq!(Version::from_fileformat("VCFv4.3"), Some(Version::V43));
        assert_eq!(Version::from_fileformat("VCFv5.0"), None);
        assert_eq!(Version::V42.to_string(), "VCFv4.2");
    }
}
