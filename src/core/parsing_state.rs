use crate::core::source::Source;
use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

/// Meta-entry categories a record can cross-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaCategory {
    Contig,
    Alt,
    Filter,
    Info,
    Format,
}

impl MetaCategory {
    /// The tag id this category is declared under in the meta section.
    pub fn tag(self) -> &'static str {
        match self {
            MetaCategory::Contig => "contig",
            MetaCategory::Alt => "ALT",
            MetaCategory::Filter => "FILTER",
            MetaCategory::Info => "INFO",
            MetaCategory::Format => "FORMAT",
        }
    }
}

/// Per-file accumulator: current line number plus memoized results of
/// cross-reference checks. A `(category, id)` pair lives in at most one
/// of the two sets, so every id is scanned against the header once.
#[derive(Debug)]
pub struct ParsingState {
    pub n_lines: u64,
    pub source: Rc<Source>,
    well_defined_meta: HashMap<MetaCategory, HashSet<String>>,
    undefined_meta: HashMap<MetaCategory, HashSet<String>>,
}

impl ParsingState {
    pub fn new(source: Rc<Source>) -> Self {
        ParsingState {
            n_lines: 0,
            source,
            well_defined_meta: HashMap::new(),
            undefined_meta: HashMap::new(),
        }
    }

    pub fn add_well_defined_meta(&mut self, category: MetaCategory, id: &str) {
        debug_assert!(!self.is_undefined_meta(category, id));
        self.well_defined_meta
            .entry(category)
            .or_default()
            .insert(id.to_string());
    }

    pub fn is_well_defined_meta(&self, category: MetaCategory, id: &str) -> bool {
        self.well_defined_meta
            .get(&category)
            .map_or(false, |ids| ids.contains(id))
    }

    pub fn add_undefined_meta(&mut self, category: MetaCategory, id: &str) {
        debug_assert!(!self.is_well_defined_meta(category, id));
        self.undefined_meta
            .entry(category)
            .or_default()
            .insert(id.to_string());
    }

    pub fn is_undefined_meta(&self, category: MetaCategory, id: &str) -> bool {
        self.undefined_meta
            .get(&category)
            .map_or(false, |ids| ids.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::{InputFormat, Ploidy, Version};
    use std::collections::HashMap as StdHashMap;

    fn test_state() -> ParsingState {
        ParsingState::new(Rc::new(Source::new(
            "state_test.vcf",
            InputFormat::VCF,
            Version::V42,
            Ploidy::new(2, StdHashMap::new()),
        )))
    }

    #[test]
    fn memoization_sets_start_empty() {
        let state = test_state();
        assert!(!state.is_well_defined_meta(MetaCategory::Contig, "chr1"));
        assert!(!state.is_undefined_meta(MetaCategory::Contig, "chr1"));
    }

    #[test]
    fn categories_do_not_leak_into_each_other() {
        let mut state = test_state();
        state.add_well_defined_meta(MetaCategory::Filter, "q10");
        assert!(state.is_well_defined_meta(MetaCategory::Filter, "q10"));
        assert!(!state.is_well_defined_meta(MetaCategory::Info, "q10"));
    }

    #[test]
    fn ids_land_in_exactly_one_set() {
        let mut state = test_state();
        state.add_well_defined_meta(MetaCategory::Contig, "chr1");
        state.add_undefined_meta(MetaCategory::Contig, "chr2");
        assert!(state.is_well_defined_meta(MetaCategory::Contig, "chr1"));
        assert!(!state.is_undefined_meta(MetaCategory::Contig, "chr1"));
        assert!(state.is_undefined_meta(MetaCategory::Contig, "chr2"));
        assert!(!state.is_well_defined_meta(MetaCategory::Contig, "chr2"));
    }

    #[test]
    fn category_tags_match_their_meta_ids() {
        assert_eq!(MetaCategory::Contig.tag(), "contig");
        assert_eq!(MetaCategory::Alt.tag(), "ALT");
        assert_eq!(MetaCategory::Format.tag(), "FORMAT");
    }
}
