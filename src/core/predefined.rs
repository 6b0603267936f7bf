//! Reserved INFO and FORMAT keys from the VCF specifications, including
//! the structural-variant annex. Each entry maps an ID to its expected
//! `(Type, Number)`; a `"."` leaves that slot unconstrained.

use crate::core::source::Version;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub type TagTable = HashMap<&'static str, (&'static str, &'static str)>;

pub fn info_table(version: Version) -> &'static TagTable {
    match version {
        Version::V41 | Version::V42 => &INFO_V41_V42,
        Version::V43 => &INFO_V43,
    }
}

pub fn format_table(version: Version) -> &'static TagTable {
    match version {
        Version::V41 | Version::V42 => &FORMAT_V41_V42,
        Version::V43 => &FORMAT_V43,
    }
}

static INFO_V41_V42: Lazy<TagTable> = Lazy::new(|| {
    HashMap::from([
        ("AA", ("String", "1")),
        ("AC", ("Integer", "A")),
        ("AF", ("Float", "A")),
        ("AN", ("Integer", "1")),
        ("BQ", ("Float", "1")),
        ("CIGAR", ("String", "A")),
        ("DB", ("Flag", "0")),
        ("DP", ("Integer", "1")),
        ("END", ("Integer", "1")),
        ("H2", ("Flag", "0")),
        ("H3", ("Flag", "0")),
        ("MQ", ("Float", "1")),
        ("MQ0", ("Integer", "1")),
        ("NS", ("Integer", "1")),
        ("SB", (".", ".")),
        ("SOMATIC", ("Flag", "0")),
        ("VALIDATED", ("Flag", "0")),
        ("1000G", ("Flag", "0")),
        ("IMPRECISE", ("Flag", "0")),
        ("NOVEL", ("Flag", "0")),
        ("SVTYPE", ("String", "1")),
        ("SVLEN", ("Integer", ".")),
        ("CIPOS", ("Integer", "2")),
        ("CIEND", ("Integer", "2")),
        ("HOMLEN", ("Integer", ".")),
        ("HOMSEQ", ("String", ".")),
        ("BKPTID", ("String", ".")),
        ("MEINFO", ("String", "4")),
        ("METRANS", ("String", "4")),
        ("DGVID", ("String", "1")),
        ("DBVARID", ("String", "1")),
        ("DBRIPID", ("String", "1")),
        ("MATEID", ("String", ".")),
        ("PARID", ("String", "1")),
        ("EVENT", ("String", "1")),
        ("CILEN", ("Integer", "2")),
        ("DPADJ", ("Integer", ".")),
        ("CN", ("Integer", "1")),
        ("CNADJ", ("Integer", ".")),
        ("CICN", ("Integer", "2")),
        ("CICNADJ", ("Integer", ".")),
    ])
});

static INFO_V43: Lazy<TagTable> = Lazy::new(|| {
    let mut table = INFO_V41_V42.clone();
    table.insert("AD", ("Integer", "R"));
    table.insert("ADF", ("Integer", "R"));
    table.insert("ADR", ("Integer", "R"));
    table.insert("SB", ("Integer", "4"));
    table
});

static FORMAT_V41_V42: Lazy<TagTable> = Lazy::new(|| {
    HashMap::from([
        ("DP", ("Integer", "1")),
        ("EC", ("Integer", "A")),
        ("FT", ("String", "1")),
        ("GL", ("Float", "G")),
        ("GLE", ("String", ".")),
        ("GP", ("Float", "G")),
        ("GQ", ("Integer", "1")),
        ("GT", ("String", "1")),
        ("HQ", ("Integer", "2")),
        ("MQ", ("Integer", "1")),
        ("PL", ("Integer", "G")),
        ("PQ", ("Integer", "1")),
        ("PS", ("Integer", "1")),
        ("CN", ("Integer", "1")),
        ("CNQ", ("Float", "1")),
        ("CNL", ("Float", ".")),
        ("NQ", ("Integer", "1")),
        ("HAP", ("Integer", "1")),
        ("AHAP", ("Integer", "1")),
    ])
});

static FORMAT_V43: Lazy<TagTable> = Lazy::new(|| {
    let mut table = FORMAT_V41_V42.clone();
    table.remove("GLE");
    table.insert("AD", ("Integer", "R"));
    table.insert("ADF", ("Integer", "R"));
    table.insert("ADR", ("Integer", "R"));
    table.insert("CNL", ("Float", "G"));
    table.insert("CNP", ("Float", "G"));
    table
});
