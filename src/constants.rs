/// Expected allele count for contigs without an explicit override.
pub const DEFAULT_PLOIDY: u32 = 2;
