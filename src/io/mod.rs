//! File input and output.
//!
//! - [`coverage`]: per-sample coverage files (`methylation_map_*.csv`), line
//!   parsing and strand merging.
//! - [`genes`]: tab-delimited reference gene tables.
//! - [`output`]: the per-chromosome DMR report and the GFF3 feature file.

pub mod coverage;
pub mod genes;
pub mod output;
