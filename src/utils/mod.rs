//! Utility functions and helper macros shared across the crate.
//!
//! - The rayon thread pool used by the parallel transform backend.
//! - Builder-style `with_*` macro for configuration structs.
//! - Chromosome list parsing and labelling helpers.

use itertools::Itertools;
use once_cell::sync::Lazy;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var("WAVEDMR_NUM_THREADS")
        .ok()
        .and_then(|str| str.parse::<usize>().ok());
    ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .expect("Failed to create thread pool")
});

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
            self.$field_name = value;
            self
            }
        }
    };
}
pub use with_field_fn;

/// Chromosomes analysed when the whole genome is requested: autosomes
/// `1..=22` followed by `23` (X) and `24` (Y).
pub fn all_chromosomes() -> Vec<String> {
    (1..=24).map(|n: u32| n.to_string()).collect()
}

/// Parses a user supplied chromosome list such as `"1, 2 5;X chr7"`.
///
/// Separators are commas, semicolons and whitespace. A leading `chr` is
/// stripped and duplicates are dropped, keeping the first occurrence.
pub fn parse_chromosome_list(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.strip_prefix("chr").unwrap_or(s).to_string())
        .filter(|s| !s.is_empty())
        .unique()
        .collect()
}

/// `chr`-prefixed label of a chromosome name.
pub fn chr_label(chromosome: &str) -> String {
    if chromosome.starts_with("chr") {
        chromosome.to_string()
    }
    else {
        format!("chr{}", chromosome)
    }
}
