//! # wavedmr
//!
//! `wavedmr` finds Differentially Methylated Regions (DMRs) between a *case*
//! and a *control* cohort from per-sample, per-chromosome cytosine coverage
//! files. Both 5-methylcytosine (mC) and 5-hydroxymethylcytosine (hmC)
//! channels are supported.
//!
//! For every chromosome the crate:
//!
//! 1. reads each sample's coverage file(s) concurrently, merging forward and
//!    reverse strands when requested ([`io::coverage`],
//!    [`tools::ingest`]);
//! 2. expands the sparse records into dense, window-aligned ratio arrays
//!    ([`tools::matrix`]);
//! 3. applies a multi-level Haar decomposition per sample, batched to fit a
//!    memory budget ([`tools::dwt`]);
//! 4. compares density-gated cohort means of the final-level coefficients and
//!    coalesces the columns exceeding the threshold into regions
//!    ([`tools::dmr`]);
//! 5. optionally annotates regions with the nearest reference gene
//!    ([`tools::annotate`]) and summarizes every sample inside every region
//!    ([`tools::aggregate`]);
//! 6. writes a per-chromosome report and appends GFF3 features
//!    ([`io::output`]).
//!
//! The whole flow is driven by [`DmrPipeline`], one chromosome at a time.
//!
//! Number of threads used by the parallel transform backend can be configured
//! with the `WAVEDMR_NUM_THREADS` environment variable.
//!
//! ## Usage
//!
//! ```no_run
//! use wavedmr::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DhunterConfig::default()
//!         .with_case_dirs(vec!["data/case_1".into(), "data/case_2".into()])
//!         .with_control_dirs(vec!["data/control_1".into()])
//!         .with_chromosomes(vec!["1".to_string(), "2".to_string()])
//!         .with_output_dir("results".into());
//!
//!     let pipeline = DmrPipeline::try_new(config)?;
//!     let summary = pipeline.run()?;
//!     println!("Found {} DMRs", summary.total_dmrs());
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod error;
pub mod io;
pub mod prelude;
pub mod tools;
pub mod utils;

pub use crate::data_structs::{
    Channel,
    Cohort,
    DmRegion,
    GeneRecord,
    GeneTable,
    GenomeWindow,
    MethylationRecord,
    Polarity,
    SampleSeries,
    Strand,
};
pub use crate::error::{
    DhunterError,
    Result,
};
pub use crate::tools::config::DhunterConfig;
pub use crate::tools::dmr::DmrConfig;
pub use crate::tools::pipeline::{
    DmrPipeline,
    RunSummary,
};
