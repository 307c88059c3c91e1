//! Analysis stages and the driver that chains them.
//!
//! - [`ingest`]: concurrent per-chromosome reading of all samples
//! - [`matrix`]: dense ratio matrix over the chromosome window
//! - [`dwt`]: batched multi-level Haar decomposition
//! - [`dmr`]: cohort comparison of coefficients and region building
//! - [`annotate`]: nearest-gene annotation
//! - [`aggregate`]: per-sample statistics inside a region
//! - [`pipeline`]: chromosome-by-chromosome driver

pub mod aggregate;
pub mod annotate;
pub mod config;
pub mod dmr;
pub mod dwt;
pub mod events;
pub mod ingest;
pub mod matrix;
pub mod pipeline;
