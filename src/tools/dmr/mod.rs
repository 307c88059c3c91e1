//! Differentially methylated region calling on final-level Haar
//! coefficients.
//!
//! Columns are scored by the difference of cohort means, restricted to
//! samples with enough informative positions in the column and to columns
//! where enough of both cohorts are informative. Runs of columns whose
//! absolute difference exceeds the threshold become [`DmRegion`]s.
//!
//! [`DmRegion`]: crate::data_structs::DmRegion

mod config;
mod detector;

pub use config::DmrConfig;
pub use detector::{
    coalesce_regions,
    column_differences,
    is_candidate,
    DmrDetector,
};
