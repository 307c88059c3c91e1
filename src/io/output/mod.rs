//! Result files.
//!
//! - [`report`]: one space-delimited report per chromosome and channel,
//!   `chromosome_<chrom>_<mc|hmc>.csv`.
//! - [`gff`]: one GFF3 file per channel for the whole run, appended to after
//!   every chromosome.

pub mod gff;
pub mod report;

pub use gff::{
    gff_path,
    DmrGffWriter,
    GffRunInfo,
};
pub use report::{
    report_path,
    DmrReportWriter,
    NO_DMRS_LINE,
};
