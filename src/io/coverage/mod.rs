//! Per-sample coverage files.
//!
//! Every sample directory holds one file per chromosome and strand, named
//! `methylation_map_{forward_|reverse_|mix_}<chrom>.csv`. Each non-empty
//! line carries five integers: `position numC numNonC numMC numHMC`.

mod merge;
mod read;

use std::path::{
    Path,
    PathBuf,
};

use log::warn;
use serde::{
    Deserialize,
    Serialize,
};

pub use self::merge::{
    merge_records,
    merge_series,
};
pub use self::read::{
    parse_line,
    read_coverage_file,
    read_records,
    StrandRead,
};
use crate::data_structs::{
    SampleMeta,
    SampleSeries,
    Strand,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::ingest::AbortHandle;

/// Which strand file(s) make up a sample's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrandMode {
    Forward,
    Reverse,
    /// Forward and reverse files read separately and merged.
    Merged,
    /// Single `mix_` file holding already merged strands.
    Premerged,
}

impl StrandMode {
    pub fn from_flags(
        forward: bool,
        reverse: bool,
        premerged: bool,
    ) -> Result<Self> {
        match (forward, reverse, premerged) {
            (true, true, true) => Ok(StrandMode::Premerged),
            (true, true, false) => Ok(StrandMode::Merged),
            (true, false, _) => Ok(StrandMode::Forward),
            (false, true, _) => Ok(StrandMode::Reverse),
            (false, false, _) => {
                Err(DhunterError::invalid_parameter(
                    "strand",
                    "at least one of forward or reverse must be enabled",
                ))
            },
        }
    }

    /// Strand label of the series produced in this mode.
    pub fn series_strand(&self) -> Strand {
        match self {
            StrandMode::Forward => Strand::Forward,
            StrandMode::Reverse => Strand::Reverse,
            StrandMode::Merged | StrandMode::Premerged => Strand::Merged,
        }
    }
}

pub fn coverage_file_path(
    sample_dir: &Path,
    strand: Strand,
    chromosome: &str,
) -> PathBuf {
    sample_dir.join(format!(
        "methylation_map_{}{}.csv",
        strand.file_infix(),
        chromosome
    ))
}

/// Outcome of reading one sample on one chromosome.
///
/// `errors` only holds absorbed ingestion errors; the series is always
/// usable, possibly empty.
#[derive(Debug)]
pub struct SampleRead {
    pub series:  SampleSeries,
    pub aborted: bool,
    pub errors:  Vec<DhunterError>,
}

fn read_strand(
    sample_dir: &Path,
    chromosome: &str,
    strand: Strand,
    meta: &SampleMeta,
    abort: &AbortHandle,
) -> Result<(SampleSeries, bool)> {
    let path = coverage_file_path(sample_dir, strand, chromosome);
    let read = read_coverage_file(&path, abort)?;
    let mut meta = meta.clone();
    meta.strand = strand;
    Ok((SampleSeries::new(meta, read.records), read.aborted))
}

/// Reads the series of one sample for one chromosome.
///
/// Open failures never propagate: the sample is returned empty together
/// with the error. In [`StrandMode::Merged`] a failing strand is replaced by
/// an empty one, so the other strand is used alone.
pub fn read_sample_series(
    sample_dir: &Path,
    chromosome: &str,
    mode: StrandMode,
    mut meta: SampleMeta,
    abort: &AbortHandle,
) -> SampleRead {
    meta.strand = mode.series_strand();
    let mut errors = Vec::new();
    let mut aborted = false;

    let mut single = |strand: Strand, errors: &mut Vec<DhunterError>| {
        match read_strand(sample_dir, chromosome, strand, &meta, abort) {
            Ok((series, was_aborted)) => {
                aborted |= was_aborted;
                series
            },
            Err(e) => {
                warn!("{}", e);
                errors.push(e);
                let mut empty = meta.clone();
                empty.strand = strand;
                SampleSeries::empty(empty)
            },
        }
    };

    let mut series = match mode {
        StrandMode::Forward => single(Strand::Forward, &mut errors),
        StrandMode::Reverse => single(Strand::Reverse, &mut errors),
        StrandMode::Premerged => single(Strand::Merged, &mut errors),
        StrandMode::Merged => {
            let forward = single(Strand::Forward, &mut errors);
            let reverse = single(Strand::Reverse, &mut errors);
            merge_series(forward, reverse)
        },
    };
    series.meta_mut().strand = mode.series_strand();

    SampleRead {
        series,
        aborted,
        errors,
    }
}
