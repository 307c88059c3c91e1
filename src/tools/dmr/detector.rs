use log::debug;

use super::config::DmrConfig;
use crate::data_structs::typedef::PosType;
use crate::data_structs::{
    Cohort,
    DmRegion,
    GenomeWindow,
};
use crate::tools::dwt::CoefficientMatrix;
use crate::tools::matrix::PositionMatrix;

/// Running sums of one cohort inside one column.
#[derive(Default)]
struct CohortTally {
    size:        usize,
    informative: usize,
    sum:         f64,
}

impl CohortTally {
    fn mean(&self) -> f64 { self.sum / self.informative as f64 }

    fn is_called(
        &self,
        config: &DmrConfig,
    ) -> bool {
        self.informative > 0
            && self.informative as f32 >= config.min_samples(self.size)
    }
}

/// Cohort difference of every coefficient column, `0` for columns that are
/// not called.
///
/// A sample is informative for column `w` when enough of its informative
/// offsets fall inside `[w·step, (w+1)·step)`. Every sample keeps a cursor
/// into its index that only moves forward, so the whole pass is linear in
/// the number of columns plus informative positions.
pub fn column_differences(
    coefficients: &CoefficientMatrix,
    indices: &[Vec<u32>],
    cohorts: &[Cohort],
    config: &DmrConfig,
) -> Vec<f32> {
    let step = config.step();
    let min_positions = config.min_positions();
    let n_samples = coefficients.n_samples();
    debug_assert_eq!(indices.len(), n_samples);
    debug_assert_eq!(cohorts.len(), n_samples);

    let n_case = cohorts
        .iter()
        .filter(|c| **c == Cohort::Case)
        .count();
    let n_control = n_samples - n_case;
    let mut cursors = vec![0usize; n_samples];

    (0..coefficients.n_columns())
        .map(|column| {
            let column_end = (column as u64 + 1).saturating_mul(step);
            let mut case = CohortTally {
                size: n_case,
                ..Default::default()
            };
            let mut control = CohortTally {
                size: n_control,
                ..Default::default()
            };

            for sample in 0..n_samples {
                let index = &indices[sample];
                let cursor = &mut cursors[sample];
                let mut count = 0usize;
                while *cursor < index.len() && (index[*cursor] as u64) < column_end {
                    count += 1;
                    *cursor += 1;
                }
                if count as f32 >= min_positions {
                    let tally = match cohorts[sample] {
                        Cohort::Case => &mut case,
                        Cohort::Control => &mut control,
                    };
                    tally.informative += 1;
                    tally.sum += coefficients.get(sample, column) as f64;
                }
            }

            if case.is_called(config) && control.is_called(config) {
                (case.mean() - control.mean()) as f32
            }
            else {
                0.0
            }
        })
        .collect()
}

pub fn is_candidate(
    difference: f32,
    threshold: f32,
) -> bool {
    difference.abs() > threshold
}

fn column_position(
    window: GenomeWindow,
    column: usize,
    step: u64,
) -> PosType {
    let position = (window.lower() as u64).saturating_add((column as u64).saturating_mul(step));
    position.min(PosType::MAX as u64) as PosType
}

/// Merges runs of adjacent candidate columns into regions.
///
/// A run covering columns `first..=last` spans
/// `[lower + first·step, lower + (last+1)·step)` and takes the difference of
/// its first column.
pub fn coalesce_regions(
    differences: &[f32],
    window: GenomeWindow,
    step: u64,
    threshold: f32,
) -> Vec<DmRegion> {
    let mut regions = Vec::new();
    let mut open: Option<(usize, f32)> = None;

    let mut close = |first: usize, last: usize, difference: f32| {
        regions.push(DmRegion::new(
            column_position(window, first, step),
            column_position(window, last + 1, step),
            difference,
            first..=last,
        ));
    };

    for (column, &difference) in differences.iter().enumerate() {
        let candidate = is_candidate(difference, threshold);
        match (open, candidate) {
            (None, true) => open = Some((column, difference)),
            (Some((first, first_diff)), false) => {
                close(first, column - 1, first_diff);
                open = None;
            },
            _ => {},
        }
    }
    if let Some((first, first_diff)) = open {
        close(first, differences.len() - 1, first_diff);
    }
    regions
}

/// Runs column scoring and region coalescing for one channel pass.
#[derive(Debug, Clone)]
pub struct DmrDetector {
    config: DmrConfig,
}

impl DmrDetector {
    pub fn new(config: DmrConfig) -> Self { Self { config } }

    pub fn config(&self) -> &DmrConfig { &self.config }

    pub fn detect(
        &self,
        coefficients: &CoefficientMatrix,
        matrix: &PositionMatrix,
    ) -> Vec<DmRegion> {
        let differences = column_differences(
            coefficients,
            matrix.indices(),
            matrix.cohorts(),
            &self.config,
        );
        let regions = coalesce_regions(
            &differences,
            matrix.window(),
            self.config.step(),
            self.config.diff_threshold,
        );
        debug!(
            "{} of {} columns called, {} regions",
            differences.iter().filter(|d| **d != 0.0).count(),
            differences.len(),
            regions.len()
        );
        regions
    }
}
