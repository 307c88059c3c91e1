//! Sparse to dense expansion of sample series.

use arcstr::ArcStr;
use itertools::Itertools;
use log::debug;
use ndarray::{
    Array2,
    ArrayView1,
    ArrayView2,
};

use crate::data_structs::typedef::CountType;
use crate::data_structs::{
    Channel,
    Cohort,
    GenomeWindow,
    MethylationRecord,
    SampleMeta,
    SampleSeries,
    Strand,
};

pub const CASE_GROUP_NAME: &str = "case_group";
pub const CONTROL_GROUP_NAME: &str = "control_group";

/// Dense ratio arrays of all samples for one channel, plus the offsets that
/// passed the coverage threshold.
///
/// Row `i` of `values` is sample `i`; its length is
/// [`GenomeWindow::dense_len`]. Offsets not in the informative index hold 0.
#[derive(Debug, Clone)]
pub struct PositionMatrix {
    window:  GenomeWindow,
    values:  Array2<f32>,
    indices: Vec<Vec<u32>>,
    cohorts: Vec<Cohort>,
}

impl PositionMatrix {
    pub fn window(&self) -> GenomeWindow { self.window }

    pub fn values(&self) -> ArrayView2<'_, f32> { self.values.view() }

    pub fn row(
        &self,
        sample: usize,
    ) -> ArrayView1<'_, f32> {
        self.values.row(sample)
    }

    /// Ascending informative offsets of every sample.
    pub fn indices(&self) -> &[Vec<u32>] { &self.indices }

    pub fn cohorts(&self) -> &[Cohort] { &self.cohorts }

    pub fn n_samples(&self) -> usize { self.values.nrows() }

    pub fn row_len(&self) -> usize { self.values.ncols() }
}

/// Expands `series` into a [`PositionMatrix`] for `channel`.
///
/// A record contributes only when its channel coverage reaches
/// `min_coverage`.
pub fn build_position_matrix(
    series: &[SampleSeries],
    window: GenomeWindow,
    channel: Channel,
    min_coverage: CountType,
) -> PositionMatrix {
    let width = window.dense_len();
    let mut values = Array2::<f32>::zeros((series.len(), width));
    let mut indices = Vec::with_capacity(series.len());

    for (mut row, sample) in values.outer_iter_mut().zip(series) {
        let mut index = Vec::new();
        for record in sample
            .records()
            .iter()
            .filter(|r| window.contains(r.position))
        {
            let value = record.channel(channel);
            if value.coverage >= min_coverage {
                let offset = window.offset(record.position);
                row[offset] = value.ratio;
                index.push(offset as u32);
            }
        }
        indices.push(index);
    }

    debug!(
        "Built {} matrix {}x{} for window {} ({} informative positions)",
        channel,
        series.len(),
        width,
        window,
        indices.iter().map(Vec::len).sum::<usize>()
    );

    PositionMatrix {
        window,
        values,
        indices,
        cohorts: series.iter().map(|s| s.meta().cohort).collect(),
    }
}

fn pool_records<'a>(
    series: impl Iterator<Item = &'a SampleSeries>
) -> Vec<MethylationRecord> {
    series
        .map(|s| s.records().iter().copied())
        .kmerge_by(|a, b| a.position < b.position)
        .coalesce(|a, b| {
            if a.position == b.position {
                Ok(a.combine(&b))
            }
            else {
                Err((a, b))
            }
        })
        .collect()
}

/// Pools the raw counts of each cohort into one synthetic series.
///
/// Returns exactly two series, `case_group` then `control_group`.
pub fn group_series(series: &[SampleSeries]) -> Vec<SampleSeries> {
    let chromosome = series
        .first()
        .map(|s| s.meta().chromosome.clone())
        .unwrap_or_else(|| ArcStr::from(""));
    let strand = series
        .first()
        .map(|s| s.meta().strand)
        .unwrap_or(Strand::Merged);

    [
        (Cohort::Case, CASE_GROUP_NAME),
        (Cohort::Control, CONTROL_GROUP_NAME),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (cohort, name))| {
        let records = pool_records(
            series
                .iter()
                .filter(|s| s.meta().cohort == cohort),
        );
        SampleSeries::new(
            SampleMeta {
                index,
                name: name.to_string(),
                chromosome: chromosome.clone(),
                cohort,
                strand,
            },
            records,
        )
    })
    .collect()
}
