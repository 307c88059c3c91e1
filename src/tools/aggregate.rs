use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    CountType,
    PosType,
};
use crate::data_structs::{
    Channel,
    DmRegion,
    SampleSeries,
};
use crate::tools::dwt::CoefficientMatrix;

/// Descriptive statistics of one sample inside one region.
///
/// Field order is the column order of the report detail rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleRegionStats {
    /// Mean coefficient over the region's columns.
    pub dwt_value:   f32,
    /// Mean ratio over positions with coverage.
    pub ratio:       f32,
    /// Positions with non-zero channel coverage.
    pub c_positions: u32,
    pub cov_min:     CountType,
    pub cov_mid:     CountType,
    pub cov_max:     CountType,
    pub sites_c:     u32,
    pub sites_non_c: u32,
    pub sites_mc:    u32,
    pub sites_hmc:   u32,
    pub dist_min:    PosType,
    pub dist_mid:    PosType,
    pub dist_max:    PosType,
}

impl SampleRegionStats {
    pub const N_FIELDS: usize = 13;

    /// Row emitted for samples failing the coverage gate.
    pub fn zeroed() -> Self { Self::default() }

    pub fn is_zeroed(&self) -> bool { *self == Self::zeroed() }

    /// The 13 fields formatted for the report.
    pub fn fields(&self) -> [String; Self::N_FIELDS] {
        [
            self.dwt_value.to_string(),
            self.ratio.to_string(),
            self.c_positions.to_string(),
            self.cov_min.to_string(),
            self.cov_mid.to_string(),
            self.cov_max.to_string(),
            self.sites_c.to_string(),
            self.sites_non_c.to_string(),
            self.sites_mc.to_string(),
            self.sites_hmc.to_string(),
            self.dist_min.to_string(),
            self.dist_mid.to_string(),
            self.dist_max.to_string(),
        ]
    }
}

/// Per-sample region statistics with one forward-only cursor per sample.
///
/// Regions must be passed in ascending order.
pub struct RegionAggregator {
    cursors: Vec<usize>,
}

impl RegionAggregator {
    pub fn new(n_samples: usize) -> Self {
        Self {
            cursors: vec![0; n_samples],
        }
    }

    pub fn aggregate(
        &mut self,
        region: &DmRegion,
        series: &[SampleSeries],
        coefficients: &CoefficientMatrix,
        channel: Channel,
        min_coverage: CountType,
    ) -> Vec<SampleRegionStats> {
        debug_assert_eq!(series.len(), self.cursors.len());
        series
            .iter()
            .enumerate()
            .map(|(sample, s)| {
                self.sample_stats(
                    sample,
                    region,
                    s,
                    coefficients,
                    channel,
                    min_coverage,
                )
            })
            .collect()
    }

    fn sample_stats(
        &mut self,
        sample: usize,
        region: &DmRegion,
        series: &SampleSeries,
        coefficients: &CoefficientMatrix,
        channel: Channel,
        min_coverage: CountType,
    ) -> SampleRegionStats {
        let records = series.records();
        let cursor = &mut self.cursors[sample];
        while *cursor < records.len() && records[*cursor].position < region.start {
            *cursor += 1;
        }

        let width = region.width();
        let mut stats = SampleRegionStats::zeroed();
        let mut cov_min: Option<CountType> = None;
        let mut cov_sum = 0u64;
        let mut ratio_sum = 0f64;
        let mut dist_min: Option<PosType> = None;
        let mut dist_sum = 0u64;
        let mut n_dist = 0u64;

        let mut idx = *cursor;
        while idx < records.len() && records[idx].position < region.end {
            let record = &records[idx];
            let value = record.channel(channel);

            cov_min = Some(cov_min.map_or(value.coverage, |m| m.min(value.coverage)));
            stats.cov_max = stats.cov_max.max(value.coverage);
            cov_sum += value.coverage as u64;
            if value.coverage > 0 {
                ratio_sum += value.ratio as f64;
                stats.c_positions += 1;
            }

            if let Some(next) = records.get(idx + 1) {
                let spacing = next.position - record.position;
                if spacing < width {
                    dist_min = Some(dist_min.map_or(spacing, |m| m.min(spacing)));
                    stats.dist_max = stats.dist_max.max(spacing);
                    dist_sum += spacing as u64;
                    n_dist += 1;
                }
            }

            stats.sites_c += (record.count_c > 0) as u32;
            stats.sites_non_c += (record.count_non_c > 0) as u32;
            stats.sites_mc += (record.count_mc > 0) as u32;
            stats.sites_hmc += (record.count_hmc > 0) as u32;
            idx += 1;
        }

        if stats.cov_max < min_coverage {
            return SampleRegionStats::zeroed();
        }

        stats.cov_min = cov_min.unwrap_or(0);
        stats.dist_min = dist_min.unwrap_or(0);
        if stats.c_positions > 0 {
            stats.cov_mid = (cov_sum / stats.c_positions as u64) as CountType;
            stats.ratio = (ratio_sum / stats.c_positions as f64) as f32;
        }
        if n_dist > 0 {
            stats.dist_mid = (dist_sum / n_dist) as PosType;
        }

        let row = coefficients.row(sample);
        let columns = region.columns.clone();
        let n_columns = region.n_columns();
        let sum: f64 = columns
            .filter_map(|c| row.get(c).copied())
            .map(|v| v as f64)
            .sum();
        stats.dwt_value = (sum / n_columns as f64) as f32;
        stats
    }
}
