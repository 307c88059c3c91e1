use arcstr::ArcStr;
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use super::enums::{
    Channel,
    Cohort,
    Strand,
};
use super::typedef::{
    CountType,
    PosType,
    RatioType,
};

/// Ratio and coverage of one channel at one position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelValue {
    pub ratio:    RatioType,
    pub coverage: CountType,
}

impl ChannelValue {
    /// Builds the channel value from the unmodified and modified counts.
    ///
    /// Returns the value together with the modified count, which is forced
    /// to zero when there is no coverage.
    fn from_counts(
        count_c: CountType,
        modified: CountType,
    ) -> (Self, CountType) {
        let coverage = count_c.saturating_add(modified);
        if coverage > 0 {
            let value = ChannelValue {
                ratio: modified as RatioType / coverage as RatioType,
                coverage,
            };
            (value, modified)
        }
        else {
            (ChannelValue::default(), 0)
        }
    }
}

/// Read counts at one cytosine position of one sample.
///
/// Coverage of the mC channel is `C + mC` and of the hmC channel `C + hmC`;
/// non-C reads do not contribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethylationRecord {
    pub position:    PosType,
    pub count_c:     CountType,
    pub count_non_c: CountType,
    pub count_mc:    CountType,
    pub count_hmc:   CountType,
    pub mc:          ChannelValue,
    pub hmc:         ChannelValue,
}

impl MethylationRecord {
    pub fn from_counts(
        position: PosType,
        count_c: CountType,
        count_non_c: CountType,
        count_mc: CountType,
        count_hmc: CountType,
    ) -> Self {
        let (mc, count_mc) = ChannelValue::from_counts(count_c, count_mc);
        let (hmc, count_hmc) = ChannelValue::from_counts(count_c, count_hmc);
        Self {
            position,
            count_c,
            count_non_c,
            count_mc,
            count_hmc,
            mc,
            hmc,
        }
    }

    /// Sums the raw counts of two records at the same position and
    /// recomputes the ratios.
    pub fn combine(
        &self,
        other: &Self,
    ) -> Self {
        debug_assert_eq!(self.position, other.position);
        Self::from_counts(
            self.position,
            self.count_c.saturating_add(other.count_c),
            self.count_non_c
                .saturating_add(other.count_non_c),
            self.count_mc.saturating_add(other.count_mc),
            self.count_hmc
                .saturating_add(other.count_hmc),
        )
    }

    pub fn channel(
        &self,
        channel: Channel,
    ) -> &ChannelValue {
        match channel {
            Channel::Mc => &self.mc,
            Channel::Hmc => &self.hmc,
        }
    }

    /// Modified-base count of the channel (mC or hmC reads).
    pub fn modified_count(
        &self,
        channel: Channel,
    ) -> CountType {
        match channel {
            Channel::Mc => self.count_mc,
            Channel::Hmc => self.count_hmc,
        }
    }
}

/// Identity of one sample's series on one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMeta {
    /// Position of the sample in the combined case + control list.
    pub index:      usize,
    pub name:       String,
    pub chromosome: ArcStr,
    pub cohort:     Cohort,
    pub strand:     Strand,
}

/// Position-ordered records of one sample on one chromosome.
///
/// Positions are strictly increasing and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    meta:    SampleMeta,
    records: Vec<MethylationRecord>,
}

impl SampleSeries {
    /// Creates a series, restoring the ordering invariant when the records
    /// are unsorted or contain duplicated positions.
    pub fn new(
        meta: SampleMeta,
        records: Vec<MethylationRecord>,
    ) -> Self {
        let mut out = Self { meta, records };
        out.normalize();
        out
    }

    pub fn empty(meta: SampleMeta) -> Self {
        Self {
            meta,
            records: Vec::new(),
        }
    }

    fn normalize(&mut self) {
        self.records.retain(|r| r.position > 0);
        if self
            .records
            .windows(2)
            .all(|w| w[0].position < w[1].position)
        {
            return;
        }
        self.records
            .sort_by_key(|r| r.position);
        let records = std::mem::take(&mut self.records);
        self.records = records
            .into_iter()
            .coalesce(|a, b| {
                if a.position == b.position {
                    Ok(a.combine(&b))
                }
                else {
                    Err((a, b))
                }
            })
            .collect();
    }

    pub fn meta(&self) -> &SampleMeta { &self.meta }

    pub fn meta_mut(&mut self) -> &mut SampleMeta { &mut self.meta }

    pub fn records(&self) -> &[MethylationRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn first_position(&self) -> Option<PosType> {
        self.records.first().map(|r| r.position)
    }

    pub fn last_position(&self) -> Option<PosType> {
        self.records.last().map(|r| r.position)
    }

    /// `(min, max)` observed position.
    pub fn bounds(&self) -> Option<(PosType, PosType)> {
        self.first_position()
            .zip(self.last_position())
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn meta(index: usize) -> SampleMeta {
        SampleMeta {
            index,
            name: format!("sample_{}", index),
            chromosome: ArcStr::from("1"),
            cohort: Cohort::Case,
            strand: Strand::Forward,
        }
    }

    #[test]
    fn test_record_ratios() {
        let record = MethylationRecord::from_counts(10, 5, 3, 40, 10);
        assert_eq!(record.mc.coverage, 45);
        assert_approx_eq!(record.mc.ratio, 40.0 / 45.0);
        assert_eq!(record.hmc.coverage, 15);
        assert_approx_eq!(record.hmc.ratio, 10.0 / 15.0);
    }

    #[test]
    fn test_zero_coverage_forces_zero() {
        let record = MethylationRecord::from_counts(12, 0, 7, 0, 0);
        for channel in Channel::ALL {
            let value = record.channel(channel);
            assert_eq!(value.coverage, 0);
            assert_eq!(value.ratio, 0.0);
            assert_eq!(record.modified_count(channel), 0);
        }
        assert_eq!(record.count_non_c, 7);
    }

    #[test]
    fn test_combine_recomputes_ratio() {
        let a = MethylationRecord::from_counts(5, 2, 1, 2, 0);
        let b = MethylationRecord::from_counts(5, 0, 1, 4, 2);
        let c = a.combine(&b);
        assert_eq!(c.count_c, 2);
        assert_eq!(c.count_non_c, 2);
        assert_eq!(c.mc.coverage, 8);
        assert_approx_eq!(c.mc.ratio, 0.75);
        assert_eq!(c.hmc.coverage, 4);
        assert_approx_eq!(c.hmc.ratio, 0.5);
    }

    #[test]
    fn test_series_normalizes_order_and_duplicates() {
        let records = vec![
            MethylationRecord::from_counts(30, 1, 0, 1, 0),
            MethylationRecord::from_counts(10, 1, 0, 1, 0),
            MethylationRecord::from_counts(30, 1, 0, 3, 0),
            MethylationRecord::from_counts(0, 9, 0, 9, 0),
        ];
        let series = SampleSeries::new(meta(0), records);
        let positions = series
            .records()
            .iter()
            .map(|r| r.position)
            .collect_vec();
        assert_eq!(positions, vec![10, 30]);
        assert_eq!(series.records()[1].count_mc, 4);
        assert_eq!(series.bounds(), Some((10, 30)));
    }

    #[test]
    fn test_empty_series_bounds() {
        let series = SampleSeries::empty(meta(3));
        assert!(series.is_empty());
        assert_eq!(series.bounds(), None);
    }
}
