use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::dwt::MAX_DWT_LEVEL;
use crate::with_field_fn;

/// Parameters of DMR detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmrConfig {
    /// Minimum absolute cohort difference, in ratio units. Strict.
    pub diff_threshold:      f32,
    /// Number of Haar levels. Each coefficient column covers `2^level`
    /// positions.
    pub dwt_level:           u32,
    /// Percentage of a column's positions a sample must cover to be
    /// informative.
    pub min_cpg_density:     f32,
    /// Percentage of each cohort that must be informative for a column to be
    /// called.
    pub min_cohort_fraction: f32,
}

impl DmrConfig {
    with_field_fn!(diff_threshold, f32);

    with_field_fn!(dwt_level, u32);

    with_field_fn!(min_cpg_density, f32);

    with_field_fn!(min_cohort_fraction, f32);

    /// Genomic positions per coefficient column.
    pub fn step(&self) -> u64 { 1u64 << self.dwt_level.min(63) }

    /// Informative positions a sample needs inside one column.
    pub fn min_positions(&self) -> f32 {
        self.min_cpg_density / 100.0 * self.step() as f32
    }

    /// Informative samples a cohort of `cohort_size` needs for a column.
    pub fn min_samples(
        &self,
        cohort_size: usize,
    ) -> f32 {
        self.min_cohort_fraction / 100.0 * cohort_size as f32
    }

    pub fn validate(&self) -> Result<()> {
        if !self.diff_threshold.is_finite() || self.diff_threshold < 0.0 {
            return Err(DhunterError::invalid_parameter(
                "diff_threshold",
                format!("must be a non-negative number, got {}", self.diff_threshold),
            ));
        }
        if !(1..=MAX_DWT_LEVEL).contains(&self.dwt_level) {
            return Err(DhunterError::invalid_parameter(
                "dwt_level",
                format!("must be in 1..={}, got {}", MAX_DWT_LEVEL, self.dwt_level),
            ));
        }
        for (name, value) in [
            ("min_cpg_density", self.min_cpg_density),
            ("min_cohort_fraction", self.min_cohort_fraction),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(DhunterError::invalid_parameter(
                    name,
                    format!("must be a percentage in 0..=100, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

impl Default for DmrConfig {
    fn default() -> Self {
        Self {
            diff_threshold:      0.2,
            dwt_level:           4,
            min_cpg_density:     10.0,
            min_cohort_fraction: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_step_and_minimums() {
        let config = DmrConfig::default()
            .with_dwt_level(3)
            .with_min_cpg_density(25.0)
            .with_min_cohort_fraction(50.0);
        assert_eq!(config.step(), 8);
        assert_eq!(config.min_positions(), 2.0);
        assert_eq!(config.min_samples(5), 2.5);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::negative_threshold(DmrConfig::default().with_diff_threshold(-0.1))]
    #[case::nan_threshold(DmrConfig::default().with_diff_threshold(f32::NAN))]
    #[case::level_zero(DmrConfig::default().with_dwt_level(0))]
    #[case::level_too_deep(DmrConfig::default().with_dwt_level(MAX_DWT_LEVEL + 1))]
    #[case::density(DmrConfig::default().with_min_cpg_density(120.0))]
    #[case::fraction(DmrConfig::default().with_min_cohort_fraction(-1.0))]
    fn test_validate_rejects(#[case] config: DmrConfig) {
        assert!(matches!(
            config.validate(),
            Err(DhunterError::InvalidParameter { .. })
        ));
    }
}
