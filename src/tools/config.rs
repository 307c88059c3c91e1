use std::fs::File;
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use serde::{
    Deserialize,
    Serialize,
};

pub use crate::tools::dwt::BackendKind;
use crate::data_structs::typedef::CountType;
use crate::data_structs::{
    Channel,
    Cohort,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::io::coverage::StrandMode;
use crate::tools::dmr::DmrConfig;
use crate::tools::ingest::SampleSource;
use crate::utils::all_chromosomes;
use crate::with_field_fn;

/// Whether and how a channel is analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub enabled:      bool,
    /// Reads a position needs in this channel to be used.
    pub min_coverage: CountType,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            enabled:      true,
            min_coverage: 10,
        }
    }
}

/// Detection on every sample or on cohort-pooled counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    #[default]
    Individual,
    /// Case and control counts are summed into two synthetic samples.
    Grouped,
}

/// Parameters of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhunterConfig {
    pub case_dirs:       Vec<PathBuf>,
    pub control_dirs:    Vec<PathBuf>,
    /// Chromosome names without the `chr` prefix.
    pub chromosomes:     Vec<String>,
    pub output_dir:      PathBuf,
    pub forward:         bool,
    pub reverse:         bool,
    /// Read the `mix_` files instead of merging forward and reverse.
    pub premerged:       bool,
    pub mc:              ChannelSettings,
    pub hmc:             ChannelSettings,
    pub dmr:             DmrConfig,
    pub sample_mode:     SampleMode,
    /// Directory with `refmap_ucsc_chr<N>.csv` gene tables.
    pub reference_dir:   Option<PathBuf>,
    /// Memory of the transform backend, in bytes.
    pub memory_budget:   u64,
    /// Share of `memory_budget` a single batch may use.
    pub memory_fraction: f64,
    pub backend:         BackendKind,
}

impl Default for DhunterConfig {
    fn default() -> Self {
        Self {
            case_dirs:       Vec::new(),
            control_dirs:    Vec::new(),
            chromosomes:     all_chromosomes(),
            output_dir:      PathBuf::from("."),
            forward:         true,
            reverse:         true,
            premerged:       false,
            mc:              ChannelSettings::default(),
            hmc:             ChannelSettings::default(),
            dmr:             DmrConfig::default(),
            sample_mode:     SampleMode::default(),
            reference_dir:   None,
            memory_budget:   1 << 30,
            memory_fraction: 0.4,
            backend:         BackendKind::default(),
        }
    }
}

impl DhunterConfig {
    with_field_fn!(case_dirs, Vec<PathBuf>);

    with_field_fn!(control_dirs, Vec<PathBuf>);

    with_field_fn!(chromosomes, Vec<String>);

    with_field_fn!(output_dir, PathBuf);

    with_field_fn!(forward, bool);

    with_field_fn!(reverse, bool);

    with_field_fn!(premerged, bool);

    with_field_fn!(mc, ChannelSettings);

    with_field_fn!(hmc, ChannelSettings);

    with_field_fn!(dmr, DmrConfig);

    with_field_fn!(sample_mode, SampleMode);

    with_field_fn!(reference_dir, Option<PathBuf>);

    with_field_fn!(memory_budget, u64);

    with_field_fn!(memory_fraction, f64);

    with_field_fn!(backend, BackendKind);

    pub fn strand_mode(&self) -> Result<StrandMode> {
        StrandMode::from_flags(self.forward, self.reverse, self.premerged)
    }

    pub fn channel_settings(
        &self,
        channel: Channel,
    ) -> ChannelSettings {
        match channel {
            Channel::Mc => self.mc,
            Channel::Hmc => self.hmc,
        }
    }

    /// Enabled channels, mC first.
    pub fn channels(&self) -> Vec<(Channel, ChannelSettings)> {
        Channel::ALL
            .into_iter()
            .map(|c| (c, self.channel_settings(c)))
            .filter(|(_, s)| s.enabled)
            .collect()
    }

    /// Case samples followed by control samples, named after their
    /// directories.
    pub fn samples(&self) -> Vec<SampleSource> {
        self.case_dirs
            .iter()
            .map(|d| (d, Cohort::Case))
            .chain(self.control_dirs.iter().map(|d| (d, Cohort::Control)))
            .enumerate()
            .map(|(index, (dir, cohort))| {
                SampleSource {
                    index,
                    name: sample_name(dir, index),
                    dir: dir.clone(),
                    cohort,
                }
            })
            .collect()
    }

    pub fn n_samples(&self) -> usize { self.case_dirs.len() + self.control_dirs.len() }

    pub fn validate(&self) -> Result<()> {
        if self.case_dirs.is_empty() {
            return Err(DhunterError::invalid_parameter(
                "case_dirs",
                "at least one case sample is required",
            ));
        }
        if self.control_dirs.is_empty() {
            return Err(DhunterError::invalid_parameter(
                "control_dirs",
                "at least one control sample is required",
            ));
        }
        if self.chromosomes.is_empty() {
            return Err(DhunterError::invalid_parameter(
                "chromosomes",
                "no chromosome selected",
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(DhunterError::invalid_parameter(
                "output_dir",
                "must not be empty",
            ));
        }
        if self.channels().is_empty() {
            return Err(DhunterError::invalid_parameter(
                "channels",
                "at least one of mC or hmC must be enabled",
            ));
        }
        self.strand_mode()?;
        self.dmr.validate()?;
        if !(self.memory_fraction > 0.0 && self.memory_fraction <= 1.0) {
            return Err(DhunterError::invalid_parameter(
                "memory_fraction",
                format!("must be in (0, 1], got {}", self.memory_fraction),
            ));
        }
        if self.memory_budget == 0 {
            return Err(DhunterError::invalid_parameter(
                "memory_budget",
                "must be positive",
            ));
        }
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open config {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json_file(
        &self,
        path: &Path,
    ) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

fn sample_name(
    dir: &Path,
    index: usize,
) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("sample_{}", index))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::tempdir;

    use super::*;

    fn config() -> DhunterConfig {
        DhunterConfig::default()
            .with_case_dirs(vec!["/data/case_a".into(), "/data/case_b".into()])
            .with_control_dirs(vec!["/data/ctrl_a".into()])
            .with_chromosomes(vec!["1".to_string()])
    }

    #[test]
    fn test_samples_order_and_names() {
        let samples = config().samples();
        let names = samples.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["case_a", "case_b", "ctrl_a"]);
        assert_eq!(samples[2].cohort, Cohort::Control);
        assert_eq!(samples[2].index, 2);
    }

    #[test]
    fn test_channels() {
        let config = config().with_mc(ChannelSettings {
            enabled:      false,
            min_coverage: 5,
        });
        assert_eq!(config.channels().len(), 1);
        assert_eq!(config.channels()[0].0, Channel::Hmc);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::no_cases(config().with_case_dirs(vec![]))]
    #[case::no_controls(config().with_control_dirs(vec![]))]
    #[case::no_chromosomes(config().with_chromosomes(vec![]))]
    #[case::no_strand(config().with_forward(false).with_reverse(false))]
    #[case::bad_fraction(config().with_memory_fraction(1.5))]
    #[case::no_memory(config().with_memory_budget(0))]
    #[case::bad_dmr(config().with_dmr(DmrConfig::default().with_dwt_level(0)))]
    #[case::no_channel(
        config()
            .with_mc(ChannelSettings { enabled: false, min_coverage: 1 })
            .with_hmc(ChannelSettings { enabled: false, min_coverage: 1 })
    )]
    fn test_validate_rejects(#[case] config: DhunterConfig) {
        assert!(matches!(
            config.validate(),
            Err(DhunterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = config()
            .with_sample_mode(SampleMode::Grouped)
            .with_backend(BackendKind::Cpu);
        config.to_json_file(&path).unwrap();
        let loaded = DhunterConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DhunterConfig =
            serde_json::from_str(r#"{"case_dirs": ["a"], "dmr": {"dwt_level": 3}}"#).unwrap();
        assert_eq!(config.dmr.dwt_level, 3);
        assert_eq!(config.dmr.diff_threshold, DmrConfig::default().diff_threshold);
        assert_eq!(config.chromosomes.len(), 24);
        assert!(config.forward);
    }
}
