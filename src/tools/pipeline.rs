//! Chromosome-by-chromosome driver.
//!
//! For every chromosome the pipeline reads all samples, then for each
//! enabled channel builds the position matrix, transforms it, detects and
//! annotates regions and writes the results. All per-chromosome state lives
//! in a [`ChromosomeContext`] that is dropped before the next chromosome is
//! read.

use std::fs;

use arcstr::ArcStr;
use crossbeam::channel::Sender;
use log::{
    error,
    info,
    warn,
};

use crate::data_structs::{
    Channel,
    GeneTable,
    GenomeWindow,
    SampleSeries,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::io::coverage::StrandMode;
use crate::io::genes::{
    gene_table_path,
    read_gene_table,
};
use crate::io::output::{
    gff_path,
    DmrGffWriter,
    DmrReportWriter,
    GffRunInfo,
};
use crate::tools::aggregate::RegionAggregator;
use crate::tools::annotate::GeneAnnotator;
use crate::tools::config::{
    ChannelSettings,
    DhunterConfig,
    SampleMode,
};
use crate::tools::dmr::DmrDetector;
use crate::tools::dwt::WaveletEngine;
use crate::tools::events::{
    EventSink,
    PipelineEvent,
};
use crate::tools::ingest::{
    AbortHandle,
    IngestionCoordinator,
    IngestionRound,
    SampleSource,
};
use crate::tools::matrix::{
    build_position_matrix,
    group_series,
};

/// DMR count of one finished channel pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutcome {
    pub chromosome: String,
    pub channel:    Channel,
    pub dmr_count:  usize,
}

/// Channel pass skipped because of a capacity or output error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub chromosome: String,
    pub channel:    Channel,
    pub message:    String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<ChannelOutcome>,
    pub failures: Vec<ChannelFailure>,
    /// The run was stopped; the interrupted chromosome produced no output.
    pub aborted:  bool,
}

impl RunSummary {
    pub fn total_dmrs(&self) -> usize {
        self.outcomes.iter().map(|o| o.dmr_count).sum()
    }

    pub fn is_success(&self) -> bool { self.failures.is_empty() && !self.aborted }
}

/// State of the chromosome being processed.
pub struct ChromosomeContext {
    pub chromosome: ArcStr,
    /// Sample series, or the two pooled cohort series in grouped mode.
    pub series:     Vec<SampleSeries>,
    pub window:     Option<GenomeWindow>,
    pub genes:      Option<GeneTable>,
}

impl ChromosomeContext {
    fn new(
        round: IngestionRound,
        config: &DhunterConfig,
        events: &EventSink,
    ) -> Self {
        let series = match config.sample_mode {
            SampleMode::Individual => round.series,
            SampleMode::Grouped => group_series(&round.series),
        };
        let genes = config.reference_dir.as_ref().and_then(|dir| {
            let path = gene_table_path(dir, &round.chromosome);
            match read_gene_table(&path, &round.chromosome) {
                Ok(table) => {
                    events.send(PipelineEvent::GenesLoaded {
                        chromosome: round.chromosome.to_string(),
                        n_genes:    table.len(),
                    });
                    Some(table)
                },
                Err(e) => {
                    warn!("{}; regions stay unannotated", e);
                    None
                },
            }
        });

        Self {
            chromosome: round.chromosome,
            series,
            window: round.window,
            genes,
        }
    }
}

pub struct DmrPipeline {
    config:      DhunterConfig,
    strand_mode: StrandMode,
    samples:     Vec<SampleSource>,
    coordinator: IngestionCoordinator,
    engine:      WaveletEngine,
    detector:    DmrDetector,
    events:      EventSink,
}

impl DmrPipeline {
    /// Validates `config` and prepares the transform backend.
    pub fn try_new(config: DhunterConfig) -> Result<Self> {
        config.validate()?;
        let engine = WaveletEngine::new(
            config.backend.build(config.memory_budget),
            config.memory_fraction,
        );
        let strand_mode = config.strand_mode()?;
        let coordinator = IngestionCoordinator::new(
            strand_mode,
            AbortHandle::default(),
            EventSink::default(),
        );
        Ok(Self {
            strand_mode,
            samples: config.samples(),
            detector: DmrDetector::new(config.dmr.clone()),
            config,
            coordinator,
            engine,
            events: EventSink::default(),
        })
    }

    /// Sends progress events to `sender`.
    pub fn with_events(
        mut self,
        sender: Sender<PipelineEvent>,
    ) -> Self {
        let events = EventSink::new(sender);
        self.coordinator = IngestionCoordinator::new(
            self.strand_mode,
            self.coordinator.abort_handle(),
            events.clone(),
        );
        self.events = events;
        self
    }

    /// Handle that stops the run from another thread.
    pub fn abort_handle(&self) -> AbortHandle { self.coordinator.abort_handle() }

    pub fn config(&self) -> &DhunterConfig { &self.config }

    pub fn run(&self) -> Result<RunSummary> {
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| DhunterError::output(&self.config.output_dir, e))?;
        info!(
            "Searching DMRs in {} chromosomes, {} case and {} control samples, {} backend",
            self.config.chromosomes.len(),
            self.config.case_dirs.len(),
            self.config.control_dirs.len(),
            self.engine.backend_name()
        );

        self.coordinator.start();
        let mut summary = RunSummary::default();
        let mut gff_counter = 0u64;

        for chromosome in self.config.chromosomes.iter() {
            let round = self.coordinator.run_round(chromosome, &self.samples);
            if round.aborted {
                warn!("Run aborted while reading chromosome {}", chromosome);
                self.events.send(PipelineEvent::Aborted {
                    chromosome: chromosome.clone(),
                });
                summary.aborted = true;
                break;
            }

            let context = ChromosomeContext::new(round, &self.config, &self.events);
            match context.window {
                Some(window) => info!("Chromosome {}: window {}", chromosome, window),
                None => warn!("Chromosome {}: no positions in any sample", chromosome),
            }

            for (channel, settings) in self.config.channels() {
                match self.process_channel(&context, channel, settings, &mut gff_counter) {
                    Ok(dmr_count) => {
                        info!(
                            "Chromosome {} {}: {}",
                            chromosome,
                            channel,
                            if dmr_count > 0 {
                                format!("{} DMRs found", dmr_count)
                            }
                            else {
                                "no DMRs were found".to_string()
                            }
                        );
                        self.events.send(PipelineEvent::ChannelFinished {
                            chromosome: chromosome.clone(),
                            channel,
                            dmr_count,
                        });
                        if dmr_count == 0 {
                            self.events.send(PipelineEvent::NoDmrsFound {
                                chromosome: chromosome.clone(),
                                channel,
                            });
                        }
                        summary.outcomes.push(ChannelOutcome {
                            chromosome: chromosome.clone(),
                            channel,
                            dmr_count,
                        });
                    },
                    Err(e) => {
                        error!("{}", e);
                        self.events.send(PipelineEvent::Failure {
                            chromosome: chromosome.clone(),
                            channel,
                            message:    e.to_string(),
                        });
                        summary.failures.push(ChannelFailure {
                            chromosome: chromosome.clone(),
                            channel,
                            message:    e.to_string(),
                        });
                    },
                }
            }

            drop(context);
            self.events.send(PipelineEvent::ChromosomeFinished {
                chromosome: chromosome.clone(),
            });
        }

        Ok(summary)
    }

    /// Runs one channel pass and writes its outputs. Returns the number of
    /// regions. Nothing is written when the transform fails or the GFF file
    /// cannot be opened.
    fn process_channel(
        &self,
        context: &ChromosomeContext,
        channel: Channel,
        settings: ChannelSettings,
        gff_counter: &mut u64,
    ) -> Result<usize> {
        let chromosome = context.chromosome.as_str();
        let detected = match context.window {
            Some(window) => {
                let matrix = build_position_matrix(
                    &context.series,
                    window,
                    channel,
                    settings.min_coverage,
                );
                let coefficients = self.engine.transform(
                    &matrix,
                    self.config.dmr.dwt_level,
                    chromosome,
                    channel,
                )?;
                let regions = self.detector.detect(&coefficients, &matrix);
                Some((coefficients, regions))
            },
            None => None,
        };

        let detected = detected.filter(|(_, regions)| !regions.is_empty());
        // Open the GFF first so a failure here leaves no report behind.
        let gff = match detected {
            Some(_) => Some(DmrGffWriter::append(&gff_path(&self.config.output_dir, channel))?),
            None => None,
        };

        let mut report = DmrReportWriter::create(
            &self.config.output_dir,
            chromosome,
            channel,
            self.config.reference_dir.is_some(),
        )?;
        let ((coefficients, mut regions), mut gff) = match detected.zip(gff) {
            Some(opened) => opened,
            None => {
                report.finish()?;
                return Ok(0);
            },
        };

        if let Some(table) = &context.genes {
            let mut annotator = GeneAnnotator::new(table);
            for region in regions.iter_mut() {
                region.gene = annotator.annotate(region);
            }
        }

        let info = GffRunInfo {
            n_samples:    context.series.len(),
            min_coverage: settings.min_coverage,
            dmr:          self.config.dmr.clone(),
        };
        let mut aggregator = RegionAggregator::new(context.series.len());
        for region in regions.iter() {
            let stats = aggregator.aggregate(
                region,
                &context.series,
                &coefficients,
                channel,
                settings.min_coverage,
            );
            report.write_region(region, &context.series, &stats)?;
            *gff_counter += 1;
            gff.write_region(chromosome, region, *gff_counter, &info)?;
        }

        report.finish()?;
        Ok(regions.len())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::*;
    use crate::data_structs::Strand;
    use crate::io::coverage::coverage_file_path;
    use crate::io::output::{
        report_path,
        NO_DMRS_LINE,
    };
    use crate::tools::dmr::DmrConfig;

    fn write_sample(
        dir: &Path,
        chromosome: &str,
        lines: &[&str],
    ) {
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(coverage_file_path(dir, Strand::Forward, chromosome), content).unwrap();
    }

    fn config(
        case: &Path,
        control: &Path,
        out: &Path,
    ) -> DhunterConfig {
        DhunterConfig::default()
            .with_case_dirs(vec![case.to_path_buf()])
            .with_control_dirs(vec![control.to_path_buf()])
            .with_chromosomes(vec!["1".to_string()])
            .with_output_dir(out.to_path_buf())
            .with_reverse(false)
            .with_mc(ChannelSettings {
                enabled:      true,
                min_coverage: 5,
            })
            .with_hmc(ChannelSettings {
                enabled:      false,
                min_coverage: 5,
            })
            .with_dmr(
                DmrConfig::default()
                    .with_diff_threshold(0.3)
                    .with_dwt_level(1)
                    .with_min_cpg_density(50.0)
                    .with_min_cohort_fraction(100.0),
            )
    }

    #[test]
    fn test_run_writes_report_and_gff() {
        let case = tempdir().unwrap();
        let control = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_sample(case.path(), "1", &[
            "10 5 3 40 10",
            "11 8 2 20 30",
            "12 0 0 0 0",
            "13 6 4 25 25",
        ]);
        write_sample(control.path(), "1", &[
            "10 9 1 5 5",
            "11 7 3 10 10",
            "12 0 0 0 0",
            "13 8 2 20 20",
        ]);

        let (sender, receiver) = crossbeam::channel::unbounded();
        let pipeline = DmrPipeline::try_new(config(case.path(), control.path(), out.path()))
            .unwrap()
            .with_events(sender);
        let summary = pipeline.run().unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.total_dmrs(), 1);
        assert_eq!(summary.outcomes[0].channel, Channel::Mc);

        let report =
            fs::read_to_string(report_path(out.path(), "1", Channel::Mc)).unwrap();
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "pos_init-pos_end methylation dwt_diff");
        assert!(lines[1].starts_with("10-12 hyper "));
        assert!(!report_path(out.path(), "1", Channel::Hmc).exists());

        let gff = fs::read_to_string(gff_path(out.path(), Channel::Mc)).unwrap();
        assert_eq!(gff.lines().count(), 1);
        assert!(gff.contains("DMR_Region:1"));

        let events = receiver.try_iter().collect::<Vec<_>>();
        assert!(events.contains(&PipelineEvent::ChannelFinished {
            chromosome: "1".to_string(),
            channel:    Channel::Mc,
            dmr_count:  1,
        }));
        assert_eq!(
            events.last(),
            Some(&PipelineEvent::ChromosomeFinished {
                chromosome: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_run_without_positions_writes_empty_report() {
        let case = tempdir().unwrap();
        let control = tempdir().unwrap();
        let out = tempdir().unwrap();

        let (sender, receiver) = crossbeam::channel::unbounded();
        let pipeline = DmrPipeline::try_new(config(case.path(), control.path(), out.path()))
            .unwrap()
            .with_events(sender);
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.total_dmrs(), 0);
        assert!(summary.failures.is_empty());
        let report =
            fs::read_to_string(report_path(out.path(), "1", Channel::Mc)).unwrap();
        assert_eq!(report.trim_end(), NO_DMRS_LINE);
        assert!(!gff_path(out.path(), Channel::Mc).exists());
        assert!(receiver
            .try_iter()
            .any(|e| matches!(e, PipelineEvent::NoDmrsFound { .. })));
    }

    #[test]
    fn test_capacity_failure_is_reported_per_channel() {
        let case = tempdir().unwrap();
        let control = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_sample(case.path(), "1", &["10 5 3 40 10", "5000 5 3 40 10"]);
        write_sample(control.path(), "1", &["10 9 1 5 5"]);

        let config = config(case.path(), control.path(), out.path())
            .with_memory_budget(1024)
            .with_memory_fraction(0.5);
        let summary = DmrPipeline::try_new(config).unwrap().run().unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].channel, Channel::Mc);
        assert!(summary.outcomes.is_empty());
        assert!(!report_path(out.path(), "1", Channel::Mc).exists());
    }

    #[test]
    fn test_unwritable_gff_leaves_no_report() {
        let case = tempdir().unwrap();
        let control = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_sample(case.path(), "1", &[
            "10 5 3 40 10",
            "11 8 2 20 30",
            "12 0 0 0 0",
            "13 6 4 25 25",
        ]);
        write_sample(control.path(), "1", &[
            "10 9 1 5 5",
            "11 7 3 10 10",
            "12 0 0 0 0",
            "13 8 2 20 20",
        ]);
        // A directory in place of the GFF file makes the append fail.
        fs::create_dir_all(gff_path(out.path(), Channel::Mc)).unwrap();

        let summary = DmrPipeline::try_new(config(case.path(), control.path(), out.path()))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].channel, Channel::Mc);
        assert!(summary.outcomes.is_empty());
        assert!(!report_path(out.path(), "1", Channel::Mc).exists());
    }

    #[test]
    fn test_stale_abort_is_cleared_by_run() {
        let case = tempdir().unwrap();
        let control = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_sample(case.path(), "1", &["10 5 3 40 10"]);
        write_sample(control.path(), "1", &["10 9 1 5 5"]);

        let pipeline =
            DmrPipeline::try_new(config(case.path(), control.path(), out.path())).unwrap();
        let abort = pipeline.abort_handle();
        abort.abort();
        let summary = pipeline.run().unwrap();
        assert!(!summary.aborted);
        assert_eq!(summary.outcomes.len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = DmrPipeline::try_new(DhunterConfig::default());
        assert!(matches!(result, Err(DhunterError::InvalidParameter { .. })));
    }
}
