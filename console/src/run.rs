use std::path::PathBuf;

use anyhow::anyhow;
use clap::{
    Args,
    ValueEnum,
};
use console::style;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use wavedmr::prelude::*;
use wavedmr::utils::parse_chromosome_list;

use crate::utils::{
    expand_wildcards,
    init_pbar,
    UtilsArgs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum StrandArg {
    Forward,
    Reverse,
    /// Read both strand files and merge them.
    Both,
    /// Read the already merged `mix_` files.
    Mix,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum BackendArg {
    Cpu,
    Parallel,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    #[arg(
        long,
        help = "JSON configuration. Arguments given on the command line override it."
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        help = "Write the resolved configuration to this path before running."
    )]
    save_config: Option<PathBuf>,
    #[arg(
        value_parser,
        short = 'A',
        long,
        num_args=1..,
        help = "Directories with the coverage files of the case samples."
    )]
    case:    Vec<String>,
    #[arg(
        value_parser,
        short = 'B',
        long,
        num_args=1..,
        help = "Directories with the coverage files of the control samples."
    )]
    control: Vec<String>,
    #[arg(short = 'o', long, help = "Output directory.")]
    output:  Option<PathBuf>,
    #[arg(
        short = 'c',
        long,
        help = "Chromosomes to analyse, e.g. \"1,2,X\". All chromosomes by default."
    )]
    chromosomes: Option<String>,
    #[arg(
        short,
        long,
        required = false,
        default_value_t = false,
        help = "Automatically confirm selected paths."
    )]
    force:   bool,

    #[arg(
        long,
        value_enum,
        help_heading = "INPUT ARGS",
        help = "Which coverage files to read. Defaults to both strands merged."
    )]
    strand:    Option<StrandArg>,
    #[arg(
        long,
        help_heading = "INPUT ARGS",
        help = "Directory with refmap_ucsc_chr<N>.csv gene tables for annotation."
    )]
    reference: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "INPUT ARGS",
        help = "Pool the counts of each cohort into a single sample."
    )]
    grouped:   bool,

    #[arg(
        long,
        default_value_t = false,
        help_heading = "FILTER ARGS",
        help = "Skip the mC channel."
    )]
    no_mc:        bool,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "FILTER ARGS",
        help = "Skip the hmC channel."
    )]
    no_hmc:       bool,
    #[arg(
        long,
        help_heading = "FILTER ARGS",
        help = "Minimum mC coverage of a position."
    )]
    mc_coverage:  Option<u32>,
    #[arg(
        long,
        help_heading = "FILTER ARGS",
        help = "Minimum hmC coverage of a position."
    )]
    hmc_coverage: Option<u32>,

    #[arg(
        short = 't',
        long,
        help_heading = "DETECTION ARGS",
        help = "Minimum absolute difference of cohort mean coefficients."
    )]
    threshold: Option<f32>,
    #[arg(
        short = 'l',
        long,
        help_heading = "DETECTION ARGS",
        help = "Number of Haar decomposition levels. A column spans 2^level bases."
    )]
    level:     Option<u32>,
    #[arg(
        short = 'd',
        long,
        help_heading = "DETECTION ARGS",
        help = "Minimum share of informative positions in a column, in percent."
    )]
    density:   Option<f32>,
    #[arg(
        long,
        help_heading = "DETECTION ARGS",
        help = "Minimum share of informative samples in each cohort, in percent."
    )]
    fraction:  Option<f32>,

    #[arg(
        long,
        value_enum,
        help_heading = "BACKEND ARGS",
        help = "Transform backend."
    )]
    backend:         Option<BackendArg>,
    #[arg(
        long,
        help_heading = "BACKEND ARGS",
        help = "Memory available to the transform backend, in MiB."
    )]
    memory:          Option<u64>,
    #[arg(
        long,
        help_heading = "BACKEND ARGS",
        help = "Share of the backend memory a single batch may use."
    )]
    memory_fraction: Option<f64>,
}

impl RunArgs {
    fn resolve_config(&self) -> anyhow::Result<DhunterConfig> {
        let mut config = match &self.config {
            Some(path) => DhunterConfig::from_json_file(path)?,
            None => DhunterConfig::default(),
        };

        if !self.case.is_empty() {
            config.case_dirs = expand_wildcards(self.case.clone());
        }
        if !self.control.is_empty() {
            config.control_dirs = expand_wildcards(self.control.clone());
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(list) = &self.chromosomes {
            config.chromosomes = parse_chromosome_list(list);
        }
        if let Some(strand) = self.strand {
            let (forward, reverse, premerged) = match strand {
                StrandArg::Forward => (true, false, false),
                StrandArg::Reverse => (false, true, false),
                StrandArg::Both => (true, true, false),
                StrandArg::Mix => (true, true, true),
            };
            config.forward = forward;
            config.reverse = reverse;
            config.premerged = premerged;
        }
        if self.reference.is_some() {
            config.reference_dir = self.reference.clone();
        }
        if self.grouped {
            config.sample_mode = SampleMode::Grouped;
        }

        if self.no_mc {
            config.mc.enabled = false;
        }
        if self.no_hmc {
            config.hmc.enabled = false;
        }
        if let Some(coverage) = self.mc_coverage {
            config.mc.min_coverage = coverage;
        }
        if let Some(coverage) = self.hmc_coverage {
            config.hmc.min_coverage = coverage;
        }

        if let Some(threshold) = self.threshold {
            config.dmr.diff_threshold = threshold;
        }
        if let Some(level) = self.level {
            config.dmr.dwt_level = level;
        }
        if let Some(density) = self.density {
            config.dmr.min_cpg_density = density;
        }
        if let Some(fraction) = self.fraction {
            config.dmr.min_cohort_fraction = fraction;
        }

        if let Some(backend) = self.backend {
            config.backend = match backend {
                BackendArg::Cpu => BackendKind::Cpu,
                BackendArg::Parallel => BackendKind::Parallel,
            };
        }
        if let Some(memory) = self.memory {
            config.memory_budget = memory << 20;
        }
        if let Some(fraction) = self.memory_fraction {
            config.memory_fraction = fraction;
        }
        Ok(config)
    }

    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let config = self.resolve_config()?;

        if !self.force {
            let prompt = format!(
                "Do you want to proceed with the following paths?\n\nCase: \
                 {:?}\nControl: {:?}\nOutput: {:?}",
                config.case_dirs, config.control_dirs, config.output_dir
            );
            let confirmed = Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact()
                .unwrap_or(false);

            if !confirmed {
                println!("{}", style("Process aborted by the user.").red());
                return Err(anyhow!("User aborted the process."));
            }
        }

        for path in config.case_dirs.iter().chain(config.control_dirs.iter()) {
            if !path.is_dir() {
                eprintln!("Path {} is not a directory.", style(path.display()).red());
            }
        }
        if let Some(path) = &self.save_config {
            config.to_json_file(path)?;
        }

        let n_chromosomes = config.chromosomes.len();
        let (sender, receiver) = crossbeam::channel::unbounded();
        let pipeline = DmrPipeline::try_new(config)?.with_events(sender);

        let progress_bar = if utils.progress {
            init_pbar(n_chromosomes)?
        }
        else {
            ProgressBar::hidden()
        };

        let handle = std::thread::spawn(move || pipeline.run());
        for event in receiver.iter() {
            match event {
                PipelineEvent::ChromosomeRead { chromosome, .. } => {
                    progress_bar.set_message(format!(
                        "{}",
                        style(format!("chr{}: detecting", chromosome)).blue()
                    ));
                },
                PipelineEvent::IngestionError { message, .. } => {
                    progress_bar.println(format!("{}", style(message).yellow()));
                },
                PipelineEvent::Failure {
                    chromosome,
                    channel,
                    message,
                } => {
                    progress_bar.println(format!(
                        "{}",
                        style(format!("chr{} {}: {}", chromosome, channel, message)).red()
                    ));
                },
                PipelineEvent::ChromosomeFinished { chromosome } => {
                    progress_bar.inc(1);
                    progress_bar.set_message(format!(
                        "{}",
                        style(format!("chr{}: done", chromosome)).green()
                    ));
                },
                _ => {},
            }
        }
        let summary = handle
            .join()
            .map_err(|_| anyhow!("DMR pipeline thread panicked"))??;
        progress_bar.finish();

        for outcome in summary.outcomes.iter() {
            println!(
                "chr{} {}: {}",
                outcome.chromosome,
                outcome.channel,
                style(outcome.dmr_count).bold()
            );
        }
        println!(
            "{}",
            style(format!("Found {} DMRs.", summary.total_dmrs()))
                .green()
                .bold()
        );
        if summary.aborted {
            return Err(anyhow!("Run was aborted"));
        }
        if !summary.failures.is_empty() {
            return Err(anyhow!(
                "{} channel passes failed",
                summary.failures.len()
            ));
        }
        Ok(())
    }
}
