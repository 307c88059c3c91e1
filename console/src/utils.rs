use std::path::PathBuf;

use clap::Args;
use glob::glob;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use log::LevelFilter;

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        long,
        default_value_t = 0,
        help_heading = "UTILS",
        help = "Number of threads of the parallel backend. 0 uses all cores."
    )]
    pub threads:  usize,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "UTILS",
        help = "Verbose logging."
    )]
    pub verbose:  bool,
    #[arg(
        long,
        action = clap::ArgAction::Set,
        default_value_t = true,
        help_heading = "UTILS",
        help = "Show a progress bar."
    )]
    pub progress: bool,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        if self.threads > 0 {
            std::env::set_var("WAVEDMR_NUM_THREADS", self.threads.to_string());
        }
        let level = if self.verbose {
            LevelFilter::Debug
        }
        else {
            LevelFilter::Warn
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .parse_default_env()
            .try_init()?;
        Ok(())
    }
}

pub fn init_pbar(total: usize) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {pos:>5.green}/{len:5} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Reading...");
    Ok(progress_bar)
}

/// Expands `*` and `?` patterns; other paths are kept as given.
pub(crate) fn expand_wildcards(paths: Vec<String>) -> Vec<PathBuf> {
    let mut expanded_paths = Vec::new();

    for path in paths {
        if path.contains('*') || path.contains('?') {
            match glob(&path) {
                Ok(matches) => {
                    for entry in matches.filter_map(Result::ok) {
                        expanded_paths.push(entry);
                    }
                },
                Err(e) => eprintln!("Invalid pattern {}: {}", path, e),
            }
        }
        else {
            expanded_paths.push(PathBuf::from(path));
        }
    }

    expanded_paths
}
