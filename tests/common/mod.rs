#![allow(dead_code)]

use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use tempfile::TempDir;
use wavedmr::io::coverage::coverage_file_path;
use wavedmr::prelude::*;

/// `position numC numNonC numMC numHMC` rows of a case sample that differs
/// from [`CONTROL_ROWS`] on the first two positions.
pub const CASE_ROWS: [&str; 4] = ["10 5 3 40 10", "11 8 2 20 30", "12 0 0 0 0", "13 6 4 25 25"];
pub const CONTROL_ROWS: [&str; 4] = ["10 9 1 5 5", "11 7 3 10 10", "12 0 0 0 0", "13 8 2 20 20"];

pub fn write_coverage(
    dir: &Path,
    strand: Strand,
    chromosome: &str,
    rows: &[&str],
) -> PathBuf {
    let path = coverage_file_path(dir, strand, chromosome);
    let mut content = rows.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

/// Named sample directory inside `root`.
pub fn sample_dir(
    root: &TempDir,
    name: &str,
) -> PathBuf {
    let dir = root.path().join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Forward-strand mC-only configuration that calls one hyper region at
/// `10-12` for [`CASE_ROWS`] against [`CONTROL_ROWS`].
pub fn scenario_config(
    case_dirs: Vec<PathBuf>,
    control_dirs: Vec<PathBuf>,
    output_dir: PathBuf,
) -> DhunterConfig {
    DhunterConfig::default()
        .with_case_dirs(case_dirs)
        .with_control_dirs(control_dirs)
        .with_chromosomes(vec!["1".to_string()])
        .with_output_dir(output_dir)
        .with_reverse(false)
        .with_mc(ChannelSettings {
            enabled:      true,
            min_coverage: 5,
        })
        .with_hmc(ChannelSettings {
            enabled:      false,
            min_coverage: 5,
        })
        .with_backend(BackendKind::Cpu)
        .with_dmr(
            DmrConfig::default()
                .with_diff_threshold(0.3)
                .with_dwt_level(1)
                .with_min_cpg_density(50.0)
                .with_min_cohort_fraction(50.0),
        )
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}
