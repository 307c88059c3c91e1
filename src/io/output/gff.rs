use std::fs::{
    File,
    OpenOptions,
};
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use bio::io::gff;
use itertools::Itertools;

use crate::data_structs::typedef::CountType;
use crate::data_structs::{
    Channel,
    DmRegion,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::dmr::DmrConfig;
use crate::utils::chr_label;

pub const GFF_SOURCE: &str = "wavedmr";
const GENERIC_FEATURE: &str = "DMR";

/// `<out>/<name of out>_<mc|hmc>_dmrs.gff`, shared by all chromosomes of a
/// run.
pub fn gff_path(
    output_dir: &Path,
    channel: Channel,
) -> PathBuf {
    let stem = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wavedmr".to_string());
    output_dir.join(format!("{}_{}_dmrs.gff", stem, channel.file_tag()))
}

/// Run parameters repeated in the attributes of every feature.
#[derive(Debug, Clone)]
pub struct GffRunInfo {
    pub n_samples:    usize,
    pub min_coverage: CountType,
    pub dmr:          DmrConfig,
}

impl GffRunInfo {
    fn note_fields(&self) -> Vec<String> {
        vec![
            format!("Samples:{}", self.n_samples),
            format!("Coverage:{}", self.min_coverage),
            format!("Threshold:{}", self.dmr.diff_threshold),
            format!("DWT_level:{}", self.dmr.dwt_level),
            format!("Density:{}", self.dmr.min_cpg_density),
            format!("Cohort_fraction:{}", self.dmr.min_cohort_fraction),
        ]
    }
}

/// Appends DMR features to a GFF3 file.
pub struct DmrGffWriter<W: Write> {
    writer: gff::Writer<W>,
    path:   PathBuf,
}

impl DmrGffWriter<File> {
    /// Opens `path` in append mode, creating it if needed.
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DhunterError::output(path, e))?;
        Ok(Self::new(file, path.to_path_buf()))
    }
}

impl<W: Write> DmrGffWriter<W> {
    pub fn new(
        writer: W,
        path: PathBuf,
    ) -> Self {
        Self {
            writer: gff::Writer::new(writer, gff::GffType::GFF3),
            path,
        }
    }

    /// Writes one region as feature number `number` of the run.
    pub fn write_region(
        &mut self,
        chromosome: &str,
        region: &DmRegion,
        number: u64,
        info: &GffRunInfo,
    ) -> Result<()> {
        let mut record = gff::Record::new();
        *record.seqname_mut() = chr_label(chromosome);
        *record.source_mut() = GFF_SOURCE.to_string();
        *record.feature_type_mut() = region
            .gene
            .as_ref()
            .map(|g| g.name1.clone())
            .unwrap_or_else(|| GENERIC_FEATURE.to_string());
        *record.start_mut() = region.start as u64;
        *record.end_mut() = region.end as u64;
        *record.score_mut() = region.difference.to_string();
        *record.strand_mut() = ".".to_string();
        *record.phase_mut() = gff::Phase::default();

        let mut note = vec![format!("DMR_Region:{}", number)];
        note.push(format!("Methylation:{}", region.polarity));
        if let Some(gene) = &region.gene {
            record
                .attributes_mut()
                .insert("Name".to_string(), gene.name2.clone());
            note.push(format!("Distance:{}", gene.relation));
        }
        note.extend(info.note_fields());
        record
            .attributes_mut()
            .insert("Note".to_string(), note.iter().join(","));

        self.writer
            .write(&record)
            .map_err(|e| DhunterError::output(&self.path, e))
    }
}
