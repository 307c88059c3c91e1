use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use itertools::Itertools;

use crate::data_structs::{
    Channel,
    DmRegion,
    SampleSeries,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::aggregate::SampleRegionStats;

pub const NO_DMRS_LINE: &str = "no DMRs were found";

const HEADER: &str = "pos_init-pos_end methylation dwt_diff";
const HEADER_WITH_GENES: &str =
    "pos_init-pos_end name_1 name_2 distance methylation dwt_diff";
const SAMPLE_HEADER: &str = "sample dwt_value ratio C_positions cov_min cov_mid \
                             cov_max sites_C sites_noC sites_mC sites_hmC \
                             dist_min dist_mid dist_max";

pub fn report_path(
    output_dir: &Path,
    chromosome: &str,
    channel: Channel,
) -> PathBuf {
    output_dir.join(format!(
        "chromosome_{}_{}.csv",
        chromosome,
        channel.file_tag()
    ))
}

/// Space-delimited per-chromosome, per-channel DMR report.
///
/// Every region is written as a summary line followed by a detail block
/// with one row per sample and a blank separator line.
pub struct DmrReportWriter<W: Write> {
    writer:         W,
    path:           PathBuf,
    with_reference: bool,
    header_written: bool,
    n_regions:      usize,
}

impl DmrReportWriter<BufWriter<File>> {
    pub fn create(
        output_dir: &Path,
        chromosome: &str,
        channel: Channel,
        with_reference: bool,
    ) -> Result<Self> {
        let path = report_path(output_dir, chromosome, channel);
        let file =
            File::create(&path).map_err(|e| DhunterError::output(&path, e))?;
        Ok(Self::new(BufWriter::new(file), path, with_reference))
    }
}

impl<W: Write> DmrReportWriter<W> {
    pub fn new(
        writer: W,
        path: PathBuf,
        with_reference: bool,
    ) -> Self {
        Self {
            writer,
            path,
            with_reference,
            header_written: false,
            n_regions: 0,
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn n_regions(&self) -> usize { self.n_regions }

    fn line(
        &mut self,
        line: &str,
    ) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| DhunterError::output(&self.path, e))
    }

    fn region_line(
        &self,
        region: &DmRegion,
    ) -> String {
        let mut fields = vec![region.to_string()];
        if self.with_reference {
            match &region.gene {
                Some(gene) => {
                    fields.push(gene.name1.clone());
                    fields.push(gene.name2.clone());
                    fields.push(gene.relation.to_string());
                },
                None => fields.extend(["-", "-", "-"].map(String::from)),
            }
        }
        fields.push(region.polarity.to_string());
        fields.push(region.difference.to_string());
        fields.join(" ")
    }

    /// Writes one region with its per-sample detail block. `stats` is in the
    /// order of `series`.
    pub fn write_region(
        &mut self,
        region: &DmRegion,
        series: &[SampleSeries],
        stats: &[SampleRegionStats],
    ) -> Result<()> {
        debug_assert_eq!(series.len(), stats.len());
        if !self.header_written {
            let header = if self.with_reference { HEADER_WITH_GENES } else { HEADER };
            self.line(header)?;
            self.header_written = true;
        }

        let line = self.region_line(region);
        self.line(&line)?;
        self.line(SAMPLE_HEADER)?;
        for (sample, row) in series.iter().zip(stats) {
            let line = std::iter::once(sample.meta().name.clone())
                .chain(row.fields())
                .join(" ");
            self.line(&line)?;
        }
        self.line("")?;
        self.n_regions += 1;
        Ok(())
    }

    /// Writes the no-result line if no region was written, then flushes.
    pub fn finish(mut self) -> Result<W> {
        if self.n_regions == 0 {
            self.line(NO_DMRS_LINE)?;
        }
        self.writer
            .flush()
            .map_err(|e| DhunterError::output(&self.path, e))?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use arcstr::ArcStr;

    use super::*;
    use crate::data_structs::{
        Cohort,
        GeneAnnotation,
        GeneRelation,
        SampleMeta,
        Strand,
    };

    fn series(name: &str) -> SampleSeries {
        SampleSeries::empty(SampleMeta {
            index:      0,
            name:       name.to_string(),
            chromosome: ArcStr::from("1"),
            cohort:     Cohort::Case,
            strand:     Strand::Merged,
        })
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("/out"), "7", Channel::Hmc),
            PathBuf::from("/out/chromosome_7_hmc.csv")
        );
    }

    #[test]
    fn test_empty_report() {
        let writer = DmrReportWriter::new(Vec::new(), PathBuf::from("mem"), false);
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, "no DMRs were found\n");
    }

    #[test]
    fn test_region_block() {
        let mut writer = DmrReportWriter::new(Vec::new(), PathBuf::from("mem"), true);
        let mut region = DmRegion::new(100, 116, -0.5, 0..=1);
        region.gene = Some(GeneAnnotation {
            name1:    "TP53".to_string(),
            name2:    "NM_000546".to_string(),
            relation: GeneRelation::BeforeGene(20),
        });
        let samples = vec![series("case_1"), series("control_1")];
        let mut stats = SampleRegionStats::zeroed();
        stats.c_positions = 4;
        stats.cov_max = 12;
        writer
            .write_region(&region, &samples, &[stats, SampleRegionStats::zeroed()])
            .unwrap();
        assert_eq!(writer.n_regions(), 1);

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], HEADER_WITH_GENES);
        assert_eq!(lines[1], "100-116 TP53 NM_000546 --20 hypo -0.5");
        assert!(lines[2].starts_with("sample dwt_value ratio"));
        assert_eq!(lines[3], "case_1 0 0 4 0 0 12 0 0 0 0 0 0 0");
        assert_eq!(lines[4], "control_1 0 0 0 0 0 0 0 0 0 0 0 0 0");
        assert_eq!(lines[5], "");
        assert_eq!(lines.len(), 6);
    }
}
