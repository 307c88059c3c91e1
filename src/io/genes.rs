use std::path::{
    Path,
    PathBuf,
};

use log::{
    debug,
    warn,
};

use crate::data_structs::{
    GeneRecord,
    GeneTable,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::utils::chr_label;

/// Location of the reference gene table of a chromosome.
pub fn gene_table_path(
    reference_dir: &Path,
    chromosome: &str,
) -> PathBuf {
    reference_dir.join(format!("refmap_ucsc_{}.csv", chr_label(chromosome)))
}

/// Reads a tab-delimited gene table
/// (`name1 name2 chromosome start end distanceFromChromStart`).
///
/// Rows that do not parse are skipped with a warning.
pub fn read_gene_table(
    path: &Path,
    chromosome: &str,
) -> Result<GeneTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            DhunterError::Ingestion {
                path:   path.to_path_buf(),
                source: e.into(),
            }
        })?;

    let mut genes = Vec::new();
    for (idx, row) in reader.deserialize::<GeneRecord>().enumerate() {
        match row {
            Ok(gene) if gene.start <= gene.end => genes.push(gene),
            Ok(gene) => {
                warn!(
                    "{}",
                    DhunterError::Parse {
                        path:   path.to_path_buf(),
                        line:   idx + 1,
                        reason: format!(
                            "gene {} ends before it starts",
                            gene.name1
                        ),
                    }
                )
            },
            Err(e) => {
                warn!(
                    "{}",
                    DhunterError::Parse {
                        path:   path.to_path_buf(),
                        line:   idx + 1,
                        reason: e.to_string(),
                    }
                )
            },
        }
    }
    debug!("Loaded {} genes from {}", genes.len(), path.display());
    Ok(GeneTable::new(chromosome, genes))
}
