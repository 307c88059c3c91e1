use serde::{
    Deserialize,
    Serialize,
};

use super::typedef::PosType;

/// One row of the reference gene table.
///
/// Field order matches the tab-delimited table rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub name1:                     String,
    pub name2:                     String,
    pub chromosome:                String,
    pub start:                     PosType,
    pub end:                       PosType,
    pub distance_from_chrom_start: u64,
}

/// Genes of one chromosome, sorted ascending by start. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    chromosome: String,
    genes:      Vec<GeneRecord>,
}

impl GeneTable {
    pub fn new(
        chromosome: impl Into<String>,
        mut genes: Vec<GeneRecord>,
    ) -> Self {
        genes.sort_by_key(|g| g.start);
        Self {
            chromosome: chromosome.into(),
            genes,
        }
    }

    pub fn chromosome(&self) -> &str { &self.chromosome }

    pub fn genes(&self) -> &[GeneRecord] { &self.genes }

    pub fn len(&self) -> usize { self.genes.len() }

    pub fn is_empty(&self) -> bool { self.genes.is_empty() }
}
