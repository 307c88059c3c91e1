use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::{
    Deserialize,
    Serialize,
};

use super::enums::Polarity;
use super::typedef::PosType;

/// Position of a region relative to the gene it was annotated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneRelation {
    /// Region starts exactly at the gene start.
    AtStart,
    /// Region starts before the gene and reaches its start. Holds the
    /// distance from the region start to the gene start.
    OverlapsStart(PosType),
    /// Region starts inside the gene. Holds the distance from the gene start.
    InsideGene(PosType),
    /// Region lies before the gene. Holds the gap to the gene start.
    BeforeGene(PosType),
    /// Region lies after the gene. Holds the gap from the gene end.
    AfterGene(PosType),
}

impl Display for GeneRelation {
    /// Tagged distance as written to reports: `0`, `-d`, `+d`, `--d`, `++d`.
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            GeneRelation::AtStart => write!(f, "0"),
            GeneRelation::OverlapsStart(d) => write!(f, "-{}", d),
            GeneRelation::InsideGene(d) => write!(f, "+{}", d),
            GeneRelation::BeforeGene(d) => write!(f, "--{}", d),
            GeneRelation::AfterGene(d) => write!(f, "++{}", d),
        }
    }
}

/// Gene a region was annotated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    pub name1:    String,
    pub name2:    String,
    pub relation: GeneRelation,
}

/// Differentially methylated region: a run of adjacent coefficient columns
/// whose cohort difference exceeds the threshold.
///
/// Covers genomic positions `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmRegion {
    pub start:      PosType,
    pub end:        PosType,
    /// Difference of the first column of the run.
    pub difference: f32,
    pub polarity:   Polarity,
    /// Coefficient columns covered by the region.
    pub columns:    RangeInclusive<usize>,
    pub gene:       Option<GeneAnnotation>,
}

impl DmRegion {
    pub fn new(
        start: PosType,
        end: PosType,
        difference: f32,
        columns: RangeInclusive<usize>,
    ) -> Self {
        Self {
            start,
            end,
            difference,
            polarity: Polarity::from_difference(difference),
            columns,
            gene: None,
        }
    }

    pub fn width(&self) -> PosType { self.end - self.start }

    pub fn n_columns(&self) -> usize {
        self.columns.end() - self.columns.start() + 1
    }

    pub fn contains(
        &self,
        position: PosType,
    ) -> bool {
        position >= self.start && position < self.end
    }
}

impl Display for DmRegion {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
