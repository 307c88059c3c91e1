use crate::data_structs::{
    DmRegion,
    GeneAnnotation,
    GeneRecord,
    GeneRelation,
    GeneTable,
};

/// Nearest-gene lookup over a start-sorted gene table.
///
/// Regions must be annotated in ascending genomic order: the search cursor
/// only moves forward, apart from a single step back after every region so
/// that a long gene can still match the next region.
pub struct GeneAnnotator<'a> {
    genes:  &'a [GeneRecord],
    cursor: usize,
}

impl<'a> GeneAnnotator<'a> {
    pub fn new(table: &'a GeneTable) -> Self {
        Self {
            genes:  table.genes(),
            cursor: 0,
        }
    }

    pub fn annotate(
        &mut self,
        region: &DmRegion,
    ) -> Option<GeneAnnotation> {
        if self.genes.is_empty() {
            return None;
        }

        let last = self.genes.len() - 1;
        let mut idx = self.cursor.min(last);
        while idx < last && self.genes[idx].start < region.start {
            idx += 1;
        }
        self.cursor = idx.saturating_sub(1);

        let gene = &self.genes[idx];
        // The table ran out before reaching the region.
        let (previous, next) = if gene.start < region.start {
            (Some(gene), None)
        }
        else {
            (idx.checked_sub(1).map(|i| &self.genes[i]), Some(gene))
        };

        let (gene, relation) = match (previous, next) {
            (_, Some(next)) if next.start == region.start => {
                (next, GeneRelation::AtStart)
            },
            (_, Some(next)) if next.start <= region.end => {
                (next, GeneRelation::OverlapsStart(next.start.saturating_sub(region.start)))
            },
            (Some(prev), _) if prev.end > region.start => {
                (prev, GeneRelation::InsideGene(region.start.saturating_sub(prev.start)))
            },
            (Some(prev), Some(next)) => {
                let dist_prev = region.start - prev.end;
                let dist_next = next.start - region.end;
                if dist_prev >= dist_next {
                    (next, GeneRelation::BeforeGene(dist_next))
                }
                else {
                    (prev, GeneRelation::AfterGene(dist_prev))
                }
            },
            (Some(prev), None) => {
                (prev, GeneRelation::AfterGene(region.start - prev.end))
            },
            (None, Some(next)) => {
                (next, GeneRelation::BeforeGene(next.start - region.end))
            },
            (None, None) => return None,
        };

        Some(GeneAnnotation {
            name1: gene.name1.clone(),
            name2: gene.name2.clone(),
            relation,
        })
    }
}
