use std::cmp::Ordering;

use crate::data_structs::{
    MethylationRecord,
    SampleSeries,
    Strand,
};

/// Two-pointer merge of two position-ordered record slices.
///
/// Records at the same position are combined by summing their counts;
/// unmatched records pass through unchanged.
pub fn merge_records(
    left: &[MethylationRecord],
    right: &[MethylationRecord],
) -> Vec<MethylationRecord> {
    let mut out = Vec::with_capacity(left.len().max(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        match left[i].position.cmp(&right[j].position) {
            Ordering::Less => {
                out.push(left[i]);
                i += 1;
            },
            Ordering::Greater => {
                out.push(right[j]);
                j += 1;
            },
            Ordering::Equal => {
                out.push(left[i].combine(&right[j]));
                i += 1;
                j += 1;
            },
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}

/// Merges the forward and reverse series of one sample.
///
/// The result keeps the metadata of `forward` and is labelled
/// [`Strand::Merged`].
pub fn merge_series(
    forward: SampleSeries,
    reverse: SampleSeries,
) -> SampleSeries {
    let records = merge_records(forward.records(), reverse.records());
    let mut meta = forward.meta().clone();
    meta.strand = Strand::Merged;
    SampleSeries::new(meta, records)
}
