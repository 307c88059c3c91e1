/// Genomic coordinate. Position `0` is a sentinel and never stored.
pub type PosType = u32;
/// Read count. Wide enough for counts summed over merged strands and cohorts.
pub type CountType = u32;
/// Methylation ratio and wavelet coefficient values.
pub type RatioType = f32;
