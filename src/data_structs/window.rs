use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use super::typedef::PosType;

/// Minimum and maximum observed position over all samples of the current
/// chromosome. Sizes every dense array of the chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeWindow {
    lower: PosType,
    upper: PosType,
}

impl GenomeWindow {
    pub fn new(
        lower: PosType,
        upper: PosType,
    ) -> Self {
        assert!(lower <= upper, "Window lower bound exceeds upper bound");
        Self { lower, upper }
    }

    /// Widens the window to include `[lower, upper]`.
    pub fn extend(
        &mut self,
        lower: PosType,
        upper: PosType,
    ) {
        self.lower = self.lower.min(lower);
        self.upper = self.upper.max(upper);
    }

    /// Folds optional bounds into an optional window.
    pub fn merge_bounds(
        window: Option<GenomeWindow>,
        bounds: Option<(PosType, PosType)>,
    ) -> Option<GenomeWindow> {
        match (window, bounds) {
            (Some(mut w), Some((lo, hi))) => {
                w.extend(lo, hi);
                Some(w)
            },
            (None, Some((lo, hi))) => Some(GenomeWindow::new(lo, hi)),
            (w, None) => w,
        }
    }

    pub fn lower(&self) -> PosType { self.lower }

    pub fn upper(&self) -> PosType { self.upper }

    /// Number of positions covered, `upper - lower + 1`.
    pub fn span(&self) -> usize { (self.upper - self.lower) as usize + 1 }

    /// Dense array length: the span rounded up to an even number.
    pub fn dense_len(&self) -> usize {
        let span = self.span();
        span + (span & 1)
    }

    /// Offset of `position` inside dense arrays.
    pub fn offset(
        &self,
        position: PosType,
    ) -> usize {
        debug_assert!(position >= self.lower && position <= self.upper);
        (position - self.lower) as usize
    }

    pub fn contains(
        &self,
        position: PosType,
    ) -> bool {
        position >= self.lower && position <= self.upper
    }
}

impl Display for GenomeWindow {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::even_span(10, 13, 4)]
    #[case::odd_span(10, 12, 4)]
    #[case::single(7, 7, 2)]
    #[case::large(1, 1_000_000, 1_000_000)]
    fn test_dense_len_is_even(
        #[case] lower: PosType,
        #[case] upper: PosType,
        #[case] expected: usize,
    ) {
        let window = GenomeWindow::new(lower, upper);
        assert_eq!(window.dense_len(), expected);
        assert_eq!(window.dense_len() % 2, 0);
        assert!(window.dense_len() >= window.span());
    }

    #[test]
    fn test_merge_bounds() {
        let w = GenomeWindow::merge_bounds(None, Some((50, 60)));
        let w = GenomeWindow::merge_bounds(w, None);
        let w = GenomeWindow::merge_bounds(w, Some((20, 55)));
        assert_eq!(w, Some(GenomeWindow::new(20, 60)));
        assert_eq!(GenomeWindow::merge_bounds(None, None), None);
    }

    #[test]
    fn test_offset() {
        let window = GenomeWindow::new(100, 200);
        assert_eq!(window.offset(100), 0);
        assert_eq!(window.offset(150), 50);
        assert!(window.contains(200));
        assert!(!window.contains(99));
    }
}
