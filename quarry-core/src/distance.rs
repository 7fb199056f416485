//! Ordered measure of how far a value is from its presumed minimum.

use std::fmt;

/// Lexicographically ordered tuple of non-negative integers.
///
/// Shorter tuples compare as if padded with zeros on the right, so
/// `[3]` equals `[3, 0]` and is smaller than `[3, 1]`.
#[derive(Debug, Clone, Default)]
pub struct ShrinkingDistance(Vec<u64>);

impl ShrinkingDistance {
    pub fn zero() -> Self {
        ShrinkingDistance(vec![0])
    }

    pub fn max() -> Self {
        ShrinkingDistance(vec![u64::MAX])
    }

    pub fn of(dimensions: &[u64]) -> Self {
        ShrinkingDistance(dimensions.to_vec())
    }

    pub fn dimensions(&self) -> &[u64] {
        &self.0
    }

    /// Dimension-wise saturating sum.
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        let len = self.0.len().max(other.0.len());
        let dims = (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.saturating_add(b)
            })
            .collect();
        ShrinkingDistance(dims)
    }

    /// Concatenate dimensions: `self` dominates, `other` breaks ties.
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        let mut dims = self.0.clone();
        dims.extend_from_slice(&other.0);
        ShrinkingDistance(dims)
    }

    /// Sum of element distances.
    pub fn for_collection<'a, I>(distances: I) -> Self
    where
        I: IntoIterator<Item = &'a ShrinkingDistance>,
    {
        distances
            .into_iter()
            .fold(ShrinkingDistance::zero(), |acc, d| acc.plus(d))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|d| *d == 0)
    }

    fn dim(&self, i: usize) -> u64 {
        self.0.get(i).copied().unwrap_or(0)
    }
}

impl PartialEq for ShrinkingDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for ShrinkingDistance {}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.dim(i).cmp(&other.dim(i)))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShrinkingDistance{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        assert!(ShrinkingDistance::of(&[1, 100]) < ShrinkingDistance::of(&[2, 0]));
        assert!(ShrinkingDistance::of(&[2, 1]) > ShrinkingDistance::of(&[2, 0]));
        assert_eq!(ShrinkingDistance::of(&[3]), ShrinkingDistance::of(&[3, 0]));
        assert!(ShrinkingDistance::of(&[3]) < ShrinkingDistance::of(&[3, 1]));
    }

    #[test]
    fn test_plus_saturates() {
        let sum = ShrinkingDistance::max().plus(&ShrinkingDistance::of(&[1, 2]));
        assert_eq!(sum.dimensions(), &[u64::MAX, 2]);
    }

    #[test]
    fn test_append_and_collection() {
        let elements = [ShrinkingDistance::of(&[2]), ShrinkingDistance::of(&[5])];
        let distance = ShrinkingDistance::of(&[2]).append(&ShrinkingDistance::for_collection(&elements));
        assert_eq!(distance.dimensions(), &[2, 7]);
        assert!(ShrinkingDistance::zero().is_zero());
    }
}
