//! Finite sets of boundary values offered alongside random generation.

use crate::shrinkable::{Generatable, Shrinkable};
use std::fmt;

/// Explicit boundary values of a domain, e.g. `0`, `-1`, or the empty string.
///
/// Edge cases are independent of the random source. They keep their shrink
/// candidates so a failing edge case shrinks like any generated value.
#[derive(Clone)]
pub struct EdgeCases<T> {
    cases: Vec<Shrinkable<T>>,
}

impl<T> EdgeCases<T> {
    pub fn none() -> Self {
        EdgeCases { cases: Vec::new() }
    }

    pub fn from_shrinkables(cases: Vec<Shrinkable<T>>) -> Self {
        EdgeCases { cases }
    }

    /// Unshrinkable edge cases.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        EdgeCases {
            cases: values.into_iter().map(Shrinkable::unshrinkable).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shrinkable<T>> {
        self.cases.iter()
    }

    /// Keep at most `max` cases.
    pub fn take(mut self, max: usize) -> Self {
        self.cases.truncate(max);
        self
    }
}

impl<T: Generatable> EdgeCases<T> {
    pub fn map<U, F>(self, f: F) -> EdgeCases<U>
    where
        U: Generatable,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f: std::sync::Arc<dyn Fn(T) -> U + Send + Sync> = std::sync::Arc::new(f);
        EdgeCases {
            cases: self
                .cases
                .into_iter()
                .map(|case| case.map_with(f.clone()))
                .collect(),
        }
    }

    /// Drop cases whose value fails the predicate; candidates are filtered too.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: std::sync::Arc<dyn Fn(&T) -> bool + Send + Sync> =
            std::sync::Arc::new(predicate);
        EdgeCases {
            cases: self
                .cases
                .into_iter()
                .filter(|case| predicate(case.value()))
                .map(|case| case.filter_with(predicate.clone()))
                .collect(),
        }
    }

    pub fn concat(mut self, other: EdgeCases<T>) -> Self {
        self.cases.extend(other.cases);
        self
    }

    /// Cartesian product, stopping after `max` combinations.
    pub fn zip<U: Generatable>(&self, other: &EdgeCases<U>, max: usize) -> EdgeCases<(T, U)> {
        let cases = self
            .cases
            .iter()
            .flat_map(|left| {
                other
                    .cases
                    .iter()
                    .map(move |right| left.clone().zip(right.clone()))
            })
            .take(max)
            .collect();
        EdgeCases { cases }
    }

    /// Dependent edge cases, stopping after `max` results.
    pub fn flat_map<U, F>(&self, f: F, max: usize) -> EdgeCases<U>
    where
        U: Generatable,
        F: Fn(&T) -> EdgeCases<U>,
    {
        let cases = self
            .cases
            .iter()
            .flat_map(|case| f(case.value()).cases)
            .take(max)
            .collect();
        EdgeCases { cases }
    }

    /// Cartesian product of several edge-case sets, first component slowest.
    pub fn combine_all(parts: &[EdgeCases<T>], max: usize) -> EdgeCases<Vec<T>> {
        let mut rows: Vec<Vec<Shrinkable<T>>> = vec![Vec::new()];
        for part in parts {
            rows = rows
                .iter()
                .flat_map(|row| {
                    part.cases.iter().map(move |case| {
                        let mut next = row.clone();
                        next.push(case.clone());
                        next
                    })
                })
                .take(max)
                .collect();
        }
        EdgeCases {
            cases: rows
                .into_iter()
                .take(max)
                .map(Shrinkable::combine_all)
                .collect(),
        }
    }
}

impl<T> IntoIterator for EdgeCases<T> {
    type Item = Shrinkable<T>;
    type IntoIter = std::vec::IntoIter<Shrinkable<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}

impl<T> Default for EdgeCases<T> {
    fn default() -> Self {
        EdgeCases::none()
    }
}

impl<T: fmt::Debug> fmt::Debug for EdgeCases<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.cases.iter().map(|c| c.value()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Generatable>(cases: &EdgeCases<T>) -> Vec<T> {
        cases.iter().map(|c| c.value().clone()).collect()
    }

    #[test]
    fn test_map_and_filter() {
        let cases = EdgeCases::from_values(vec![0, 1, -1, 5]);
        assert_eq!(values(&cases.clone().map(|v| v * 2)), vec![0, 2, -2, 10]);
        assert_eq!(values(&cases.filter(|v| *v >= 0)), vec![0, 1, 5]);
    }

    #[test]
    fn test_zip_is_bounded() {
        let left = EdgeCases::from_values(vec![1, 2, 3]);
        let right = EdgeCases::from_values(vec!['a', 'b']);
        assert_eq!(
            values(&left.zip(&right, 4)),
            vec![(1, 'a'), (1, 'b'), (2, 'a'), (2, 'b')]
        );
    }

    #[test]
    fn test_combine_all_order() {
        let parts = vec![
            EdgeCases::from_values(vec![0, 1]),
            EdgeCases::from_values(vec![7, 8]),
        ];
        assert_eq!(
            values(&EdgeCases::combine_all(&parts, 10)),
            vec![vec![0, 7], vec![0, 8], vec![1, 7], vec![1, 8]]
        );
        assert!(EdgeCases::combine_all(&[EdgeCases::<i32>::none()], 10).is_empty());
    }

    #[test]
    fn test_flat_map_and_take() {
        let cases = EdgeCases::from_values(vec![1usize, 2]);
        let expanded = cases.flat_map(|n| EdgeCases::from_values(vec![*n; *n]), 10);
        assert_eq!(values(&expanded), vec![1, 2, 2]);
        assert_eq!(expanded.take(1).len(), 1);
    }

    #[test]
    fn test_edge_cases_keep_shrinking() {
        let cases = EdgeCases::from_shrinkables(vec![Shrinkable::integral(4, 0)]);
        let first = cases.iter().next().map(|c| c.shrink().count());
        assert_eq!(first, Some(3));
    }
}
