//! Lists with size bounds and optional uniqueness.

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::data::{cutoff_size, next_length, Size};
use crate::edge_cases::EdgeCases;
use crate::error::QuarryError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::RandomGenerator;
use crate::shrinkable::{Generatable, Shrinkable};
use std::sync::Arc;

/// Maximum size of generated collections unless configured otherwise.
pub const DEFAULT_MAX_SIZE: usize = 255;

/// Draws per element before a unique collection gives up.
pub const MAX_UNIQUENESS_ATTEMPTS: usize = 1000;

/// Tells whether two elements count as duplicates.
pub(crate) type SameKey<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Lists of elements from another arbitrary.
pub struct ListArbitrary<T> {
    element: BoxedArbitrary<T>,
    min_size: usize,
    max_size: usize,
    uniqueness: Option<SameKey<T>>,
}

impl<T> Clone for ListArbitrary<T> {
    fn clone(&self) -> Self {
        ListArbitrary {
            element: self.element.clone(),
            min_size: self.min_size,
            max_size: self.max_size,
            uniqueness: self.uniqueness.clone(),
        }
    }
}

pub fn lists<T: Generatable>(element: impl Arbitrary<T> + 'static) -> ListArbitrary<T> {
    ListArbitrary::new(BoxedArbitrary::new(element))
}

impl<T: Generatable> ListArbitrary<T> {
    pub fn new(element: BoxedArbitrary<T>) -> Self {
        ListArbitrary {
            element,
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
            uniqueness: None,
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = self.max_size.max(min_size);
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self.min_size = self.min_size.min(max_size);
        self
    }

    pub fn of_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self.max_size = size;
        self
    }

    /// No two elements may map to the same key.
    pub fn uniqueness_by<K, F>(mut self, key: F) -> Self
    where
        K: PartialEq,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.uniqueness = Some(Arc::new(move |a, b| key(a) == key(b)));
        self
    }

    pub fn unique(self) -> Self
    where
        T: PartialEq,
    {
        self.uniqueness_by(|value: &T| value.clone())
    }

    fn singletons(&self) -> EdgeCases<Vec<T>> {
        let min_size = self.min_size;
        EdgeCases::from_shrinkables(
            self.element
                .edge_cases()
                .into_iter()
                .map(|element| Shrinkable::collection(vec![element], min_size))
                .collect(),
        )
    }
}

impl<T: Generatable> Arbitrary<Vec<T>> for ListArbitrary<T> {
    fn generator(&self, size: Size) -> RandomGenerator<Vec<T>> {
        list_generator(
            self.element.generator_with_embedded_edge_cases(size),
            self.min_size,
            self.max_size,
            size,
            self.uniqueness.clone(),
        )
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let element = self.element.exhaustive(max_samples)?;
        let all = ExhaustiveGenerator::lists(element, self.min_size, self.max_size, max_samples)?;
        Some(match self.uniqueness.clone() {
            Some(same) => all.filter(move |values| all_unique(values, &same)),
            None => all,
        })
    }

    /// The empty list and single-element lists, as far as the size bounds allow.
    fn edge_cases(&self) -> EdgeCases<Vec<T>> {
        let mut cases = EdgeCases::none();
        if self.min_size == 0 {
            cases = cases.concat(EdgeCases::from_values(vec![Vec::new()]));
        }
        if self.min_size <= 1 && self.max_size >= 1 {
            cases = cases.concat(self.singletons());
        }
        cases
    }
}

fn all_unique<T>(values: &[T], same: &SameKey<T>) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(i, a)| values[i + 1..].iter().all(|b| !same(a, b)))
}

/// Variable-length lists; lengths favour small values at small sizes.
pub(crate) fn list_generator<T: Generatable>(
    element: RandomGenerator<T>,
    min_size: usize,
    max_size: usize,
    size: Size,
    uniqueness: Option<SameKey<T>>,
) -> RandomGenerator<Vec<T>> {
    let cutoff = cutoff_size(min_size, max_size, size);
    RandomGenerator::new(move |seed| {
        let (length, mut seed) = next_length(seed, min_size, max_size, cutoff);
        let mut elements: Vec<Shrinkable<T>> = Vec::with_capacity(length);
        while elements.len() < length {
            let mut accepted = false;
            for _ in 0..MAX_UNIQUENESS_ATTEMPTS {
                let (draw, rest) = seed.split();
                seed = rest;
                let candidate = element.next(draw)?;
                let fresh = match &uniqueness {
                    Some(same) => elements.iter().all(|e| !same(e.value(), candidate.value())),
                    None => true,
                };
                if fresh {
                    elements.push(candidate);
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                return Err(QuarryError::GenerationExhausted {
                    attempts: MAX_UNIQUENESS_ATTEMPTS,
                    reason: format!(
                        "could not find a unique element at position {} of {}",
                        elements.len(),
                        length
                    ),
                });
            }
        }
        let collection = Shrinkable::collection(elements, min_size);
        Ok(match uniqueness.clone() {
            Some(same) => collection.filter(move |values| all_unique(values, &same)),
            None => collection,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::ArbitraryExt;
    use crate::arbitraries::{integers, of};
    use crate::data::Seed;

    #[test]
    fn test_sizes_respect_bounds() {
        let arbitrary = lists(integers::<i32>()).of_min_size(2).of_max_size(6);
        for size in [1, 50, 100] {
            let generator = arbitrary.generator(Size::new(size));
            for seed in 0..100 {
                let len = generator
                    .next(Seed::from_u64(seed))
                    .expect("generation failed")
                    .value()
                    .len();
                assert!((2..=6).contains(&len));
            }
        }
    }

    #[test]
    fn test_unique_lists() {
        let arbitrary = integers::<u8>().between(0, 20).list().of_size(15).unique();
        let generator = arbitrary.generator(Size::new(100));
        for seed in 0..50 {
            let sample = generator.next(Seed::from_u64(seed)).expect("generation failed");
            let mut values = sample.value().clone();
            values.sort_unstable();
            values.dedup();
            assert_eq!(values.len(), 15);
            for candidate in sample.shrink().take(50) {
                let mut shrunk = candidate.value().clone();
                let len = shrunk.len();
                shrunk.sort_unstable();
                shrunk.dedup();
                assert_eq!(shrunk.len(), len);
            }
        }
    }

    #[test]
    fn test_uniqueness_exhaustion() {
        let arbitrary = lists(of([1, 2, 3])).of_size(4).unique();
        let result = arbitrary.generator(Size::new(10)).next(Seed::from_u64(0));
        assert!(matches!(
            result,
            Err(QuarryError::GenerationExhausted { attempts: MAX_UNIQUENESS_ATTEMPTS, .. })
        ));
    }

    #[test]
    fn test_uniqueness_by_key() {
        let arbitrary = integers::<i32>()
            .between(-9, 9)
            .list()
            .of_size(5)
            .uniqueness_by(|v: &i32| v.abs());
        let sample = arbitrary
            .generator(Size::new(10))
            .next(Seed::from_u64(3))
            .expect("generation failed");
        let mut keys: Vec<i32> = sample.value().iter().map(|v| v.abs()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_exhaustive_and_edge_cases() {
        let arbitrary = lists(of(['a', 'b'])).of_max_size(2);
        assert_eq!(arbitrary.exhaustive(10).map(|g| g.max_count()), Some(7));
        let unique = lists(of(['a', 'b'])).of_max_size(2).unique();
        assert_eq!(unique.exhaustive(10).map(|g| g.iter().count()), Some(5));
        let edges: Vec<Vec<char>> = arbitrary
            .edge_cases()
            .iter()
            .map(|c| c.value().clone())
            .collect();
        assert_eq!(edges, vec![vec![], vec!['a'], vec!['b']]);
        assert!(lists(of(['a'])).of_min_size(2).edge_cases().is_empty());
    }
}
