//! Arbitraries: descriptions of value domains and their derivations.

use crate::arbitraries::{frequency_of, just, ListArbitrary};
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::{RandomGenerator, DEFAULT_MAX_MISSES};
use crate::shrinkable::Generatable;
use std::fmt;
use std::sync::Arc;

/// Upper bound on edge cases produced by dependent or combined arbitraries.
pub const MAX_DERIVED_EDGE_CASES: usize = 100;

/// Description of a value domain.
///
/// An arbitrary builds generators on demand and never generates eagerly.
/// Implementations are immutable, so one arbitrary may serve several
/// properties running on different threads.
pub trait Arbitrary<T: Generatable>: Send + Sync {
    /// Random generator for the given generation size.
    fn generator(&self, size: Size) -> RandomGenerator<T>;

    /// Random generator that mixes in this arbitrary's edge cases.
    fn generator_with_embedded_edge_cases(&self, size: Size) -> RandomGenerator<T> {
        self.generator(size).with_edge_cases(size, self.edge_cases())
    }

    /// Enumeration of the whole domain, if it has at most `max_samples` values.
    fn exhaustive(&self, _max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        None
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        EdgeCases::none()
    }
}

/// Shared, type-erased arbitrary.
pub struct BoxedArbitrary<T>(Arc<dyn Arbitrary<T>>);

impl<T: Generatable> BoxedArbitrary<T> {
    pub fn new<A: Arbitrary<T> + 'static>(arbitrary: A) -> Self {
        BoxedArbitrary(Arc::new(arbitrary))
    }
}

impl<T> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        BoxedArbitrary(self.0.clone())
    }
}

impl<T> fmt::Debug for BoxedArbitrary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxedArbitrary<{}>", std::any::type_name::<T>())
    }
}

impl<T: Generatable> Arbitrary<T> for BoxedArbitrary<T> {
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        self.0.generator(size)
    }

    fn generator_with_embedded_edge_cases(&self, size: Size) -> RandomGenerator<T> {
        self.0.generator_with_embedded_edge_cases(size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.0.exhaustive(max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        self.0.edge_cases()
    }
}

/// Combinators available on every arbitrary.
pub trait ArbitraryExt<T: Generatable>: Arbitrary<T> + Sized + 'static {
    fn boxed(self) -> BoxedArbitrary<T> {
        BoxedArbitrary::new(self)
    }

    /// Shrinking happens on the source value; `f` is reapplied to each candidate.
    fn map<U, F>(self, f: F) -> Mapped<T, U>
    where
        U: Generatable,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Mapped {
            source: self.boxed(),
            f: Arc::new(f),
        }
    }

    /// Values and shrink candidates must satisfy the predicate.
    fn filter<F>(self, predicate: F) -> Filtered<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Filtered {
            source: self.boxed(),
            predicate: Arc::new(predicate),
            max_misses: DEFAULT_MAX_MISSES,
        }
    }

    /// Build a dependent arbitrary from each generated value.
    fn flat_map<U, A, F>(self, f: F) -> FlatMapped<T, U>
    where
        U: Generatable,
        A: Arbitrary<U> + 'static,
        F: Fn(T) -> A + Send + Sync + 'static,
    {
        FlatMapped {
            source: self.boxed(),
            f: Arc::new(move |value| BoxedArbitrary::new(f(value))),
        }
    }

    fn dont_shrink(self) -> Unshrinkable<T> {
        Unshrinkable {
            source: self.boxed(),
        }
    }

    fn without_edge_cases(self) -> WithoutEdgeCases<T> {
        WithoutEdgeCases {
            source: self.boxed(),
        }
    }

    /// Produce `None` with the given probability; `None` is the shrink target.
    fn inject_none(self, probability: f64) -> BoxedArbitrary<Option<T>> {
        let none_weight = (probability.clamp(0.0, 1.0) * 1000.0).round() as u64;
        frequency_of(vec![
            (none_weight, just(None).boxed()),
            (1000 - none_weight, self.map(Some).boxed()),
        ])
        .boxed()
    }

    /// Lists of values from this arbitrary.
    fn list(self) -> ListArbitrary<T> {
        ListArbitrary::new(self.boxed())
    }
}

impl<T: Generatable, A: Arbitrary<T> + Sized + 'static> ArbitraryExt<T> for A {}

/// Arbitrary derived by [`ArbitraryExt::map`].
pub struct Mapped<T, U> {
    source: BoxedArbitrary<T>,
    f: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T: Generatable, U: Generatable> Arbitrary<U> for Mapped<T, U> {
    fn generator(&self, size: Size) -> RandomGenerator<U> {
        let f = self.f.clone();
        self.source.generator(size).map(move |v| f(v))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        let f = self.f.clone();
        Some(self.source.exhaustive(max_samples)?.map(move |v| f(v)))
    }

    fn edge_cases(&self) -> EdgeCases<U> {
        let f = self.f.clone();
        self.source.edge_cases().map(move |v| f(v))
    }
}

/// Arbitrary derived by [`ArbitraryExt::filter`].
pub struct Filtered<T> {
    source: BoxedArbitrary<T>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    max_misses: usize,
}

impl<T: Generatable> Filtered<T> {
    /// Number of rejected values before generation fails.
    pub fn with_max_misses(mut self, max_misses: usize) -> Self {
        self.max_misses = max_misses;
        self
    }
}

impl<T: Generatable> Arbitrary<T> for Filtered<T> {
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        let predicate = self.predicate.clone();
        self.source
            .generator(size)
            .filter(move |v| predicate(v), self.max_misses)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let predicate = self.predicate.clone();
        Some(
            self.source
                .exhaustive(max_samples)?
                .filter(move |v| predicate(v)),
        )
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        let predicate = self.predicate.clone();
        self.source.edge_cases().filter(move |v| predicate(v))
    }
}

/// Arbitrary derived by [`ArbitraryExt::flat_map`].
pub struct FlatMapped<T, U> {
    source: BoxedArbitrary<T>,
    f: Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>,
}

impl<T: Generatable, U: Generatable> Arbitrary<U> for FlatMapped<T, U> {
    fn generator(&self, size: Size) -> RandomGenerator<U> {
        let f = self.f.clone();
        self.source
            .generator(size)
            .flat_map(move |v| f(v).generator_with_embedded_edge_cases(size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        let f = self.f.clone();
        self.source
            .exhaustive(max_samples)?
            .flat_map(move |v| f(v.clone()).exhaustive(max_samples), max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<U> {
        let f = self.f.clone();
        self.source
            .edge_cases()
            .flat_map(|v| f(v.clone()).edge_cases(), MAX_DERIVED_EDGE_CASES)
    }
}

/// Arbitrary derived by [`ArbitraryExt::dont_shrink`].
pub struct Unshrinkable<T> {
    source: BoxedArbitrary<T>,
}

impl<T: Generatable> Arbitrary<T> for Unshrinkable<T> {
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        self.source.generator(size).dont_shrink()
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.source.exhaustive(max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        EdgeCases::from_values(
            self.source
                .edge_cases()
                .into_iter()
                .map(|case| case.into_value()),
        )
    }
}

/// Arbitrary derived by [`ArbitraryExt::without_edge_cases`].
pub struct WithoutEdgeCases<T> {
    source: BoxedArbitrary<T>,
}

impl<T: Generatable> Arbitrary<T> for WithoutEdgeCases<T> {
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        self.source.generator(size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.source.exhaustive(max_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries::integers;
    use crate::data::Seed;

    fn draw<T: Generatable>(arbitrary: &impl Arbitrary<T>, seed: u64) -> T {
        arbitrary
            .generator(Size::new(50))
            .next(Seed::from_u64(seed))
            .expect("generation failed")
            .into_value()
    }

    #[test]
    fn test_map_applies_to_generation_and_exhaustion() {
        let base = integers::<i32>().between(0, 4);
        let doubled = base.clone().map(|v| v * 2);
        for seed in 0..50 {
            assert_eq!(draw(&doubled, seed), draw(&base, seed) * 2);
        }
        let all: Vec<i32> = doubled.exhaustive(10).expect("small").iter().collect();
        assert_eq!(all, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_filter_applies_everywhere() {
        let odd = integers::<i32>().between(-10, 10).filter(|v| v % 2 != 0);
        for seed in 0..50 {
            assert_ne!(draw(&odd, seed) % 2, 0);
        }
        assert!(odd.edge_cases().iter().all(|c| c.value() % 2 != 0));
        assert_eq!(odd.exhaustive(100).expect("small").iter().count(), 10);
    }

    #[test]
    fn test_flat_map_exhaustive() {
        let pairs = integers::<u8>()
            .between(1, 3)
            .flat_map(|n| integers::<u8>().between(0, n).map(move |m| (n, m)));
        let all: Vec<(u8, u8)> = pairs.exhaustive(100).expect("small").iter().collect();
        assert_eq!(all.len(), 2 + 3 + 4);
        assert!(all.iter().all(|(n, m)| m <= n));
    }

    #[test]
    fn test_without_edge_cases_and_dont_shrink() {
        let plain = integers::<i64>().without_edge_cases();
        assert!(plain.edge_cases().is_empty());
        let fixed = integers::<i64>().between(100, 200).dont_shrink();
        let sample = fixed
            .generator(Size::new(10))
            .next(Seed::from_u64(1))
            .expect("generation failed");
        assert_eq!(sample.shrink().count(), 0);
    }

    #[test]
    fn test_inject_none() {
        let maybe = integers::<i32>().between(1, 9).inject_none(0.5);
        let nones = (0..200).filter(|s| draw(&maybe, *s).is_none()).count();
        assert!(nones > 50 && nones < 150, "unexpected None rate {}", nones);
        let always = integers::<i32>().between(1, 9).inject_none(1.0);
        assert_eq!(draw(&always, 3), None);
    }
}
