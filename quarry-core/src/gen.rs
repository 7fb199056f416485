//! Random generator combinators.

use crate::data::{Seed, Size};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::{QuarryError, Result};
use crate::shrinkable::{Generatable, ShrinkStream, Shrinkable};
use std::sync::Arc;

/// Default number of rejected values before a filter gives up.
pub const DEFAULT_MAX_MISSES: usize = 10_000;

/// A generator for test data of type `T`.
///
/// A generator is a stateless function from a seed to a shrinkable value.
/// The generation size is fixed when an arbitrary builds the generator, so
/// the same seed always reproduces the same sample.
pub struct RandomGenerator<T> {
    generator: Arc<dyn Fn(Seed) -> Result<Shrinkable<T>> + Send + Sync>,
}

impl<T> Clone for RandomGenerator<T> {
    fn clone(&self) -> Self {
        RandomGenerator {
            generator: self.generator.clone(),
        }
    }
}

impl<T: Generatable> RandomGenerator<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Seed) -> Result<Shrinkable<T>> + Send + Sync + 'static,
    {
        RandomGenerator {
            generator: Arc::new(f),
        }
    }

    /// Generate a value from the given seed.
    pub fn next(&self, seed: Seed) -> Result<Shrinkable<T>> {
        (self.generator)(seed)
    }

    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self {
        RandomGenerator::new(move |_seed| Ok(Shrinkable::unshrinkable(value.clone())))
    }

    /// Lazy stream of independent draws.
    pub fn samples(&self, seed: Seed) -> impl Iterator<Item = Result<Shrinkable<T>>> {
        let generator = self.clone();
        std::iter::successors(Some(seed), |s| Some(s.split().1))
            .map(move |s| generator.next(s.split().0))
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> RandomGenerator<U>
    where
        U: Generatable,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(T) -> U + Send + Sync> = Arc::new(f);
        RandomGenerator::new(move |seed| Ok(self.next(seed)?.map_with(f.clone())))
    }

    /// Retry generation until the predicate accepts a value.
    ///
    /// The first attempt uses the given seed, so filtering an already
    /// filtered generator with the same predicate changes nothing.
    pub fn filter<F>(self, predicate: F, max_misses: usize) -> RandomGenerator<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: Arc<dyn Fn(&T) -> bool + Send + Sync> = Arc::new(predicate);
        RandomGenerator::new(move |seed| {
            let attempts = max_misses.max(1);
            let mut current = seed;
            for _ in 0..attempts {
                let candidate = self.next(current)?;
                if predicate(candidate.value()) {
                    return Ok(candidate.filter_with(predicate.clone()));
                }
                current = current.split().1;
            }
            Err(QuarryError::GenerationExhausted {
                attempts,
                reason: "filter rejected every generated value".to_string(),
            })
        })
    }

    /// Dependent generation; the outer value shrinks before the inner one.
    pub fn flat_map<U, F>(self, f: F) -> RandomGenerator<U>
    where
        U: Generatable,
        F: Fn(T) -> RandomGenerator<U> + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(T) -> RandomGenerator<U> + Send + Sync> = Arc::new(f);
        RandomGenerator::new(move |seed| {
            let (outer_seed, inner_seed) = seed.split();
            let outer = self.next(outer_seed)?;
            let inner = f(outer.value().clone()).next(inner_seed)?;
            Ok(flat_mapped(outer, inner, f.clone(), inner_seed))
        })
    }

    pub fn zip<U: Generatable>(self, other: RandomGenerator<U>) -> RandomGenerator<(T, U)> {
        RandomGenerator::new(move |seed| {
            let (left, right) = seed.split();
            Ok(self.next(left)?.zip(other.next(right)?))
        })
    }

    /// Combine independent generators into a fixed-length vector.
    pub fn combine_all(generators: Vec<RandomGenerator<T>>) -> RandomGenerator<Vec<T>> {
        RandomGenerator::new(move |seed| {
            let mut current = seed;
            let mut parts = Vec::with_capacity(generators.len());
            for generator in &generators {
                let (draw, rest) = current.split();
                parts.push(generator.next(draw)?);
                current = rest;
            }
            Ok(Shrinkable::combine_all(parts))
        })
    }

    /// Replace some random draws by edge cases.
    ///
    /// An edge case is chosen with probability `1 / (clamp(size / 5, 3, 100) + 1)`.
    pub fn with_edge_cases(self, size: Size, edge_cases: EdgeCases<T>) -> RandomGenerator<T> {
        if edge_cases.is_empty() {
            return self;
        }
        let cases: Arc<Vec<Shrinkable<T>>> = Arc::new(edge_cases.into_iter().collect());
        let base = (size.get() / 5).clamp(3, 100) as u64;
        RandomGenerator::new(move |seed| {
            let (choice, seed) = seed.next_bounded(base + 1);
            if choice == 0 {
                let (index, _) = seed.next_bounded(cases.len() as u64);
                Ok(cases[index as usize].clone())
            } else {
                self.next(seed)
            }
        })
    }

    pub fn dont_shrink(self) -> RandomGenerator<T> {
        RandomGenerator::new(move |seed| Ok(self.next(seed)?.dont_shrink()))
    }
}

fn flat_mapped<T, U>(
    outer: Shrinkable<T>,
    inner: Shrinkable<U>,
    f: Arc<dyn Fn(T) -> RandomGenerator<U> + Send + Sync>,
    seed: Seed,
) -> Shrinkable<U>
where
    T: Generatable,
    U: Generatable,
{
    let distance = outer.distance().append(inner.distance());
    let value = inner.value().clone();
    Shrinkable::new(value, distance, move || {
        let regenerate = f.clone();
        let outer_shrinks = outer.shrink().filter_map(move |candidate| {
            let inner = regenerate(candidate.value().clone()).next(seed).ok()?;
            Some(flat_mapped(candidate, inner, regenerate.clone(), seed))
        });
        let keep = outer.clone();
        let f = f.clone();
        let inner_shrinks = inner
            .shrink()
            .map(move |candidate| flat_mapped(keep.clone(), candidate, f.clone(), seed));
        Box::new(outer_shrinks.chain(inner_shrinks)) as ShrinkStream<U>
    })
}

/// Integral values in `[min, max]` shrinking towards `target`.
///
/// Half of the draws are uniform over the range; the rest stay within a
/// size-dependent window around the target.
pub fn integral(min: i128, max: i128, target: i128, size: Size) -> RandomGenerator<i128> {
    let window = (size.get() as i128).saturating_mul(size.get() as i128).max(10);
    RandomGenerator::new(move |seed| {
        let (uniform, seed) = seed.next_bool();
        let (low, high) = if uniform {
            (min, max)
        } else {
            (
                target.saturating_sub(window).max(min),
                target.saturating_add(window).min(max),
            )
        };
        let (value, _) = seed.next_i128_in(low, high);
        Ok(Shrinkable::integral(value, target))
    })
}

/// Pick one index by weight; shrinks towards the first index.
pub fn choose_index(weights: Vec<u64>) -> RandomGenerator<usize> {
    let total: u64 = weights.iter().fold(0u64, |acc, w| acc.saturating_add(*w));
    let weights = Arc::new(weights);
    RandomGenerator::new(move |seed| {
        if total == 0 {
            return Err(QuarryError::GenerationExhausted {
                attempts: 0,
                reason: "no alternative has a positive weight".to_string(),
            });
        }
        let (mut pick, _) = seed.next_bounded(total);
        let mut index = 0;
        for (i, weight) in weights.iter().enumerate() {
            if pick < *weight {
                index = i;
                break;
            }
            pick -= weight;
        }
        Ok(index_shrinkable(index))
    })
}

pub(crate) fn index_shrinkable(index: usize) -> Shrinkable<usize> {
    let distance = ShrinkingDistance::of(&[index as u64]);
    if index == 0 {
        return Shrinkable::from(index);
    }
    Shrinkable::new(index, distance, move || {
        Box::new((0..index).map(index_shrinkable))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw<T: Generatable>(generator: &RandomGenerator<T>, seed: u64) -> T {
        generator
            .next(Seed::from_u64(seed))
            .expect("generation failed")
            .into_value()
    }

    #[test]
    fn test_constant() {
        let generator = RandomGenerator::constant(42);
        assert_eq!(draw(&generator, 1), 42);
    }

    #[test]
    fn test_integral_respects_bounds() {
        let generator = integral(-3, 200, 0, Size::new(50));
        for seed in 0..500 {
            let value = draw(&generator, seed);
            assert!((-3..=200).contains(&value));
        }
    }

    #[test]
    fn test_map_uses_the_same_draw() {
        let base = integral(0, 1000, 0, Size::new(30));
        let mapped = base.clone().map(|v| v * 3);
        for seed in 0..100 {
            assert_eq!(draw(&mapped, seed), draw(&base, seed) * 3);
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let base = integral(0, 1000, 0, Size::new(30));
        let once = base.clone().filter(|v| v % 7 == 0, DEFAULT_MAX_MISSES);
        let twice = once
            .clone()
            .filter(|v| v % 7 == 0, DEFAULT_MAX_MISSES);
        for seed in 0..100 {
            assert_eq!(draw(&once, seed), draw(&twice, seed));
            assert_eq!(draw(&once, seed) % 7, 0);
        }
    }

    #[test]
    fn test_filter_exhaustion() {
        let generator = RandomGenerator::constant(1).filter(|v| *v > 1, 50);
        let result = generator.next(Seed::from_u64(0));
        assert!(matches!(
            result,
            Err(QuarryError::GenerationExhausted { attempts: 50, .. })
        ));

        let unbudgeted = RandomGenerator::constant(1).filter(|v| *v > 1, 0);
        assert!(matches!(
            unbudgeted.next(Seed::from_u64(0)),
            Err(QuarryError::GenerationExhausted { attempts: 1, .. })
        ));
    }

    #[test]
    fn test_flat_map_shrinks_outer_first() {
        let generator = integral(1, 5, 1, Size::new(10))
            .flat_map(|n| RandomGenerator::constant(vec![0u8; n as usize]));
        let seed = (0..100)
            .map(Seed::from_u64)
            .find(|s| generator.next(*s).map(|v| v.value().len() > 2).unwrap_or(false))
            .expect("no long sample");
        let sample = generator.next(seed).expect("generation failed");
        let first = sample.shrink().next().expect("no candidates");
        assert_eq!(first.value().len(), 1);
    }

    #[test]
    fn test_zip_and_combine_all() {
        let pair = integral(0, 9, 0, Size::new(10)).zip(RandomGenerator::constant('x'));
        let (number, letter) = draw(&pair, 3);
        assert!(number <= 9);
        assert_eq!(letter, 'x');

        let all = RandomGenerator::combine_all(vec![RandomGenerator::constant(1); 4]);
        assert_eq!(draw(&all, 8), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_with_edge_cases_injects_cases() {
        let generator = integral(1000, 2000, 1000, Size::new(10))
            .with_edge_cases(Size::new(10), EdgeCases::from_values(vec![-1]));
        let hits = (0..400).filter(|seed| draw(&generator, *seed) == -1).count();
        assert!(hits > 20 && hits < 250, "unexpected edge-case rate {}", hits);
    }

    #[test]
    fn test_choose_index_weights() {
        let generator = choose_index(vec![0, 1, 0]);
        for seed in 0..50 {
            assert_eq!(draw(&generator, seed), 1);
        }
        assert!(choose_index(vec![]).next(Seed::from_u64(0)).is_err());
    }

    #[test]
    fn test_samples_are_independent() {
        let generator = integral(0, 1_000_000, 0, Size::new(100));
        let values: Vec<i128> = generator
            .samples(Seed::from_u64(5))
            .take(20)
            .map(|s| s.expect("generation failed").into_value())
            .collect();
        let distinct: std::collections::HashSet<_> = values.iter().collect();
        assert!(distinct.len() > 10);
    }
}
