//! Deterministic enumeration of small domains.

use crate::shrinkable::Generatable;
use std::sync::Arc;

type Enumerate<T> = Arc<dyn Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync>;

/// A finite, ordered, restartable sequence of values.
///
/// Each call to [`ExhaustiveGenerator::iter`] starts the enumeration from
/// the beginning, which lets products be computed by nested iteration
/// without materializing them. Constructors return `None` when the
/// cardinality exceeds the caller's budget.
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    enumerate: Enumerate<T>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        ExhaustiveGenerator {
            max_count: self.max_count,
            enumerate: self.enumerate.clone(),
        }
    }
}

impl<T: Generatable> ExhaustiveGenerator<T> {
    /// Create a generator from a declared count and a restartable enumeration.
    pub fn new<F, I>(max_count: u64, enumerate: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: Iterator<Item = T> + 'static,
    {
        ExhaustiveGenerator {
            max_count,
            enumerate: Arc::new(move || Box::new(enumerate()) as Box<dyn Iterator<Item = T>>),
        }
    }

    /// Upper bound on the number of values produced.
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.enumerate)()
    }

    /// Enumerate the given values in order.
    pub fn choose(values: Vec<T>, max_samples: u64) -> Option<Self> {
        let count = values.len() as u64;
        if count > max_samples {
            return None;
        }
        let values = Arc::new(values);
        Some(ExhaustiveGenerator::new(count, move || {
            let values = values.clone();
            (0..values.len()).map(move |i| values[i].clone())
        }))
    }

    pub fn map<U, F>(self, f: F) -> ExhaustiveGenerator<U>
    where
        U: Generatable,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        ExhaustiveGenerator::new(self.max_count, move || {
            let f = f.clone();
            self.iter().map(move |v| f(v))
        })
    }

    /// Skip values failing the predicate; the declared count stays an upper bound.
    pub fn filter<F>(self, predicate: F) -> ExhaustiveGenerator<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        ExhaustiveGenerator::new(self.max_count, move || {
            let predicate = predicate.clone();
            self.iter().filter(move |v| predicate(v))
        })
    }

    /// Cartesian product, left component slowest.
    pub fn zip<U: Generatable>(
        self,
        other: ExhaustiveGenerator<U>,
        max_samples: u64,
    ) -> Option<ExhaustiveGenerator<(T, U)>> {
        let count = self.max_count.checked_mul(other.max_count)?;
        if count > max_samples {
            return None;
        }
        Some(ExhaustiveGenerator::new(count, move || {
            let other = other.clone();
            self.iter().flat_map(move |left| {
                other.iter().map(move |right| (left.clone(), right))
            })
        }))
    }

    /// Dependent enumeration; fails if any dependent domain cannot be enumerated.
    pub fn flat_map<U, F>(self, f: F, max_samples: u64) -> Option<ExhaustiveGenerator<U>>
    where
        U: Generatable,
        F: Fn(&T) -> Option<ExhaustiveGenerator<U>> + Send + Sync + 'static,
    {
        let mut count: u64 = 0;
        for value in self.iter() {
            count = count.checked_add(f(&value)?.max_count)?;
            if count > max_samples {
                return None;
            }
        }
        let f = Arc::new(f);
        Some(ExhaustiveGenerator::new(count, move || {
            let f = f.clone();
            self.iter().flat_map(move |value| {
                f(&value)
                    .map(|inner| inner.iter())
                    .unwrap_or_else(|| Box::new(std::iter::empty()) as Box<dyn Iterator<Item = U>>)
            })
        }))
    }

    /// Fixed-length product of several generators, first component slowest.
    pub fn combine_all(
        generators: Vec<ExhaustiveGenerator<T>>,
        max_samples: u64,
    ) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let count = generators
            .iter()
            .try_fold(1u64, |acc, g| acc.checked_mul(g.max_count))?;
        if count > max_samples {
            return None;
        }
        let generators = Arc::new(generators);
        Some(ExhaustiveGenerator::new(count, move || {
            let mut rows: Box<dyn Iterator<Item = Vec<T>>> =
                Box::new(std::iter::once(Vec::new()));
            for generator in generators.iter() {
                let generator = generator.clone();
                rows = Box::new(rows.flat_map(move |prefix| {
                    generator.iter().map(move |value| {
                        let mut row = prefix.clone();
                        row.push(value);
                        row
                    })
                }));
            }
            rows
        }))
    }

    /// All lists of length `min_size..=max_size` over the element domain,
    /// shorter lists first.
    pub fn lists(
        element: ExhaustiveGenerator<T>,
        min_size: usize,
        max_size: usize,
        max_samples: u64,
    ) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let per_length = (min_size..=max_size)
            .map(|len| ExhaustiveGenerator::combine_all(vec![element.clone(); len], max_samples))
            .collect::<Option<Vec<_>>>()?;
        ExhaustiveGenerator::concat(per_length, max_samples)
    }

    /// One generator after the other.
    pub fn concat(
        generators: Vec<ExhaustiveGenerator<T>>,
        max_samples: u64,
    ) -> Option<ExhaustiveGenerator<T>> {
        let count = generators
            .iter()
            .try_fold(0u64, |acc, g| acc.checked_add(g.max_count))?;
        if count > max_samples {
            return None;
        }
        let generators = Arc::new(generators);
        Some(ExhaustiveGenerator::new(count, move || {
            let generators = generators.clone();
            (0..generators.len()).flat_map(move |i| generators[i].iter())
        }))
    }
}

impl ExhaustiveGenerator<i128> {
    /// All integers in `[min, max]` in ascending order.
    pub fn from_range(min: i128, max: i128, max_samples: u64) -> Option<Self> {
        if min > max {
            return Some(ExhaustiveGenerator::new(0, std::iter::empty));
        }
        let span = max.abs_diff(min);
        let count = u64::try_from(span.checked_add(1)?).ok()?;
        if count > max_samples {
            return None;
        }
        Some(ExhaustiveGenerator::new(count, move || min..=max))
    }
}
