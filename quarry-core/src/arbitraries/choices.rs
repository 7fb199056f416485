//! Constants, value choices and weighted alternatives.

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::error::QuarryError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::{choose_index, index_shrinkable, RandomGenerator};
use crate::shrinkable::Generatable;
use std::sync::Arc;

/// Arbitrary producing a single value.
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

pub fn just<T: Generatable>(value: T) -> Just<T> {
    Just { value }
}

impl<T: Generatable> Arbitrary<T> for Just<T> {
    fn generator(&self, _size: Size) -> RandomGenerator<T> {
        RandomGenerator::constant(self.value.clone())
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::choose(vec![self.value.clone()], max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        EdgeCases::from_values(vec![self.value.clone()])
    }
}

/// Weighted choice between fixed values; shrinks towards earlier values.
#[derive(Debug, Clone)]
pub struct Choose<T> {
    choices: Arc<Vec<(u64, T)>>,
}

/// Uniform choice between the given values.
pub fn of<T: Generatable>(values: impl IntoIterator<Item = T>) -> Choose<T> {
    frequency(values.into_iter().map(|v| (1, v)).collect())
}

/// Weighted choice between the given values.
pub fn frequency<T: Generatable>(choices: Vec<(u64, T)>) -> Choose<T> {
    Choose {
        choices: Arc::new(choices),
    }
}

pub fn booleans() -> Choose<bool> {
    of([false, true])
}

impl<T: Generatable> Choose<T> {
    fn values(&self) -> Vec<(u64, T)> {
        self.choices
            .iter()
            .filter(|(weight, _)| *weight > 0)
            .cloned()
            .collect()
    }
}

impl<T: Generatable> Arbitrary<T> for Choose<T> {
    fn generator(&self, _size: Size) -> RandomGenerator<T> {
        let choices = Arc::new(self.values());
        let index = choose_index(choices.iter().map(|(weight, _)| *weight).collect());
        index.map(move |i| choices[i].1.clone())
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let values = self.values().into_iter().map(|(_, value)| value).collect();
        ExhaustiveGenerator::choose(values, max_samples)
    }

    /// First and last value; the last one shrinks towards earlier values.
    fn edge_cases(&self) -> EdgeCases<T> {
        let choices = Arc::new(self.values());
        if choices.is_empty() {
            return EdgeCases::none();
        }
        let mut indices = vec![0, choices.len() - 1];
        indices.dedup();
        EdgeCases::from_shrinkables(
            indices
                .into_iter()
                .map(|i| {
                    let choices = choices.clone();
                    index_shrinkable(i).map(move |j| choices[j].1.clone())
                })
                .collect(),
        )
    }
}

/// Weighted choice between arbitraries; shrinks the choice first, then within it.
pub struct FrequencyOf<T> {
    alternatives: Arc<Vec<(u64, BoxedArbitrary<T>)>>,
}

impl<T> Clone for FrequencyOf<T> {
    fn clone(&self) -> Self {
        FrequencyOf {
            alternatives: self.alternatives.clone(),
        }
    }
}

pub fn frequency_of<T: Generatable>(alternatives: Vec<(u64, BoxedArbitrary<T>)>) -> FrequencyOf<T> {
    FrequencyOf {
        alternatives: Arc::new(alternatives),
    }
}

/// Uniform choice between arbitraries.
pub fn one_of<T: Generatable>(alternatives: Vec<BoxedArbitrary<T>>) -> FrequencyOf<T> {
    frequency_of(alternatives.into_iter().map(|a| (1, a)).collect())
}

impl<T: Generatable> FrequencyOf<T> {
    fn active(&self) -> Vec<(u64, BoxedArbitrary<T>)> {
        self.alternatives
            .iter()
            .filter(|(weight, _)| *weight > 0)
            .cloned()
            .collect()
    }
}

impl<T: Generatable> Arbitrary<T> for FrequencyOf<T> {
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        let alternatives = Arc::new(self.active());
        if alternatives.is_empty() {
            return RandomGenerator::new(|_seed| {
                Err(QuarryError::GenerationExhausted {
                    attempts: 0,
                    reason: "no alternative has a positive weight".to_string(),
                })
            });
        }
        choose_index(alternatives.iter().map(|(weight, _)| *weight).collect())
            .flat_map(move |i| alternatives[i].1.generator_with_embedded_edge_cases(size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let parts = self
            .active()
            .iter()
            .map(|(_, arbitrary)| arbitrary.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        ExhaustiveGenerator::concat(parts, max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<T> {
        self.active()
            .iter()
            .fold(EdgeCases::none(), |acc, (_, arbitrary)| {
                acc.concat(arbitrary.edge_cases())
            })
    }
}
