//! Integral domains over any primitive integer type.

use crate::arbitrary::Arbitrary;
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::error::QuarryError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::{self, RandomGenerator};
use crate::shrinkable::{Generatable, Shrinkable};
use num_traits::{FromPrimitive, PrimInt};
use std::marker::PhantomData;

/// Integers in an inclusive range, shrinking towards a target.
///
/// The target defaults to zero, clamped into the range. Values are handled
/// as `i128` internally, so `u128` ranges beyond `i128::MAX` are cut off.
/// An empty range (`min > max`) fails generation with
/// [`QuarryError::InvalidConfig`].
#[derive(Debug, Clone)]
pub struct IntegerArbitrary<T> {
    min: i128,
    max: i128,
    target: Option<i128>,
    _marker: PhantomData<fn() -> T>,
}

pub fn integers<T>() -> IntegerArbitrary<T>
where
    T: PrimInt + FromPrimitive + Generatable,
{
    IntegerArbitrary {
        min: widen(T::min_value()),
        max: widen(T::max_value()),
        target: None,
        _marker: PhantomData,
    }
}

fn widen<T: PrimInt>(value: T) -> i128 {
    value.to_i128().unwrap_or(if value < T::zero() {
        i128::MIN
    } else {
        i128::MAX
    })
}

fn narrow<T: PrimInt + FromPrimitive>(value: i128) -> T {
    T::from_i128(value).unwrap_or_else(|| {
        if value < 0 {
            T::min_value()
        } else {
            T::max_value()
        }
    })
}

impl<T> IntegerArbitrary<T>
where
    T: PrimInt + FromPrimitive + Generatable,
{
    pub fn between(mut self, min: T, max: T) -> Self {
        self.min = widen(min);
        self.max = widen(max);
        self
    }

    pub fn greater_or_equal(mut self, min: T) -> Self {
        self.min = widen(min);
        self
    }

    pub fn less_or_equal(mut self, max: T) -> Self {
        self.max = widen(max);
        self
    }

    pub fn shrink_towards(mut self, target: T) -> Self {
        self.target = Some(widen(target));
        self
    }

    fn target(&self) -> i128 {
        self.target.unwrap_or(0).clamp(self.min, self.max.max(self.min))
    }

    fn shrinkable(&self, value: i128) -> Shrinkable<T> {
        Shrinkable::integral(value, self.target()).map(narrow::<T>)
    }
}

impl<T> Arbitrary<T> for IntegerArbitrary<T>
where
    T: PrimInt + FromPrimitive + Generatable,
{
    fn generator(&self, size: Size) -> RandomGenerator<T> {
        if self.min > self.max {
            let message = format!("integer range is empty: min {} > max {}", self.min, self.max);
            return RandomGenerator::new(move |_| {
                Err(QuarryError::InvalidConfig {
                    message: message.clone(),
                })
            });
        }
        gen::integral(self.min, self.max, self.target(), size).map(narrow::<T>)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        Some(ExhaustiveGenerator::from_range(self.min, self.max, max_samples)?.map(narrow::<T>))
    }

    /// Range bounds, the target and its neighbours.
    fn edge_cases(&self) -> EdgeCases<T> {
        if self.min > self.max {
            return EdgeCases::none();
        }
        let target = self.target();
        let mut values: Vec<i128> = Vec::new();
        for candidate in [
            Some(target),
            target.checked_sub(1),
            target.checked_add(1),
            Some(self.min),
            Some(self.max),
        ]
        .into_iter()
        .flatten()
        {
            if (self.min..=self.max).contains(&candidate) && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        EdgeCases::from_shrinkables(values.into_iter().map(|v| self.shrinkable(v)).collect())
    }
}
