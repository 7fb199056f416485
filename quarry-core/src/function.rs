//! Generated function values.
//!
//! A generated function answers each argument with a value drawn from a
//! result arbitrary, seeded by a stable base seed combined with the
//! argument's hash. Equal arguments therefore give equal answers without a
//! lookup table of all inputs.

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::data::{Seed, Size};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::{QuarryError, Result};
use crate::gen::RandomGenerator;
use crate::shrinkable::{Generatable, Shrinkable};
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

type Condition<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;
type Answer<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

/// Arbitrary producing functions from `A` to `R`.
pub struct FunctionArbitrary<A, R> {
    results: BoxedArbitrary<R>,
    conditions: Vec<(Condition<A>, Answer<A, R>)>,
}

impl<A, R> Clone for FunctionArbitrary<A, R> {
    fn clone(&self) -> Self {
        FunctionArbitrary {
            results: self.results.clone(),
            conditions: self.conditions.clone(),
        }
    }
}

pub fn functions<A, R>(results: impl Arbitrary<R> + 'static) -> FunctionArbitrary<A, R>
where
    A: Hash + 'static,
    R: Generatable,
{
    FunctionArbitrary {
        results: BoxedArbitrary::new(results),
        conditions: Vec::new(),
    }
}

impl<A: Hash + 'static, R: Generatable> FunctionArbitrary<A, R> {
    /// Answer arguments matching `condition` with `answer` instead of a random result.
    ///
    /// Conditions are checked in the order they were added.
    pub fn when<C, F>(mut self, condition: C, answer: F) -> Self
    where
        C: Fn(&A) -> bool + Send + Sync + 'static,
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.conditions.push((Arc::new(condition), Arc::new(answer)));
        self
    }
}

#[derive(Clone)]
enum Body<R> {
    Random(RandomGenerator<R>),
    Constant(R),
}

/// A call routed through [`GeneratedFunction::dispatch`].
#[derive(Debug, Clone, Copy)]
pub enum FunctionCall<'a, A> {
    Apply(&'a A),
    Describe,
    Hash,
    /// Any other behaviour a caller may expect from a function value.
    Default { method: &'a str },
}

/// Result of a dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<R> {
    Value(R),
    Description(String),
    Hash(u64),
}

/// A function value produced by [`FunctionArbitrary`].
pub struct GeneratedFunction<A, R> {
    base_seed: u64,
    body: Body<R>,
    conditions: Arc<Vec<(Condition<A>, Answer<A, R>)>>,
    last_result: Arc<Mutex<Option<Shrinkable<R>>>>,
}

impl<A, R: Clone> Clone for GeneratedFunction<A, R> {
    fn clone(&self) -> Self {
        GeneratedFunction {
            base_seed: self.base_seed,
            body: self.body.clone(),
            conditions: self.conditions.clone(),
            last_result: self.last_result.clone(),
        }
    }
}

/// Combine the base seed with the hash of the arguments.
fn seed_for_args<A: Hash>(base_seed: u64, args: &A) -> u64 {
    let mut hasher = DefaultHasher::new();
    args.hash(&mut hasher);
    base_seed.rotate_right(16) ^ hasher.finish()
}

impl<A: Hash + 'static, R: Generatable> GeneratedFunction<A, R> {
    fn constant(
        value: R,
        base_seed: u64,
        conditions: Arc<Vec<(Condition<A>, Answer<A, R>)>>,
    ) -> Self {
        GeneratedFunction {
            base_seed,
            body: Body::Constant(value),
            conditions,
            last_result: Arc::new(Mutex::new(None)),
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Whether this function ignores its arguments.
    pub fn is_constant(&self) -> bool {
        matches!(self.body, Body::Constant(_))
    }

    /// Apply the function, surfacing result generation errors.
    pub fn try_apply(&self, args: &A) -> Result<R> {
        if let Some((_, answer)) = self.conditions.iter().find(|(condition, _)| condition(args)) {
            return Ok(answer(args));
        }
        match &self.body {
            Body::Constant(value) => Ok(value.clone()),
            Body::Random(results) => {
                let seed = Seed::from_u64(seed_for_args(self.base_seed, args));
                let result = results.next(seed)?;
                let value = result.value().clone();
                *self.last_result.lock() = Some(result);
                Ok(value)
            }
        }
    }

    /// Apply the function.
    ///
    /// # Panics
    ///
    /// Panics if the result arbitrary fails to generate a value, e.g. because
    /// its filter is exhausted. A panic inside a property counts as a failure.
    pub fn apply(&self, args: &A) -> R {
        self.try_apply(args)
            .unwrap_or_else(|error| panic!("generated function failed: {}", error))
    }

    /// Single entry point for every call a function value supports.
    pub fn dispatch(&self, call: FunctionCall<'_, A>) -> Result<CallOutcome<R>> {
        match call {
            FunctionCall::Apply(args) => Ok(CallOutcome::Value(self.try_apply(args)?)),
            FunctionCall::Describe => Ok(CallOutcome::Description(self.to_string())),
            FunctionCall::Hash => {
                let mut hasher = DefaultHasher::new();
                self.base_seed.hash(&mut hasher);
                Ok(CallOutcome::Hash(hasher.finish()))
            }
            FunctionCall::Default { method } => Err(QuarryError::UnsupportedOperation {
                operation: format!("default method `{}` on a generated function", method),
            }),
        }
    }

    /// Wrap the function so that it shrinks to a constant of its last result.
    fn into_shrinkable(self) -> Shrinkable<GeneratedFunction<A, R>> {
        let last_result = self.last_result.clone();
        let conditions = self.conditions.clone();
        let base_seed = self.base_seed;
        Shrinkable::new(self, ShrinkingDistance::max(), move || {
            let conditions = conditions.clone();
            let candidate = last_result.lock().clone().map(move |result| {
                result.map(move |value| {
                    GeneratedFunction::constant(value, base_seed, conditions.clone())
                })
            });
            Box::new(candidate.into_iter())
        })
    }
}

impl<A, R> fmt::Display for GeneratedFunction<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function<{}>(baseSeed: {})",
            std::any::type_name::<R>(),
            self.base_seed
        )
    }
}

impl<A, R: fmt::Debug> fmt::Debug for GeneratedFunction<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Constant(value) => write!(f, "Function<constant {:?}>", value),
            Body::Random(_) => write!(f, "{}", self),
        }
    }
}

impl<A: Hash + 'static, R: Generatable> Arbitrary<GeneratedFunction<A, R>> for FunctionArbitrary<A, R> {
    fn generator(&self, size: Size) -> RandomGenerator<GeneratedFunction<A, R>> {
        let results = self.results.generator_with_embedded_edge_cases(size);
        let conditions = Arc::new(self.conditions.clone());
        RandomGenerator::new(move |seed| {
            let (base_seed, _) = seed.next_u64();
            let function = GeneratedFunction {
                base_seed,
                body: Body::Random(results.clone()),
                conditions: conditions.clone(),
                last_result: Arc::new(Mutex::new(None)),
            };
            Ok(function.into_shrinkable())
        })
    }

    /// Constant functions over the result edge cases.
    fn edge_cases(&self) -> EdgeCases<GeneratedFunction<A, R>> {
        let conditions = Arc::new(self.conditions.clone());
        self.results
            .edge_cases()
            .map(move |value| GeneratedFunction::constant(value, 0, conditions.clone()))
    }
}
