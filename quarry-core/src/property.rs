//! Properties and the loop that drives them.
//!
//! A property owns one arbitrary per parameter and a falsifier over the
//! parameter values. Running it pulls samples, evaluates the falsifier on
//! each and hands the first falsified sample to the [`Shrinker`].

use crate::arbitrary::{Arbitrary, ArbitraryExt, BoxedArbitrary};
use crate::data::{Config, EdgeCasesMode, GenerationMode, Seed};
use crate::edge_cases::EdgeCases;
use crate::error::{QuarryError, Result, ShrinkStep, TestResult};
use crate::exhaustive::ExhaustiveGenerator;
use crate::shrinkable::{Generatable, Shrinkable};
use crate::shrinker::{FalsifiedSample, IntoExecutionResult, Shrinker, TryExecutionResult};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info};

trait AnyValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> AnyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-erased property parameter value.
#[derive(Clone)]
pub struct Parameter(Arc<dyn AnyValue>);

impl Parameter {
    pub fn new<T: Any + fmt::Debug + Send + Sync>(value: T) -> Self {
        Parameter(Arc::new(value))
    }

    /// The value, if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let value: &dyn AnyValue = &*self.0;
        value.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Observer of the shrinking progression.
pub trait ShrinkReporter: Send + Sync {
    /// A smaller falsified sample was found by shrinking `parameter`.
    fn on_shrink(&self, parameter: usize, sample: &FalsifiedSample<Parameter>);

    /// A candidate for `parameter` was tried and rejected.
    fn on_attempt(&self, _parameter: usize, _sample: &FalsifiedSample<Parameter>) {}
}

type PropertyFn = Arc<dyn Fn(&[Parameter]) -> TryExecutionResult + Send + Sync>;

/// A property over one or more generated parameters.
pub struct Property {
    parameters: Vec<BoxedArbitrary<Parameter>>,
    falsifier: PropertyFn,
    name: Option<String>,
    reporter: Option<Arc<dyn ShrinkReporter>>,
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

fn parameter<T, A>(arbitrary: A) -> BoxedArbitrary<Parameter>
where
    T: Generatable + fmt::Debug,
    A: Arbitrary<T> + 'static,
{
    arbitrary.map(Parameter::new::<T>).boxed()
}

fn argument<T: Any>(parameters: &[Parameter], index: usize) -> Option<&T> {
    parameters.get(index).and_then(|p| p.downcast_ref::<T>())
}

impl Property {
    /// Property over an untyped parameter list.
    pub fn from_parameters<F>(parameters: Vec<BoxedArbitrary<Parameter>>, falsifier: F) -> Self
    where
        F: Fn(&[Parameter]) -> TryExecutionResult + Send + Sync + 'static,
    {
        Property {
            parameters,
            falsifier: Arc::new(falsifier),
            name: None,
            reporter: None,
        }
    }

    pub fn for_all<T, A, F, R>(arbitrary: A, predicate: F) -> Self
    where
        T: Generatable + fmt::Debug,
        A: Arbitrary<T> + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoExecutionResult,
    {
        Property::from_parameters(vec![parameter(arbitrary)], move |parameters| {
            match argument::<T>(parameters, 0) {
                Some(a) => predicate(a).into_execution_result(),
                None => TryExecutionResult::Invalid,
            }
        })
    }

    pub fn for_all2<T, U, A, B, F, R>(first: A, second: B, predicate: F) -> Self
    where
        T: Generatable + fmt::Debug,
        U: Generatable + fmt::Debug,
        A: Arbitrary<T> + 'static,
        B: Arbitrary<U> + 'static,
        F: Fn(&T, &U) -> R + Send + Sync + 'static,
        R: IntoExecutionResult,
    {
        Property::from_parameters(
            vec![parameter(first), parameter(second)],
            move |parameters| {
                match (argument::<T>(parameters, 0), argument::<U>(parameters, 1)) {
                    (Some(a), Some(b)) => predicate(a, b).into_execution_result(),
                    _ => TryExecutionResult::Invalid,
                }
            },
        )
    }

    pub fn for_all3<T, U, V, A, B, C, F, R>(first: A, second: B, third: C, predicate: F) -> Self
    where
        T: Generatable + fmt::Debug,
        U: Generatable + fmt::Debug,
        V: Generatable + fmt::Debug,
        A: Arbitrary<T> + 'static,
        B: Arbitrary<U> + 'static,
        C: Arbitrary<V> + 'static,
        F: Fn(&T, &U, &V) -> R + Send + Sync + 'static,
        R: IntoExecutionResult,
    {
        Property::from_parameters(
            vec![parameter(first), parameter(second), parameter(third)],
            move |parameters| {
                match (
                    argument::<T>(parameters, 0),
                    argument::<U>(parameters, 1),
                    argument::<V>(parameters, 2),
                ) {
                    (Some(a), Some(b), Some(c)) => predicate(a, b, c).into_execution_result(),
                    _ => TryExecutionResult::Invalid,
                }
            },
        )
    }

    /// Name used in reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_reporter(mut self, reporter: impl ShrinkReporter + 'static) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    /// Run the property.
    ///
    /// Falsification is reported through [`TestResult::Fail`]; `Err` means the
    /// run itself could not proceed (invalid config, a domain that cannot be
    /// enumerated in exhaustive mode, or a generator that gave up).
    pub fn run(&self, config: &Config) -> Result<TestResult> {
        config.validate()?;
        let run_seed = config.seed.unwrap_or_else(|| Seed::random().0);
        debug!(
            property = self.name.as_deref().unwrap_or("property"),
            seed = run_seed,
            mode = ?config.generation,
            "running property"
        );

        let mut trials = Trials {
            property: self,
            config,
            run_seed,
            tests_run: 0,
            discards: 0,
        };

        match config.generation {
            GenerationMode::EdgeCases => trials.run_edge_cases(config.max_edge_cases),
            GenerationMode::Exhaustive => match self.exhaustive(config.test_limit as u64) {
                Some(samples) => match trials.run_exhaustive(samples) {
                    Some(result) => Ok(result),
                    None => Err(QuarryError::GenerationExhausted {
                        attempts: 0,
                        reason: "exhaustive enumeration produced no samples".to_string(),
                    }),
                },
                None => Err(QuarryError::NotExhaustible {
                    max_samples: config.test_limit as u64,
                }),
            },
            GenerationMode::Auto => match self.exhaustive(config.test_limit as u64) {
                Some(samples) => match trials.run_exhaustive(samples) {
                    Some(result) => Ok(result),
                    None => trials.run_randomized(),
                },
                None => trials.run_randomized(),
            },
            GenerationMode::Randomized => trials.run_randomized(),
        }
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<Parameter>>> {
        let parts = self
            .parameters
            .iter()
            .map(|p| p.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        ExhaustiveGenerator::combine_all(parts, max_samples)
    }

    /// Combinations of parameter edge cases, first parameter slowest.
    ///
    /// Each parameter keeps its own edge-case shrinkable.
    fn edge_cases(&self, max: usize) -> Vec<Vec<Shrinkable<Parameter>>> {
        let parts: Vec<EdgeCases<Parameter>> =
            self.parameters.iter().map(|p| p.edge_cases()).collect();
        let mut rows: Vec<Vec<Shrinkable<Parameter>>> = vec![Vec::new()];
        for part in &parts {
            rows = rows
                .iter()
                .flat_map(|row| {
                    part.iter().map(move |case| {
                        let mut next = row.clone();
                        next.push(case.clone());
                        next
                    })
                })
                .take(max)
                .collect();
        }
        rows.truncate(max);
        rows
    }

    /// Evaluate the falsifier; a panic falsifies with its message.
    fn evaluate(&self, parameters: &[Parameter]) -> TryExecutionResult {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.falsifier)(parameters))) {
            Ok(result) => result,
            Err(payload) => TryExecutionResult::falsified(panic_message(payload.as_ref())),
        }
    }

    fn shrink_failure(
        &self,
        config: &Config,
        run_seed: u64,
        tests_run: usize,
        sample: FalsifiedSample<Parameter>,
    ) -> TestResult {
        let original_sample = format!("{:?}", sample);
        let mut shrink_steps = vec![ShrinkStep {
            counterexample: original_sample.clone(),
            step: 0,
            parameter: None,
        }];
        let mut rejected = 0usize;
        let reporter = self.reporter.as_deref();
        let falsifier = |parameters: &[Parameter]| self.evaluate(parameters);

        let minimal = Shrinker::from_config(config).shrink(
            &falsifier,
            sample,
            |index, smaller| {
                let step = shrink_steps.len();
                shrink_steps.push(ShrinkStep {
                    counterexample: format!("{:?}", smaller),
                    step,
                    parameter: Some(index),
                });
                if let Some(reporter) = reporter {
                    reporter.on_shrink(index, smaller);
                }
            },
            |index, candidate| {
                rejected += 1;
                if let Some(reporter) = reporter {
                    reporter.on_attempt(index, candidate);
                }
            },
        );

        let shrinks_performed = shrink_steps.len() - 1;
        info!(
            property = self.name.as_deref().unwrap_or("property"),
            seed = run_seed,
            tests_run,
            shrinks = shrinks_performed,
            "property falsified"
        );

        TestResult::Fail {
            counterexample: format!("{:?}", minimal),
            original_sample,
            failure: minimal.failure().map(str::to_string),
            seed: run_seed.to_string(),
            tests_run,
            shrinks_performed,
            shrink_attempts: shrinks_performed + rejected,
            property_name: self.name.clone(),
            shrink_steps,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// Bookkeeping for one run.
struct Trials<'a> {
    property: &'a Property,
    config: &'a Config,
    run_seed: u64,
    tests_run: usize,
    discards: usize,
}

impl Trials<'_> {
    /// Evaluate one sample; `Some` ends the run.
    fn try_sample(&mut self, shrinkables: Vec<Shrinkable<Parameter>>) -> Option<TestResult> {
        let parameters: Vec<Parameter> = shrinkables.iter().map(|s| s.value().clone()).collect();
        match self.property.evaluate(&parameters) {
            TryExecutionResult::Satisfied => {
                self.tests_run += 1;
                None
            }
            TryExecutionResult::Invalid => {
                self.discards += 1;
                if self.discards > self.config.discard_limit {
                    debug!(discards = self.discards, "discard limit reached");
                    Some(TestResult::Discard {
                        limit: self.config.discard_limit,
                        tests_run: self.tests_run,
                        property_name: self.property.name.clone(),
                    })
                } else {
                    None
                }
            }
            TryExecutionResult::Falsified { reason } => {
                self.tests_run += 1;
                Some(self.property.shrink_failure(
                    self.config,
                    self.run_seed,
                    self.tests_run,
                    FalsifiedSample::new(shrinkables, reason),
                ))
            }
        }
    }

    fn pass(&self, exhaustive: bool) -> TestResult {
        TestResult::Pass {
            tests_run: self.tests_run,
            exhaustive,
            property_name: self.property.name.clone(),
        }
    }

    /// A property whose parameters have no edge-case combination is an error,
    /// never a pass without trials.
    fn run_edge_cases(&mut self, max: usize) -> Result<TestResult> {
        let cases = self.property.edge_cases(max);
        if cases.is_empty() {
            return Err(QuarryError::NoEdgeCases);
        }
        for case in cases {
            if let Some(result) = self.try_sample(case) {
                return Ok(result);
            }
        }
        Ok(self.pass(false))
    }

    /// Exhaustive samples are already enumerated smallest first and are not shrunk.
    ///
    /// `None` when the enumeration turned out to be empty.
    fn run_exhaustive(&mut self, samples: ExhaustiveGenerator<Vec<Parameter>>) -> Option<TestResult> {
        let mut enumerated = false;
        for sample in samples.iter() {
            enumerated = true;
            let shrinkables = sample.into_iter().map(Shrinkable::unshrinkable).collect();
            if let Some(result) = self.try_sample(shrinkables) {
                return Some(result);
            }
        }
        enumerated.then(|| self.pass(true))
    }

    fn run_randomized(&mut self) -> Result<TestResult> {
        let config = self.config;
        if config.edge_cases == EdgeCasesMode::First {
            let max = config.max_edge_cases.min(config.test_limit);
            for case in self.property.edge_cases(max) {
                if let Some(result) = self.try_sample(case) {
                    return Ok(result);
                }
            }
        }

        let mut seed = Seed::from_u64(self.run_seed);
        while self.tests_run < config.test_limit {
            let size = config.size_for_trial(self.tests_run);
            let (trial_seed, next_seed) = seed.split();
            seed = next_seed;

            let mut parameter_seed = trial_seed;
            let mut shrinkables = Vec::with_capacity(self.property.parameters.len());
            for arbitrary in &self.property.parameters {
                let (current, rest) = parameter_seed.split();
                parameter_seed = rest;
                let generator = match config.edge_cases {
                    EdgeCasesMode::Mixin => arbitrary.generator_with_embedded_edge_cases(size),
                    EdgeCasesMode::First | EdgeCasesMode::None => arbitrary.generator(size),
                };
                shrinkables.push(generator.next(current)?);
            }

            if let Some(result) = self.try_sample(shrinkables) {
                return Ok(result);
            }
        }
        Ok(self.pass(false))
    }
}

/// Property over a single arbitrary.
pub fn for_all<T, A, F, R>(arbitrary: A, predicate: F) -> Property
where
    T: Generatable + fmt::Debug,
    A: Arbitrary<T> + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
    R: IntoExecutionResult,
{
    Property::for_all(arbitrary, predicate)
}

pub fn for_all2<T, U, A, B, F, R>(first: A, second: B, predicate: F) -> Property
where
    T: Generatable + fmt::Debug,
    U: Generatable + fmt::Debug,
    A: Arbitrary<T> + 'static,
    B: Arbitrary<U> + 'static,
    F: Fn(&T, &U) -> R + Send + Sync + 'static,
    R: IntoExecutionResult,
{
    Property::for_all2(first, second, predicate)
}

pub fn for_all3<T, U, V, A, B, C, F, R>(first: A, second: B, third: C, predicate: F) -> Property
where
    T: Generatable + fmt::Debug,
    U: Generatable + fmt::Debug,
    V: Generatable + fmt::Debug,
    A: Arbitrary<T> + 'static,
    B: Arbitrary<U> + 'static,
    C: Arbitrary<V> + 'static,
    F: Fn(&T, &U, &V) -> R + Send + Sync + 'static,
    R: IntoExecutionResult,
{
    Property::for_all3(first, second, third, predicate)
}
