//! Shrinking of falsified samples, one parameter after the other.

use crate::data::{Config, ShrinkingMode};
use crate::distance::ShrinkingDistance;
use crate::shrinkable::{Generatable, Shrinkable};
use std::fmt;
use tracing::{debug, trace};

/// Outcome of evaluating a property against one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryExecutionResult {
    Satisfied,
    /// The property failed, optionally with the reason it reported.
    Falsified { reason: Option<String> },
    /// The sample violated an assumption; it neither passes nor fails.
    Invalid,
}

impl TryExecutionResult {
    pub fn falsified(reason: impl Into<String>) -> Self {
        TryExecutionResult::Falsified {
            reason: Some(reason.into()),
        }
    }

    pub fn is_falsified(&self) -> bool {
        matches!(self, TryExecutionResult::Falsified { .. })
    }
}

/// Conversion of property return values into execution results.
pub trait IntoExecutionResult {
    fn into_execution_result(self) -> TryExecutionResult;
}

impl IntoExecutionResult for TryExecutionResult {
    fn into_execution_result(self) -> TryExecutionResult {
        self
    }
}

impl IntoExecutionResult for bool {
    fn into_execution_result(self) -> TryExecutionResult {
        if self {
            TryExecutionResult::Satisfied
        } else {
            TryExecutionResult::Falsified { reason: None }
        }
    }
}

impl IntoExecutionResult for () {
    fn into_execution_result(self) -> TryExecutionResult {
        TryExecutionResult::Satisfied
    }
}

impl<E: fmt::Display> IntoExecutionResult for std::result::Result<(), E> {
    fn into_execution_result(self) -> TryExecutionResult {
        match self {
            Ok(()) => TryExecutionResult::Satisfied,
            Err(error) => TryExecutionResult::falsified(error.to_string()),
        }
    }
}

/// Evaluates a property against the parameters of a sample.
pub trait Falsifier<T> {
    fn execute(&self, parameters: &[T]) -> TryExecutionResult;
}

impl<T, F> Falsifier<T> for F
where
    F: Fn(&[T]) -> TryExecutionResult,
{
    fn execute(&self, parameters: &[T]) -> TryExecutionResult {
        self(parameters)
    }
}

/// One shrinkable per property parameter plus the failure they produced.
///
/// Samples are replaced, never mutated, when a smaller one is found.
#[derive(Clone)]
pub struct FalsifiedSample<T> {
    shrinkables: Vec<Shrinkable<T>>,
    failure: Option<String>,
}

impl<T: Generatable> FalsifiedSample<T> {
    pub fn new(shrinkables: Vec<Shrinkable<T>>, failure: Option<String>) -> Self {
        FalsifiedSample {
            shrinkables,
            failure,
        }
    }

    pub fn shrinkables(&self) -> &[Shrinkable<T>] {
        &self.shrinkables
    }

    pub fn parameters(&self) -> Vec<T> {
        self.shrinkables.iter().map(|s| s.value().clone()).collect()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn size(&self) -> usize {
        self.shrinkables.len()
    }

    pub fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(self.shrinkables.iter().map(|s| s.distance()))
    }

    /// Copy of this sample with one parameter replaced.
    pub fn with_replaced(&self, index: usize, shrinkable: Shrinkable<T>, failure: Option<String>) -> Self {
        let mut shrinkables = self.shrinkables.clone();
        shrinkables[index] = shrinkable;
        FalsifiedSample {
            shrinkables,
            failure,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FalsifiedSample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.shrinkables.iter().map(|s| s.value()))
            .finish()
    }
}

/// Searches for a smaller sample that still falsifies the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shrinker {
    mode: ShrinkingMode,
    max_attempts: usize,
}

impl Shrinker {
    pub fn new(mode: ShrinkingMode, max_attempts: usize) -> Self {
        Shrinker { mode, max_attempts }
    }

    pub fn from_config(config: &Config) -> Self {
        Shrinker::new(config.shrinking, config.shrink_limit)
    }

    /// Shrink `sample` to a local minimum of `falsifier`.
    ///
    /// Each parameter is shrunk in turn while the others stay fixed. The
    /// first candidate that still falsifies replaces the current sample and
    /// the search for that parameter restarts from the new value's own
    /// candidates; a rejected candidate is reported and the next one is
    /// pulled. Passes over all parameters repeat while they lower the total
    /// distance.
    ///
    /// `on_shrink` receives the parameter index and the new smallest sample,
    /// `on_attempt` the index and each rejected candidate. In bounded mode the
    /// search stops after `max_attempts` evaluations and returns the smallest
    /// sample found so far.
    ///
    /// Candidates are not deduplicated: a shrinkable whose candidates cycle
    /// makes full shrinking loop forever.
    pub fn shrink<T, F>(
        &self,
        falsifier: &F,
        sample: FalsifiedSample<T>,
        mut on_shrink: impl FnMut(usize, &FalsifiedSample<T>),
        mut on_attempt: impl FnMut(usize, &FalsifiedSample<T>),
    ) -> FalsifiedSample<T>
    where
        T: Generatable,
        F: Falsifier<T> + ?Sized,
    {
        let budget = match self.mode {
            ShrinkingMode::Off => return sample,
            ShrinkingMode::Bounded => Some(self.max_attempts),
            ShrinkingMode::Full => None,
        };

        let mut current = sample;
        let mut attempts = 0usize;
        loop {
            let before = current.distance();
            for index in 0..current.size() {
                loop {
                    let mut accepted = None;
                    for candidate in current.shrinkables[index].shrink() {
                        if budget.is_some_and(|max| attempts >= max) {
                            debug!(attempts, "shrink budget exhausted");
                            return current;
                        }
                        attempts += 1;
                        let next = current.with_replaced(index, candidate, None);
                        match falsifier.execute(&next.parameters()) {
                            TryExecutionResult::Falsified { reason } => {
                                accepted = Some(FalsifiedSample {
                                    failure: reason,
                                    ..next
                                });
                                break;
                            }
                            _ => {
                                trace!(parameter = index, "rejected shrink candidate");
                                on_attempt(index, &next);
                            }
                        }
                    }
                    match accepted {
                        Some(next) => {
                            debug!(parameter = index, distance = %next.distance(), "accepted shrink");
                            current = next;
                            on_shrink(index, &current);
                        }
                        None => break,
                    }
                }
            }
            if current.distance() >= before {
                return current;
            }
        }
    }
}
