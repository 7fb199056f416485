//! Error types and property outcomes.

use std::fmt;
use thiserror::Error;

/// Main error type for quarry generation and property runs.
///
/// A falsified property is not an error: it is reported through
/// [`TestResult::Fail`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuarryError {
    /// A constrained generator could not produce a value within its retry budget.
    #[error("Generation exhausted after {attempts} attempts: {reason}")]
    GenerationExhausted { attempts: usize, reason: String },

    /// The requested operation is not supported by a generated value.
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// Exhaustive generation was requested for a domain that cannot be enumerated.
    #[error("Parameter space cannot be enumerated within {max_samples} samples")]
    NotExhaustible { max_samples: u64 },

    /// Edge-case generation was requested but no parameter combination exists.
    #[error("No edge cases to try")]
    NoEdgeCases,

    /// Too many test cases were discarded.
    #[error("Too many test cases discarded (limit: {limit})")]
    TooManyDiscards { limit: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;

/// A shrinking step in the failure progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkStep {
    /// The counterexample at this step.
    pub counterexample: String,
    /// The step number (0 = original, 1+ = accepted shrinks).
    pub step: usize,
    /// Index of the parameter that changed, if any.
    pub parameter: Option<usize>,
}

/// Outcome of a property test.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    /// Test passed successfully.
    Pass {
        tests_run: usize,
        exhaustive: bool,
        property_name: Option<String>,
    },

    /// Test failed with a counterexample.
    Fail {
        /// Minimal counterexample after shrinking.
        counterexample: String,
        /// The sample that failed first.
        original_sample: String,
        /// Failure reason of the minimal counterexample.
        failure: Option<String>,
        /// Run seed; replays the original failure with `Config::with_seed`.
        seed: String,
        tests_run: usize,
        shrinks_performed: usize,
        shrink_attempts: usize,
        property_name: Option<String>,
        /// The shrinking progression showing how we reached the minimal counterexample.
        shrink_steps: Vec<ShrinkStep>,
    },

    /// Too many test cases were discarded.
    Discard {
        limit: usize,
        tests_run: usize,
        property_name: Option<String>,
    },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }

    pub fn tests_run(&self) -> usize {
        match self {
            TestResult::Pass { tests_run, .. }
            | TestResult::Fail { tests_run, .. }
            | TestResult::Discard { tests_run, .. } => *tests_run,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Pass {
                tests_run,
                exhaustive,
                property_name,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                if *exhaustive {
                    write!(
                        f,
                        "  ✓ {} passed {} tests (exhaustive).",
                        prop_name, tests_run
                    )
                } else {
                    write!(f, "  ✓ {} passed {} tests.", prop_name, tests_run)
                }
            }
            TestResult::Fail {
                counterexample,
                original_sample,
                failure,
                seed,
                tests_run,
                shrinks_performed,
                shrink_attempts,
                property_name,
                shrink_steps,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                writeln!(
                    f,
                    "  ✗ {} failed after {} tests and {} shrinks ({} attempts).",
                    prop_name, tests_run, shrinks_performed, shrink_attempts
                )?;
                writeln!(f, "    seed = {}", seed)?;

                if !shrink_steps.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "    Shrinking progression:")?;
                    for step in shrink_steps {
                        match (step.step, step.parameter) {
                            (0, _) => writeln!(f, "      │ Original: {}", step.counterexample)?,
                            (n, Some(index)) => writeln!(
                                f,
                                "      │ Step {}: {} -- arg {}",
                                n, step.counterexample, index
                            )?,
                            (n, None) => {
                                writeln!(f, "      │ Step {}: {}", n, step.counterexample)?
                            }
                        }
                    }
                    writeln!(f)?;
                } else if original_sample != counterexample {
                    writeln!(f, "    Original sample: {}", original_sample)?;
                }

                if let Some(reason) = failure {
                    writeln!(f, "    === {} ===", reason)?;
                }

                write!(f, "    Minimal counterexample: {}", counterexample)
            }
            TestResult::Discard {
                limit,
                property_name,
                ..
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                write!(f, "  ⚐ {} gave up after {} discards", prop_name, limit)
            }
        }
    }
}

impl From<QuarryError> for TestResult {
    fn from(error: QuarryError) -> Self {
        match error {
            QuarryError::TooManyDiscards { limit } => TestResult::Discard {
                limit,
                tests_run: 0,
                property_name: None,
            },
            _ => TestResult::Fail {
                counterexample: String::new(),
                original_sample: String::new(),
                failure: Some(error.to_string()),
                seed: String::new(),
                tests_run: 0,
                shrinks_performed: 0,
                shrink_attempts: 0,
                property_name: None,
                shrink_steps: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = QuarryError::GenerationExhausted {
            attempts: 10,
            reason: "filter rejected every value".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Generation exhausted after 10 attempts: filter rejected every value"
        );
    }

    #[test]
    fn test_fail_display_includes_seed_and_progression() {
        let result = TestResult::Fail {
            counterexample: "[11]".to_string(),
            original_sample: "[87]".to_string(),
            failure: Some("value too large".to_string()),
            seed: "42".to_string(),
            tests_run: 3,
            shrinks_performed: 1,
            shrink_attempts: 4,
            property_name: Some("small".to_string()),
            shrink_steps: vec![
                ShrinkStep {
                    counterexample: "[87]".to_string(),
                    step: 0,
                    parameter: None,
                },
                ShrinkStep {
                    counterexample: "[11]".to_string(),
                    step: 1,
                    parameter: Some(0),
                },
            ],
        };
        let rendered = result.to_string();
        assert!(rendered.contains("small failed after 3 tests"));
        assert!(rendered.contains("seed = 42"));
        assert!(rendered.contains("Step 1: [11] -- arg 0"));
        assert!(rendered.contains("=== value too large ==="));
        assert!(rendered.ends_with("Minimal counterexample: [11]"));
    }

    #[test]
    fn test_discard_from_error() {
        let result = TestResult::from(QuarryError::TooManyDiscards { limit: 5 });
        assert!(matches!(result, TestResult::Discard { limit: 5, .. }));
        assert!(!result.is_pass());
    }
}
