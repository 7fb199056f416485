//! Quarry property-based testing library.
//!
//! This is the main entry point for Quarry: arbitraries describe value
//! domains, properties check predicates over them and failing samples are
//! shrunk to a minimal counterexample.

pub use quarry_core::*;
