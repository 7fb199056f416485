//! Core generation and shrinking engine for Quarry property-based testing.
//!
//! This crate provides the building blocks: shrinkable values, random and
//! exhaustive generators, arbitraries and their combinators, the shrinker,
//! transformer chains, generated functions and the property driving loop.

pub mod arbitraries;
pub mod arbitrary;
pub mod chain;
pub mod data;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod exhaustive;
pub mod function;
pub mod gen;
pub mod property;
pub mod shrinkable;
pub mod shrinker;

// Re-export the main types
pub use arbitraries::*;
pub use arbitrary::*;
pub use chain::*;
pub use data::*;
pub use distance::*;
pub use edge_cases::*;
pub use error::*;
pub use exhaustive::*;
pub use function::*;
pub use gen::*;
pub use property::*;
pub use shrinkable::*;
pub use shrinker::*;
