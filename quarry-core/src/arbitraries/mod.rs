//! Domain constructors for common value types.

mod chars;
mod choices;
mod collections;
mod combine;
mod integers;
mod strings;

pub use chars::{chars, CharacterArbitrary};
pub use choices::{booleans, frequency, frequency_of, just, of, one_of, Choose, FrequencyOf, Just};
pub use collections::{lists, ListArbitrary, DEFAULT_MAX_SIZE, MAX_UNIQUENESS_ATTEMPTS};
pub use combine::{combine2, combine3, combine_all, zip, CombineAll, Zipped};
pub use integers::{integers, IntegerArbitrary};
pub use strings::{strings, StringArbitrary};
