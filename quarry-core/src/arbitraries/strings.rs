//! Strings over a configurable alphabet.

use super::chars::{chars, CharacterArbitrary};
use super::collections::{list_generator, DEFAULT_MAX_SIZE};
use crate::arbitrary::Arbitrary;
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::RandomGenerator;
use crate::shrinkable::Shrinkable;

/// Strings with length bounds; shrinks by removing characters, then by
/// shrinking the remaining ones.
#[derive(Debug, Clone)]
pub struct StringArbitrary {
    chars: CharacterArbitrary,
    min_length: usize,
    max_length: usize,
}

pub fn strings() -> StringArbitrary {
    StringArbitrary {
        chars: chars(),
        min_length: 0,
        max_length: DEFAULT_MAX_SIZE,
    }
}

impl StringArbitrary {
    pub fn of_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = self.max_length.max(min_length);
        self
    }

    pub fn of_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self.min_length = self.min_length.min(max_length);
        self
    }

    pub fn of_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self.max_length = length;
        self
    }

    pub fn with_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.chars = self.chars.with(chars);
        self
    }

    pub fn with_char_range(mut self, min: char, max: char) -> Self {
        self.chars = self.chars.range(min, max);
        self
    }

    pub fn ascii(mut self) -> Self {
        self.chars = self.chars.ascii();
        self
    }

    pub fn alpha(mut self) -> Self {
        self.chars = self.chars.alpha();
        self
    }

    pub fn numeric(mut self) -> Self {
        self.chars = self.chars.numeric();
        self
    }

    pub fn whitespace(mut self) -> Self {
        self.chars = self.chars.whitespace();
        self
    }

    pub fn all(mut self) -> Self {
        self.chars = self.chars.all();
        self
    }
}

fn to_string(chars: Vec<char>) -> String {
    chars.into_iter().collect()
}

impl Arbitrary<String> for StringArbitrary {
    fn generator(&self, size: Size) -> RandomGenerator<String> {
        list_generator(
            self.chars.generator_with_embedded_edge_cases(size),
            self.min_length,
            self.max_length,
            size,
            None,
        )
        .map(to_string)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<String>> {
        let alphabet = self.chars.exhaustive(max_samples)?;
        let all = ExhaustiveGenerator::lists(alphabet, self.min_length, self.max_length, max_samples)?;
        Some(all.map(to_string))
    }

    /// The empty string and single-character strings, as far as the length bounds allow.
    fn edge_cases(&self) -> EdgeCases<String> {
        let mut cases = EdgeCases::none();
        if self.min_length == 0 {
            cases = cases.concat(EdgeCases::from_values(vec![String::new()]));
        }
        if self.min_length <= 1 && self.max_length >= 1 {
            let min_length = self.min_length;
            let singles = self
                .chars
                .edge_cases()
                .into_iter()
                .map(|c| Shrinkable::collection(vec![c], min_length).map(to_string))
                .collect();
            cases = cases.concat(EdgeCases::from_shrinkables(singles));
        }
        cases
    }
}
