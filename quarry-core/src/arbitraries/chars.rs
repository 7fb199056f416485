//! Character domains built from inclusive code point ranges.

use crate::arbitrary::Arbitrary;
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::RandomGenerator;
use crate::shrinkable::Shrinkable;
use std::sync::Arc;

const SURROGATES_START: u32 = 0xD800;
const SURROGATES_END: u32 = 0xDFFF;

/// Characters drawn from a union of ranges; shrinks towards the first character.
///
/// Without any configured range every Unicode scalar value is allowed.
#[derive(Debug, Clone, Default)]
pub struct CharacterArbitrary {
    ranges: Vec<(u32, u32)>,
}

pub fn chars() -> CharacterArbitrary {
    CharacterArbitrary::default()
}

impl CharacterArbitrary {
    /// Allow the given characters.
    pub fn with(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.ranges
            .extend(chars.into_iter().map(|c| (c as u32, c as u32)));
        self
    }

    /// Allow every character in `[min, max]`.
    pub fn range(mut self, min: char, max: char) -> Self {
        if min <= max {
            self.ranges.push((min as u32, max as u32));
        }
        self
    }

    pub fn ascii(self) -> Self {
        self.range('\u{0}', '\u{7f}')
    }

    pub fn alpha(self) -> Self {
        self.range('a', 'z').range('A', 'Z')
    }

    pub fn numeric(self) -> Self {
        self.range('0', '9')
    }

    pub fn whitespace(self) -> Self {
        self.with([' ', '\t', '\n', '\r', '\u{b}', '\u{c}'])
    }

    pub fn all(self) -> Self {
        self.range('\u{0}', char::MAX)
    }

    /// Configured ranges with surrogates and overlaps cut out.
    ///
    /// Ranges keep their configured order; a later range only contributes
    /// the characters no earlier range covers.
    fn effective_ranges(&self) -> Vec<(u32, u32)> {
        let configured = if self.ranges.is_empty() {
            vec![(0, char::MAX as u32)]
        } else {
            self.ranges.clone()
        };
        let mut covered = vec![(SURROGATES_START, SURROGATES_END)];
        let mut effective = Vec::new();
        for range in configured {
            let pieces = subtract(range, &covered);
            covered.extend(pieces.iter().copied());
            effective.extend(pieces);
        }
        effective
    }

    fn index_space(&self) -> CharIndex {
        CharIndex::new(self.effective_ranges())
    }
}

/// The parts of `range` outside every range in `covered`.
fn subtract(range: (u32, u32), covered: &[(u32, u32)]) -> Vec<(u32, u32)> {
    covered.iter().fold(vec![range], |pieces, (cut_min, cut_max)| {
        pieces
            .into_iter()
            .flat_map(|(min, max)| {
                if max < *cut_min || min > *cut_max {
                    return vec![(min, max)];
                }
                let mut parts = Vec::new();
                if min < *cut_min {
                    parts.push((min, cut_min - 1));
                }
                if max > *cut_max {
                    parts.push((cut_max + 1, max));
                }
                parts
            })
            .collect()
    })
}

/// Maps a dense index onto the configured ranges.
#[derive(Debug)]
struct CharIndex {
    ranges: Vec<(u32, u32)>,
    total: u64,
}

impl CharIndex {
    fn new(ranges: Vec<(u32, u32)>) -> Self {
        let total = ranges.iter().map(|(min, max)| (max - min) as u64 + 1).sum();
        CharIndex { ranges, total }
    }

    fn char_at(&self, index: i128) -> char {
        let mut remaining = index.max(0) as u64;
        for (min, max) in &self.ranges {
            let len = (max - min) as u64 + 1;
            if remaining < len {
                return char::from_u32(min + remaining as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
            remaining -= len;
        }
        char::REPLACEMENT_CHARACTER
    }

    fn index_of(&self, code_point: u32) -> Option<i128> {
        let mut offset: u64 = 0;
        for (min, max) in &self.ranges {
            if (*min..=*max).contains(&code_point) {
                return Some((offset + (code_point - min) as u64) as i128);
            }
            offset += (max - min) as u64 + 1;
        }
        None
    }
}

impl Arbitrary<char> for CharacterArbitrary {
    fn generator(&self, _size: Size) -> RandomGenerator<char> {
        let index = Arc::new(self.index_space());
        RandomGenerator::new(move |seed| {
            let (position, _) = seed.next_i128_in(0, index.total as i128 - 1);
            let lookup = index.clone();
            Ok(Shrinkable::integral(position, 0).map(move |i| lookup.char_at(i)))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<char>> {
        let index = Arc::new(self.index_space());
        let positions = ExhaustiveGenerator::from_range(0, index.total as i128 - 1, max_samples)?;
        Some(positions.map(move |i| index.char_at(i)))
    }

    /// The bounds of every range.
    fn edge_cases(&self) -> EdgeCases<char> {
        let index = Arc::new(self.index_space());
        let mut positions: Vec<i128> = Vec::new();
        for (min, max) in &index.ranges {
            for code_point in [*min, *max] {
                if let Some(position) = index.index_of(code_point) {
                    if !positions.contains(&position) {
                        positions.push(position);
                    }
                }
            }
        }
        EdgeCases::from_shrinkables(
            positions
                .into_iter()
                .map(|position| {
                    let lookup = index.clone();
                    Shrinkable::integral(position, 0).map(move |i| lookup.char_at(i))
                })
                .collect(),
        )
    }
}
