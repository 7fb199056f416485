//! Core data types: generation size, splittable seeds and run configuration.

use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size typically ranges from 0 to the configured size limit. It biases the
/// magnitude of generated values (collection lengths, integer windows)
/// without changing the logical domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Scale size by a factor.
    pub fn scale(&self, factor: f64) -> Self {
        Size((self.0 as f64 * factor) as usize)
    }

    /// Clamp size to a maximum value.
    pub fn clamp(&self, max: usize) -> Self {
        Size(self.0.min(max))
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic generation.
///
/// Seeds are plain values: every draw returns the advanced seed alongside
/// the drawn value, and `split` derives two independent streams. The same
/// seed therefore always reproduces the same sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and advance the seed.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value in `[0, bound)`.
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        (((value as u128 * bound as u128) >> 64) as u64, new_seed)
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, new_seed) = self.next_u64();
        (value & 1 == 1, new_seed)
    }

    /// Generate a float in `[0, 1)`.
    pub fn next_f64(self) -> (f64, Self) {
        let (value, new_seed) = self.next_u64();
        ((value >> 11) as f64 / (1u64 << 53) as f64, new_seed)
    }

    /// Generate a value in the inclusive range `[min, max]`.
    ///
    /// Ranges wider than 64 bits combine two draws.
    pub fn next_i128_in(self, min: i128, max: i128) -> (i128, Self) {
        if min >= max {
            return (min, self);
        }
        let span = max.abs_diff(min);
        if span < u64::MAX as u128 {
            let (offset, seed) = self.next_bounded(span as u64 + 1);
            (min + offset as i128, seed)
        } else {
            let (high, seed) = self.next_u64();
            let (low, seed) = seed.next_u64();
            let raw = ((high as u128) << 64) | low as u128;
            let offset = match span.checked_add(1) {
                Some(modulus) => raw % modulus,
                None => raw,
            };
            (min.wrapping_add(offset as i128), seed)
        }
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// How samples are produced for a property run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Exhaustive if the whole parameter space fits into the test limit,
    /// randomized otherwise.
    #[default]
    Auto,
    /// Always draw random samples.
    Randomized,
    /// Enumerate the parameter space; fails if it cannot be enumerated.
    Exhaustive,
    /// Only try combinations of edge cases.
    EdgeCases,
}

/// How edge cases take part in randomized generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCasesMode {
    /// Try edge-case combinations before any random sample.
    First,
    /// Inject edge cases at random among generated samples.
    #[default]
    Mixin,
    /// Never use edge cases.
    None,
}

/// How far the shrinker may go after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShrinkingMode {
    /// Report the original failing sample.
    Off,
    /// Stop after `Config::shrink_limit` attempts.
    #[default]
    Bounded,
    /// Shrink until a local minimum is reached.
    Full,
}

/// Configuration for property testing.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of tests to run.
    pub test_limit: usize,

    /// Maximum number of shrink attempts in bounded mode.
    pub shrink_limit: usize,

    /// Maximum size parameter to use.
    pub size_limit: usize,

    /// Maximum number of discards before giving up.
    pub discard_limit: usize,

    /// Fixed run seed for replaying a failure.
    pub seed: Option<u64>,

    pub generation: GenerationMode,

    pub edge_cases: EdgeCasesMode,

    /// Upper bound on edge-case combinations tried per run.
    pub max_edge_cases: usize,

    pub shrinking: ShrinkingMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            test_limit: 100,
            shrink_limit: 1000,
            size_limit: 100,
            discard_limit: 100,
            seed: None,
            generation: GenerationMode::Auto,
            edge_cases: EdgeCasesMode::Mixin,
            max_edge_cases: 20,
            shrinking: ShrinkingMode::Bounded,
        }
    }
}

impl Config {
    /// Create a new config with the given number of tests.
    pub fn with_tests(mut self, tests: usize) -> Self {
        self.test_limit = tests;
        self
    }

    /// Create a new config with the given shrink limit.
    pub fn with_shrinks(mut self, shrinks: usize) -> Self {
        self.shrink_limit = shrinks;
        self
    }

    /// Create a new config with the given size limit.
    pub fn with_size_limit(mut self, size: usize) -> Self {
        self.size_limit = size;
        self
    }

    /// Create a new config with the given discard limit.
    pub fn with_discard_limit(mut self, discards: usize) -> Self {
        self.discard_limit = discards;
        self
    }

    /// Replay a run from its reported seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_generation(mut self, mode: GenerationMode) -> Self {
        self.generation = mode;
        self
    }

    pub fn with_edge_cases(mut self, mode: EdgeCasesMode) -> Self {
        self.edge_cases = mode;
        self
    }

    pub fn with_max_edge_cases(mut self, max: usize) -> Self {
        self.max_edge_cases = max;
        self
    }

    pub fn with_shrinking(mut self, mode: ShrinkingMode) -> Self {
        self.shrinking = mode;
        self
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> crate::Result<()> {
        if self.test_limit == 0 {
            return Err(crate::QuarryError::InvalidConfig {
                message: "test_limit must be at least 1".to_string(),
            });
        }
        if self.size_limit == 0 {
            return Err(crate::QuarryError::InvalidConfig {
                message: "size_limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Size used for the given trial: grows linearly towards the size limit.
    pub fn size_for_trial(&self, trial: usize) -> Size {
        Size::new((trial * self.size_limit) / self.test_limit.max(1))
    }
}

/// Effective upper bound for size-shaped values (string lengths, list sizes).
///
/// Small generation sizes keep values close to `min`; the full range only
/// opens up once `max - min` fits into the size-derived offset.
pub fn cutoff_size(min: usize, max: usize, size: Size) -> usize {
    let range = max.saturating_sub(min);
    let offset = ((size.get() as f64).sqrt().round() as usize).max(10);
    if range <= offset {
        max
    } else {
        (min + offset).min(max)
    }
}

/// Draw a length in `[min, max]`, mostly below the cutoff.
pub(crate) fn next_length(seed: Seed, min: usize, max: usize, cutoff: usize) -> (usize, Seed) {
    let (choice, seed) = seed.next_bounded(10);
    let upper = if choice == 0 { max } else { cutoff.clamp(min, max) };
    let (length, seed) = seed.next_i128_in(min as i128, upper as i128);
    (length as usize, seed)
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        let seed = Seed::from_u64(42);
        assert_eq!(seed.next_u64(), Seed::from_u64(42).next_u64());
    }

    #[test]
    fn test_split_streams_differ() {
        let (left, right) = Seed::from_u64(7).split();
        assert_ne!(left.next_u64().0, right.next_u64().0);
    }

    #[test]
    fn test_range_draws_stay_in_bounds() {
        let mut seed = Seed::from_u64(3);
        for _ in 0..1000 {
            let (value, next) = seed.next_i128_in(-5, 5);
            assert!((-5..=5).contains(&value));
            seed = next;
        }
        let (wide, _) = seed.next_i128_in(i64::MIN as i128, u64::MAX as i128);
        assert!(wide >= i64::MIN as i128 && wide <= u64::MAX as i128);
    }

    #[test]
    fn test_degenerate_range() {
        let (value, _) = Seed::from_u64(1).next_i128_in(9, 9);
        assert_eq!(value, 9);
    }

    #[test]
    fn test_next_f64_unit_interval() {
        let mut seed = Seed::from_u64(11);
        for _ in 0..1000 {
            let (value, next) = seed.next_f64();
            assert!((0.0..1.0).contains(&value));
            seed = next;
        }
    }

    #[test]
    fn test_cutoff_size() {
        assert_eq!(cutoff_size(0, 5, Size::new(100)), 5);
        assert_eq!(cutoff_size(0, 20, Size::new(100)), 10);
        assert_eq!(cutoff_size(3, 1000, Size::new(400)), 23);
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_tests(10)
            .with_seed(99)
            .with_generation(GenerationMode::Randomized)
            .with_shrinking(ShrinkingMode::Full);
        assert_eq!(config.test_limit, 10);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.generation, GenerationMode::Randomized);
        assert_eq!(config.shrinking, ShrinkingMode::Full);
        assert!(config.validate().is_ok());
        assert!(Config::default().with_tests(0).validate().is_err());
    }

    #[test]
    fn test_size_progression() {
        let config = Config::default().with_tests(10).with_size_limit(100);
        assert_eq!(config.size_for_trial(0), Size::new(0));
        assert_eq!(config.size_for_trial(5), Size::new(50));
    }
}
