//! Generator invariant properties
//!
//! Generated values stay inside their declared domains, and the derived
//! arbitraries agree with the arbitraries they were built from.

use crate::{arbitrary_seed, arbitrary_size, assert_passes};
use quarry::*;

fn draw<T: Generatable>(arbitrary: &impl Arbitrary<T>, size: Size, seed: Seed) -> Option<T> {
    arbitrary
        .generator_with_embedded_edge_cases(size)
        .next(seed)
        .ok()
        .map(Shrinkable::into_value)
}

/// Property: bounded integers never leave their range
pub fn test_integers_stay_in_bounds() {
    let bounded = integers::<i32>().between(-50, 50);
    let prop = for_all2(arbitrary_size(), arbitrary_seed(), move |size, seed| {
        draw(&bounded, *size, *seed).is_some_and(|v| (-50..=50).contains(&v))
    });
    assert_passes("integers stay in bounds", prop);
}

/// Property: list sizes stay within `[min, max]`, shrink candidates included
pub fn test_lists_respect_size_bounds() {
    let bounded = lists(integers::<u8>()).of_min_size(2).of_max_size(7);
    let prop = for_all2(arbitrary_size(), arbitrary_seed(), move |size, seed| {
        match bounded.generator(*size).next(*seed) {
            Ok(sample) => {
                (2..=7).contains(&sample.value().len())
                    && sample.shrink().all(|c| c.value().len() >= 2)
            }
            Err(_) => false,
        }
    });
    assert_passes("lists respect size bounds", prop);
}

/// Property: unique lists and their shrink candidates have no duplicates
pub fn test_unique_lists_are_unique() {
    fn all_unique(values: &[u8]) -> bool {
        values
            .iter()
            .enumerate()
            .all(|(i, v)| !values[i + 1..].contains(v))
    }

    let unique = lists(integers::<u8>().between(0, 20)).of_max_size(10).unique();
    let prop = for_all(arbitrary_seed(), move |seed| {
        match unique.generator(Size::new(50)).next(*seed) {
            Ok(sample) => {
                all_unique(sample.value()) && sample.shrink().all(|c| all_unique(c.value()))
            }
            Err(_) => false,
        }
    });
    assert_passes("unique lists are unique", prop);
}

/// Property: `map` transforms the value drawn by the source, not a new one
pub fn test_map_uses_same_draw() {
    let base = integers::<i64>().between(0, 1000);
    let doubled = base.clone().map(|v| v * 2);
    let prop = for_all2(arbitrary_size(), arbitrary_seed(), move |size, seed| {
        let plain = base.generator(*size).next(*seed).map(Shrinkable::into_value);
        let mapped = doubled.generator(*size).next(*seed).map(Shrinkable::into_value);
        match (plain, mapped) {
            (Ok(a), Ok(b)) => b == a * 2,
            _ => false,
        }
    });
    assert_passes("map uses the same draw", prop);
}

/// Property: filtering twice by the same predicate changes nothing
pub fn test_filter_is_idempotent() {
    let divisible = |v: &i32| v % 3 == 0;
    let once = integers::<i32>().between(0, 100).filter(divisible);
    let twice = integers::<i32>().between(0, 100).filter(divisible).filter(divisible);
    let prop = for_all2(arbitrary_size(), arbitrary_seed(), move |size, seed| {
        let a = once.generator(*size).next(*seed).map(Shrinkable::into_value);
        let b = twice.generator(*size).next(*seed).map(Shrinkable::into_value);
        a.is_ok() && a == b && a.is_ok_and(|v| v % 3 == 0)
    });
    assert_passes("filter is idempotent", prop);
}

/// Property: the same size and seed reproduce the same value
pub fn test_generation_is_deterministic() {
    let words = strings().alpha().of_max_length(12);
    let prop = for_all2(arbitrary_size(), arbitrary_seed(), move |size, seed| {
        let first = draw(&words, *size, *seed);
        first.is_some() && first == draw(&words, *size, *seed)
    });
    assert_passes("generation is deterministic", prop);
}

/// An unsatisfiable filter aborts the run instead of passing it
pub fn test_unsatisfiable_filter_aborts_run() {
    let never = integers::<i32>().between(0, 10).filter(|v| *v > 100);
    let prop = for_all(never, |_| true).named("unsatisfiable filter");

    for mode in [GenerationMode::Auto, GenerationMode::Randomized] {
        let result = prop.run(&Config::default().with_seed(7).with_generation(mode));
        assert!(
            matches!(result, Err(QuarryError::GenerationExhausted { attempts: DEFAULT_MAX_MISSES, .. })),
            "{:?}: {:?}",
            mode,
            result
        );
    }

    let result = prop.run(&Config::default().with_generation(GenerationMode::Exhaustive));
    assert!(
        matches!(result, Err(QuarryError::GenerationExhausted { attempts: 0, .. })),
        "{:?}",
        result
    );
}

/// Uniqueness that cannot be met aborts the run instead of passing it
pub fn test_unsatisfiable_uniqueness_aborts_run() {
    let crowded = lists(of([1, 2, 3])).of_size(4).unique();
    let prop = for_all(crowded, |_| true).named("unsatisfiable uniqueness");

    for mode in [GenerationMode::Auto, GenerationMode::Randomized] {
        let result = prop.run(&Config::default().with_seed(7).with_generation(mode));
        assert!(
            matches!(result, Err(QuarryError::GenerationExhausted { .. })),
            "{:?}: {:?}",
            mode,
            result
        );
    }
}
