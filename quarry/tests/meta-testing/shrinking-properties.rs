//! Shrinking properties
//!
//! Shrinking must end in a local minimum of the falsifier, make strict
//! progress on every accepted step, and respect its attempt budget.

use crate::{arbitrary_seed, assert_passes};
use quarry::*;

fn full() -> Shrinker {
    Shrinker::new(ShrinkingMode::Full, 0)
}

/// An integer in [0, 100] failing above 10 shrinks from 87 to 11
pub fn test_integer_shrinks_to_eleven() {
    let falsifier = |p: &[i32]| (p[0] <= 10).into_execution_result();
    let start = Shrinkable::integral(87, 0).map(|v| v as i32);
    let minimal = full().shrink(&falsifier, FalsifiedSample::new(vec![start], None), |_, _| {}, |_, _| {});
    assert_eq!(minimal.parameters(), vec![11]);

    let run = || {
        for_all(integers::<i32>().between(0, 100), |v| *v <= 10)
            .run(&Config::default().with_seed(1234))
            .expect("run failed")
    };
    let first = run();
    match &first {
        TestResult::Fail { counterexample, .. } => assert_eq!(counterexample, "[11]"),
        other => panic!("expected failure, got {}", other),
    }
    assert_eq!(first, run());
}

/// A lowercase string of length 15 failing above length 3 shrinks to length 4
pub fn test_string_shrinks_to_length_four() {
    let words = strings().with_char_range('a', 'z').of_max_length(20);
    let generator = words.generator(Size::new(100));
    let start = (0..10_000)
        .filter_map(|s| generator.next(Seed::from_u64(s)).ok())
        .find(|sample| sample.value().chars().count() == 15)
        .expect("no string of length 15 generated");

    let falsifier = |p: &[String]| (p[0].chars().count() <= 3).into_execution_result();
    let minimal = full().shrink(&falsifier, FalsifiedSample::new(vec![start], None), |_, _| {}, |_, _| {});
    assert_eq!(minimal.parameters(), vec!["aaaa".to_string()]);
}

fn sum_falsifier(p: &[Vec<i32>]) -> TryExecutionResult {
    (p[0].iter().sum::<i32>() < 40).into_execution_result()
}

fn falsified_list(seed: Seed) -> Option<Shrinkable<Vec<i32>>> {
    lists(integers::<i32>().between(0, 50))
        .of_max_size(20)
        .generator(Size::new(100))
        .next(seed)
        .ok()
        .filter(|sample| sum_falsifier(&[sample.value().clone()]).is_falsified())
}

/// Property: shrinking ends where no candidate still falsifies
pub fn test_shrinking_reaches_local_minimum() {
    let prop = for_all(arbitrary_seed(), |seed| {
        let Some(start) = falsified_list(*seed) else {
            return true;
        };
        let minimal = full().shrink(
            &sum_falsifier,
            FalsifiedSample::new(vec![start], None),
            |_, _| {},
            |_, _| {},
        );
        let shrinkable = &minimal.shrinkables()[0];
        sum_falsifier(&minimal.parameters()).is_falsified()
            && shrinkable
                .shrink()
                .all(|c| !sum_falsifier(&[c.value().clone()]).is_falsified())
    });
    assert_passes("shrinking reaches a local minimum", prop);
}

/// Property: every accepted shrink lowers the sample distance
pub fn test_distance_strictly_decreases() {
    let prop = for_all(arbitrary_seed(), |seed| {
        let Some(start) = falsified_list(*seed) else {
            return true;
        };
        let sample = FalsifiedSample::new(vec![start], None);
        let mut distances = vec![sample.distance()];
        full().shrink(
            &sum_falsifier,
            sample,
            |_, smaller| distances.push(smaller.distance()),
            |_, _| {},
        );
        distances.windows(2).all(|w| w[1] < w[0])
    });
    assert_passes("distance strictly decreases", prop);
}

/// Property: bounded shrinking never evaluates more candidates than allowed
pub fn test_bounded_shrinking_terminates() {
    let prop = for_all(arbitrary_seed(), |seed| {
        let Some(start) = falsified_list(*seed) else {
            return true;
        };
        let evaluations = std::cell::Cell::new(0usize);
        Shrinker::new(ShrinkingMode::Bounded, 5).shrink(
            &sum_falsifier,
            FalsifiedSample::new(vec![start], None),
            |_, _| evaluations.set(evaluations.get() + 1),
            |_, _| evaluations.set(evaluations.get() + 1),
        );
        evaluations.get() <= 5
    });
    assert_passes("bounded shrinking terminates", prop);
}
