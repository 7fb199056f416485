//! Exhaustive generation properties

use quarry::*;

/// Iterating an exhaustive generator twice yields the same sequence
pub fn test_exhaustive_is_restartable() {
    let words = strings().with_chars(['x', 'y']).of_max_length(3);
    let generator = words.exhaustive(1000).expect("small domain");
    let first: Vec<String> = generator.iter().collect();
    let second: Vec<String> = generator.iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len() as u64, generator.max_count());
    assert_eq!(first.len(), 1 + 2 + 4 + 8);
    assert_eq!(first[0], "");
}

/// The product of exhaustive generators enumerates every combination once
pub fn test_product_counts_multiply() {
    let pairs = zip(integers::<u8>().between(1, 4), of(['a', 'b', 'c']));
    let all: Vec<(u8, char)> = pairs.exhaustive(12).expect("small domain").iter().collect();
    assert_eq!(all.len(), 12);
    for (i, pair) in all.iter().enumerate() {
        assert!(!all[i + 1..].contains(pair), "duplicate {:?}", pair);
    }
    assert_eq!(all[0], (1, 'a'));
    assert_eq!(all[11], (4, 'c'));
}

/// Domains over budget cannot be enumerated
pub fn test_over_budget_is_not_exhaustible() {
    assert!(integers::<u8>().exhaustive(255).is_none());
    assert!(integers::<u8>().exhaustive(256).is_some());
    assert!(integers::<i64>().exhaustive(u64::MAX).is_none());
    assert!(lists(booleans()).of_max_size(10).exhaustive(100).is_none());

    let result = for_all(integers::<i64>(), |_| true)
        .run(&Config::default().with_generation(GenerationMode::Exhaustive));
    assert!(matches!(result, Err(QuarryError::NotExhaustible { .. })));
}

/// Auto mode enumerates small domains and counts each value once
pub fn test_auto_mode_picks_exhaustive() {
    let result = for_all2(booleans(), integers::<i8>().between(-2, 2), |_, _| true)
        .run(&Config::default())
        .expect("run failed");
    assert_eq!(
        result,
        TestResult::Pass {
            tests_run: 10,
            exhaustive: true,
            property_name: None,
        }
    );

    let result = for_all(integers::<u8>().between(0, 9), |v| *v < 9)
        .run(&Config::default())
        .expect("run failed");
    match result {
        TestResult::Fail {
            counterexample,
            tests_run,
            ..
        } => {
            assert_eq!(counterexample, "[9]");
            assert_eq!(tests_run, 10);
        }
        other => panic!("expected failure, got {}", other),
    }
}
