//! Edge case properties

use quarry::*;

fn values<T: Generatable>(edge_cases: EdgeCases<T>) -> Vec<T> {
    edge_cases.into_iter().map(Shrinkable::into_value).collect()
}

/// Integer edge cases are the shrink target, its neighbours and the bounds
pub fn test_integer_edge_cases() {
    assert_eq!(
        values(integers::<i32>().between(-100, 100).edge_cases()),
        vec![0, -1, 1, -100, 100]
    );
    assert_eq!(
        values(integers::<u8>().edge_cases()),
        vec![0, 1, 255]
    );
    assert_eq!(
        values(integers::<i32>().between(10, 20).edge_cases()),
        vec![10, 11, 20]
    );
}

/// Edge cases tried first catch boundary bugs before any random sample
pub fn test_edge_cases_first_finds_boundaries() {
    let result = for_all(integers::<i32>(), |v| v.checked_abs().is_some())
        .run(
            &Config::default()
                .with_edge_cases(EdgeCasesMode::First)
                .with_shrinking(ShrinkingMode::Off),
        )
        .expect("run failed");
    match result {
        TestResult::Fail {
            counterexample,
            tests_run,
            ..
        } => {
            assert_eq!(counterexample, format!("[{}]", i32::MIN));
            assert_eq!(tests_run, 4);
        }
        other => panic!("expected failure, got {}", other),
    }
}

/// Edge-cases mode runs the product of all parameters' edge cases
pub fn test_edge_cases_mode_runs_product() {
    let result = for_all2(
        integers::<i32>().between(-10, 10),
        booleans(),
        |_, _| true,
    )
    .run(&Config::default().with_generation(GenerationMode::EdgeCases))
    .expect("run failed");
    assert_eq!(result.tests_run(), 5 * 2);

    let limited = for_all2(integers::<i32>(), integers::<i32>(), |_, _| true)
        .run(
            &Config::default()
                .with_generation(GenerationMode::EdgeCases)
                .with_max_edge_cases(7),
        )
        .expect("run failed");
    assert_eq!(limited.tests_run(), 7);
}
