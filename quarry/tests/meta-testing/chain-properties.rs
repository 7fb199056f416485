//! Chain properties
//!
//! Chains building strings of the shape `ab+c`, one character per step.

use crate::assert_passes;
use quarry::*;

fn append(suffix: &'static str) -> Transformer<String> {
    Transformer::transform(format!("+{}", suffix), move |s: String| s + suffix)
}

fn regex_chains() -> ChainArbitrary<String> {
    chains(String::new)
        .with_transformer(
            TransformerProvider::when(|s: &String| s.is_empty()).provide(just(append("a"))),
        )
        .with_transformer(
            TransformerProvider::when(|s: &String| s.ends_with('a')).provide(just(append("b"))),
        )
        .with_transformer(
            TransformerProvider::when(|s: &String| s.ends_with('b'))
                .provide(frequency(vec![(4, append("b")), (1, append("c"))])),
        )
        .with_transformer(
            TransformerProvider::when(|s: &String| s.ends_with('c'))
                .provide(just(Transformer::end_of_chain())),
        )
        .infinite()
}

fn is_prefix_of_pattern(state: &str) -> bool {
    let Some(rest) = state.strip_prefix('a') else {
        return state.is_empty();
    };
    let body = rest.strip_suffix('c').unwrap_or(rest);
    body.chars().all(|c| c == 'b') && (body.len() == rest.len() || !body.is_empty())
}

/// A chain failing on length >= 3 shrinks to the trace of "abc"
pub fn test_regex_chain_shrinks_to_abc() {
    let result = for_all(regex_chains(), |chain: &Chain<String>| {
        chain.last_state().len() < 3
    })
    .run(
        &Config::default()
            .with_seed(2024)
            .with_shrinking(ShrinkingMode::Full),
    )
    .expect("run failed");
    match result {
        TestResult::Fail {
            counterexample,
            tests_run,
            ..
        } => {
            assert_eq!(tests_run, 1);
            assert!(
                counterexample.contains("last_state: \"abc\""),
                "unexpected counterexample {}",
                counterexample
            );
            assert!(counterexample.contains("[\"+a\", \"+b\", \"+c\"]"));
        }
        other => panic!("expected failure, got {}", other),
    }
}

/// Property: every intermediate state is a prefix of `ab+c`
pub fn test_chain_states_match_pattern() {
    let prop = for_all(regex_chains(), |chain: &Chain<String>| {
        chain.iter().all(|state| is_prefix_of_pattern(&state)) && chain.ended_explicitly()
    });
    assert_passes("chain states match ab+c", prop);
}
