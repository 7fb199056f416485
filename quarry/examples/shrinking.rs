//! Shrinking examples: a failing property is reduced step by step to a
//! minimal counterexample, and the run seed replays the original failure.

use quarry::*;
use tracing_subscriber::filter::LevelFilter;

struct PrintSteps;

impl ShrinkReporter for PrintSteps {
    fn on_shrink(&self, parameter: usize, sample: &FalsifiedSample<Parameter>) {
        println!("  shrunk arg {parameter}: {sample:?}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    println!("⛏ Quarry Shrinking Examples\n");

    integer_shrinking();
    string_shrinking();
    replay_from_seed();
}

fn integer_shrinking() {
    println!("=== Integers ===");
    let prop = for_all(integers::<i32>().between(0, 100), |v| *v <= 10)
        .named("at most ten")
        .with_reporter(PrintSteps);
    match prop.run(&Config::default().with_shrinking(ShrinkingMode::Full)) {
        Ok(result) => println!("{result}\n"),
        Err(error) => println!("run failed: {error}\n"),
    }
}

fn string_shrinking() {
    println!("=== Strings ===");
    let prop = for_all(
        strings().with_char_range('a', 'z').of_max_length(20),
        |s: &String| s.len() <= 3,
    )
    .named("short strings");
    match prop.run(&Config::default()) {
        Ok(result) => println!("{result}\n"),
        Err(error) => println!("run failed: {error}\n"),
    }
}

fn replay_from_seed() {
    println!("=== Replay ===");
    let prop = for_all2(integers::<i64>(), integers::<i64>(), |a, b| {
        a.checked_add(*b).is_some()
    })
    .named("no overflow");
    let first = match prop.run(&Config::default()) {
        Ok(result) => result,
        Err(error) => {
            println!("run failed: {error}");
            return;
        }
    };
    println!("{first}");
    if let TestResult::Fail { seed, .. } = &first {
        if let Ok(seed) = seed.parse::<u64>() {
            let replayed = prop.run(&Config::default().with_seed(seed));
            println!("replayed with seed {seed}: same result = {}", replayed.as_ref() == Ok(&first));
        }
    }
}
