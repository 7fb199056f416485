//! Transformer chains producing strings of the shape `ab+c`.
//!
//! Each step appends one character; the provider that applies depends on
//! the last character. A failing chain shrinks to the shortest trace.

use quarry::*;

fn append(suffix: &'static str) -> Transformer<String> {
    Transformer::transform(format!("+{suffix}"), move |s: String| s + suffix)
}

fn regex_chains() -> ChainArbitrary<String> {
    chains(String::new)
        .with_transformer(TransformerProvider::when(|s: &String| s.is_empty()).provide(just(append("a"))))
        .with_transformer(TransformerProvider::when(|s: &String| s.ends_with('a')).provide(just(append("b"))))
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

fn main() {
    println!("⛏ Quarry Chain Example\n");

    println!("=== Sample chains ===");
    let generator = regex_chains().generator(Size::new(50));
    for seed in 0..5 {
        match generator.next(Seed::from_u64(seed)) {
            Ok(sample) => {
                let chain = sample.value();
                let states: Vec<String> = chain.iter().collect();
                println!("  {} via {:?}", chain.last_state(), states);
            }
            Err(error) => println!("  generation failed: {error}"),
        }
    }
    println!();

    println!("=== Shrinking a chain ===");
    let prop = for_all(regex_chains(), |chain: &Chain<String>| chain.last_state().len() < 3)
        .named("chains stay short");
    match prop.run(&Config::default().with_shrinking(ShrinkingMode::Full)) {
        Ok(result) => println!("{result}"),
        Err(error) => println!("run failed: {error}"),
    }
}
