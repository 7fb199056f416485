//! Generated function properties

use crate::assert_passes;
use quarry::*;

/// Property: a generated function answers equal arguments equally
pub fn test_same_arguments_same_result() {
    let prop = for_all2(
        functions::<(i32, String), i64>(integers::<i64>()),
        strings().alpha().of_max_length(8),
        |f, word| {
            let args = (word.len() as i32, word.clone());
            f.apply(&args) == f.apply(&args) && f.apply(&args) == f.clone().apply(&args)
        },
    );
    assert_passes("same arguments give the same result", prop);
}

/// Two generated instances differ on some argument
pub fn test_instances_differ() {
    let generator = functions::<u32, u64>(integers::<u64>()).generator(Size::new(100));
    let first = generator
        .next(Seed::from_u64(11))
        .expect("generation failed")
        .into_value();
    let second = generator
        .next(Seed::from_u64(12))
        .expect("generation failed")
        .into_value();
    assert_ne!(first.base_seed(), second.base_seed());
    assert!((0..50u32).any(|x| first.apply(&x) != second.apply(&x)));
}
