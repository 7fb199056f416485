//! Products of independent arbitraries.

use crate::arbitrary::{Arbitrary, ArbitraryExt, BoxedArbitrary, Mapped, MAX_DERIVED_EDGE_CASES};
use crate::data::Size;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::gen::RandomGenerator;
use crate::shrinkable::Generatable;

/// Pairs of independent values; the left value shrinks first.
pub struct Zipped<A, B> {
    left: BoxedArbitrary<A>,
    right: BoxedArbitrary<B>,
}

impl<A, B> Clone for Zipped<A, B> {
    fn clone(&self) -> Self {
        Zipped {
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

pub fn zip<A, B>(left: impl Arbitrary<A> + 'static, right: impl Arbitrary<B> + 'static) -> Zipped<A, B>
where
    A: Generatable,
    B: Generatable,
{
    Zipped {
        left: BoxedArbitrary::new(left),
        right: BoxedArbitrary::new(right),
    }
}

impl<A: Generatable, B: Generatable> Arbitrary<(A, B)> for Zipped<A, B> {
    fn generator(&self, size: Size) -> RandomGenerator<(A, B)> {
        self.left
            .generator_with_embedded_edge_cases(size)
            .zip(self.right.generator_with_embedded_edge_cases(size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<(A, B)>> {
        self.left
            .exhaustive(max_samples)?
            .zip(self.right.exhaustive(max_samples)?, max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<(A, B)> {
        self.left
            .edge_cases()
            .zip(&self.right.edge_cases(), MAX_DERIVED_EDGE_CASES)
    }
}

/// Combine two arbitraries through a function.
pub fn combine2<A, B, R, F>(
    a: impl Arbitrary<A> + 'static,
    b: impl Arbitrary<B> + 'static,
    f: F,
) -> Mapped<(A, B), R>
where
    A: Generatable,
    B: Generatable,
    R: Generatable,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    zip(a, b).map(move |(x, y)| f(x, y))
}

/// Combine three arbitraries through a function.
pub fn combine3<A, B, C, R, F>(
    a: impl Arbitrary<A> + 'static,
    b: impl Arbitrary<B> + 'static,
    c: impl Arbitrary<C> + 'static,
    f: F,
) -> Mapped<((A, B), C), R>
where
    A: Generatable,
    B: Generatable,
    C: Generatable,
    R: Generatable,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    zip(zip(a, b), c).map(move |((x, y), z)| f(x, y, z))
}

/// Fixed-length vectors with one component per arbitrary.
pub struct CombineAll<T> {
    parts: Vec<BoxedArbitrary<T>>,
}

impl<T> Clone for CombineAll<T> {
    fn clone(&self) -> Self {
        CombineAll {
            parts: self.parts.clone(),
        }
    }
}

pub fn combine_all<T: Generatable>(parts: Vec<BoxedArbitrary<T>>) -> CombineAll<T> {
    CombineAll { parts }
}

impl<T: Generatable> Arbitrary<Vec<T>> for CombineAll<T> {
    fn generator(&self, size: Size) -> RandomGenerator<Vec<T>> {
        RandomGenerator::combine_all(
            self.parts
                .iter()
                .map(|part| part.generator_with_embedded_edge_cases(size))
                .collect(),
        )
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let parts = self
            .parts
            .iter()
            .map(|part| part.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        ExhaustiveGenerator::combine_all(parts, max_samples)
    }

    fn edge_cases(&self) -> EdgeCases<Vec<T>> {
        let parts: Vec<EdgeCases<T>> = self.parts.iter().map(|p| p.edge_cases()).collect();
        EdgeCases::combine_all(&parts, MAX_DERIVED_EDGE_CASES)
    }
}
