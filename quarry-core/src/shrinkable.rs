//! Generated values bundled with their own lazy shrink candidates.

use crate::distance::ShrinkingDistance;
use std::fmt;
use std::sync::Arc;

/// Values that can flow through generators and shrinkers.
///
/// Generated values are cloned when candidates are derived and shared
/// across threads when properties run in parallel.
pub trait Generatable: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Generatable for T {}

/// Lazy, possibly infinite stream of shrink candidates.
pub type ShrinkStream<T> = Box<dyn Iterator<Item = Shrinkable<T>>>;

type ShrinkFn<T> = Arc<dyn Fn() -> ShrinkStream<T> + Send + Sync>;

/// A generated value together with the means to produce smaller candidates.
///
/// Every candidate yielded by [`Shrinkable::shrink`] has a distance smaller
/// than or equal to its parent and differs from it in value. Calling
/// `shrink` again starts a fresh stream: nothing is materialized up front.
#[derive(Clone)]
pub struct Shrinkable<T> {
    value: T,
    distance: ShrinkingDistance,
    shrinker: Option<ShrinkFn<T>>,
}

impl<T> Shrinkable<T> {
    /// A value without shrink candidates.
    pub fn unshrinkable(value: T) -> Self {
        Shrinkable {
            value,
            distance: ShrinkingDistance::zero(),
            shrinker: None,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn distance(&self) -> &ShrinkingDistance {
        &self.distance
    }

    /// Check if this value has a candidate producer at all.
    pub fn can_shrink(&self) -> bool {
        self.shrinker.is_some()
    }
}

impl<T: Generatable> Shrinkable<T> {
    /// Create a shrinkable from a value, its distance and a candidate producer.
    pub fn new<F>(value: T, distance: ShrinkingDistance, shrink: F) -> Self
    where
        F: Fn() -> ShrinkStream<T> + Send + Sync + 'static,
    {
        Shrinkable {
            value,
            distance,
            shrinker: Some(Arc::new(shrink)),
        }
    }

    /// Start a fresh stream of shrink candidates.
    pub fn shrink(&self) -> ShrinkStream<T> {
        match &self.shrinker {
            Some(shrink) => shrink(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Map the value and every candidate; shrinking stays in the source domain.
    pub fn map<U, F>(self, f: F) -> Shrinkable<U>
    where
        U: Generatable,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_with(Arc::new(f))
    }

    pub(crate) fn map_with<U: Generatable>(
        self,
        f: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> Shrinkable<U> {
        let shrinker = self.shrinker.map(|inner| {
            let f = f.clone();
            Arc::new(move || {
                let f = f.clone();
                Box::new(inner().map(move |candidate| candidate.map_with(f.clone())))
                    as ShrinkStream<U>
            }) as ShrinkFn<U>
        });
        Shrinkable {
            value: f(self.value),
            distance: self.distance,
            shrinker,
        }
    }

    /// Drop every candidate that does not satisfy the predicate.
    ///
    /// The value itself is not checked; callers filter before wrapping.
    pub fn filter<F>(self, predicate: F) -> Shrinkable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Arc::new(predicate))
    }

    pub(crate) fn filter_with(self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        let shrinker = self.shrinker.map(|inner| {
            Arc::new(move || {
                let keep = predicate.clone();
                let wrap = predicate.clone();
                Box::new(
                    inner()
                        .filter(move |candidate| keep(candidate.value()))
                        .map(move |candidate| candidate.filter_with(wrap.clone())),
                ) as ShrinkStream<T>
            }) as ShrinkFn<T>
        });
        Shrinkable {
            value: self.value,
            distance: self.distance,
            shrinker,
        }
    }

    /// Pair two shrinkables; the left side is shrunk first.
    pub fn zip<U: Generatable>(self, other: Shrinkable<U>) -> Shrinkable<(T, U)> {
        if !self.can_shrink() && !other.can_shrink() {
            return Shrinkable::unshrinkable((self.value, other.value));
        }
        let distance = self.distance.plus(&other.distance);
        let value = (self.value.clone(), other.value.clone());
        Shrinkable::new(value, distance, move || {
            let right = other.clone();
            let left = self.clone();
            let lefts = self.shrink().map(move |a| a.zip(right.clone()));
            let rights = other.shrink().map(move |b| left.clone().zip(b));
            Box::new(lefts.chain(rights))
        })
    }

    /// Keep the value, drop its candidates.
    pub fn dont_shrink(self) -> Self {
        Shrinkable::unshrinkable(self.value)
    }

    /// Fixed-length product shrinking one component after the other.
    pub fn combine_all(elements: Vec<Shrinkable<T>>) -> Shrinkable<Vec<T>> {
        let values: Vec<T> = elements.iter().map(|e| e.value.clone()).collect();
        let distance = ShrinkingDistance::for_collection(elements.iter().map(|e| &e.distance));
        let elements = Arc::new(elements);
        Shrinkable::new(values, distance, move || {
            let elements = elements.clone();
            Box::new((0..elements.len()).flat_map(move |index| {
                let base = elements.clone();
                elements[index].shrink().map(move |candidate| {
                    let mut next = base.to_vec();
                    next[index] = candidate;
                    Shrinkable::combine_all(next)
                })
            }))
        })
    }

    /// Variable-length collection that never shrinks below `min_size` elements.
    ///
    /// Candidates remove chunks first (halving chunk sizes), then shrink the
    /// remaining elements left to right.
    pub fn collection(elements: Vec<Shrinkable<T>>, min_size: usize) -> Shrinkable<Vec<T>> {
        let values: Vec<T> = elements.iter().map(|e| e.value.clone()).collect();
        let len = elements.len();
        let distance = ShrinkingDistance::of(&[len as u64]).append(
            &ShrinkingDistance::for_collection(elements.iter().map(|e| &e.distance)),
        );
        let elements = Arc::new(elements);
        Shrinkable::new(values, distance, move || {
            let removals = chunk_removals(len, min_size).map({
                let elements = elements.clone();
                move |(start, size)| {
                    let mut remaining = elements[..start].to_vec();
                    remaining.extend_from_slice(&elements[start + size..]);
                    Shrinkable::collection(remaining, min_size)
                }
            });
            let elements = elements.clone();
            let element_shrinks = (0..len).flat_map(move |index| {
                let base = elements.clone();
                elements[index].shrink().map(move |candidate| {
                    let mut next = base.to_vec();
                    next[index] = candidate;
                    Shrinkable::collection(next, min_size)
                })
            });
            Box::new(removals.chain(element_shrinks))
        })
    }
}

impl Shrinkable<i128> {
    /// Integral value shrinking towards `target`.
    ///
    /// Candidates are the target itself, then values approaching the
    /// original by halving the remaining gap.
    pub fn integral(value: i128, target: i128) -> Shrinkable<i128> {
        let gap = value.abs_diff(target);
        let distance = ShrinkingDistance::of(&[gap.min(u64::MAX as u128) as u64]);
        if gap == 0 {
            return Shrinkable {
                value,
                distance,
                shrinker: None,
            };
        }
        Shrinkable::new(value, distance, move || {
            let steps = std::iter::successors(Some(gap / 2), |step| Some(step / 2))
                .take_while(|step| *step != 0)
                .filter_map(move |step| {
                    if value > target {
                        value.checked_sub_unsigned(step)
                    } else {
                        value.checked_add_unsigned(step)
                    }
                });
            Box::new(
                std::iter::once(target)
                    .chain(steps)
                    .map(move |candidate| Shrinkable::integral(candidate, target)),
            )
        })
    }
}

/// `(start, length)` pairs of chunks to remove, largest chunks first.
fn chunk_removals(len: usize, min_size: usize) -> impl Iterator<Item = (usize, usize)> {
    let removable = len.saturating_sub(min_size);
    std::iter::successors(Some(removable), |size| Some(size / 2))
        .take_while(|size| *size > 0)
        .flat_map(move |size| {
            let mut starts: Vec<usize> = (0..=len - size).step_by(size).collect();
            if starts.last() != Some(&(len - size)) {
                starts.push(len - size);
            }
            starts.into_iter().map(move |start| (start, size))
        })
}

impl<T: fmt::Debug> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", &self.value)
            .field("distance", &self.distance)
            .finish()
    }
}

impl<T> From<T> for Shrinkable<T> {
    fn from(value: T) -> Self {
        Shrinkable::unshrinkable(value)
    }
}
