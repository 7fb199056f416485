//! Chains: stateful sequences built from guarded transformers.
//!
//! A chain starts from an initial state and repeatedly asks the registered
//! providers which of them apply to the current state. One applicable
//! provider supplies a [`Transformer`], which produces the next state. The
//! chain ends on an end-of-chain transformer, at the configured maximum, or
//! when no provider applies.
//!
//! Shrinking works on the sequence of transformers: trailing steps are cut,
//! single steps are removed and individual transformers are shrunk. Every
//! candidate is replayed from the initial state; if a provider's guard no
//! longer holds for the re-derived state the candidate is skipped.

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::data::{Seed, Size};
use crate::distance::ShrinkingDistance;
use crate::error::Result;
use crate::gen::RandomGenerator;
use crate::shrinkable::{Generatable, ShrinkStream, Shrinkable};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A named function from one chain state to the next.
pub struct Transformer<T> {
    description: String,
    kind: TransformKind<T>,
}

enum TransformKind<T> {
    EndOfChain,
    Transform(Arc<dyn Fn(T) -> T + Send + Sync>),
}

impl<T> Clone for Transformer<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            TransformKind::EndOfChain => TransformKind::EndOfChain,
            TransformKind::Transform(f) => TransformKind::Transform(f.clone()),
        };
        Transformer {
            description: self.description.clone(),
            kind,
        }
    }
}

impl<T> Transformer<T> {
    pub fn transform<F>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Transformer {
            description: description.into(),
            kind: TransformKind::Transform(Arc::new(f)),
        }
    }

    /// Marks the end of a chain.
    pub fn end_of_chain() -> Self {
        Transformer {
            description: "end of chain".to_string(),
            kind: TransformKind::EndOfChain,
        }
    }

    pub fn is_end_of_chain(&self) -> bool {
        matches!(self.kind, TransformKind::EndOfChain)
    }

    pub fn transformation(&self) -> &str {
        &self.description
    }

    /// Apply to a state; the end of chain leaves it untouched.
    pub fn apply(&self, state: T) -> T {
        match &self.kind {
            TransformKind::EndOfChain => state,
            TransformKind::Transform(f) => f(state),
        }
    }
}

impl<T> fmt::Debug for Transformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

type Precondition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Supplies transformers for states that satisfy its precondition.
pub struct TransformerProvider<T> {
    precondition: Option<Precondition<T>>,
    transformers: BoxedArbitrary<Transformer<T>>,
    weight: u64,
}

impl<T> Clone for TransformerProvider<T> {
    fn clone(&self) -> Self {
        TransformerProvider {
            precondition: self.precondition.clone(),
            transformers: self.transformers.clone(),
            weight: self.weight,
        }
    }
}

/// Half-built provider returned by [`TransformerProvider::when`].
pub struct GuardedProvider<T> {
    precondition: Precondition<T>,
}

impl<T: Generatable> GuardedProvider<T> {
    pub fn provide(self, transformers: impl Arbitrary<Transformer<T>> + 'static) -> TransformerProvider<T> {
        TransformerProvider {
            precondition: Some(self.precondition),
            transformers: BoxedArbitrary::new(transformers),
            weight: 1,
        }
    }
}

impl<T: Generatable> TransformerProvider<T> {
    pub fn when<F>(precondition: F) -> GuardedProvider<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        GuardedProvider {
            precondition: Arc::new(precondition),
        }
    }

    /// A provider that applies to every state.
    pub fn always(transformers: impl Arbitrary<Transformer<T>> + 'static) -> Self {
        TransformerProvider {
            precondition: None,
            transformers: BoxedArbitrary::new(transformers),
            weight: 1,
        }
    }

    /// Relative weight under [`ProviderSelection::Weighted`].
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    pub fn applies_to(&self, state: &T) -> bool {
        self.precondition.as_ref().map_or(true, |p| p(state))
    }
}

/// How a provider is picked when several apply to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderSelection {
    /// The first applicable provider in registration order.
    FirstMatch,
    /// A random applicable provider, proportional to its weight.
    #[default]
    Weighted,
}

/// Ceiling on the length of an [`infinite`](ChainArbitrary::infinite) chain
/// that never reaches an end-of-chain transformer.
pub const INFINITE_CHAIN_LIMIT: usize = 10_000;

/// One applied transformer and the provider it came from.
struct ChainStep<T> {
    provider: usize,
    transformer: Shrinkable<Transformer<T>>,
}

impl<T> Clone for ChainStep<T> {
    fn clone(&self) -> Self {
        ChainStep {
            provider: self.provider,
            transformer: self.transformer.clone(),
        }
    }
}

struct ChainContext<T> {
    initial: Arc<dyn Fn() -> T + Send + Sync>,
    providers: Vec<TransformerProvider<T>>,
    max_transformations: Option<usize>,
}

/// Arbitrary producing [`Chain`]s.
pub struct ChainArbitrary<T> {
    initial: Arc<dyn Fn() -> T + Send + Sync>,
    providers: Vec<TransformerProvider<T>>,
    max_transformations: Option<usize>,
    infinite: bool,
    selection: ProviderSelection,
}

impl<T> Clone for ChainArbitrary<T> {
    fn clone(&self) -> Self {
        ChainArbitrary {
            initial: self.initial.clone(),
            providers: self.providers.clone(),
            max_transformations: self.max_transformations,
            infinite: self.infinite,
            selection: self.selection,
        }
    }
}

/// Chains starting from a fresh `initial()` state.
pub fn chains<T, F>(initial: F) -> ChainArbitrary<T>
where
    T: Generatable,
    F: Fn() -> T + Send + Sync + 'static,
{
    ChainArbitrary {
        initial: Arc::new(initial),
        providers: Vec::new(),
        max_transformations: None,
        infinite: false,
        selection: ProviderSelection::default(),
    }
}

impl<T: Generatable> ChainArbitrary<T> {
    pub fn with_transformer(mut self, provider: TransformerProvider<T>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_max_transformations(mut self, max: usize) -> Self {
        self.max_transformations = Some(max);
        self
    }

    /// Without a maximum the chain only ends on an end-of-chain transformer,
    /// when no provider applies, or at [`INFINITE_CHAIN_LIMIT`] steps.
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    pub fn with_selection(mut self, selection: ProviderSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Explicit maximum, or one derived from the generation size.
    fn effective_max(&self, size: Size) -> Option<usize> {
        match (self.max_transformations, self.infinite) {
            (Some(max), _) => Some(max),
            (None, true) => None,
            (None, false) => Some(((size.get() as f64).sqrt().round() as usize).max(10)),
        }
    }

    fn select(&self, applicable: &[usize], seed: Seed) -> usize {
        let total: u64 = applicable
            .iter()
            .map(|i| self.providers[*i].weight)
            .fold(0, u64::saturating_add);
        if self.selection == ProviderSelection::FirstMatch || total == 0 {
            return applicable[0];
        }
        let (mut pick, _) = seed.next_bounded(total);
        for index in applicable {
            let weight = self.providers[*index].weight;
            if pick < weight {
                return *index;
            }
            pick -= weight;
        }
        applicable[0]
    }

    fn generate(&self, context: &Arc<ChainContext<T>>, size: Size, seed: Seed) -> Result<Shrinkable<Chain<T>>> {
        let max = self.effective_max(size).unwrap_or(INFINITE_CHAIN_LIMIT);
        let generators: Vec<RandomGenerator<Transformer<T>>> = self
            .providers
            .iter()
            .map(|p| p.transformers.generator_with_embedded_edge_cases(size))
            .collect();
        let mut state = (self.initial)();
        let mut steps: Vec<ChainStep<T>> = Vec::new();
        let mut seed = seed;
        while steps.len() < max {
            let applicable: Vec<usize> = (0..self.providers.len())
                .filter(|i| self.providers[*i].applies_to(&state))
                .collect();
            if applicable.is_empty() {
                break;
            }
            let (choice, rest) = seed.split();
            let (draw, rest) = rest.split();
            seed = rest;
            let provider = self.select(&applicable, choice);
            let transformer = generators[provider].next(draw)?;
            let ends = transformer.value().is_end_of_chain();
            if !ends {
                state = transformer.value().apply(state);
            }
            steps.push(ChainStep {
                provider,
                transformer,
            });
            if ends {
                break;
            }
        }
        Ok(chain_shrinkable(context.clone(), steps))
    }
}

impl<T: Generatable> Arbitrary<Chain<T>> for ChainArbitrary<T> {
    fn generator(&self, size: Size) -> RandomGenerator<Chain<T>> {
        let arbitrary = self.clone();
        let context = Arc::new(ChainContext {
            initial: self.initial.clone(),
            providers: self.providers.clone(),
            max_transformations: self.effective_max(size),
        });
        RandomGenerator::new(move |seed| arbitrary.generate(&context, size, seed))
    }
}

/// Replay steps from the initial state; `None` if a guard no longer holds.
///
/// An end-of-chain transformer cuts off any steps after it.
fn replay<T: Generatable>(context: &ChainContext<T>, steps: Vec<ChainStep<T>>) -> Option<Vec<ChainStep<T>>> {
    let mut state = (context.initial)();
    let mut valid = Vec::with_capacity(steps.len());
    for step in steps {
        if !context.providers[step.provider].applies_to(&state) {
            trace!(
                step = valid.len(),
                transformation = step.transformer.value().transformation(),
                "shrink candidate inapplicable"
            );
            return None;
        }
        let ends = step.transformer.value().is_end_of_chain();
        if !ends {
            state = step.transformer.value().apply(state);
        }
        valid.push(step);
        if ends {
            break;
        }
    }
    Some(valid)
}

fn chain_shrinkable<T: Generatable>(context: Arc<ChainContext<T>>, steps: Vec<ChainStep<T>>) -> Shrinkable<Chain<T>> {
    let chain = Chain {
        initial: context.initial.clone(),
        transformers: steps.iter().map(|s| s.transformer.value().clone()).collect(),
        max_transformations: context.max_transformations,
    };
    let distance = ShrinkingDistance::of(&[steps.len() as u64]).append(
        &ShrinkingDistance::for_collection(steps.iter().map(|s| s.transformer.distance())),
    );
    if steps.is_empty() {
        return Shrinkable::unshrinkable(chain);
    }
    let steps = Arc::new(steps);
    Shrinkable::new(chain, distance, move || {
        let context = context.clone();
        let candidates = candidate_steps(steps.clone());
        Box::new(candidates.filter_map(move |candidate| {
            replay(&context, candidate).map(|valid| chain_shrinkable(context.clone(), valid))
        })) as ShrinkStream<Chain<T>>
    })
}

/// Unvalidated candidate step sequences, in shrinking order.
fn candidate_steps<T: Generatable>(steps: Arc<Vec<ChainStep<T>>>) -> Box<dyn Iterator<Item = Vec<ChainStep<T>>>> {
    let ended = steps.last().is_some_and(|s| s.transformer.value().is_end_of_chain());
    let body = if ended { steps.len() - 1 } else { steps.len() };

    let truncations = {
        let steps = steps.clone();
        let gap = body;
        std::iter::once(0)
            .chain(
                std::iter::successors(Some(gap / 2), |step| Some(step / 2))
                    .take_while(|step| *step != 0)
                    .map(move |step| gap - step),
            )
            .filter(move |keep| *keep < body)
            .map(move |keep| {
                let mut kept = steps[..keep].to_vec();
                if ended {
                    kept.push(steps[body].clone());
                }
                kept
            })
    };

    let removals = {
        let steps = steps.clone();
        (0..body).map(move |index| {
            let mut kept = steps.to_vec();
            kept.remove(index);
            kept
        })
    };

    let transformer_shrinks = (0..body).flat_map(move |index| {
        let base = steps.clone();
        steps[index].transformer.shrink().map(move |candidate| {
            let mut next = base.to_vec();
            let provider = next[index].provider;
            next[index] = ChainStep {
                provider,
                transformer: candidate,
            };
            next
        })
    });

    Box::new(truncations.chain(removals).chain(transformer_shrinks))
}

/// A generated sequence of transformations.
///
/// The chain stores its transformers, not its states: iterating replays
/// them from a fresh initial state, so a chain can be iterated any number
/// of times.
pub struct Chain<T> {
    initial: Arc<dyn Fn() -> T + Send + Sync>,
    transformers: Vec<Transformer<T>>,
    max_transformations: Option<usize>,
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Chain {
            initial: self.initial.clone(),
            transformers: self.transformers.clone(),
            max_transformations: self.max_transformations,
        }
    }
}

impl<T: Generatable> Chain<T> {
    /// States in order: the initial state, then one per transformation.
    pub fn iter(&self) -> ChainIter<'_, T> {
        ChainIter {
            chain: self,
            state: None,
            index: 0,
            started: false,
        }
    }

    /// Descriptions of the applied transformations, without the end marker.
    pub fn transformations(&self) -> Vec<String> {
        self.transformers
            .iter()
            .filter(|t| !t.is_end_of_chain())
            .map(|t| t.transformation().to_string())
            .collect()
    }

    /// Number of applied transformations.
    pub fn len(&self) -> usize {
        self.transformers
            .iter()
            .filter(|t| !t.is_end_of_chain())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the chain was ended by an end-of-chain transformer.
    pub fn ended_explicitly(&self) -> bool {
        self.transformers.last().is_some_and(|t| t.is_end_of_chain())
    }

    pub fn last_state(&self) -> T {
        self.transformers
            .iter()
            .fold((self.initial)(), |state, t| t.apply(state))
    }

    pub fn max_transformations(&self) -> Option<usize> {
        self.max_transformations
    }
}

/// Lazy replay of a chain's states.
pub struct ChainIter<'a, T> {
    chain: &'a Chain<T>,
    state: Option<T>,
    index: usize,
    started: bool,
}

impl<'a, T: Generatable> Iterator for ChainIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let next = match self.state.take() {
            None if !self.started => {
                self.started = true;
                (self.chain.initial)()
            }
            None => return None,
            Some(state) => {
                let transformer = self
                    .chain
                    .transformers
                    .get(self.index)
                    .filter(|t| !t.is_end_of_chain())?;
                self.index += 1;
                transformer.apply(state)
            }
        };
        self.state = Some(next.clone());
        Some(next)
    }
}

impl<T: Generatable + fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("transformations", &self.transformations())
            .field("last_state", &self.last_state())
            .finish()
    }
}
