//! Applying transitions against a registry.
//!
//! An application is the outcome of applying one or more transitions to a
//! starting state. It comes in two shapes:
//!
//! - [`ChainableApplication`]: still holds the registry, so more transitions
//!   can be applied to its resulting state
//! - [`FinalApplication`]: produced by a side-effecting transition, which
//!   ends the chain
//!
//! [`Application`] is the sum of both and is what command handlers return.
//!
//! # Side effects
//!
//! Some transitions cannot be built before an external operation succeeds
//! (sending a message, opening a transaction). [`Registry::apply_with_effect`]
//! checks that the current state is the expected variant and that the
//! transition is registered for it *before* running the effect, so effects
//! never run for moves that would be rejected anyway.

mod error;
mod history;

pub use error::TransitionError;
pub use history::{History, Step};

use crate::core::{State, Tag, Transition, Variant, VariantOf};
use crate::registry::Registry;
use std::fmt;

/// An application that more transitions can be chained onto.
pub struct ChainableApplication<S: State, T: Transition> {
    registry: Registry<S, T>,
    history: History<S, T>,
}

/// An application whose chain has been terminated by a side effect.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalApplication<S: State, T: Transition> {
    history: History<S, T>,
}

/// Outcome returned by command handlers.
#[derive(Clone, Debug, PartialEq)]
pub enum Application<S: State, T: Transition> {
    /// Further transitions may still be applied
    Chainable(ChainableApplication<S, T>),

    /// The chain ended with a side-effecting transition
    Final(FinalApplication<S, T>),
}

impl<S: State, T: Transition> Registry<S, T> {
    /// Apply a single transition to `state`.
    pub fn apply_transition(
        &self,
        state: S,
        transition: T,
    ) -> Result<ChainableApplication<S, T>, TransitionError<S, T>> {
        ChainableApplication {
            registry: self.clone(),
            history: History::start(state, self.tracks_states()),
        }
        .then(transition)
    }

    /// Run `effect` to produce a transition of type `T2`, then apply it.
    ///
    /// The effect runs at most once, and only when `state` is an `S2` and a
    /// `T2` transition is registered for `S2`. The effect's own error is
    /// returned unchanged.
    pub fn apply_with_effect<S2, T2, E, F>(
        &self,
        state: S,
        effect: F,
    ) -> Result<FinalApplication<S, T>, E>
    where
        S2: VariantOf<S>,
        T2: VariantOf<T>,
        E: From<TransitionError<S, T>>,
        F: FnOnce(&S2) -> Result<T2, E>,
    {
        settle(self, History::start(state, self.tracks_states()), effect)
    }
}

fn settle<S, T, S2, T2, E, F>(
    registry: &Registry<S, T>,
    history: History<S, T>,
    effect: F,
) -> Result<FinalApplication<S, T>, E>
where
    S: State,
    T: Transition,
    S2: VariantOf<S>,
    T2: VariantOf<T>,
    E: From<TransitionError<S, T>>,
    F: FnOnce(&S2) -> Result<T2, E>,
{
    let Some(current) = S2::project(history.state()) else {
        tracing::warn!(
            state = history.state().name(),
            expected = S2::KIND.name(),
            "skipped effect: state is not the expected variant"
        );
        let (state, _, _) = history.into_parts();
        return Err(TransitionError::IncompatibleState {
            state,
            expected: S2::KIND,
        }
        .into());
    };

    if !registry.accepts(S2::KIND, T2::KIND) {
        tracing::warn!(
            state = history.state().name(),
            transition = T2::KIND.name(),
            "skipped effect: transition not registered for state"
        );
        let (state, _, _) = history.into_parts();
        return Err(TransitionError::InvalidTransitionClass {
            state,
            transition: T2::KIND,
        }
        .into());
    }

    let transition: T = effect(current)?.into();
    let next = registry.next_state(history.state(), &transition)?;

    Ok(FinalApplication {
        history: history.record(transition, next),
    })
}

impl<S: State, T: Transition> ChainableApplication<S, T> {
    /// Apply another transition to the current resulting state.
    pub fn then(self, transition: T) -> Result<Self, TransitionError<S, T>> {
        let next = self.registry.next_state(self.history.state(), &transition)?;
        Ok(Self {
            registry: self.registry,
            history: self.history.record(transition, next),
        })
    }

    /// End the chain with a side-effecting transition.
    ///
    /// Same guarantees as [`Registry::apply_with_effect`]; the transitions
    /// applied so far are kept.
    pub fn then_with_effect<S2, T2, E, F>(self, effect: F) -> Result<FinalApplication<S, T>, E>
    where
        S2: VariantOf<S>,
        T2: VariantOf<T>,
        E: From<TransitionError<S, T>>,
        F: FnOnce(&S2) -> Result<T2, E>,
    {
        settle(&self.registry, self.history, effect)
    }

    /// The registry transitions are applied against.
    pub fn registry(&self) -> &Registry<S, T> {
        &self.registry
    }

    pub fn history(&self) -> &History<S, T> {
        &self.history
    }

    pub fn state(&self) -> &S {
        self.history.state()
    }

    pub fn applied(&self) -> &[T] {
        self.history.applied()
    }

    pub fn into_state(self) -> S {
        self.history.into_state()
    }
}

impl<S: State, T: Transition> FinalApplication<S, T> {
    pub fn history(&self) -> &History<S, T> {
        &self.history
    }

    pub fn state(&self) -> &S {
        self.history.state()
    }

    pub fn applied(&self) -> &[T] {
        self.history.applied()
    }

    pub fn into_state(self) -> S {
        self.history.into_state()
    }
}

impl<S: State, T: Transition> Application<S, T> {
    pub fn history(&self) -> &History<S, T> {
        match self {
            Self::Chainable(application) => application.history(),
            Self::Final(application) => application.history(),
        }
    }

    /// The resulting state.
    pub fn state(&self) -> &S {
        self.history().state()
    }

    /// Transitions applied, oldest first.
    pub fn applied(&self) -> &[T] {
        self.history().applied()
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final(_))
    }

    pub fn into_state(self) -> S {
        match self {
            Self::Chainable(application) => application.into_state(),
            Self::Final(application) => application.into_state(),
        }
    }
}

impl<S: State, T: Transition> From<ChainableApplication<S, T>> for Application<S, T> {
    fn from(application: ChainableApplication<S, T>) -> Self {
        Self::Chainable(application)
    }
}

impl<S: State, T: Transition> From<FinalApplication<S, T>> for Application<S, T> {
    fn from(application: FinalApplication<S, T>) -> Self {
        Self::Final(application)
    }
}

impl<S: State, T: Transition> Clone for ChainableApplication<S, T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            history: self.history.clone(),
        }
    }
}

// Applications built against different registries compare equal when their
// histories do.
impl<S: State, T: Transition> PartialEq for ChainableApplication<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.history == other.history
    }
}

impl<S: State, T: Transition> fmt::Debug for ChainableApplication<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainableApplication")
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Chaining on a pending result: each step is skipped once a previous one failed.
///
/// # Example
///
/// ```rust
/// use switchyard::application::ApplyExt;
/// # use switchyard::registry::Registry;
/// # use switchyard::{state_enum, transition_enum};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct Red;
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct Green;
/// # state_enum! { pub enum Light: LightKind { Red(Red), Green(Green) } }
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct Next;
/// # transition_enum! { pub enum Signal: SignalKind { Next(Next) } }
/// let registry = Registry::<Light, Signal>::builder()
///     .on(|_: &Red, _: &Next| Green)
///     .on(|_: &Green, _: &Next| Red)
///     .build()
///     .unwrap();
///
/// let application = registry
///     .apply_transition(Red.into(), Next.into())
///     .then(Next.into())
///     .then(Next.into())
///     .unwrap();
///
/// assert_eq!(application.state(), &Light::from(Green));
/// assert_eq!(application.applied().len(), 3);
/// ```
pub trait ApplyExt<S: State, T: Transition, E> {
    /// Apply `transition` if every previous step succeeded.
    fn then(self, transition: T) -> Result<ChainableApplication<S, T>, E>;

    /// End the chain with a side-effecting transition if every previous step succeeded.
    fn then_with_effect<S2, T2, F>(self, effect: F) -> Result<FinalApplication<S, T>, E>
    where
        S2: VariantOf<S>,
        T2: VariantOf<T>,
        F: FnOnce(&S2) -> Result<T2, E>;
}

impl<S, T, E> ApplyExt<S, T, E> for Result<ChainableApplication<S, T>, E>
where
    S: State,
    T: Transition,
    E: From<TransitionError<S, T>>,
{
    fn then(self, transition: T) -> Result<ChainableApplication<S, T>, E> {
        self.and_then(|application| application.then(transition).map_err(E::from))
    }

    fn then_with_effect<S2, T2, F>(self, effect: F) -> Result<FinalApplication<S, T>, E>
    where
        S2: VariantOf<S>,
        T2: VariantOf<T>,
        F: FnOnce(&S2) -> Result<T2, E>,
    {
        self.and_then(|application| application.then_with_effect(effect))
    }
}
