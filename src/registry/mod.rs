//! Transition registry: the immutable table of pure transition functions.
//!
//! A registry maps `(state kind, transition kind)` pairs to a function
//! `(&State, &Transition) -> State`. It is built once with
//! [`RegistryBuilder`] and then shared read-only by everything that applies
//! transitions against it.
//!
//! # Example
//!
//! ```rust
//! use switchyard::registry::Registry;
//! use switchyard::{state_enum, transition_enum};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Off;
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct On;
//!
//! state_enum! {
//!     pub enum Switch: SwitchKind {
//!         Off(Off),
//!         On(On),
//!     }
//! }
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Toggle;
//!
//! transition_enum! {
//!     pub enum SwitchEvent: SwitchEventKind {
//!         Toggle(Toggle),
//!     }
//! }
//!
//! let registry = Registry::<Switch, SwitchEvent>::builder()
//!     .on(|_: &Off, _: &Toggle| On)
//!     .on(|_: &On, _: &Toggle| Off)
//!     .build()
//!     .unwrap();
//!
//! let state = registry.fold(Switch::from(Off), vec![Toggle.into(), Toggle.into(), Toggle.into()]);
//! assert_eq!(state, Switch::from(On));
//! ```

mod builder;
mod error;
pub mod macros;

pub use builder::RegistryBuilder;
pub use error::{BuildError, BuildErrors};

use crate::application::TransitionError;
use crate::core::{State, Tag, Transition, Variant};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased transition function.
///
/// Returns `None` only when called with variants other than the ones it was
/// registered for.
type TransitionFn<S, T> = Arc<dyn Fn(&S, &T) -> Option<S> + Send + Sync>;

/// One registered transition.
pub struct Entry<S: State, T: Transition> {
    /// Kind of the state the transition applies to
    pub from: S::Kind,
    /// Kind of the transition
    pub via: T::Kind,
    /// Kind of the state the function produces
    pub to: S::Kind,
    apply: TransitionFn<S, T>,
}

impl<S: State, T: Transition> Entry<S, T> {
    /// Run the transition function.
    pub fn invoke(&self, state: &S, transition: &T) -> Option<S> {
        (self.apply)(state, transition)
    }
}

impl<S: State, T: Transition> Clone for Entry<S, T> {
    fn clone(&self) -> Self {
        Self {
            from: self.from,
            via: self.via,
            to: self.to,
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<S: State, T: Transition> fmt::Debug for Entry<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} : {}",
            self.from.name(),
            self.to.name(),
            self.via.name()
        )
    }
}

struct Table<S: State, T: Transition> {
    entries: Vec<Entry<S, T>>,
    index: HashMap<(S::Kind, T::Kind), usize>,
    track_states: bool,
}

/// Immutable transition table.
///
/// Cloning a registry is cheap: every clone shares the same table.
pub struct Registry<S: State, T: Transition> {
    table: Arc<Table<S, T>>,
}

impl<S: State + 'static, T: Transition + 'static> Registry<S, T> {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder<S, T> {
        RegistryBuilder::new()
    }
}

impl<S: State, T: Transition> Registry<S, T> {
    pub(crate) fn from_parts(
        entries: Vec<Entry<S, T>>,
        index: HashMap<(S::Kind, T::Kind), usize>,
        track_states: bool,
    ) -> Self {
        Self {
            table: Arc::new(Table {
                entries,
                index,
                track_states,
            }),
        }
    }

    /// Find the entry registered for a pair of kinds.
    pub fn lookup(&self, from: S::Kind, via: T::Kind) -> Option<&Entry<S, T>> {
        self.table
            .index
            .get(&(from, via))
            .map(|&position| &self.table.entries[position])
    }

    /// Whether a transition of kind `via` is legal from states of kind `from`.
    pub fn accepts(&self, from: S::Kind, via: T::Kind) -> bool {
        self.table.index.contains_key(&(from, via))
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[Entry<S, T>] {
        &self.table.entries
    }

    /// Whether applications record the states they pass through.
    pub fn tracks_states(&self) -> bool {
        self.table.track_states
    }

    /// Compute the state reached by applying `transition` to `state`.
    ///
    /// Fails with [`TransitionError::InvalidTransition`] carrying both inputs
    /// when no function is registered for their kinds.
    pub fn next_state(&self, state: &S, transition: &T) -> Result<S, TransitionError<S, T>> {
        let next = self
            .lookup(state.kind(), transition.kind())
            .and_then(|entry| entry.invoke(state, transition));

        match next {
            Some(next) => {
                tracing::debug!(
                    from = state.name(),
                    to = next.name(),
                    via = transition.name(),
                    "applied transition"
                );
                Ok(next)
            }
            None => {
                tracing::warn!(
                    state = state.name(),
                    transition = transition.name(),
                    "rejected unregistered transition"
                );
                Err(TransitionError::InvalidTransition {
                    state: state.clone(),
                    transition: transition.clone(),
                })
            }
        }
    }

    /// Replay `transitions` in order starting from `initial`.
    ///
    /// Stops at the first unregistered step.
    pub fn try_fold<I>(&self, initial: S, transitions: I) -> Result<S, TransitionError<S, T>>
    where
        I: IntoIterator<Item = T>,
    {
        transitions
            .into_iter()
            .try_fold(initial, |state, transition| {
                self.next_state(&state, &transition)
            })
    }

    /// Replay `transitions` in order starting from `initial`.
    ///
    /// Used to rebuild state from an event log, where every step was valid
    /// when it was recorded.
    ///
    /// # Panics
    ///
    /// Panics if any step is not registered: the log is corrupt.
    pub fn fold<I>(&self, initial: S, transitions: I) -> S
    where
        I: IntoIterator<Item = T>,
    {
        match self.try_fold(initial, transitions) {
            Ok(state) => state,
            Err(error) => panic!("transition log cannot be replayed: {error}"),
        }
    }
}

impl<S: State, T: Transition> Clone for Registry<S, T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<S: State, T: Transition> fmt::Debug for Registry<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.table.entries)
            .field("track_states", &self.table.track_states)
            .finish()
    }
}
