//! Errors raised when a transition cannot be applied.

use crate::core::{State, Tag, Transition, Variant};
use thiserror::Error;

/// Misuse of a state machine: the requested move is not registered.
///
/// Always recoverable. The caller can pick a different command.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError<S: State, T: Transition> {
    #[error("No transition from state '{}' via '{}'", .state.name(), .transition.name())]
    InvalidTransition { state: S, transition: T },

    #[error("State '{}' is not the expected '{}'", .state.name(), .expected.name())]
    IncompatibleState { state: S, expected: S::Kind },

    #[error("Transition '{}' is not registered for state '{}'", .transition.name(), .state.name())]
    InvalidTransitionClass { state: S, transition: T::Kind },
}

impl<S: State, T: Transition> TransitionError<S, T> {
    /// The state the failed move started from.
    pub fn state(&self) -> &S {
        match self {
            Self::InvalidTransition { state, .. }
            | Self::IncompatibleState { state, .. }
            | Self::InvalidTransitionClass { state, .. } => state,
        }
    }
}
