//! Errors raised while building a transition registry.

use thiserror::Error;

/// A single invalid registration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("No transitions defined. Register at least one transition before .build()")]
    NoTransitions,

    #[error("Transition '{via}' registered more than once for state '{from}'")]
    DuplicateTransition {
        from: &'static str,
        via: &'static str,
    },
}

/// Every problem found by [`RegistryBuilder::build`](super::RegistryBuilder::build).
///
/// All registrations are checked before failing, so one build reports every
/// duplicate at once.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid transition registry: {}", render(.0))]
pub struct BuildErrors(pub Vec<BuildError>);

fn render(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildErrors {
    pub fn errors(&self) -> &[BuildError] {
        &self.0
    }
}
