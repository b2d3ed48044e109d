//! Persistence decorator.

use super::CommandHandler;
use crate::application::Application;
use crate::core::Identified;
use crate::log::{EventStore, LogError};

/// Appends every transition of a successful application to an event store.
///
/// Transitions are keyed by the entity id of the resulting state and
/// appended in the order they were applied. Failures pass through untouched
/// and append nothing. A store that refuses an append fails the command with
/// the store's error; transitions appended before it stay recorded.
pub struct Persistent<H, P> {
    inner: H,
    store: P,
}

impl<H, P> Persistent<H, P> {
    pub fn new(inner: H, store: P) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}

impl<H, P> CommandHandler for Persistent<H, P>
where
    H: CommandHandler,
    H::State: Identified,
    H::Error: From<LogError>,
    P: EventStore<H::Transition>,
{
    type Command = H::Command;
    type State = H::State;
    type Transition = H::Transition;
    type Error = H::Error;

    fn invoke(
        &self,
        command: Self::Command,
    ) -> Result<Application<Self::State, Self::Transition>, Self::Error> {
        let application = self.inner.invoke(command)?;
        let entity = application.state().entity_id();
        for transition in application.applied() {
            self.store.append(entity, transition.clone())?;
        }
        Ok(application)
    }
}
