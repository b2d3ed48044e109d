//! Command handler pipeline.
//!
//! A domain handler turns a command into an [`Application`]. Decorators wrap
//! a handler, observe each successful application and hand it back
//! unchanged:
//!
//! - [`Persistent`] appends the applied transitions to an event store
//! - [`Traced`] writes a PlantUML sequence of what happened
//! - [`Observed`] calls an arbitrary hook
//!
//! Decorators never turn a success into a failure or the reverse, so they
//! compose in any order: `Traced::new(Persistent::new(domain, log), trace)`.

mod observed;
mod persistent;
mod traced;

pub use observed::Observed;
pub use persistent::Persistent;
pub use traced::{TraceDocument, Traced};

use crate::application::Application;
use crate::core::{State, Transition};

/// A request to change a workflow.
pub trait Command {
    /// Short name used as the group title in traces.
    fn name(&self) -> &str;
}

/// Turns commands into applications.
pub trait CommandHandler {
    type Command: Command;
    type State: State;
    type Transition: Transition;
    type Error;

    fn invoke(
        &self,
        command: Self::Command,
    ) -> Result<Application<Self::State, Self::Transition>, Self::Error>;
}

impl<H: CommandHandler + ?Sized> CommandHandler for &H {
    type Command = H::Command;
    type State = H::State;
    type Transition = H::Transition;
    type Error = H::Error;

    fn invoke(
        &self,
        command: Self::Command,
    ) -> Result<Application<Self::State, Self::Transition>, Self::Error> {
        (**self).invoke(command)
    }
}
