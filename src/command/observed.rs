//! Hook decorator.

use super::CommandHandler;
use crate::application::Application;

/// Calls `hook` with every successful application before returning it.
pub struct Observed<H, F> {
    inner: H,
    hook: F,
}

impl<H, F> Observed<H, F> {
    pub fn new(inner: H, hook: F) -> Self {
        Self { inner, hook }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H, F> CommandHandler for Observed<H, F>
where
    H: CommandHandler,
    F: Fn(&Application<H::State, H::Transition>),
{
    type Command = H::Command;
    type State = H::State;
    type Transition = H::Transition;
    type Error = H::Error;

    fn invoke(
        &self,
        command: Self::Command,
    ) -> Result<Application<Self::State, Self::Transition>, Self::Error> {
        self.inner.invoke(command).inspect(|application| (self.hook)(application))
    }
}
