//! Trace decorator rendering PlantUML sequence diagrams.

use super::{Command, CommandHandler};
use crate::application::Application;
use crate::core::{State, Transition, Variant};
use std::sync::{Arc, Mutex, PoisonError};

/// A PlantUML sequence diagram built up while commands run.
///
/// Shared behind an `Arc` so collaborators of a handler (fake external
/// services, the scheduling hub) can add their own lines to the same
/// document.
#[derive(Debug)]
pub struct TraceDocument {
    title: String,
    body: Mutex<String>,
}

impl TraceDocument {
    pub fn new(title: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            title: title.into(),
            body: Mutex::new(String::new()),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append raw text. Callers supply their own line breaks.
    pub fn append(&self, text: &str) {
        self.body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }

    /// The complete diagram.
    pub fn render(&self) -> String {
        let body = self.body.lock().unwrap_or_else(PoisonError::into_inner);
        format!("@startuml\ntitle {}\n{}@enduml\n", self.title, body)
    }
}

/// Records each command as a group of `From -> To : Via` lines.
///
/// Failed commands leave an empty group.
pub struct Traced<H> {
    inner: H,
    document: Arc<TraceDocument>,
}

impl<H> Traced<H> {
    pub fn new(inner: H, document: Arc<TraceDocument>) -> Self {
        Self { inner, document }
    }

    pub fn document(&self) -> &Arc<TraceDocument> {
        &self.document
    }
}

impl<H: CommandHandler> CommandHandler for Traced<H> {
    type Command = H::Command;
    type State = H::State;
    type Transition = H::Transition;
    type Error = H::Error;

    fn invoke(
        &self,
        command: Self::Command,
    ) -> Result<Application<Self::State, Self::Transition>, Self::Error> {
        self.document.append(&format!("group {}\n", command.name()));
        let result = self.inner.invoke(command).inspect(|application| {
            self.document.append(&render_steps(application));
        });
        self.document.append("end\n");
        result
    }
}

fn render_steps<S: State, T: Transition>(application: &Application<S, T>) -> String {
    application
        .history()
        .steps()
        .into_iter()
        .map(|step| {
            let from = step.from.map_or("?", |state| state.name());
            format!("  {} -> {} : {}\n", from, step.to.name(), step.via.name())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fixtures::{
        handler, Ajar, Closed, DoorCommand, DoorHandler, Open, Pushed, Unlatched,
    };
    use crate::core::EntityId;
    use crate::registry::Registry;

    #[test]
    fn renders_one_group_per_command() {
        let document = TraceDocument::new("entering");
        let traced = Traced::new(handler(), Arc::clone(&document));

        traced.invoke(DoorCommand::Enter(EntityId::new())).unwrap();

        assert_eq!(
            document.render(),
            "@startuml\n\
             title entering\n\
             group Enter\n  \
             Closed -> Ajar : Unlatched\n  \
             Ajar -> Open : Pushed\n\
             end\n\
             @enduml\n"
        );
    }

    #[test]
    fn failed_command_leaves_empty_group() {
        let document = TraceDocument::new("shoving");
        let traced = Traced::new(handler(), Arc::clone(&document));

        let result = traced.invoke(DoorCommand::Shove(EntityId::new()));

        assert!(result.is_err());
        assert_eq!(
            document.render(),
            "@startuml\ntitle shoving\ngroup Shove\nend\n@enduml\n"
        );
    }

    #[test]
    fn untracked_registry_renders_unknown_sources() {
        let untracked = Registry::builder()
            .on(|closed: &Closed, _: &Unlatched| Ajar { id: closed.id })
            .on(|ajar: &Ajar, _: &Pushed| Open { id: ajar.id })
            .track_states(false)
            .build()
            .unwrap();
        let document = TraceDocument::new("untracked");
        let traced = Traced::new(
            DoorHandler {
                registry: untracked,
            },
            Arc::clone(&document),
        );

        traced.invoke(DoorCommand::Enter(EntityId::new())).unwrap();

        assert!(document.render().contains("  ? -> Open : Unlatched\n  ? -> Open : Pushed\n"));
    }

    #[test]
    fn collaborators_can_add_lines() {
        let document = TraceDocument::new("shared");
        let shared = Arc::clone(&document);

        shared.append("Door -> Bell : ring\n");

        assert!(document.render().contains("Door -> Bell : ring\n"));
        assert_eq!(document.title(), "shared");
    }
}
