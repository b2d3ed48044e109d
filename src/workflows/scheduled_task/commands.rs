//! Commands and domain handler for scheduled tasks.

use super::{
    Created, NotFound, PendingTask, ScheduledTask, TaskAborted, TaskCompleted, TaskEvent,
    TaskExtended, TaskFailed, TaskStarted, TaskState,
};
use crate::application::{Application, TransitionError};
use crate::clock::Clock;
use crate::command::{Command, CommandHandler};
use crate::core::{EntityId, Variant};
use crate::log::LogError;
use crate::registry::Registry;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub enum TaskCommand {
    CreatePendingTask { task: ScheduledTask },
    StartTask { task_id: EntityId },
    FailTask {
        task_id: EntityId,
        reason: String,
        retry_delay: Duration,
    },
    AbortTask { task_id: EntityId, reason: String },
    RecordTaskSuccessAndExtend {
        task_id: EntityId,
        next_task: ScheduledTask,
    },
    RecordTaskSuccessAndComplete { task_id: EntityId },
}

impl Command for TaskCommand {
    fn name(&self) -> &str {
        match self {
            Self::CreatePendingTask { .. } => "CreatePendingTask",
            Self::StartTask { .. } => "StartTask",
            Self::FailTask { .. } => "FailTask",
            Self::AbortTask { .. } => "AbortTask",
            Self::RecordTaskSuccessAndExtend { .. } => "RecordTaskSuccessAndExtend",
            Self::RecordTaskSuccessAndComplete { .. } => "RecordTaskSuccessAndComplete",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error(transparent)]
    Transition(#[from] TransitionError<TaskState, TaskEvent>),

    #[error("Task {task_id} cannot run before {invoke_after} (now {now})")]
    NotDueYet {
        task_id: EntityId,
        invoke_after: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Task {task_id} cannot start from state '{state}'")]
    WrongState {
        task_id: EntityId,
        state: &'static str,
    },

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Domain handler for scheduled tasks.
///
/// `fetch` rebuilds a task's current state, usually
/// `move |id| projection.fetch(id)`. Its error converts into [`TaskError`]
/// and fails the command before anything is applied.
pub struct TaskHandler<F> {
    registry: Registry<TaskState, TaskEvent>,
    fetch: F,
    clock: Arc<dyn Clock>,
}

impl<F, E> TaskHandler<F>
where
    F: Fn(EntityId) -> Result<TaskState, E>,
    TaskError: From<E>,
{
    pub fn new(registry: Registry<TaskState, TaskEvent>, fetch: F, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            fetch,
            clock,
        }
    }

    fn apply(
        &self,
        task_id: EntityId,
        transition: TaskEvent,
    ) -> Result<Application<TaskState, TaskEvent>, TaskError> {
        let state = (self.fetch)(task_id)?;
        let application = self.registry.apply_transition(state, transition)?;
        Ok(application.into())
    }

    fn start(&self, task_id: EntityId) -> Result<Application<TaskState, TaskEvent>, TaskError> {
        let state = (self.fetch)(task_id)?;
        if !matches!(state, TaskState::PendingTask(_)) {
            return Err(TaskError::WrongState {
                task_id,
                state: state.name(),
            });
        }

        let application = self.registry.apply_with_effect(state, |pending: &PendingTask| {
            let now = self.clock.now();
            if pending.task.is_due(now) {
                Ok(TaskStarted)
            } else {
                Err(TaskError::NotDueYet {
                    task_id,
                    invoke_after: pending.task.invoke_after,
                    now,
                })
            }
        })?;
        Ok(application.into())
    }
}

impl<F, E> CommandHandler for TaskHandler<F>
where
    F: Fn(EntityId) -> Result<TaskState, E>,
    TaskError: From<E>,
{
    type Command = TaskCommand;
    type State = TaskState;
    type Transition = TaskEvent;
    type Error = TaskError;

    fn invoke(
        &self,
        command: TaskCommand,
    ) -> Result<Application<TaskState, TaskEvent>, TaskError> {
        match command {
            TaskCommand::CreatePendingTask { task } => {
                let application = self.registry.apply_transition(
                    NotFound { id: EntityId::new() }.into(),
                    Created { task }.into(),
                )?;
                Ok(application.into())
            }
            TaskCommand::StartTask { task_id } => self.start(task_id),
            TaskCommand::FailTask {
                task_id,
                reason,
                retry_delay,
            } => self.apply(task_id, TaskFailed { reason, retry_delay }.into()),
            TaskCommand::AbortTask { task_id, reason } => {
                self.apply(task_id, TaskAborted { reason }.into())
            }
            TaskCommand::RecordTaskSuccessAndExtend { task_id, next_task } => {
                self.apply(task_id, TaskExtended { next_task }.into())
            }
            TaskCommand::RecordTaskSuccessAndComplete { task_id } => {
                self.apply(task_id, TaskCompleted.into())
            }
        }
    }
}
