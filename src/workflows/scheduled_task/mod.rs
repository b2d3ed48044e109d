//! Scheduled tasks: a job that becomes due at a point in time, runs, and is
//! then extended with a follow-up, completed, failed (and retried later) or
//! aborted.
//!
//! ```text
//! NotFound --Created--> PendingTask --TaskStarted--> ExecutingTask
//! ExecutingTask --TaskExtended | TaskFailed--> PendingTask
//! ExecutingTask --TaskCompleted--> CompleteTask
//! PendingTask | ExecutingTask --TaskAborted--> AbortedTask
//! ```

mod commands;
mod hub;

pub use commands::{TaskCommand, TaskError, TaskHandler};
pub use hub::{DrainReport, HubConfig, JobFailure, PendingJob, PendingJobs, TaskHub};

use crate::core::EntityId;
use crate::registry::Registry;
use crate::{state_enum, transition_enum};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to run and when.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// The task is due once this instant has passed
    pub invoke_after: DateTime<Utc>,
    /// Opaque action handed to the job runner, usually a URI
    pub action: String,
}

impl ScheduledTask {
    pub fn new(invoke_after: DateTime<Utc>, action: impl Into<String>) -> Self {
        Self {
            invoke_after,
            action: action.into(),
        }
    }

    /// Due strictly after `invoke_after`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.invoke_after < now
    }

    /// The same task pushed back by `delay`.
    pub fn postponed(&self, delay: Duration) -> Self {
        let invoke_after = TimeDelta::from_std(delay)
            .ok()
            .and_then(|delta| self.invoke_after.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            invoke_after,
            action: self.action.clone(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NotFound {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PendingTask {
    pub id: EntityId,
    pub task: ScheduledTask,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExecutingTask {
    pub id: EntityId,
    pub original_task: ScheduledTask,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CompleteTask {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AbortedTask {
    pub id: EntityId,
}

state_enum! {
    pub enum TaskState: TaskStateKind {
        NotFound(NotFound),
        PendingTask(PendingTask),
        ExecutingTask(ExecutingTask),
        CompleteTask(CompleteTask),
        AbortedTask(AbortedTask),
    }
    entity_id: id
    final: [CompleteTask, AbortedTask]
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Created {
    pub task: ScheduledTask,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaskStarted;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaskExtended {
    pub next_task: ScheduledTask,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaskFailed {
    pub reason: String,
    pub retry_delay: Duration,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaskCompleted;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaskAborted {
    pub reason: String,
}

transition_enum! {
    pub enum TaskEvent: TaskEventKind {
        Created(Created),
        TaskStarted(TaskStarted),
        TaskExtended(TaskExtended),
        TaskFailed(TaskFailed),
        TaskCompleted(TaskCompleted),
        TaskAborted(TaskAborted),
    }
}

/// The scheduled task transitions.
pub fn registry() -> Registry<TaskState, TaskEvent> {
    Registry::builder()
        .on(|not_found: &NotFound, created: &Created| PendingTask {
            id: not_found.id,
            task: created.task.clone(),
        })
        .on(|pending: &PendingTask, _: &TaskStarted| ExecutingTask {
            id: pending.id,
            original_task: pending.task.clone(),
        })
        .on(|executing: &ExecutingTask, failed: &TaskFailed| PendingTask {
            id: executing.id,
            task: executing.original_task.postponed(failed.retry_delay),
        })
        .on(|executing: &ExecutingTask, extended: &TaskExtended| PendingTask {
            id: executing.id,
            task: extended.next_task.clone(),
        })
        .on(|executing: &ExecutingTask, _: &TaskAborted| AbortedTask { id: executing.id })
        .on(|pending: &PendingTask, _: &TaskAborted| AbortedTask { id: pending.id })
        .on(|executing: &ExecutingTask, _: &TaskCompleted| CompleteTask { id: executing.id })
        .build()
        .expect("scheduled task transitions are well formed")
}

/// The not-found state every task's log is folded from.
pub fn not_found(id: EntityId) -> TaskState {
    NotFound { id }.into()
}
