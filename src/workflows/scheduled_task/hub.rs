//! Scheduling hub: keeps the set of pending tasks current and runs the due
//! ones.
//!
//! The pending set is derived from every application the hub's handler
//! produces: entering `PendingTask` adds the task, entering any other
//! variant removes it. Draining repeatedly starts the first due task in
//! list order, hands its action to the job runner and records the outcome
//! through the same handler.

use super::{ScheduledTask, TaskCommand, TaskEvent, TaskState};
use crate::application::Application;
use crate::clock::Clock;
use crate::command::{CommandHandler, Observed, TraceDocument};
use crate::core::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Hub settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// How long a failed task waits before it is due again
    pub retry_delay: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// Error reported by the job runner.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct JobFailure(pub String);

#[derive(Clone, Debug, PartialEq)]
pub struct PendingJob {
    pub id: EntityId,
    pub task: ScheduledTask,
}

/// Tasks waiting to run, in the order they became pending.
#[derive(Debug, Default)]
pub struct PendingJobs {
    jobs: Mutex<Vec<PendingJob>>,
}

impl PendingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the state a task just entered.
    pub fn update(&self, state: &TaskState) {
        let mut jobs = self.lock();
        match state {
            TaskState::PendingTask(pending) => {
                jobs.retain(|job| job.id != pending.id);
                jobs.push(PendingJob {
                    id: pending.id,
                    task: pending.task.clone(),
                });
            }
            TaskState::ExecutingTask(executing) => jobs.retain(|job| job.id != executing.id),
            TaskState::CompleteTask(complete) => jobs.retain(|job| job.id != complete.id),
            TaskState::AbortedTask(aborted) => jobs.retain(|job| job.id != aborted.id),
            TaskState::NotFound(_) => {}
        }
    }

    /// First job due at `now`, ignoring the ids in `skip`.
    pub fn next_due(&self, now: DateTime<Utc>, skip: &[EntityId]) -> Option<PendingJob> {
        self.lock()
            .iter()
            .find(|job| job.task.is_due(now) && !skip.contains(&job.id))
            .cloned()
    }

    pub fn remove(&self, id: EntityId) {
        self.lock().retain(|job| job.id != id);
    }

    pub fn jobs(&self) -> Vec<PendingJob> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What one call to [`TaskHub::drain`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks moved to `ExecutingTask`
    pub started: usize,
    /// Tasks whose job asked for a follow-up
    pub extended: usize,
    pub completed: usize,
    /// Tasks whose job failed and were rescheduled
    pub failed: usize,
    /// Tasks removed from the pending set because a command for them failed
    pub dropped: Vec<EntityId>,
}

type PendingHook = Box<dyn Fn(&Application<TaskState, TaskEvent>) + Send + Sync>;

/// Runs due scheduled tasks.
///
/// `job` receives a task's action and answers with `Ok(Some(next))` to
/// schedule a follow-up, `Ok(None)` when the work is done, or an error to
/// have the task retried after [`HubConfig::retry_delay`].
pub struct TaskHub<H, J> {
    handler: Observed<H, PendingHook>,
    pending: Arc<PendingJobs>,
    clock: Arc<dyn Clock>,
    job: J,
    config: HubConfig,
    trace: Option<Arc<TraceDocument>>,
}

enum Outcome {
    Extended,
    Completed,
    Failed,
}

impl<H, J> TaskHub<H, J>
where
    H: CommandHandler<Command = TaskCommand, State = TaskState, Transition = TaskEvent>,
    H::Error: fmt::Display,
    J: Fn(&str) -> Result<Option<ScheduledTask>, JobFailure>,
{
    pub fn new(handler: H, clock: Arc<dyn Clock>, config: HubConfig, job: J) -> Self {
        let pending = Arc::new(PendingJobs::new());
        let observer = Arc::clone(&pending);
        let hook: PendingHook = Box::new(move |application: &Application<TaskState, TaskEvent>| {
            observer.update(application.state())
        });

        Self {
            handler: Observed::new(handler, hook),
            pending,
            clock,
            job,
            config,
            trace: None,
        }
    }

    /// Also write the hub's conversations with the job runner to `document`.
    pub fn with_trace(mut self, document: Arc<TraceDocument>) -> Self {
        self.trace = Some(document);
        self
    }

    /// Schedule a new task.
    pub fn create_task(
        &self,
        task: ScheduledTask,
    ) -> Result<Application<TaskState, TaskEvent>, H::Error> {
        self.invoke(TaskCommand::CreatePendingTask { task })
    }

    /// Run any command through the hub so the pending set sees its outcome.
    pub fn invoke(
        &self,
        command: TaskCommand,
    ) -> Result<Application<TaskState, TaskEvent>, H::Error> {
        self.handler.invoke(command)
    }

    pub fn pending_jobs(&self) -> &PendingJobs {
        &self.pending
    }

    /// Run due tasks until none is left.
    ///
    /// Each task runs at most once per drain: a failed task or a follow-up
    /// that is already due waits for the next call. A task that cannot be
    /// started is dropped from the pending set.
    pub fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let mut handled = Vec::new();

        while let Some(job) = self.pending.next_due(self.clock.now(), &handled) {
            handled.push(job.id);
            if let Err(error) = self.invoke(TaskCommand::StartTask { task_id: job.id }) {
                tracing::warn!(task = %job.id, %error, "dropping pending task that cannot start");
                self.pending.remove(job.id);
                report.dropped.push(job.id);
                continue;
            }
            report.started += 1;

            tracing::info!(task = %job.id, action = %job.task.action, "running job");
            self.note(&format!("Hub -> JobRunner : {}\n", job.task.action));

            let (outcome, follow_up) = match (self.job)(&job.task.action) {
                Ok(Some(next_task)) => (
                    Outcome::Extended,
                    TaskCommand::RecordTaskSuccessAndExtend {
                        task_id: job.id,
                        next_task,
                    },
                ),
                Ok(None) => (
                    Outcome::Completed,
                    TaskCommand::RecordTaskSuccessAndComplete { task_id: job.id },
                ),
                Err(failure) => {
                    tracing::warn!(task = %job.id, %failure, "job failed");
                    (
                        Outcome::Failed,
                        TaskCommand::FailTask {
                            task_id: job.id,
                            reason: failure.to_string(),
                            retry_delay: self.config.retry_delay,
                        },
                    )
                }
            };

            match self.invoke(follow_up) {
                Ok(_) => match outcome {
                    Outcome::Extended => report.extended += 1,
                    Outcome::Completed => report.completed += 1,
                    Outcome::Failed => report.failed += 1,
                },
                Err(error) => {
                    tracing::warn!(task = %job.id, %error, "could not record job outcome");
                    self.pending.remove(job.id);
                    report.dropped.push(job.id);
                }
            }
        }

        tracing::debug!(
            started = report.started,
            pending = self.pending.len(),
            "drain finished"
        );
        report
    }

    fn note(&self, text: &str) {
        if let Some(trace) = &self.trace {
            trace.append(text);
        }
    }
}
