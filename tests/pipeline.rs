//! End-to-end tests: handlers wrapped in decorators, persisted to an event
//! log and read back through projections.

use chrono::TimeDelta;
use std::cell::Cell;
use std::sync::Arc;
use switchyard::clock::{Clock, ManualClock};
use switchyard::command::{Persistent, TraceDocument, Traced};
use switchyard::core::{EntityId, Identified};
use switchyard::log::{EventStore, LogSnapshot};
use switchyard::workflows::account::{
    self, AccountError, AccountEvent, AccountState, Created, Email, EmailTransactionId,
    NeedsWelcomeEmail, WelcomeMessageSent,
};
use switchyard::workflows::eligibility::{
    self, Aborted, Article, CreatedEligibilityWorkflow, EligibilityCriteriaCollected,
    EligibilityEvent, EligibilityMatches, EligibilityState, EligibilityStateKind,
    JournalPublishingModel, NoDealFound,
};
use switchyard::workflows::scheduled_task::{
    self, CompleteTask, HubConfig, ScheduledTask, TaskEvent, TaskHandler, TaskHub, TaskState,
};
use switchyard::{EventLog, Projection, State, Variant};

fn account_not_found(id: EntityId) -> AccountState {
    account::NotFound { id }.into()
}

fn eligibility_not_found(id: EntityId) -> EligibilityState {
    eligibility::NotFound { id }.into()
}

#[test]
fn account_survives_a_snapshot_round_trip() {
    let registry = account::registry();
    let log: Arc<EventLog<AccountEvent>> = Arc::new(EventLog::new());
    let id = EntityId::new();
    let emails_sent = Cell::new(0);

    let created = registry
        .apply_transition(
            account_not_found(id),
            Created {
                email: Email("new@example.com".into()),
            }
            .into(),
        )
        .unwrap();
    let opened = registry
        .apply_with_effect(created.into_state(), |needs: &NeedsWelcomeEmail| {
            emails_sent.set(emails_sent.get() + 1);
            assert_eq!(needs.email, Email("new@example.com".into()));
            Ok::<_, AccountError>(WelcomeMessageSent {
                transaction_id: EmailTransactionId("tx-1".into()),
            })
        })
        .unwrap();
    for transition in [
        AccountEvent::from(Created {
            email: Email("new@example.com".into()),
        }),
        opened.applied()[0].clone(),
    ] {
        log.append(id, transition).unwrap();
    }

    let json = log.snapshot().to_json().unwrap();
    let restored = Arc::new(EventLog::restore(LogSnapshot::from_json(&json).unwrap()).unwrap());
    let projection = Projection::new(restored, account::registry(), account_not_found);

    assert_eq!(emails_sent.get(), 1);
    assert_eq!(&projection.fetch(id).unwrap(), opened.state());
}

#[test]
fn eligibility_workflows_are_projected_independently() {
    let log: Arc<EventLog<EligibilityEvent>> = Arc::new(EventLog::new());
    let projection = Projection::new(
        Arc::clone(&log),
        eligibility::registry(),
        eligibility_not_found,
    );
    let article = Article {
        doi: "10.1000/xyz".into(),
        journal: JournalPublishingModel::FullyOpenAccess,
        manuscript_link: "https://manuscripts.example/xyz".into(),
    };
    let waiting = EntityId::new();
    let aborted = EntityId::new();

    for id in [waiting, aborted] {
        log.append(
            id,
            CreatedEligibilityWorkflow {
                article: article.clone(),
            }
            .into(),
        )
        .unwrap();
    }
    log.append(
        waiting,
        EligibilityCriteriaCollected {
            matches: EligibilityMatches::default(),
        }
        .into(),
    )
    .unwrap();
    log.append(
        aborted,
        Aborted {
            reason: "duplicate submission".into(),
        }
        .into(),
    )
    .unwrap();
    log.append(waiting, NoDealFound.into()).unwrap();

    let kinds: Vec<(EntityId, EligibilityStateKind)> = projection
        .all()
        .unwrap()
        .into_iter()
        .map(|(id, state)| (id, state.kind()))
        .collect();

    assert_eq!(
        kinds,
        vec![
            (waiting, EligibilityStateKind::WaitingForPublishingModelChoice),
            (aborted, EligibilityStateKind::HasBeenAborted),
        ]
    );
    let (found, state) = projection.find(|state| state.is_final()).unwrap().unwrap();
    assert_eq!(found, aborted);
    assert_eq!(state.entity_id(), aborted);

    let bytes = log.snapshot().to_bytes().unwrap();
    let restored = EventLog::restore(LogSnapshot::from_bytes(&bytes).unwrap()).unwrap();
    assert_eq!(restored.records(), log.records());
}

#[test]
fn hub_runs_tasks_through_the_whole_pipeline() {
    let clock = Arc::new(ManualClock::epoch());
    let log = Arc::new(EventLog::new());
    let projection = Projection::new(
        Arc::clone(&log),
        scheduled_task::registry(),
        scheduled_task::not_found,
    );
    let trace = TraceDocument::new("Scheduled tasks");
    let fetch = {
        let projection = projection.clone();
        move |id: EntityId| projection.fetch(id)
    };
    let handler = Traced::new(
        Persistent::new(
            TaskHandler::new(scheduled_task::registry(), fetch, clock.clone()),
            Arc::clone(&log),
        ),
        Arc::clone(&trace),
    );
    let follow_up = ScheduledTask::new(clock.now() + TimeDelta::seconds(30), "http://do.this/2");
    let hub = TaskHub::new(handler, clock.clone(), HubConfig::default(), |action: &str| {
        Ok((action == "http://do.this/1").then(|| follow_up.clone()))
    })
    .with_trace(Arc::clone(&trace));

    let task_id = hub
        .create_task(ScheduledTask::new(
            clock.now() - TimeDelta::seconds(1),
            "http://do.this/1",
        ))
        .unwrap()
        .state()
        .entity_id();
    let first = hub.drain();
    clock.advance(TimeDelta::seconds(31));
    let second = hub.drain();

    assert_eq!((first.started, first.extended), (1, 1));
    assert_eq!((second.started, second.completed), (1, 1));
    assert!(hub.pending_jobs().is_empty());
    assert_eq!(
        projection.fetch(task_id).unwrap(),
        TaskState::from(CompleteTask { id: task_id })
    );
    assert_eq!(
        log.fetch(task_id).unwrap(),
        vec![
            TaskEvent::from(scheduled_task::Created {
                task: ScheduledTask::new(clock.now() - TimeDelta::seconds(32), "http://do.this/1"),
            }),
            TaskEvent::from(scheduled_task::TaskStarted),
            TaskEvent::from(scheduled_task::TaskExtended {
                next_task: follow_up.clone(),
            }),
            TaskEvent::from(scheduled_task::TaskStarted),
            TaskEvent::from(scheduled_task::TaskCompleted),
        ]
    );

    let rendered = trace.render();
    assert!(rendered.starts_with("@startuml\ntitle Scheduled tasks\n"));
    assert!(rendered.contains(
        "group CreatePendingTask\n  NotFound -> PendingTask : Created\nend\n"
    ));
    assert!(rendered.contains("Hub -> JobRunner : http://do.this/1\n"));
    assert!(rendered.contains("Hub -> JobRunner : http://do.this/2\n"));
    assert!(rendered.contains("  ExecutingTask -> CompleteTask : TaskCompleted\n"));
    assert!(rendered.ends_with("@enduml\n"));
}
