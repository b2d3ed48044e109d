//! Rebuilding entity state by folding the event log.

use super::{EventLog, EventStore, LogError};
use crate::core::{EntityId, State, Transition};
use crate::registry::Registry;
use std::sync::Arc;

/// Read side of an event-sourced workflow.
///
/// Folds an entity's transitions through the registry, starting from the
/// not-found state produced by `initial`. An entity with no records folds
/// to that initial state.
pub struct Projection<S: State, T: Transition> {
    log: Arc<EventLog<T>>,
    registry: Registry<S, T>,
    initial: fn(EntityId) -> S,
}

impl<S: State, T: Transition> Projection<S, T> {
    pub fn new(log: Arc<EventLog<T>>, registry: Registry<S, T>, initial: fn(EntityId) -> S) -> Self {
        Self {
            log,
            registry,
            initial,
        }
    }

    /// Current state of one entity.
    ///
    /// A recorded sequence the registry rejects is reported as
    /// [`LogError::CorruptHistory`].
    pub fn fetch(&self, entity: EntityId) -> Result<S, LogError> {
        let transitions = self.log.fetch(entity)?;
        self.replay(entity, transitions)
    }

    /// Current state of every entity in the log, in order of first append.
    pub fn all(&self) -> Result<Vec<(EntityId, S)>, LogError> {
        self.log
            .fold_all(|entity, transitions| self.replay(entity, transitions))
            .into_iter()
            .map(|(entity, state)| state.map(|state| (entity, state)))
            .collect()
    }

    /// First entity whose current state satisfies `predicate`.
    ///
    /// Scans the whole log; there is no secondary index.
    pub fn find<P>(&self, mut predicate: P) -> Result<Option<(EntityId, S)>, LogError>
    where
        P: FnMut(&S) -> bool,
    {
        Ok(self.all()?.into_iter().find(|(_, state)| predicate(state)))
    }

    pub fn log(&self) -> &Arc<EventLog<T>> {
        &self.log
    }

    fn replay(&self, entity: EntityId, transitions: Vec<T>) -> Result<S, LogError> {
        self.registry
            .try_fold((self.initial)(entity), transitions)
            .map_err(|error| {
                tracing::warn!(%entity, %error, "recorded history cannot be replayed");
                LogError::CorruptHistory {
                    entity,
                    reason: error.to_string(),
                }
            })
    }
}

impl<S: State, T: Transition> Clone for Projection<S, T> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            registry: self.registry.clone(),
            initial: self.initial,
        }
    }
}
