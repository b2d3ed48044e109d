//! Append-only event log of `(entity, transition)` records.
//!
//! The log is the only source of truth for event-sourced workflows: current
//! state is rebuilt by folding an entity's transitions, in append order,
//! through the registry (see [`Projection`]).
//!
//! Concurrent writers for the *same* entity must be serialised by the caller.
//! The log keeps appends linear but cannot detect interleaved commands.

mod error;
mod projection;
mod snapshot;

pub use error::{LogError, SnapshotFormat};
pub use projection::Projection;
pub use snapshot::{LogSnapshot, SNAPSHOT_VERSION};

use crate::core::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Destination for transitions produced by command handlers.
///
/// Both operations may fail for stores backed by something other than
/// memory; [`EventLog`] never does.
pub trait EventStore<T> {
    /// Append one transition for `entity`.
    fn append(&self, entity: EntityId, transition: T) -> Result<(), LogError>;

    /// Every transition recorded for `entity`, in append order.
    fn fetch(&self, entity: EntityId) -> Result<Vec<T>, LogError>;
}

impl<T, L: EventStore<T> + ?Sized> EventStore<T> for Arc<L> {
    fn append(&self, entity: EntityId, transition: T) -> Result<(), LogError> {
        (**self).append(entity, transition)
    }

    fn fetch(&self, entity: EntityId) -> Result<Vec<T>, LogError> {
        (**self).fetch(entity)
    }
}

/// A single log entry. Never mutated once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Position in the log, starting at 0
    pub sequence: u64,
    /// The entity the transition belongs to
    pub entity: EntityId,
    /// The transition itself
    pub transition: T,
    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
}

/// In-memory event log.
pub struct EventLog<T> {
    records: RwLock<Vec<Record<T>>>,
}

impl<T: Clone> EventLog<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn from_records(records: Vec<Record<T>>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of records across all entities.
    pub fn len(&self) -> usize {
        self.read(|records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record, in append order.
    pub fn records(&self) -> Vec<Record<T>> {
        self.read(|records| records.to_vec())
    }

    /// Entities with at least one record, in order of first append.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.read(|records| {
            let mut ids: Vec<EntityId> = Vec::new();
            for record in records {
                if !ids.contains(&record.entity) {
                    ids.push(record.entity);
                }
            }
            ids
        })
    }

    /// Group transitions per entity and project each group with `f`.
    ///
    /// Entities come out in order of first append, each with its
    /// transitions in append order.
    pub fn fold_all<V, F>(&self, mut f: F) -> Vec<(EntityId, V)>
    where
        F: FnMut(EntityId, Vec<T>) -> V,
    {
        let groups = self.read(|records| {
            let mut groups: Vec<(EntityId, Vec<T>)> = Vec::new();
            for record in records {
                match groups.iter_mut().find(|(id, _)| *id == record.entity) {
                    Some((_, transitions)) => transitions.push(record.transition.clone()),
                    None => groups.push((record.entity, vec![record.transition.clone()])),
                }
            }
            groups
        });

        groups
            .into_iter()
            .map(|(id, transitions)| (id, f(id, transitions)))
            .collect()
    }

    fn read<R>(&self, f: impl FnOnce(&Vec<Record<T>>) -> R) -> R {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        f(&records)
    }
}

impl<T: Clone> EventStore<T> for EventLog<T> {
    fn append(&self, entity: EntityId, transition: T) -> Result<(), LogError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let sequence = records.len() as u64;
        tracing::debug!(%entity, sequence, "appended transition");
        records.push(Record {
            sequence,
            entity,
            transition,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    fn fetch(&self, entity: EntityId) -> Result<Vec<T>, LogError> {
        Ok(self.read(|records| {
            records
                .iter()
                .filter(|record| record.entity == entity)
                .map(|record| record.transition.clone())
                .collect()
        }))
    }
}

impl<T: Clone> Default for EventLog<T> {
    fn default() -> Self {
        Self::new()
    }
}
