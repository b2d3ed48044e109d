//! Saving and restoring an event log.
//!
//! A snapshot holds every record of the log. Transition functions live in
//! the registry and are never serialized, so restoring a log and folding it
//! through the same registry rebuilds every entity's state.

use super::{EventLog, LogError, Record, SnapshotFormat};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of an [`EventLog`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogSnapshot<T> {
    /// Snapshot format version
    pub version: u32,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Every record, in append order
    pub records: Vec<Record<T>>,
}

impl<T: Serialize + DeserializeOwned> LogSnapshot<T> {
    pub fn to_json(&self) -> Result<String, LogError> {
        serde_json::to_string_pretty(self).map_err(|e| LogError::Encode {
            format: SnapshotFormat::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, LogError> {
        serde_json::from_str(json).map_err(|e| LogError::Decode {
            format: SnapshotFormat::Json,
            reason: e.to_string(),
        })
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LogError> {
        bincode::serialize(self).map_err(|e| LogError::Encode {
            format: SnapshotFormat::Binary,
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LogError> {
        bincode::deserialize(bytes).map_err(|e| LogError::Decode {
            format: SnapshotFormat::Binary,
            reason: e.to_string(),
        })
    }
}

impl<T: Clone> EventLog<T> {
    /// Copy the whole log into a snapshot.
    pub fn snapshot(&self) -> LogSnapshot<T> {
        LogSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            records: self.records(),
        }
    }

    /// Rebuild a log from a snapshot.
    ///
    /// Rejects snapshots from other format versions and snapshots whose
    /// sequence numbers are not `0, 1, 2, ...`.
    pub fn restore(snapshot: LogSnapshot<T>) -> Result<Self, LogError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LogError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        if let Some((position, record)) = snapshot
            .records
            .iter()
            .enumerate()
            .find(|(position, record)| record.sequence != *position as u64)
        {
            return Err(LogError::SequenceGap {
                position,
                sequence: record.sequence,
            });
        }

        tracing::debug!(records = snapshot.records.len(), "restored event log");
        Ok(Self::from_records(snapshot.records))
    }
}
