//! Event log error types.

use crate::core::EntityId;
use std::fmt;
use thiserror::Error;

/// Encoding used by a [`LogSnapshot`](super::LogSnapshot).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Binary,
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

/// Failures of an event store, a projection or a log snapshot.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LogError {
    /// The backing store could not be read or written
    #[error("Event store unavailable: {0}")]
    Unavailable(String),

    /// An entity's records no longer replay through the registry
    #[error("History of entity {entity} cannot be replayed: {reason}")]
    CorruptHistory { entity: EntityId, reason: String },

    #[error("Cannot encode snapshot as {format}: {reason}")]
    Encode {
        format: SnapshotFormat,
        reason: String,
    },

    #[error("Cannot decode {format} snapshot: {reason}")]
    Decode {
        format: SnapshotFormat,
        reason: String,
    },

    #[error("Snapshot version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Restored records must be numbered `0, 1, 2, ...` with no gaps
    #[error("Snapshot record at position {position} carries sequence {sequence}")]
    SequenceGap { position: usize, sequence: u64 },
}
