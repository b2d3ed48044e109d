//! Core traits for workflow states and transitions.
//!
//! States and transitions are closed sets of variants. Lookup never looks at
//! field values, only at the variant's *kind*: a fieldless companion enum that
//! acts as an explicit discriminant.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Discriminant of a state or transition variant.
///
/// Tags are the registry's lookup keys. They are generated by
/// [`state_enum!`](crate::state_enum) and [`transition_enum!`](crate::transition_enum).
pub trait Tag: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Variant name for display, logging and diagrams.
    fn name(&self) -> &'static str;
}

/// A value belonging to a closed set of variants.
///
/// # Required Traits
///
/// - `Clone`: applications keep copies of visited states
/// - `PartialEq`: replayed states are compared against live ones
/// - `Debug`: values end up in error messages
/// - `Serialize` + `Deserialize`: transitions are persisted in the event log
pub trait Variant:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// The fieldless discriminant enum for this set of variants.
    type Kind: Tag;

    /// Runtime discriminant of this value.
    fn kind(&self) -> Self::Kind;

    /// Name of this value's variant.
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Trait for workflow states.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{State, Variant};
/// use switchyard::state_enum;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Pending;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Done { pub result: u32 }
///
/// state_enum! {
///     pub enum JobState: JobStateKind {
///         Pending(Pending),
///         Done(Done),
///     }
///     final: [Done]
/// }
///
/// let state: JobState = Done { result: 7 }.into();
/// assert_eq!(state.kind(), JobStateKind::Done);
/// assert_eq!(state.name(), "Done");
/// assert!(state.is_final());
/// ```
pub trait State: Variant {
    /// Check if this is a terminal state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Trait for workflow transitions (events or intents moving a state forward).
pub trait Transition: Variant {}

/// A payload type that is exactly one variant of the enum `E`.
///
/// This is what lets registrations and side-effecting applications name a
/// variant by type, the way `PendingTask` names `ScheduledTaskState::PendingTask`.
pub trait VariantOf<E: Variant>: Into<E> {
    /// Kind of the variant wrapping this payload.
    const KIND: E::Kind;

    /// Borrow the payload if `value` is this variant.
    fn project(value: &E) -> Option<&Self>;
}
