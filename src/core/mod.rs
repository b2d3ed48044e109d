//! Core workflow types.
//!
//! This module contains the vocabulary every other module is written in:
//! - State and transition variants via the `State` and `Transition` traits
//! - Explicit discriminants (`Tag`) used as registry keys
//! - Entity identifiers for event-sourced workflows
//!
//! Nothing here has side effects.

mod id;
mod state;

pub use id::{EntityId, Identified};
pub use state::{State, Tag, Transition, Variant, VariantOf};
