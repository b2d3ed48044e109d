//! Switchyard: event-sourced workflows built from pure transition tables
//!
//! A workflow is a closed set of state variants and a closed set of
//! transition variants. A [`Registry`] maps each legal
//! `(state kind, transition kind)` pair to a pure function producing the
//! next state. Everything with side effects lives at the edges:
//! command handlers run effects, and decorators persist, trace or observe
//! the resulting [`Application`].
//!
//! # Core Concepts
//!
//! - **Variants**: states and transitions declared with [`state_enum!`] and
//!   [`transition_enum!`], each with an explicit kind
//! - **Registry**: immutable table of transition functions, validated at build time
//! - **Application**: result of applying transitions, with its history
//! - **Event log**: append-only record of applied transitions, replayed by projections
//!
//! # Example
//!
//! ```rust
//! use switchyard::core::{EntityId, Identified};
//! use switchyard::{state_enum, transition_enum, ApplyExt, Registry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Requested { pub id: EntityId }
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Approved { pub id: EntityId }
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Shipped { pub id: EntityId }
//!
//! state_enum! {
//!     pub enum Order: OrderKind {
//!         Requested(Requested),
//!         Approved(Approved),
//!         Shipped(Shipped),
//!     }
//!     entity_id: id
//!     final: [Shipped]
//! }
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Approve;
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! pub struct Ship;
//!
//! transition_enum! {
//!     pub enum OrderEvent: OrderEventKind {
//!         Approve(Approve),
//!         Ship(Ship),
//!     }
//! }
//!
//! let registry = Registry::<Order, OrderEvent>::builder()
//!     .on(|s: &Requested, _: &Approve| Approved { id: s.id })
//!     .on(|s: &Approved, _: &Ship| Shipped { id: s.id })
//!     .build()
//!     .unwrap();
//!
//! let id = EntityId::new();
//! let application = registry
//!     .apply_transition(Requested { id }.into(), Approve.into())
//!     .then(Ship.into())
//!     .unwrap();
//!
//! assert_eq!(application.state(), &Order::from(Shipped { id }));
//! assert_eq!(application.state().entity_id(), id);
//! ```

pub mod application;
pub mod clock;
pub mod command;
pub mod core;
pub mod diagram;
pub mod log;
pub mod registry;
pub mod workflows;

// Re-export commonly used types
pub use application::{
    Application, ApplyExt, ChainableApplication, FinalApplication, TransitionError,
};
pub use command::{Command, CommandHandler};
pub use crate::core::{EntityId, Identified, State, Tag, Transition, Variant, VariantOf};
pub use log::{EventLog, EventStore, Projection};
pub use registry::{Registry, RegistryBuilder};
