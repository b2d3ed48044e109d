//! Example workflows built on the engine.
//!
//! Each module defines its states, transitions and registry. The larger ones
//! also ship a command handler wired for the persistence and trace
//! decorators.

pub mod account;
pub mod bargain;
pub mod eligibility;
pub mod scheduled_task;
