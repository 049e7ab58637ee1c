//! Shared domain types for Monteo.
//!
//! This crate contains the core domain types used across the Monteo platform:
//! the process graph (stages, checkpoints, automations), jobs and their
//! checklists, engine settings, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod checklist;
pub mod error;
pub mod event;
pub mod job;
pub mod process;
pub mod settings;
