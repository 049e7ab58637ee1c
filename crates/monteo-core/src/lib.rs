//! Workflow engine and repository trait definitions for Monteo.
//!
//! This crate defines the "ports" (repository and collaborator traits) that
//! the infrastructure layer implements, plus the engine itself: the
//! compiled-in process definition, the checklist template service, the
//! automation rule engine, the status transition state machine, the
//! optimistic board reconciliation layer, and the job service tying them
//! together. It depends only on `monteo-types` -- never on `monteo-infra`
//! or any database/IO crate.

pub mod automation;
pub mod board;
pub mod checklist;
pub mod process;
pub mod repository;
pub mod service;
pub mod transition;
