//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and engine rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod blob;
pub mod job;
pub mod notify;
