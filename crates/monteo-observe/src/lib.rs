//! Observability setup for Monteo.

pub mod tracing_setup;
