//! Checklist template store: admin edits and per-job instantiation.

mod service;

pub use service::TemplateService;
