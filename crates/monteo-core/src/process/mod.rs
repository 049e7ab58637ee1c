//! The compiled-in process definition.
//!
//! A fixed, totally ordered graph of stages a job passes through. Any change
//! to this structure is a deployment-time configuration change, not a
//! runtime operation; admins edit checklist labels and roles, never the
//! graph itself.

mod definition;

pub use definition::ProcessDefinition;

use serde::Serialize;

use monteo_types::job::Job;
use monteo_types::process::{Actor, StageId};

/// Computed state of one checkpoint for a job.
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointState {
    pub key: &'static str,
    pub label: &'static str,
    /// Met when a completed checklist item is linked to this checkpoint.
    pub met: bool,
}

/// Computed per-stage progress for a job.
#[derive(Debug, Clone, Serialize)]
pub struct StageProgress {
    pub stage: StageId,
    pub label: &'static str,
    pub actor: Actor,
    pub checkpoints: Vec<CheckpointState>,
    /// All checklist items of the stage exist and are completed.
    pub gate_ready: bool,
}

/// Derive per-stage checkpoint and gate state for a job.
pub fn stage_progress(process: &ProcessDefinition, job: &Job) -> Vec<StageProgress> {
    process
        .stages()
        .iter()
        .map(|stage| {
            let checkpoints = stage
                .checkpoints
                .iter()
                .map(|cp| CheckpointState {
                    key: cp.key,
                    label: cp.label,
                    met: job
                        .items_for_stage(stage.id)
                        .any(|i| i.completed && i.checkpoint.as_deref() == Some(cp.key)),
                })
                .collect();
            StageProgress {
                stage: stage.id,
                label: stage.label,
                actor: stage.actor,
                checkpoints,
                gate_ready: job.stage_all_done(stage.id),
            }
        })
        .collect()
}
