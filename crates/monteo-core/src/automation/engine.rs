//! Decides whether a checklist mutation fires an auto-advance or
//! auto-revert transition.
//!
//! The engine is a pure decision function: it returns the target stage and
//! the caller routes it through the state machine. Side effects
//! (notifications) hang off the resulting status change, never off this
//! evaluation.

use monteo_types::checklist::ChecklistItem;
use monteo_types::job::Job;
use monteo_types::process::{RuleId, StageId};
use monteo_types::settings::EngineSettings;

use crate::process::ProcessDefinition;

pub struct AutomationEngine;

impl AutomationEngine {
    /// Evaluate a checklist toggle against the job's *post-toggle* state.
    ///
    /// - Advance: the toggled item belongs to the job's current stage, the
    ///   toggle made that stage all-done, the stage's auto-advance rule is
    ///   enabled and a next stage exists.
    /// - Revert: an item of an earlier, previously all-done stage was
    ///   unchecked while the job's status is already past it, and the same
    ///   rule is enabled. The target is one stage back from the *current*
    ///   status, regardless of how far the job advanced since the item was
    ///   completed -- which can leave checklist state and displayed status
    ///   inconsistent for jobs several stages ahead. Deliberately kept
    ///   as-is; see DESIGN.md.
    /// - Never fires for terminal statuses.
    pub fn evaluate(
        process: &ProcessDefinition,
        settings: &EngineSettings,
        job: &Job,
        item: &ChecklistItem,
        completed: bool,
    ) -> Option<StageId> {
        let current = job.status.stage()?;

        if completed {
            Self::evaluate_advance(process, settings, job, item, current)
        } else {
            Self::evaluate_revert(process, settings, job, item, current)
        }
    }

    fn evaluate_advance(
        process: &ProcessDefinition,
        settings: &EngineSettings,
        job: &Job,
        item: &ChecklistItem,
        current: StageId,
    ) -> Option<StageId> {
        if item.stage != current {
            return None;
        }
        if !job.stage_all_done(current) {
            return None;
        }
        if !settings.rule_enabled(&RuleId::AutoAdvance(current)) {
            return None;
        }
        process.next_stage(current)
    }

    fn evaluate_revert(
        process: &ProcessDefinition,
        settings: &EngineSettings,
        job: &Job,
        item: &ChecklistItem,
        current: StageId,
    ) -> Option<StageId> {
        if !process.is_ahead(current, item.stage) {
            return None;
        }
        // The stage was all-done before this item was unchecked.
        let was_all_done = job
            .items_for_stage(item.stage)
            .filter(|i| i.id != item.id)
            .all(|i| i.completed);
        if !was_all_done {
            return None;
        }
        if !settings.rule_enabled(&RuleId::AutoAdvance(item.stage)) {
            return None;
        }
        process.previous_stage(current)
    }
}
