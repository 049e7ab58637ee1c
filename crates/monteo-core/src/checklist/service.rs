//! Template service: list/upsert the admin-editable template set and
//! instantiate checklists for jobs.
//!
//! Template changes apply only to future instantiations; existing jobs keep
//! the items they were created with.

use std::collections::HashSet;

use monteo_types::checklist::{ChecklistItem, ChecklistItemTemplate};
use monteo_types::error::EngineError;
use monteo_types::job::Job;
use monteo_types::process::{Actor, RuleId, StageId};

use crate::process::ProcessDefinition;
use crate::repository::template::TemplateRepository;

/// Service over the checklist template set.
pub struct TemplateService<T: TemplateRepository> {
    repo: T,
}

impl<T: TemplateRepository> TemplateService<T> {
    pub fn new(repo: T) -> Self {
        Self { repo }
    }

    /// List all templates ordered by (stage, position).
    pub async fn list_templates(&self) -> Result<Vec<ChecklistItemTemplate>, EngineError> {
        let mut templates = self.repo.list().await?;
        sort_templates(&mut templates);
        Ok(templates)
    }

    /// Replace the whole template set.
    ///
    /// Admin only (`Forbidden` otherwise). Fails with a validation error on
    /// empty labels, and when the replacement would delete a `locked`
    /// template -- rejected, not silently ignored. The stored set is
    /// untouched on any failure.
    pub async fn upsert_templates(
        &self,
        role: Actor,
        mut templates: Vec<ChecklistItemTemplate>,
    ) -> Result<Vec<ChecklistItemTemplate>, EngineError> {
        if role != Actor::Office {
            return Err(EngineError::Forbidden(
                "only office staff may edit checklist templates".to_string(),
            ));
        }

        for template in &templates {
            if template.label.trim().is_empty() {
                return Err(EngineError::Validation(
                    "template labels must not be empty".to_string(),
                ));
            }
        }

        let current = self.repo.list().await?;
        let new_ids: HashSet<_> = templates.iter().map(|t| t.id).collect();
        for locked in current.iter().filter(|t| t.locked) {
            if !new_ids.contains(&locked.id) {
                return Err(EngineError::Validation(format!(
                    "template '{}' is locked and cannot be deleted",
                    locked.label
                )));
            }
        }

        sort_templates(&mut templates);
        self.repo.replace_all(&templates).await?;
        Ok(templates)
    }

    /// Instantiate the current template set for a job.
    ///
    /// Copies templates for every stage into fresh checklist items in
    /// (stage, position) order. Idempotent: a job that already has items is
    /// left untouched -- the UI may invoke this more than once. Returns
    /// whether items were created.
    pub async fn instantiate_for_job(&self, job: &mut Job) -> Result<bool, EngineError> {
        if !job.checklist_items.is_empty() {
            return Ok(false);
        }

        let templates = self.list_templates().await?;
        job.checklist_items = templates
            .iter()
            .enumerate()
            .map(|(index, template)| ChecklistItem::from_template(template, index as i64))
            .collect();
        Ok(!job.checklist_items.is_empty())
    }

    /// Synthesized auto-advance rules: one per stage that has at least one
    /// template and a configured next stage.
    pub async fn auto_advance_rules(
        &self,
        process: &ProcessDefinition,
    ) -> Result<Vec<RuleId>, EngineError> {
        let templates = self.repo.list().await?;
        let stages_with_templates: HashSet<StageId> =
            templates.iter().map(|t| t.stage).collect();

        Ok(StageId::ALL
            .into_iter()
            .filter(|stage| {
                stages_with_templates.contains(stage) && process.next_stage(*stage).is_some()
            })
            .map(RuleId::AutoAdvance)
            .collect())
    }
}

fn sort_templates(templates: &mut [ChecklistItemTemplate]) {
    templates.sort_by_key(|t| (t.stage.position(), t.position));
}
