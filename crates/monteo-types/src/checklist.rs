//! Checklist templates (admin-defined blueprints) and job-scoped items.
//!
//! Templates are mutable by an administrator; edits apply only to *future*
//! job instantiations. Each job-scoped item captures its stage and label at
//! creation time, so existing jobs are never retouched by template changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::process::{Actor, StageId};

/// Admin-editable blueprint for one checklist item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemTemplate {
    pub id: Uuid,
    pub label: String,
    /// Whether instantiated items accept a file attachment.
    #[serde(default)]
    pub allow_attachment: bool,
    /// Stage whose gate this item counts toward.
    pub stage: StageId,
    /// Role the item is assigned to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role: Option<Actor>,
    /// Checkpoint key this template satisfies, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    /// Locked templates are referenced by hard-coded automations and cannot
    /// be deleted (deletion is rejected, not silently ignored).
    #[serde(default)]
    pub locked: bool,
    /// Display order within the stage.
    #[serde(default)]
    pub position: i64,
}

/// Job-scoped checklist item, created from a template or ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    /// Source template, `None` for custom operator-created items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    pub label: String,
    #[serde(default)]
    pub allow_attachment: bool,
    #[serde(default)]
    pub completed: bool,
    /// Stable display and gate-evaluation order; unique per job.
    pub order_index: i64,
    /// Stage captured at creation time.
    pub stage: StageId,
    /// Checkpoint key carried over from the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    /// URL of the uploaded attachment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl ChecklistItem {
    /// Instantiate a fresh item from a template.
    pub fn from_template(template: &ChecklistItemTemplate, order_index: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            template_id: Some(template.id),
            label: template.label.clone(),
            allow_attachment: template.allow_attachment,
            completed: false,
            order_index,
            stage: template.stage,
            checkpoint: template.checkpoint.clone(),
            attachment_url: None,
        }
    }

    /// Create an ad-hoc operator item for the given stage.
    pub fn custom(label: String, stage: StageId, allow_attachment: bool, order_index: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            template_id: None,
            label,
            allow_attachment,
            completed: false,
            order_index,
            stage,
            checkpoint: None,
            attachment_url: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.template_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_template() -> ChecklistItemTemplate {
        ChecklistItemTemplate {
            id: Uuid::now_v7(),
            label: "Site measured".to_string(),
            allow_attachment: true,
            stage: StageId::BeforeMeasurement,
            assigned_role: Some(Actor::Installer),
            checkpoint: Some("site_measured".to_string()),
            locked: false,
            position: 0,
        }
    }

    #[test]
    fn from_template_copies_stage_and_checkpoint() {
        let template = sample_template();
        let item = ChecklistItem::from_template(&template, 3);
        assert_eq!(item.template_id, Some(template.id));
        assert_eq!(item.stage, StageId::BeforeMeasurement);
        assert_eq!(item.checkpoint.as_deref(), Some("site_measured"));
        assert_eq!(item.order_index, 3);
        assert!(!item.completed);
        assert!(!item.is_custom());
    }

    #[test]
    fn custom_item_has_no_template() {
        let item = ChecklistItem::custom("Call neighbour".to_string(), StageId::Lead, false, 7);
        assert!(item.is_custom());
        assert!(item.checkpoint.is_none());
        assert_eq!(item.order_index, 7);
    }

    #[test]
    fn template_json_roundtrip() {
        let template = sample_template();
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains("\"before_measurement\""));
        let parsed: ChecklistItemTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.label, template.label);
        assert_eq!(parsed.stage, template.stage);
    }

    #[test]
    fn item_json_roundtrip_with_attachment() {
        let mut item = ChecklistItem::custom("Photo".to_string(), StageId::BeforeInstallation, true, 0);
        item.attachment_url = Some("attachments/abc/photo.jpg".to_string());
        let json = serde_json::to_string(&item).unwrap();
        let parsed: ChecklistItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.attachment_url.as_deref(), Some("attachments/abc/photo.jpg"));
    }
}
