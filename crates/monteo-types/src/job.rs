//! Job (montage) types: id, status, record, request DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::checklist::ChecklistItem;
use crate::process::StageId;

/// Unique identifier for a job, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Current lifecycle position of a job: one stage, or a terminal state.
///
/// Serializes to the stage's snake_case id or `completed`/`cancelled`.
/// Parsing rejects unknown strings -- the state machine surfaces that as
/// `UnknownStatus` and never coerces. Unknown status strings coming from
/// elsewhere are tolerated for *display* only, via [`display_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Stage(StageId),
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Stage(stage) => stage.as_str(),
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// The stage, when the status is not terminal.
    pub const fn stage(&self) -> Option<StageId> {
        match self {
            JobStatus::Stage(stage) => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => other.parse::<StageId>().map(JobStatus::Stage),
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Human-readable label for a status string, with a fallback for unknown
/// values so stale records still render.
pub fn display_label(status: &str) -> String {
    match status.parse::<JobStatus>() {
        Ok(JobStatus::Stage(StageId::Lead)) => "Lead".to_string(),
        Ok(JobStatus::Stage(StageId::BeforeMeasurement)) => "Measurement".to_string(),
        Ok(JobStatus::Stage(StageId::BeforeFirstPayment)) => "First payment".to_string(),
        Ok(JobStatus::Stage(StageId::BeforeInstallation)) => "Installation".to_string(),
        Ok(JobStatus::Stage(StageId::BeforeInvoicing)) => "Invoicing".to_string(),
        Ok(JobStatus::Completed) => "Completed".to_string(),
        Ok(JobStatus::Cancelled) => "Cancelled".to_string(),
        Err(_) => format!("Unknown ({status})"),
    }
}

/// An installation job tracked through the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub address: String,
    /// Assigned installer; required to leave `lead` under the
    /// require-installer policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    /// Agreed measurement/installation date, when scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a fresh job in the first stage with an empty checklist.
    pub fn new(client_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Stage(StageId::Lead),
            client_name,
            client_phone: String::new(),
            address: String::new(),
            installer: None,
            scheduled_on: None,
            note: String::new(),
            checklist_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Items counting toward the given stage's gate, in order.
    pub fn items_for_stage(&self, stage: StageId) -> impl Iterator<Item = &ChecklistItem> {
        self.checklist_items.iter().filter(move |i| i.stage == stage)
    }

    /// Whether the given stage has at least one item and all are completed.
    pub fn stage_all_done(&self, stage: StageId) -> bool {
        let mut any = false;
        for item in self.items_for_stage(stage) {
            if !item.completed {
                return false;
            }
            any = true;
        }
        any
    }

    /// The next free `order_index` for appending an item.
    pub fn next_order_index(&self) -> i64 {
        self.checklist_items
            .iter()
            .map(|i| i.order_index)
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// Request to create a new job. Only `client_name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobRequest {
    pub client_name: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub installer: Option<String>,
    #[serde(default)]
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
    /// Instantiate the checklist from templates at creation time.
    #[serde(default)]
    pub init_checklist: bool,
}

/// Request to update a job's business attributes. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub installer: Option<Option<String>>,
    #[serde(default)]
    pub scheduled_on: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub note: Option<String>,
    /// When set, the update fails with a conflict unless the stored
    /// `updated_at` still matches.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_roundtrips_through_str() {
        for raw in [
            "lead",
            "before_measurement",
            "before_first_payment",
            "before_installation",
            "before_invoicing",
            "completed",
            "cancelled",
        ] {
            let status: JobStatus = raw.parse().unwrap();
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn job_status_rejects_unknown() {
        assert!("on_hold".parse::<JobStatus>().is_err());
    }

    #[test]
    fn job_status_terminal_flags() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Stage(StageId::Lead).is_terminal());
        assert_eq!(JobStatus::Stage(StageId::Lead).stage(), Some(StageId::Lead));
        assert_eq!(JobStatus::Completed.stage(), None);
    }

    #[test]
    fn job_status_serde_is_a_plain_string() {
        let json = serde_json::to_string(&JobStatus::Stage(StageId::BeforeInvoicing)).unwrap();
        assert_eq!(json, "\"before_invoicing\"");
        let parsed: JobStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, JobStatus::Cancelled);
        assert!(serde_json::from_str::<JobStatus>("\"garbage\"").is_err());
    }

    #[test]
    fn display_label_falls_back_for_unknown() {
        assert_eq!(display_label("before_measurement"), "Measurement");
        assert_eq!(display_label("weird_status"), "Unknown (weird_status)");
    }

    #[test]
    fn new_job_starts_in_lead_with_empty_checklist() {
        let job = Job::new("Novak".to_string());
        assert_eq!(job.status, JobStatus::Stage(StageId::Lead));
        assert!(job.checklist_items.is_empty());
        assert_eq!(job.next_order_index(), 0);
    }

    #[test]
    fn stage_all_done_requires_at_least_one_item() {
        let job = Job::new("Novak".to_string());
        assert!(!job.stage_all_done(StageId::Lead));
    }

    #[test]
    fn job_json_roundtrip() {
        let job = Job::new("Svoboda".to_string());
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"lead\""));
        let parsed: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, job.id);
        assert_eq!(parsed.status, job.status);
    }
}
