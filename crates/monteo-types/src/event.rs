//! Events emitted after successful status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{JobId, JobStatus};
use crate::process::Actor;

/// Emitted after a successful status transition; consumed by the
/// notification dispatcher. Fire-and-forget: delivery failures are logged
/// and never reverse the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
    /// Who requested the transition (`system` for automation-triggered).
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::StageId;

    #[test]
    fn event_json_roundtrip() {
        let event = StatusChangeEvent {
            job_id: JobId::new(),
            from: JobStatus::Stage(StageId::Lead),
            to: JobStatus::Stage(StageId::BeforeMeasurement),
            actor: Actor::System,
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"before_measurement\""));
        let parsed: StatusChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.from, JobStatus::Stage(StageId::Lead));
        assert_eq!(parsed.actor, Actor::System);
    }
}
