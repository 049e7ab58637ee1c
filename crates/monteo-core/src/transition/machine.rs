//! The single authority over a job's `status`.
//!
//! Both manual UI changes and automation-triggered changes route through
//! [`StateMachine::transition`], so validation happens in exactly one
//! place. The machine is a linear chain of ordered stages plus two
//! absorbing terminal states (`completed`, `cancelled`) reachable from any
//! non-terminal stage by manual action only.

use chrono::Utc;

use monteo_types::error::EngineError;
use monteo_types::event::StatusChangeEvent;
use monteo_types::job::{Job, JobStatus};
use monteo_types::process::{Actor, StageId};
use monteo_types::settings::EngineSettings;

use crate::process::ProcessDefinition;

pub struct StateMachine;

impl StateMachine {
    /// Validate and apply a status change.
    ///
    /// - `UnknownStatus` when `requested` is not a stage or terminal id;
    ///   the job is never mutated in that case.
    /// - `PolicyViolation` when leaving `lead` toward a later stage without
    ///   an assigned installer while the require-installer policy is set.
    /// - Terminal states are absorbing, and only a non-system actor may
    ///   enter them.
    /// - Requesting the current status is a no-op success.
    ///
    /// On success sets `status`, stamps `updated_at`, and returns the event
    /// to hand to the notification dispatcher. Moving a job backward does
    /// not un-complete checklist items; automation-triggered reverts also
    /// touch only status.
    pub fn transition(
        process: &ProcessDefinition,
        settings: &EngineSettings,
        job: &mut Job,
        requested: &str,
        actor: Actor,
    ) -> Result<Option<StatusChangeEvent>, EngineError> {
        let target: JobStatus = requested
            .parse()
            .map_err(|_| EngineError::UnknownStatus(requested.to_string()))?;

        if target == job.status {
            return Ok(None);
        }

        if job.status.is_terminal() {
            return Err(EngineError::Validation(format!(
                "job is {} and can no longer change status",
                job.status
            )));
        }

        if target.is_terminal() && actor == Actor::System {
            return Err(EngineError::Validation(
                "terminal states are reached by manual action only".to_string(),
            ));
        }

        if let JobStatus::Stage(to) = target {
            Self::check_installer_policy(process, settings, job, to)?;
        }

        let from = job.status;
        job.status = target;
        job.updated_at = Utc::now();

        Ok(Some(StatusChangeEvent {
            job_id: job.id,
            from,
            to: target,
            actor,
            occurred_at: job.updated_at,
        }))
    }

    /// Leaving `lead` toward any later stage requires an assigned installer
    /// when the policy flag is set. Cancelling a lead is always allowed.
    fn check_installer_policy(
        process: &ProcessDefinition,
        settings: &EngineSettings,
        job: &Job,
        to: StageId,
    ) -> Result<(), EngineError> {
        if !settings.require_installer_for_measurement {
            return Ok(());
        }
        if job.status.stage() != Some(StageId::Lead) {
            return Ok(());
        }
        if process.is_ahead(to, StageId::Lead) && job.installer.is_none() {
            return Err(EngineError::PolicyViolation(
                "an installer must be assigned before converting a lead".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process() -> &'static ProcessDefinition {
        ProcessDefinition::get()
    }

    #[test]
    fn unknown_status_fails_and_never_mutates() {
        let mut job = Job::new("Novak".to_string());
        let before = job.clone();

        let err = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "on_hold",
            Actor::Office,
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::UnknownStatus(s) if s == "on_hold"));
        assert_eq!(job.status, before.status);
        assert_eq!(job.updated_at, before.updated_at);
    }

    #[test]
    fn forward_move_applies_and_returns_event() {
        let mut job = Job::new("Novak".to_string());

        let event = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "before_measurement",
            Actor::Office,
        )
        .unwrap()
        .unwrap();

        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeMeasurement));
        assert_eq!(event.from, JobStatus::Stage(StageId::Lead));
        assert_eq!(event.to, JobStatus::Stage(StageId::BeforeMeasurement));
    }

    #[test]
    fn same_status_is_a_noop() {
        let mut job = Job::new("Novak".to_string());
        let stamp = job.updated_at;

        let event = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "lead",
            Actor::Office,
        )
        .unwrap();

        assert!(event.is_none());
        assert_eq!(job.updated_at, stamp);
    }

    #[test]
    fn installer_policy_blocks_lead_conversion() {
        let settings = EngineSettings {
            require_installer_for_measurement: true,
            ..Default::default()
        };
        let mut job = Job::new("Novak".to_string());

        let err = StateMachine::transition(
            process(),
            &settings,
            &mut job,
            "before_measurement",
            Actor::Office,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation(_)));
        assert_eq!(job.status, JobStatus::Stage(StageId::Lead));

        job.installer = Some("Kovar".to_string());
        let event = StateMachine::transition(
            process(),
            &settings,
            &mut job,
            "before_measurement",
            Actor::Office,
        )
        .unwrap();
        assert!(event.is_some());
    }

    #[test]
    fn cancelling_a_lead_skips_the_installer_policy() {
        let settings = EngineSettings {
            require_installer_for_measurement: true,
            ..Default::default()
        };
        let mut job = Job::new("Novak".to_string());

        let event = StateMachine::transition(process(), &settings, &mut job, "cancelled", Actor::Office)
            .unwrap();
        assert!(event.is_some());
        assert_eq!(job.status, JobStatus::Cancelled);
    }

    #[test]
    fn terminal_states_are_absorbing() {
        let mut job = Job::new("Novak".to_string());
        job.status = JobStatus::Completed;

        let err = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "lead",
            Actor::Office,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn automation_cannot_enter_terminal_states() {
        let mut job = Job::new("Novak".to_string());

        let err = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "completed",
            Actor::System,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let event = StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "completed",
            Actor::Office,
        )
        .unwrap();
        assert!(event.is_some());
    }

    #[test]
    fn manual_backward_move_keeps_checklist_untouched() {
        use monteo_types::checklist::ChecklistItem;

        let mut job = Job::new("Novak".to_string());
        job.status = JobStatus::Stage(StageId::BeforeFirstPayment);
        let mut item = ChecklistItem::custom("Site measured".to_string(), StageId::BeforeMeasurement, false, 0);
        item.completed = true;
        job.checklist_items.push(item);

        StateMachine::transition(
            process(),
            &EngineSettings::default(),
            &mut job,
            "before_measurement",
            Actor::Office,
        )
        .unwrap();

        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeMeasurement));
        assert!(job.checklist_items[0].completed);
    }
}
