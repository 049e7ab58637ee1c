//! Job service: the write path for everything job-related.
//!
//! Orchestrates the state machine, the automation engine, checklist
//! instantiation, persistence and notification dispatch. Within one job,
//! automation-triggered transitions happen *after* the checklist mutation
//! that caused them and *before* the mutation's result is returned, so a
//! caller observing "item toggled" already sees the post-automation status.

use chrono::Utc;
use uuid::Uuid;

use monteo_types::checklist::ChecklistItem;
use monteo_types::error::EngineError;
use monteo_types::job::{CreateJobRequest, Job, JobId, UpdateJobRequest};
use monteo_types::process::{Actor, StageId};

use crate::automation::AutomationEngine;
use crate::checklist::TemplateService;
use crate::process::ProcessDefinition;
use crate::repository::job::{JobFilter, JobRepository};
use crate::repository::settings::SettingsRepository;
use crate::repository::template::TemplateRepository;
use crate::service::blob::BlobStore;
use crate::service::notify::Notifier;
use crate::transition::StateMachine;

/// Service orchestrating the full job lifecycle.
///
/// Generic over repository and collaborator traits -- monteo-core never
/// depends on monteo-infra.
pub struct JobService<J, T, S, N, B>
where
    J: JobRepository,
    T: TemplateRepository,
    S: SettingsRepository,
    N: Notifier,
    B: BlobStore,
{
    job_repo: J,
    template_service: TemplateService<T>,
    settings_repo: S,
    notifier: N,
    blob_store: B,
    process: &'static ProcessDefinition,
}

impl<J, T, S, N, B> JobService<J, T, S, N, B>
where
    J: JobRepository,
    T: TemplateRepository,
    S: SettingsRepository,
    N: Notifier,
    B: BlobStore,
{
    pub fn new(
        job_repo: J,
        template_service: TemplateService<T>,
        settings_repo: S,
        notifier: N,
        blob_store: B,
    ) -> Self {
        Self {
            job_repo,
            template_service,
            settings_repo,
            notifier,
            blob_store,
            process: ProcessDefinition::get(),
        }
    }

    pub fn process(&self) -> &'static ProcessDefinition {
        self.process
    }

    /// Create a new job in `lead`, optionally instantiating the checklist
    /// from the current templates.
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<Job, EngineError> {
        let client_name = request.client_name.trim().to_string();
        if client_name.is_empty() {
            return Err(EngineError::Validation(
                "client name must not be empty".to_string(),
            ));
        }

        let mut job = Job::new(client_name);
        if let Some(phone) = request.client_phone {
            job.client_phone = phone;
        }
        if let Some(address) = request.address {
            job.address = address;
        }
        job.installer = request.installer;
        job.scheduled_on = request.scheduled_on;
        if let Some(note) = request.note {
            job.note = note;
        }

        if request.init_checklist {
            self.template_service.instantiate_for_job(&mut job).await?;
        }

        self.job_repo.create(&job).await?;
        Ok(job)
    }

    pub async fn get_job(&self, id: &JobId) -> Result<Job, EngineError> {
        self.job_repo
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("job {id}")))
    }

    pub async fn list_jobs(&self, filter: Option<JobFilter>) -> Result<Vec<Job>, EngineError> {
        Ok(self.job_repo.list(filter).await?)
    }

    /// Update business attributes. When the request carries
    /// `expected_updated_at`, the save is guarded and fails with a conflict
    /// on a stale stamp.
    pub async fn update_job(
        &self,
        id: &JobId,
        request: UpdateJobRequest,
    ) -> Result<Job, EngineError> {
        let mut job = self.get_job(id).await?;
        let expected = request.expected_updated_at;

        if let Some(name) = request.client_name {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(EngineError::Validation(
                    "client name must not be empty".to_string(),
                ));
            }
            job.client_name = trimmed;
        }
        if let Some(phone) = request.client_phone {
            job.client_phone = phone;
        }
        if let Some(address) = request.address {
            job.address = address;
        }
        if let Some(installer) = request.installer {
            job.installer = installer;
        }
        if let Some(scheduled_on) = request.scheduled_on {
            job.scheduled_on = scheduled_on;
        }
        if let Some(note) = request.note {
            job.note = note;
        }

        job.updated_at = Utc::now();

        match expected {
            Some(stamp) => self.job_repo.update_guarded(&job, stamp).await?,
            None => self.job_repo.update(&job).await?,
        }
        Ok(job)
    }

    /// Delete a job record entirely; admin only.
    pub async fn delete_job(&self, role: Actor, id: &JobId) -> Result<(), EngineError> {
        if role != Actor::Office {
            return Err(EngineError::Forbidden(
                "only office staff may delete jobs".to_string(),
            ));
        }
        if !self.job_repo.delete(id).await? {
            return Err(EngineError::NotFound(format!("job {id}")));
        }
        Ok(())
    }

    /// Manual status change from the board or a status picker.
    ///
    /// Routes through the state machine (the single validation point),
    /// saves, dispatches the notification, returns the canonical job.
    pub async fn request_status_change(
        &self,
        id: &JobId,
        to_status: &str,
        actor: Actor,
    ) -> Result<Job, EngineError> {
        let mut job = self.get_job(id).await?;
        let settings = self.settings_repo.load().await?;

        let event = StateMachine::transition(self.process, &settings, &mut job, to_status, actor)?;

        if let Some(event) = event {
            self.job_repo.update(&job).await?;
            tracing::info!(
                job_id = %job.id,
                from = %event.from,
                to = %event.to,
                actor = %event.actor,
                "status changed"
            );
            self.notifier.notify(event).await;
        }
        Ok(job)
    }

    /// Toggle a checklist item and re-evaluate automation.
    ///
    /// The toggle itself always succeeds for an existing item; a
    /// consequential auto-transition that fails (e.g. policy violation) is
    /// logged and swallowed so the caller still gets the toggled checklist.
    pub async fn toggle_checklist_item(
        &self,
        id: &JobId,
        item_id: &Uuid,
        completed: bool,
    ) -> Result<Job, EngineError> {
        let mut job = self.get_job(id).await?;

        let item = job
            .checklist_items
            .iter_mut()
            .find(|i| i.id == *item_id)
            .ok_or_else(|| EngineError::NotFound(format!("checklist item {item_id}")))?;
        item.completed = completed;
        let toggled = item.clone();
        job.updated_at = Utc::now();

        let mut event = None;
        if !job.status.is_terminal() {
            let settings = self.settings_repo.load().await?;
            if let Some(target) =
                AutomationEngine::evaluate(self.process, &settings, &job, &toggled, completed)
            {
                match StateMachine::transition(
                    self.process,
                    &settings,
                    &mut job,
                    target.as_str(),
                    Actor::System,
                ) {
                    Ok(fired) => event = fired,
                    Err(err) => {
                        tracing::warn!(
                            job_id = %job.id,
                            target = %target,
                            error = %err,
                            "auto-transition rejected; checklist toggle kept"
                        );
                    }
                }
            }
        }

        self.job_repo.update(&job).await?;
        if let Some(event) = event {
            tracing::info!(
                job_id = %job.id,
                from = %event.from,
                to = %event.to,
                "automation moved job"
            );
            self.notifier.notify(event).await;
        }
        Ok(job)
    }

    /// Instantiate the checklist from the current templates; idempotent.
    pub async fn init_checklist(&self, id: &JobId) -> Result<Job, EngineError> {
        let mut job = self.get_job(id).await?;
        if self.template_service.instantiate_for_job(&mut job).await? {
            job.updated_at = Utc::now();
            self.job_repo.update(&job).await?;
        }
        Ok(job)
    }

    /// Add an ad-hoc checklist item.
    ///
    /// `stage` defaults to the job's current stage; terminal jobs need an
    /// explicit stage since they have none.
    pub async fn add_custom_item(
        &self,
        id: &JobId,
        label: &str,
        stage: Option<StageId>,
        allow_attachment: bool,
    ) -> Result<Job, EngineError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EngineError::Validation(
                "item label must not be empty".to_string(),
            ));
        }

        let mut job = self.get_job(id).await?;
        let stage = match stage.or_else(|| job.status.stage()) {
            Some(stage) => stage,
            None => {
                return Err(EngineError::Validation(
                    "stage is required for completed or cancelled jobs".to_string(),
                ));
            }
        };

        let item = ChecklistItem::custom(
            label.to_string(),
            stage,
            allow_attachment,
            job.next_order_index(),
        );
        job.checklist_items.push(item);
        job.updated_at = Utc::now();
        self.job_repo.update(&job).await?;
        Ok(job)
    }

    /// Remove a checklist item; admin only -- items are otherwise
    /// append-only.
    pub async fn remove_item(
        &self,
        role: Actor,
        id: &JobId,
        item_id: &Uuid,
    ) -> Result<Job, EngineError> {
        if role != Actor::Office {
            return Err(EngineError::Forbidden(
                "only office staff may delete checklist items".to_string(),
            ));
        }

        let mut job = self.get_job(id).await?;
        let before = job.checklist_items.len();
        job.checklist_items.retain(|i| i.id != *item_id);
        if job.checklist_items.len() == before {
            return Err(EngineError::NotFound(format!("checklist item {item_id}")));
        }
        job.updated_at = Utc::now();
        self.job_repo.update(&job).await?;
        Ok(job)
    }

    /// Store a file against a checklist item that allows attachments.
    pub async fn attach_file(
        &self,
        id: &JobId,
        item_id: &Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Job, EngineError> {
        let mut job = self.get_job(id).await?;

        let item = job
            .checklist_items
            .iter_mut()
            .find(|i| i.id == *item_id)
            .ok_or_else(|| EngineError::NotFound(format!("checklist item {item_id}")))?;
        if !item.allow_attachment {
            return Err(EngineError::Validation(format!(
                "item '{}' does not accept attachments",
                item.label
            )));
        }

        let url = self.blob_store.store(id, item_id, filename, bytes).await?;
        item.attachment_url = Some(url);
        job.updated_at = Utc::now();
        self.job_repo.update(&job).await?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};
    use monteo_types::checklist::ChecklistItemTemplate;
    use monteo_types::error::RepositoryError;
    use monteo_types::event::StatusChangeEvent;
    use monteo_types::job::JobStatus;
    use monteo_types::settings::EngineSettings;

    // -----------------------------------------------------------------------
    // In-memory fakes
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct MemoryJobRepo {
        jobs: Mutex<HashMap<JobId, Job>>,
    }

    impl JobRepository for MemoryJobRepo {
        async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.contains_key(&job.id) {
                return Err(RepositoryError::Conflict("duplicate id".to_string()));
            }
            jobs.insert(job.id, job.clone());
            Ok(())
        }

        async fn get(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
            Ok(self.jobs.lock().unwrap().get(id).cloned())
        }

        async fn list(&self, filter: Option<JobFilter>) -> Result<Vec<Job>, RepositoryError> {
            let jobs = self.jobs.lock().unwrap();
            let filter = filter.unwrap_or_default();
            Ok(jobs
                .values()
                .filter(|j| filter.status.is_none_or(|s| j.status == s))
                .filter(|j| !filter.open_only || !j.status.is_terminal())
                .cloned()
                .collect())
        }

        async fn update(&self, job: &Job) -> Result<(), RepositoryError> {
            self.jobs.lock().unwrap().insert(job.id, job.clone());
            Ok(())
        }

        async fn update_guarded(
            &self,
            job: &Job,
            expected: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut jobs = self.jobs.lock().unwrap();
            let stored = jobs.get(&job.id).ok_or(RepositoryError::NotFound)?;
            if stored.updated_at != expected {
                return Err(RepositoryError::Conflict(
                    "record changed since read".to_string(),
                ));
            }
            jobs.insert(job.id, job.clone());
            Ok(())
        }

        async fn delete(&self, id: &JobId) -> Result<bool, RepositoryError> {
            Ok(self.jobs.lock().unwrap().remove(id).is_some())
        }
    }

    struct MemoryTemplateRepo {
        templates: Mutex<Vec<ChecklistItemTemplate>>,
    }

    impl TemplateRepository for MemoryTemplateRepo {
        async fn list(&self) -> Result<Vec<ChecklistItemTemplate>, RepositoryError> {
            Ok(self.templates.lock().unwrap().clone())
        }

        async fn replace_all(
            &self,
            templates: &[ChecklistItemTemplate],
        ) -> Result<(), RepositoryError> {
            *self.templates.lock().unwrap() = templates.to_vec();
            Ok(())
        }
    }

    struct StaticSettings(EngineSettings);

    impl SettingsRepository for StaticSettings {
        async fn load(&self) -> Result<EngineSettings, RepositoryError> {
            Ok(self.0.clone())
        }

        async fn set_flag(&self, _key: &str, _value: bool) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn set_rule_enabled(
            &self,
            _rule_key: &str,
            _enabled: bool,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<StatusChangeEvent>>,
    }

    impl Notifier for &RecordingNotifier {
        async fn notify(&self, event: StatusChangeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct MemoryBlobStore;

    impl BlobStore for MemoryBlobStore {
        async fn store(
            &self,
            job_id: &JobId,
            item_id: &Uuid,
            filename: &str,
            _bytes: &[u8],
        ) -> Result<String, EngineError> {
            Ok(format!("attachments/{job_id}/{item_id}/{filename}"))
        }
    }

    fn template(label: &str, stage: StageId, position: i64) -> ChecklistItemTemplate {
        ChecklistItemTemplate {
            id: Uuid::now_v7(),
            label: label.to_string(),
            allow_attachment: label.contains("photo"),
            stage,
            assigned_role: None,
            checkpoint: None,
            locked: false,
            position,
        }
    }

    /// Two templates per interior stage so gates need both toggles.
    fn default_templates() -> Vec<ChecklistItemTemplate> {
        vec![
            template("Contact established", StageId::Lead, 0),
            template("Measurement date agreed", StageId::Lead, 1),
            template("Site measured", StageId::BeforeMeasurement, 0),
            template("Materials specified", StageId::BeforeMeasurement, 1),
            template("Offer sent", StageId::BeforeFirstPayment, 0),
        ]
    }

    fn service_with<'a>(
        settings: EngineSettings,
        notifier: &'a RecordingNotifier,
    ) -> JobService<MemoryJobRepo, MemoryTemplateRepo, StaticSettings, &'a RecordingNotifier, MemoryBlobStore>
    {
        JobService::new(
            MemoryJobRepo::default(),
            TemplateService::new(MemoryTemplateRepo {
                templates: Mutex::new(default_templates()),
            }),
            StaticSettings(settings),
            notifier,
            MemoryBlobStore,
        )
    }

    async fn seeded_job<'a>(
        service: &JobService<
            MemoryJobRepo,
            MemoryTemplateRepo,
            StaticSettings,
            &'a RecordingNotifier,
            MemoryBlobStore,
        >,
    ) -> Job {
        service
            .create_job(CreateJobRequest {
                client_name: "Novak".to_string(),
                init_checklist: true,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    fn items_of(job: &Job, stage: StageId) -> Vec<Uuid> {
        job.items_for_stage(stage).map(|i| i.id).collect()
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_job_starts_in_lead() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        assert_eq!(job.status, JobStatus::Stage(StageId::Lead));
        assert_eq!(job.checklist_items.len(), default_templates().len());
    }

    #[tokio::test]
    async fn toggling_both_measurement_items_advances_to_first_payment() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let mut job = seeded_job(&service).await;

        // Move to measurement manually first.
        job = service
            .request_status_change(&job.id, "before_measurement", Actor::Office)
            .await
            .unwrap();

        let items = items_of(&job, StageId::BeforeMeasurement);
        let job = service
            .toggle_checklist_item(&job.id, &items[0], true)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeMeasurement));

        let job = service
            .toggle_checklist_item(&job.id, &items[1], true)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeFirstPayment));

        // One manual move + one automation advance were dispatched.
        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].actor, Actor::System);
        assert_eq!(events[1].to, JobStatus::Stage(StageId::BeforeFirstPayment));
    }

    #[tokio::test]
    async fn disabled_auto_advance_leaves_status_unchanged() {
        let notifier = RecordingNotifier::default();
        let settings = EngineSettings::default().with_rule(
            &monteo_types::process::RuleId::AutoAdvance(StageId::BeforeMeasurement),
            false,
        );
        let service = service_with(settings, &notifier);
        let mut job = seeded_job(&service).await;

        job = service
            .request_status_change(&job.id, "before_measurement", Actor::Office)
            .await
            .unwrap();
        for item_id in items_of(&job, StageId::BeforeMeasurement) {
            job = service
                .toggle_checklist_item(&job.id, &item_id, true)
                .await
                .unwrap();
        }
        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeMeasurement));
    }

    #[tokio::test]
    async fn unchecking_earlier_stage_pulls_job_one_stage_back() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let mut job = seeded_job(&service).await;

        // Complete measurement items, then jump two stages ahead manually.
        let measurement_items = items_of(&job, StageId::BeforeMeasurement);
        for item_id in &measurement_items {
            job = service
                .toggle_checklist_item(&job.id, item_id, true)
                .await
                .unwrap();
        }
        job = service
            .request_status_change(&job.id, "before_installation", Actor::Office)
            .await
            .unwrap();

        // Unchecking a measurement item steps one stage back only.
        let job = service
            .toggle_checklist_item(&job.id, &measurement_items[0], false)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Stage(StageId::BeforeFirstPayment));
    }

    #[tokio::test]
    async fn failed_auto_transition_keeps_the_toggle() {
        let notifier = RecordingNotifier::default();
        let settings = EngineSettings {
            require_installer_for_measurement: true,
            ..Default::default()
        };
        let service = service_with(settings, &notifier);
        let job = seeded_job(&service).await;

        // Completing all lead items triggers an auto-advance that the
        // installer policy rejects; the toggles must survive.
        let lead_items = items_of(&job, StageId::Lead);
        let mut job = job;
        for item_id in &lead_items {
            job = service
                .toggle_checklist_item(&job.id, item_id, true)
                .await
                .unwrap();
        }

        assert_eq!(job.status, JobStatus::Stage(StageId::Lead));
        assert!(job.items_for_stage(StageId::Lead).all(|i| i.completed));
        assert!(notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminal_jobs_allow_toggles_but_no_automation() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let mut job = seeded_job(&service).await;

        job = service
            .request_status_change(&job.id, "cancelled", Actor::Office)
            .await
            .unwrap();

        let lead_items = items_of(&job, StageId::Lead);
        for item_id in &lead_items {
            job = service
                .toggle_checklist_item(&job.id, item_id, true)
                .await
                .unwrap();
        }
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.items_for_stage(StageId::Lead).all(|i| i.completed));
    }

    #[tokio::test]
    async fn toggle_unknown_item_is_not_found() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        let err = service
            .toggle_checklist_item(&job.id, &Uuid::now_v7(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_status_fails_and_job_is_unchanged() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        let err = service
            .request_status_change(&job.id, "warehouse", Actor::Office)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownStatus(_)));

        let reloaded = service.get_job(&job.id).await.unwrap();
        assert_eq!(reloaded.status, JobStatus::Stage(StageId::Lead));
        assert!(notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_expected_stamp_conflicts() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;
        let stale = job.updated_at - chrono::Duration::seconds(10);

        let err = service
            .update_job(
                &job.id,
                UpdateJobRequest {
                    note: Some("remeasure left window".to_string()),
                    expected_updated_at: Some(stale),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        let ok = service
            .update_job(
                &job.id,
                UpdateJobRequest {
                    note: Some("remeasure left window".to_string()),
                    expected_updated_at: Some(job.updated_at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.note, "remeasure left window");
    }

    #[tokio::test]
    async fn init_checklist_twice_is_idempotent() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = service
            .create_job(CreateJobRequest {
                client_name: "Novak".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(job.checklist_items.is_empty());

        let job = service.init_checklist(&job.id).await.unwrap();
        let count = job.checklist_items.len();
        assert!(count > 0);

        let job = service.init_checklist(&job.id).await.unwrap();
        assert_eq!(job.checklist_items.len(), count);
    }

    #[tokio::test]
    async fn custom_items_default_to_current_stage() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        let job = service
            .add_custom_item(&job.id, "Confirm parking permit", None, false)
            .await
            .unwrap();
        let custom = job.checklist_items.last().unwrap();
        assert!(custom.is_custom());
        assert_eq!(custom.stage, StageId::Lead);
        assert_eq!(custom.order_index, job.checklist_items.len() as i64 - 1);
    }

    #[tokio::test]
    async fn remove_item_requires_admin() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;
        let item_id = job.checklist_items[0].id;

        let err = service
            .remove_item(Actor::Installer, &job.id, &item_id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let job = service
            .remove_item(Actor::Office, &job.id, &item_id)
            .await
            .unwrap();
        assert!(job.checklist_items.iter().all(|i| i.id != item_id));
    }

    #[tokio::test]
    async fn delete_job_requires_admin() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        let err = service
            .delete_job(Actor::Client, &job.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        service.delete_job(Actor::Office, &job.id).await.unwrap();
        let err = service.get_job(&job.id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn attachments_respect_the_allow_flag() {
        let notifier = RecordingNotifier::default();
        let service = service_with(EngineSettings::default(), &notifier);
        let job = seeded_job(&service).await;

        let plain = job.checklist_items.iter().find(|i| !i.allow_attachment).unwrap();
        let err = service
            .attach_file(&job.id, &plain.id, "site.jpg", b"bytes")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let job = service
            .add_custom_item(&job.id, "Door photo", None, true)
            .await
            .unwrap();
        let photo = job.checklist_items.last().unwrap().clone();
        let job = service
            .attach_file(&job.id, &photo.id, "door.jpg", b"bytes")
            .await
            .unwrap();
        let stored = job
            .checklist_items
            .iter()
            .find(|i| i.id == photo.id)
            .unwrap();
        assert!(stored.attachment_url.as_deref().unwrap().ends_with("door.jpg"));
    }
}
