//! Job repository trait definition.
//!
//! The record store contract: atomic read/replace of whole job records.
//! The core does not assume row-level locking; conflict detection is
//! opt-in via the guarded update.
//!
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use chrono::{DateTime, Utc};
use monteo_types::error::RepositoryError;
use monteo_types::job::{Job, JobId, JobStatus};

/// Filter for job list queries.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Only jobs in this exact status.
    pub status: Option<JobStatus>,
    /// Only jobs assigned to this installer.
    pub installer: Option<String>,
    /// Exclude terminal (completed/cancelled) jobs.
    pub open_only: bool,
}

/// Repository trait for job persistence.
pub trait JobRepository: Send + Sync {
    /// Insert a new job record. Fails with `Conflict` if the id exists.
    fn create(
        &self,
        job: &Job,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a job by id.
    fn get(
        &self,
        id: &JobId,
    ) -> impl std::future::Future<Output = Result<Option<Job>, RepositoryError>> + Send;

    /// List jobs matching the filter, newest first.
    fn list(
        &self,
        filter: Option<JobFilter>,
    ) -> impl std::future::Future<Output = Result<Vec<Job>, RepositoryError>> + Send;

    /// Replace a job record (last write wins).
    fn update(
        &self,
        job: &Job,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Replace a job record only if the stored `updated_at` still matches
    /// `expected`; fails with `Conflict` otherwise.
    fn update_guarded(
        &self,
        job: &Job,
        expected: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a job by id. Returns `true` if it existed.
    fn delete(
        &self,
        id: &JobId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
