//! SQLite job repository implementation.
//!
//! Implements `JobRepository` from `monteo-core` using sqlx with split
//! read/write pools. The checklist is stored as a JSON column on the job
//! row so a job loads and saves as one atomic record, matching the
//! read/replace contract the core assumes.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use monteo_core::repository::job::{JobFilter, JobRepository};
use monteo_types::error::RepositoryError;
use monteo_types::job::{Job, JobId, JobStatus};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `JobRepository`.
pub struct SqliteJobRepository {
    pool: DatabasePool,
}

impl SqliteJobRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct JobRow {
    id: String,
    status: String,
    client_name: String,
    client_phone: String,
    address: String,
    installer: Option<String>,
    scheduled_on: Option<String>,
    note: String,
    checklist: String,
    created_at: String,
    updated_at: String,
}

impl JobRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            status: row.try_get("status")?,
            client_name: row.try_get("client_name")?,
            client_phone: row.try_get("client_phone")?,
            address: row.try_get("address")?,
            installer: row.try_get("installer")?,
            scheduled_on: row.try_get("scheduled_on")?,
            note: row.try_get("note")?,
            checklist: row.try_get("checklist")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_job(self) -> Result<Job, RepositoryError> {
        let id: JobId = self
            .id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid job id: {e}")))?;
        let status: JobStatus = self
            .status
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid job status: {e}")))?;
        let checklist_items = serde_json::from_str(&self.checklist)
            .map_err(|e| RepositoryError::Query(format!("invalid checklist JSON: {e}")))?;
        let scheduled_on = self
            .scheduled_on
            .as_deref()
            .map(|s| {
                s.parse::<NaiveDate>()
                    .map_err(|e| RepositoryError::Query(format!("invalid date: {e}")))
            })
            .transpose()?;

        Ok(Job {
            id,
            status,
            client_name: self.client_name,
            client_phone: self.client_phone,
            address: self.address,
            installer: self.installer,
            scheduled_on,
            note: self.note,
            checklist_items,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn checklist_json(job: &Job) -> Result<String, RepositoryError> {
    serde_json::to_string(&job.checklist_items)
        .map_err(|e| RepositoryError::Query(format!("serialize checklist: {e}")))
}

// ---------------------------------------------------------------------------
// JobRepository impl
// ---------------------------------------------------------------------------

impl JobRepository for SqliteJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        let checklist = checklist_json(job)?;

        sqlx::query(
            r#"INSERT INTO jobs
                 (id, status, client_name, client_phone, address, installer,
                  scheduled_on, note, checklist, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(job.id.to_string())
        .bind(job.status.as_str())
        .bind(&job.client_name)
        .bind(&job.client_phone)
        .bind(&job.address)
        .bind(&job.installer)
        .bind(job.scheduled_on.map(|d| d.to_string()))
        .bind(&job.note)
        .bind(&checklist)
        .bind(job.created_at.to_rfc3339())
        .bind(job.updated_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("job {} already exists", job.id))
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = JobRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_job()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: Option<JobFilter>) -> Result<Vec<Job>, RepositoryError> {
        let filter = filter.unwrap_or_default();

        let rows = match (&filter.status, &filter.installer, filter.open_only) {
            (Some(status), _, _) => {
                sqlx::query("SELECT * FROM jobs WHERE status = ? ORDER BY created_at DESC")
                    .bind(status.as_str())
                    .fetch_all(&self.pool.reader)
                    .await
            }
            (None, Some(installer), true) => sqlx::query(
                "SELECT * FROM jobs WHERE installer = ? AND status NOT IN ('completed', 'cancelled') ORDER BY created_at DESC",
            )
            .bind(installer)
            .fetch_all(&self.pool.reader)
            .await,
            (None, Some(installer), false) => {
                sqlx::query("SELECT * FROM jobs WHERE installer = ? ORDER BY created_at DESC")
                    .bind(installer)
                    .fetch_all(&self.pool.reader)
                    .await
            }
            (None, None, true) => sqlx::query(
                "SELECT * FROM jobs WHERE status NOT IN ('completed', 'cancelled') ORDER BY created_at DESC",
            )
            .fetch_all(&self.pool.reader)
            .await,
            (None, None, false) => {
                sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC")
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                JobRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_job()
            })
            .collect()
    }

    async fn update(&self, job: &Job) -> Result<(), RepositoryError> {
        let checklist = checklist_json(job)?;

        let result = sqlx::query(
            r#"UPDATE jobs SET
                 status = ?, client_name = ?, client_phone = ?, address = ?,
                 installer = ?, scheduled_on = ?, note = ?, checklist = ?,
                 updated_at = ?
               WHERE id = ?"#,
        )
        .bind(job.status.as_str())
        .bind(&job.client_name)
        .bind(&job.client_phone)
        .bind(&job.address)
        .bind(&job.installer)
        .bind(job.scheduled_on.map(|d| d.to_string()))
        .bind(&job.note)
        .bind(&checklist)
        .bind(job.updated_at.to_rfc3339())
        .bind(job.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_guarded(
        &self,
        job: &Job,
        expected: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let checklist = checklist_json(job)?;

        let result = sqlx::query(
            r#"UPDATE jobs SET
                 status = ?, client_name = ?, client_phone = ?, address = ?,
                 installer = ?, scheduled_on = ?, note = ?, checklist = ?,
                 updated_at = ?
               WHERE id = ? AND updated_at = ?"#,
        )
        .bind(job.status.as_str())
        .bind(&job.client_name)
        .bind(&job.client_phone)
        .bind(&job.address)
        .bind(&job.installer)
        .bind(job.scheduled_on.map(|d| d.to_string()))
        .bind(&job.note)
        .bind(&checklist)
        .bind(job.updated_at.to_rfc3339())
        .bind(job.id.to_string())
        .bind(expected.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT id FROM jobs WHERE id = ?")
                .bind(job.id.to_string())
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            return match exists {
                Some(_) => Err(RepositoryError::Conflict(
                    "record changed since read".to_string(),
                )),
                None => Err(RepositoryError::NotFound),
            };
        }
        Ok(())
    }

    async fn delete(&self, id: &JobId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
