//! SQLite checklist template repository implementation.

use sqlx::Row;
use uuid::Uuid;

use monteo_core::repository::template::TemplateRepository;
use monteo_types::checklist::ChecklistItemTemplate;
use monteo_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TemplateRepository`.
pub struct SqliteTemplateRepository {
    pool: DatabasePool,
}

impl SqliteTemplateRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn template_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChecklistItemTemplate, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let stage: String = row
        .try_get("stage")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let assigned_role: Option<String> = row
        .try_get("assigned_role")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(ChecklistItemTemplate {
        id: id
            .parse::<Uuid>()
            .map_err(|e| RepositoryError::Query(format!("invalid template id: {e}")))?,
        label: row
            .try_get("label")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        allow_attachment: row
            .try_get::<i64, _>("allow_attachment")
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            != 0,
        stage: stage
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid stage: {e}")))?,
        assigned_role: assigned_role
            .as_deref()
            .map(|s| {
                s.parse()
                    .map_err(|e| RepositoryError::Query(format!("invalid role: {e}")))
            })
            .transpose()?,
        checkpoint: row
            .try_get("checkpoint")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        locked: row
            .try_get::<i64, _>("locked")
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            != 0,
        position: row
            .try_get("position")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
    })
}

impl TemplateRepository for SqliteTemplateRepository {
    async fn list(&self) -> Result<Vec<ChecklistItemTemplate>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM checklist_templates ORDER BY stage, position")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(template_from_row).collect()
    }

    async fn replace_all(
        &self,
        templates: &[ChecklistItemTemplate],
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM checklist_templates")
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for template in templates {
            sqlx::query(
                r#"INSERT INTO checklist_templates
                     (id, label, allow_attachment, stage, assigned_role, checkpoint, locked, position)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(template.id.to_string())
            .bind(&template.label)
            .bind(template.allow_attachment as i64)
            .bind(template.stage.as_str())
            .bind(template.assigned_role.map(|r| r.to_string()))
            .bind(&template.checkpoint)
            .bind(template.locked as i64)
            .bind(template.position)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}
