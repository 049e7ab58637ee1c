//! SQLite settings repository implementation.
//!
//! Policy flags are stored under `policy.<key>`, automation rule overrides
//! under `rule.<rule_key>`. Absent keys fall back to the defaults baked
//! into `EngineSettings` (rules enabled, policies off).

use sqlx::Row;

use monteo_core::repository::settings::SettingsRepository;
use monteo_types::error::RepositoryError;
use monteo_types::settings::{EngineSettings, REQUIRE_INSTALLER_FOR_MEASUREMENT};

use super::pool::DatabasePool;

const POLICY_PREFIX: &str = "policy.";
const RULE_PREFIX: &str = "rule.";

/// SQLite-backed implementation of `SettingsRepository`.
pub struct SqliteSettingsRepository {
    pool: DatabasePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn set(&self, key: String, value: bool) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO settings (key, value) VALUES (?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value"#,
        )
        .bind(key)
        .bind(if value { "true" } else { "false" })
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> Result<EngineSettings, RepositoryError> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut settings = EngineSettings::default();
        for row in &rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let value: String = row
                .try_get("value")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let enabled = value == "true";

            if let Some(rule_key) = key.strip_prefix(RULE_PREFIX) {
                settings.rule_overrides.insert(rule_key.to_string(), enabled);
            } else if key == format!("{POLICY_PREFIX}{REQUIRE_INSTALLER_FOR_MEASUREMENT}") {
                settings.require_installer_for_measurement = enabled;
            }
        }
        Ok(settings)
    }

    async fn set_flag(&self, key: &str, value: bool) -> Result<(), RepositoryError> {
        self.set(format!("{POLICY_PREFIX}{key}"), value).await
    }

    async fn set_rule_enabled(&self, rule_key: &str, enabled: bool) -> Result<(), RepositoryError> {
        self.set(format!("{RULE_PREFIX}{rule_key}"), enabled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monteo_types::process::{RuleId, StageId};

    async fn test_repo() -> (tempfile::TempDir, SqliteSettingsRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteSettingsRepository::new(pool))
    }

    #[tokio::test]
    async fn defaults_when_table_is_empty() {
        let (_dir, repo) = test_repo().await;
        let settings = repo.load().await.unwrap();
        assert!(!settings.require_installer_for_measurement);
        assert!(settings.rule_enabled(&RuleId::AutoAdvance(StageId::Lead)));
    }

    #[tokio::test]
    async fn rule_override_roundtrip() {
        let (_dir, repo) = test_repo().await;
        let rule = RuleId::AutoAdvance(StageId::BeforeMeasurement);

        repo.set_rule_enabled(&rule.key(), false).await.unwrap();
        let settings = repo.load().await.unwrap();
        assert!(!settings.rule_enabled(&rule));
        assert!(settings.rule_enabled(&RuleId::AutoAdvance(StageId::Lead)));

        repo.set_rule_enabled(&rule.key(), true).await.unwrap();
        let settings = repo.load().await.unwrap();
        assert!(settings.rule_enabled(&rule));
    }

    #[tokio::test]
    async fn policy_flag_roundtrip() {
        let (_dir, repo) = test_repo().await;

        repo.set_flag(REQUIRE_INSTALLER_FOR_MEASUREMENT, true)
            .await
            .unwrap();
        let settings = repo.load().await.unwrap();
        assert!(settings.require_installer_for_measurement);
    }
}
