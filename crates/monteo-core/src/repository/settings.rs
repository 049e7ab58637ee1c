//! Settings repository trait definition.
//!
//! Process-wide configuration: policy flags and automation rule overrides.
//! Read into an [`EngineSettings`] snapshot at evaluation time so the
//! engine itself never touches ambient state.

use monteo_types::error::RepositoryError;
use monteo_types::settings::EngineSettings;

/// Repository trait for engine settings.
pub trait SettingsRepository: Send + Sync {
    /// Load the full settings snapshot.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<EngineSettings, RepositoryError>> + Send;

    /// Persist a policy flag.
    fn set_flag(
        &self,
        key: &str,
        value: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist an automation rule override.
    fn set_rule_enabled(
        &self,
        rule_key: &str,
        enabled: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
