//! Checklist template repository trait definition.

use monteo_types::checklist::ChecklistItemTemplate;
use monteo_types::error::RepositoryError;

/// Repository trait for the admin-editable checklist template set.
pub trait TemplateRepository: Send + Sync {
    /// List all templates ordered by (stage, position).
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChecklistItemTemplate>, RepositoryError>> + Send;

    /// Replace the whole template set atomically.
    fn replace_all(
        &self,
        templates: &[ChecklistItemTemplate],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
