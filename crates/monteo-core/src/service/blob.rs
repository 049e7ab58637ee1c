//! Blob storage contract for checklist attachments.

use monteo_types::error::EngineError;
use monteo_types::job::JobId;
use uuid::Uuid;

pub trait BlobStore: Send + Sync {
    /// Store an attachment and return its URL.
    fn store(
        &self,
        job_id: &JobId,
        item_id: &Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<String, EngineError>> + Send;
}
