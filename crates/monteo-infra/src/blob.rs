//! Local filesystem blob store for checklist attachments.

use std::path::PathBuf;

use monteo_core::service::blob::BlobStore;
use monteo_types::error::EngineError;
use monteo_types::job::JobId;
use uuid::Uuid;

/// Stores attachments under `{data_dir}/attachments/{job_id}/{item_id}/`.
///
/// The returned URL is the path relative to the data directory, which the
/// API serves as static content.
pub struct LocalBlobStore {
    data_dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl BlobStore for LocalBlobStore {
    async fn store(
        &self,
        job_id: &JobId,
        item_id: &Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, EngineError> {
        // Strip any path components a client smuggles into the filename.
        let safe_name = filename
            .rsplit(['/', '\\'])
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("attachment");

        let dir = self
            .data_dir
            .join("attachments")
            .join(job_id.to_string())
            .join(item_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| EngineError::Storage(e.to_string()))?;

        let path = dir.join(safe_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| EngineError::Storage(e.to_string()))?;

        Ok(format!("attachments/{job_id}/{item_id}/{safe_name}"))
    }
}
