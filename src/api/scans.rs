use super::{ApiClient, ApiError};
use crate::models::{LibraryId, ScanJob, ScanMode, ScanStarted};

impl ApiClient {
    /// POST /libraries/{id}/scan or /libraries/{id}/rescan
    pub async fn scan_library(
        &self,
        library_id: LibraryId,
        mode: ScanMode,
    ) -> Result<ScanStarted, ApiError> {
        self.post_for(&format!("/libraries/{}/{}", library_id, mode.as_str()))
            .await
    }

    /// GET /scans/{job_id}
    pub async fn get_scan_job_by_id(&self, job_id: &str) -> Result<ScanJob, ApiError> {
        self.get_json(&format!("/scans/{}", urlencoding::encode(job_id)))
            .await
    }
}
