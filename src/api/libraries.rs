use super::{ApiClient, ApiError};
use crate::models::{CreateLibraryRequest, Library};

impl ApiClient {
    /// GET /libraries
    pub async fn get_libraries(&self) -> Result<Vec<Library>, ApiError> {
        self.get_json("/libraries").await
    }

    /// POST /libraries
    pub async fn post_library(&self, request: &CreateLibraryRequest) -> Result<Library, ApiError> {
        let library: Library = self.post_json("/libraries", request).await?;
        tracing::info!(
            "Created {} library '{}' (id {})",
            library.library_type.as_str(),
            library.name,
            library.id
        );
        Ok(library)
    }
}
