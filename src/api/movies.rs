use super::{ApiClient, ApiError};
use crate::models::{LibraryId, Movie, MovieId};

impl ApiClient {
    /// GET /movies?library_id=
    pub async fn get_movies(&self, library_id: LibraryId) -> Result<Vec<Movie>, ApiError> {
        self.get_json(&format!("/movies?library_id={}", library_id))
            .await
    }

    /// GET /movies/{id}?library_id=
    pub async fn get_movie_by_id(
        &self,
        id: MovieId,
        library_id: LibraryId,
    ) -> Result<Movie, ApiError> {
        self.get_json(&format!("/movies/{}?library_id={}", id, library_id))
            .await
    }

    /// POST /movies/{id}/enrich
    pub async fn post_movie_enrich(&self, id: MovieId) -> Result<(), ApiError> {
        self.post_command(&format!("/movies/{}/enrich", id)).await
    }
}
