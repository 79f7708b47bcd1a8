// Media files, streaming and artwork URLs

use super::{ApiClient, ApiError};
use crate::models::{EpisodeId, FileId, MediaFile, MovieId};

/// Catalog entity that owns artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Movie,
    Series,
    Episode,
}

/// Artwork variant served by the image endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    Poster,
    Backdrop,
    /// Episode still frame
    Still,
}

impl ImageKind {
    fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Movie => "movies",
            ImageKind::Series => "series",
            ImageKind::Episode => "episodes",
        }
    }
}

impl ImageVariant {
    fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Poster => "poster",
            ImageVariant::Backdrop => "backdrop",
            ImageVariant::Still => "still",
        }
    }
}

/// URL of a cached artwork image, e.g. `/api/images/series/4/backdrop`
pub fn image_url(base_url: &str, kind: ImageKind, id: i64, variant: ImageVariant) -> String {
    format!(
        "{}/api/images/{}/{}/{}",
        base_url.trim_end_matches('/'),
        kind.as_str(),
        id,
        variant.as_str()
    )
}

/// URL the player streams a resolved file from
pub fn stream_url(base_url: &str, file_id: FileId) -> String {
    format!("{}/api/files/{}/stream", base_url.trim_end_matches('/'), file_id)
}

impl ApiClient {
    /// GET /movies/{id}/files
    pub async fn get_movie_files(&self, movie_id: MovieId) -> Result<Vec<MediaFile>, ApiError> {
        self.get_json(&format!("/movies/{}/files", movie_id)).await
    }

    /// GET /episodes/{id}/files
    pub async fn get_episode_files(
        &self,
        episode_id: EpisodeId,
    ) -> Result<Vec<MediaFile>, ApiError> {
        self.get_json(&format!("/episodes/{}/files", episode_id))
            .await
    }
}
