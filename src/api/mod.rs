// Catalog service client
// Every request either parses a JSON body or fails with an ApiError carrying the status

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    CreateLibraryRequest, Episode, EpisodeId, Library, LibraryId, MediaFile, Movie, MovieId,
    ScanJob, ScanMode, ScanStarted, Season, SeasonId, Series, SeriesId,
};

mod files;
mod libraries;
mod movies;
mod scans;
mod series;

pub use files::{image_url, stream_url, ImageKind, ImageVariant};

/// Any failed request against the catalog service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error: {status} for {path}")]
    Status { status: u16, path: String },

    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("failed to parse response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },
}

impl ApiError {
    /// HTTP status code, when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// The remote catalog/scan/enrichment service as seen by the client core.
///
/// Views hold an `Arc<dyn Catalog>` so the coordination logic can run against
/// the HTTP client or an in-memory fake.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_libraries(&self) -> Result<Vec<Library>, ApiError>;
    async fn create_library(&self, request: &CreateLibraryRequest) -> Result<Library, ApiError>;

    async fn list_movies(&self, library_id: LibraryId) -> Result<Vec<Movie>, ApiError>;
    async fn get_movie(&self, id: MovieId, library_id: LibraryId) -> Result<Movie, ApiError>;
    async fn list_movie_files(&self, movie_id: MovieId) -> Result<Vec<MediaFile>, ApiError>;

    async fn list_series(&self) -> Result<Vec<Series>, ApiError>;
    async fn get_series(&self, id: SeriesId) -> Result<Series, ApiError>;

    async fn list_seasons(&self, series_id: SeriesId) -> Result<Vec<Season>, ApiError>;
    async fn get_season(&self, id: SeasonId) -> Result<Season, ApiError>;

    async fn list_episodes(&self, season_id: SeasonId) -> Result<Vec<Episode>, ApiError>;
    async fn get_episode(&self, id: EpisodeId) -> Result<Episode, ApiError>;
    async fn list_episode_files(&self, episode_id: EpisodeId)
        -> Result<Vec<MediaFile>, ApiError>;

    async fn trigger_scan(
        &self,
        library_id: LibraryId,
        mode: ScanMode,
    ) -> Result<ScanStarted, ApiError>;
    async fn get_scan_job(&self, job_id: &str) -> Result<ScanJob, ApiError>;

    async fn enrich_movie(&self, movie_id: MovieId) -> Result<(), ApiError>;
    async fn enrich_series(&self, series_id: SeriesId) -> Result<(), ApiError>;
}

/// HTTP client for the catalog service
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a client for a service rooted at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ApiError::Transport {
            path: base_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        tracing::debug!("{} {}", method, path);

        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response.text().await.map_err(|e| self.transport_error(path, e))
    }

    fn transport_error(&self, path: &str, error: reqwest::Error) -> ApiError {
        match self.request_timeout {
            Some(after) if error.is_timeout() => ApiError::Timeout {
                what: format!("request to {}", path),
                after,
            },
            _ => ApiError::Transport {
                path: path.to_string(),
                message: error.to_string(),
            },
        }
    }

    fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::GET, path, None).await?;
        Self::decode(path, &body)
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(|source| ApiError::Encode {
            path: path.to_string(),
            source,
        })?;
        let body = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(path, &body)
    }

    /// POST without a request body
    pub(crate) async fn post_for<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::POST, path, None).await?;
        Self::decode(path, &body)
    }

    /// POST whose response body is irrelevant (may be empty)
    pub(crate) async fn post_command(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::POST, path, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for ApiClient {
    async fn list_libraries(&self) -> Result<Vec<Library>, ApiError> {
        self.get_libraries().await
    }

    async fn create_library(&self, request: &CreateLibraryRequest) -> Result<Library, ApiError> {
        self.post_library(request).await
    }

    async fn list_movies(&self, library_id: LibraryId) -> Result<Vec<Movie>, ApiError> {
        self.get_movies(library_id).await
    }

    async fn get_movie(&self, id: MovieId, library_id: LibraryId) -> Result<Movie, ApiError> {
        self.get_movie_by_id(id, library_id).await
    }

    async fn list_movie_files(&self, movie_id: MovieId) -> Result<Vec<MediaFile>, ApiError> {
        self.get_movie_files(movie_id).await
    }

    async fn list_series(&self) -> Result<Vec<Series>, ApiError> {
        self.get_all_series().await
    }

    async fn get_series(&self, id: SeriesId) -> Result<Series, ApiError> {
        self.get_series_by_id(id).await
    }

    async fn list_seasons(&self, series_id: SeriesId) -> Result<Vec<Season>, ApiError> {
        self.get_seasons_by_series(series_id).await
    }

    async fn get_season(&self, id: SeasonId) -> Result<Season, ApiError> {
        self.get_season_by_id(id).await
    }

    async fn list_episodes(&self, season_id: SeasonId) -> Result<Vec<Episode>, ApiError> {
        self.get_episodes_by_season(season_id).await
    }

    async fn get_episode(&self, id: EpisodeId) -> Result<Episode, ApiError> {
        self.get_episode_by_id(id).await
    }

    async fn list_episode_files(
        &self,
        episode_id: EpisodeId,
    ) -> Result<Vec<MediaFile>, ApiError> {
        self.get_episode_files(episode_id).await
    }

    async fn trigger_scan(
        &self,
        library_id: LibraryId,
        mode: ScanMode,
    ) -> Result<ScanStarted, ApiError> {
        self.scan_library(library_id, mode).await
    }

    async fn get_scan_job(&self, job_id: &str) -> Result<ScanJob, ApiError> {
        self.get_scan_job_by_id(job_id).await
    }

    async fn enrich_movie(&self, movie_id: MovieId) -> Result<(), ApiError> {
        self.post_movie_enrich(movie_id).await
    }

    async fn enrich_series(&self, series_id: SeriesId) -> Result<(), ApiError> {
        self.post_series_enrich(series_id).await
    }
}
