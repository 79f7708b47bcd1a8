// In-memory catalog for exercising the client core without a service

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiError, Catalog};
use crate::models::*;
use crate::services::context::{ClientContext, ClientOptions};

/// Catalog fake keyed by request path. Each call is recorded, can be delayed
/// with [`FakeCatalog::delay`] and made to fail with [`FakeCatalog::fail`].
#[derive(Default)]
pub struct FakeCatalog {
    pub libraries: Mutex<Vec<Library>>,
    pub movies: Mutex<HashMap<LibraryId, Vec<Movie>>>,
    pub series: Mutex<Vec<Series>>,
    pub seasons: Mutex<HashMap<SeriesId, Vec<Season>>>,
    pub episodes: Mutex<HashMap<SeasonId, Vec<Episode>>>,
    pub movie_files: Mutex<HashMap<MovieId, Vec<MediaFile>>>,
    pub episode_files: Mutex<HashMap<EpisodeId, Vec<MediaFile>>>,
    /// Statuses returned by successive polls of a scan job
    pub scan_jobs: Mutex<HashMap<String, VecDeque<ScanJobStatus>>>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_libraries(self, libraries: Vec<Library>) -> Self {
        *self.libraries.lock().unwrap() = libraries;
        self
    }

    /// Delay every request whose path equals `path`
    pub fn delay(&self, path: &str, after: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), after);
    }

    /// Fail every request whose path equals `path` with a 500
    pub fn fail(&self, path: &str) {
        self.failures.lock().unwrap().insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| *c == path).count()
    }

    async fn request(&self, path: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(path.clone());
        let delay = self.delays.lock().unwrap().get(&path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(&path) {
            return Err(ApiError::Status { status: 500, path });
        }
        Ok(())
    }

    fn not_found(path: String) -> ApiError {
        ApiError::Status { status: 404, path }
    }

    pub fn add_series(&self, series: Series, seasons: Vec<(Season, Vec<Episode>)>) {
        let id = series.id;
        self.series.lock().unwrap().push(series);
        let mut season_list = Vec::new();
        for (season, episodes) in seasons {
            self.episodes.lock().unwrap().insert(season.id, episodes);
            season_list.push(season);
        }
        self.seasons.lock().unwrap().insert(id, season_list);
    }
}

pub fn library(id: LibraryId, name: &str, library_type: LibraryType) -> Library {
    Library {
        id,
        name: name.to_string(),
        library_type,
    }
}

pub fn movie(id: MovieId, library_id: LibraryId, title: &str) -> Movie {
    Movie {
        id,
        library_id: Some(library_id),
        title: title.to_string(),
        original_title: None,
        year: None,
        overview: None,
        runtime_min: None,
        has_poster: false,
        has_backdrop: false,
    }
}

pub fn series(id: SeriesId, title: &str) -> Series {
    Series {
        id,
        library_id: None,
        title: title.to_string(),
        original_title: None,
        overview: None,
        status: None,
        has_poster: false,
        has_backdrop: false,
    }
}

pub fn season(id: SeasonId, series_id: SeriesId, number: i32) -> Season {
    Season {
        id,
        series_id: Some(series_id),
        number,
        title: None,
        overview: None,
        has_poster: false,
    }
}

pub fn episode(id: EpisodeId, season_id: SeasonId, number: i32, title: &str) -> Episode {
    Episode {
        id,
        season_id,
        number,
        title: title.to_string(),
        overview: None,
        air_date: None,
        runtime_min: None,
        has_still: false,
    }
}

pub fn media_file(id: FileId, is_missing: bool) -> MediaFile {
    MediaFile {
        id,
        path: format!("/media/{}.mkv", id),
        container: "matroska".to_string(),
        video_codec: "h264".to_string(),
        audio_codec: "aac".to_string(),
        width: 1920,
        height: 1080,
        audio_channels: 2,
        duration: 1440,
        is_missing,
    }
}

/// Context wired to a fake catalog
pub fn context(catalog: &Arc<FakeCatalog>) -> ClientContext {
    ClientContext::new(catalog.clone(), ClientOptions::default())
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_libraries(&self) -> Result<Vec<Library>, ApiError> {
        self.request("/libraries".to_string()).await?;
        Ok(self.libraries.lock().unwrap().clone())
    }

    async fn create_library(&self, request: &CreateLibraryRequest) -> Result<Library, ApiError> {
        self.request("POST /libraries".to_string()).await?;
        let mut libraries = self.libraries.lock().unwrap();
        let created = Library {
            id: libraries.len() as LibraryId + 1,
            name: request.name.clone(),
            library_type: request.library_type,
        };
        libraries.push(created.clone());
        Ok(created)
    }

    async fn list_movies(&self, library_id: LibraryId) -> Result<Vec<Movie>, ApiError> {
        self.request(format!("/movies?library_id={}", library_id))
            .await?;
        Ok(self
            .movies
            .lock()
            .unwrap()
            .get(&library_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_movie(&self, id: MovieId, library_id: LibraryId) -> Result<Movie, ApiError> {
        let path = format!("/movies/{}", id);
        self.request(path.clone()).await?;
        self.movies
            .lock()
            .unwrap()
            .get(&library_id)
            .and_then(|movies| movies.iter().find(|m| m.id == id).cloned())
            .ok_or_else(|| Self::not_found(path))
    }

    async fn list_movie_files(&self, movie_id: MovieId) -> Result<Vec<MediaFile>, ApiError> {
        self.request(format!("/movies/{}/files", movie_id)).await?;
        Ok(self
            .movie_files
            .lock()
            .unwrap()
            .get(&movie_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_series(&self) -> Result<Vec<Series>, ApiError> {
        self.request("/series".to_string()).await?;
        Ok(self.series.lock().unwrap().clone())
    }

    async fn get_series(&self, id: SeriesId) -> Result<Series, ApiError> {
        let path = format!("/series/{}", id);
        self.request(path.clone()).await?;
        self.series
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn list_seasons(&self, series_id: SeriesId) -> Result<Vec<Season>, ApiError> {
        self.request(format!("/series/{}/seasons", series_id))
            .await?;
        Ok(self
            .seasons
            .lock()
            .unwrap()
            .get(&series_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_season(&self, id: SeasonId) -> Result<Season, ApiError> {
        let path = format!("/seasons/{}", id);
        self.request(path.clone()).await?;
        self.seasons
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn list_episodes(&self, season_id: SeasonId) -> Result<Vec<Episode>, ApiError> {
        self.request(format!("/seasons/{}/episodes", season_id))
            .await?;
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .get(&season_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_episode(&self, id: EpisodeId) -> Result<Episode, ApiError> {
        let path = format!("/episodes/{}", id);
        self.request(path.clone()).await?;
        self.episodes
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn list_episode_files(
        &self,
        episode_id: EpisodeId,
    ) -> Result<Vec<MediaFile>, ApiError> {
        self.request(format!("/episodes/{}/files", episode_id))
            .await?;
        Ok(self
            .episode_files
            .lock()
            .unwrap()
            .get(&episode_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn trigger_scan(
        &self,
        library_id: LibraryId,
        mode: ScanMode,
    ) -> Result<ScanStarted, ApiError> {
        self.request(format!("/libraries/{}/{}", library_id, mode.as_str()))
            .await?;
        Ok(ScanStarted {
            job_id: format!("job-{}", library_id),
            status: ScanJobStatus::Running,
        })
    }

    async fn get_scan_job(&self, job_id: &str) -> Result<ScanJob, ApiError> {
        self.request(format!("/scans/{}", job_id)).await?;
        let status = self
            .scan_jobs
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(|statuses| statuses.pop_front())
            .unwrap_or(ScanJobStatus::Done);
        let library_id = job_id
            .trim_start_matches("job-")
            .parse()
            .unwrap_or_default();
        Ok(ScanJob {
            id: job_id.to_string(),
            library_id,
            started_at: chrono::Utc::now(),
            finished_at: None,
            status,
            error: (status == ScanJobStatus::Failed).then(|| "scan failed".to_string()),
        })
    }

    async fn enrich_movie(&self, movie_id: MovieId) -> Result<(), ApiError> {
        self.request(format!("/movies/{}/enrich", movie_id)).await
    }

    async fn enrich_series(&self, series_id: SeriesId) -> Result<(), ApiError> {
        self.request(format!("/series/{}/enrich", series_id)).await
    }
}
