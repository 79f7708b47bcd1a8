// Series, seasons and episodes

use super::{ApiClient, ApiError};
use crate::models::{Episode, EpisodeId, Season, SeasonId, Series, SeriesId};

impl ApiClient {
    /// GET /series
    pub async fn get_all_series(&self) -> Result<Vec<Series>, ApiError> {
        self.get_json("/series").await
    }

    /// GET /series/{id}
    pub async fn get_series_by_id(&self, id: SeriesId) -> Result<Series, ApiError> {
        self.get_json(&format!("/series/{}", id)).await
    }

    /// POST /series/{id}/enrich
    pub async fn post_series_enrich(&self, id: SeriesId) -> Result<(), ApiError> {
        self.post_command(&format!("/series/{}/enrich", id)).await
    }

    /// GET /series/{id}/seasons
    pub async fn get_seasons_by_series(&self, series_id: SeriesId) -> Result<Vec<Season>, ApiError> {
        self.get_json(&format!("/series/{}/seasons", series_id))
            .await
    }

    /// GET /seasons/{id}
    pub async fn get_season_by_id(&self, id: SeasonId) -> Result<Season, ApiError> {
        self.get_json(&format!("/seasons/{}", id)).await
    }

    /// GET /seasons/{id}/episodes
    pub async fn get_episodes_by_season(
        &self,
        season_id: SeasonId,
    ) -> Result<Vec<Episode>, ApiError> {
        self.get_json(&format!("/seasons/{}/episodes", season_id))
            .await
    }

    /// GET /episodes/{id}
    pub async fn get_episode_by_id(&self, id: EpisodeId) -> Result<Episode, ApiError> {
        self.get_json(&format!("/episodes/{}", id)).await
    }
}
