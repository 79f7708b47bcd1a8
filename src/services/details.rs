// Movie and episode detail loads

use crate::api::{image_url, Catalog, ImageKind, ImageVariant};
use crate::error::ClientError;
use crate::models::{
    CollectionNode, Episode, EpisodeId, LibraryId, Movie, MovieId, Season, Series, SeriesId,
};
use crate::routes::Route;

use super::playable::PlayableOwner;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: Movie,
}

impl MovieDetail {
    /// The service only resolves a movie within its library, so the library
    /// id must come from the view that navigated here.
    pub async fn load(
        catalog: &dyn Catalog,
        id: MovieId,
        library_id: Option<LibraryId>,
    ) -> Result<Self, ClientError> {
        let library_id = library_id.ok_or(ClientError::MissingContext("library"))?;
        let movie = catalog.get_movie(id, library_id).await?;
        Ok(Self { movie })
    }

    /// Original title, when it differs from the display title
    pub fn original_title(&self) -> Option<&str> {
        self.movie
            .original_title
            .as_deref()
            .filter(|original| *original != self.movie.title)
    }

    pub fn poster_url(&self, base_url: &str) -> Option<String> {
        self.movie
            .has_poster
            .then(|| image_url(base_url, ImageKind::Movie, self.movie.id, ImageVariant::Poster))
    }

    pub fn backdrop_url(&self, base_url: &str) -> Option<String> {
        self.movie
            .has_backdrop
            .then(|| image_url(base_url, ImageKind::Movie, self.movie.id, ImageVariant::Backdrop))
    }

    pub fn back_route(&self) -> Route {
        Route::Movies
    }

    pub fn playable_owner(&self) -> PlayableOwner {
        PlayableOwner::Movie(self.movie.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeDetail {
    pub episode: Episode,
    pub season: Season,
    pub series: Series,
    /// Series the user navigated from, if any
    from_series: Option<SeriesId>,
}

impl EpisodeDetail {
    /// Load episode, then its season, then its series. Each step needs the
    /// previous one's parent id, so the chain is sequential.
    pub async fn load(
        catalog: &dyn Catalog,
        id: EpisodeId,
        from_series: Option<SeriesId>,
    ) -> Result<Self, ClientError> {
        let episode = catalog.get_episode(id).await?;
        let season = catalog.get_season(episode.season_id).await?;
        let series_id = season
            .series_id
            .or(from_series)
            .ok_or(ClientError::MissingContext("series"))?;
        let series = catalog.get_series(series_id).await?;

        tracing::debug!(
            "Loaded episode {} of season {} of '{}'",
            episode.id,
            season.number,
            series.title
        );

        Ok(Self {
            episode,
            season,
            series,
            from_series,
        })
    }

    /// e.g. `Dark • S1E3`
    pub fn header_title(&self) -> String {
        format!(
            "{} • S{}E{}",
            self.series.title, self.season.number, self.episode.number
        )
    }

    pub fn title(&self) -> String {
        self.episode.display_title()
    }

    pub fn subtitle(&self) -> String {
        format!(
            "{} • Season {} • Episode {}",
            self.series.title, self.season.number, self.episode.number
        )
    }

    pub fn still_url(&self, base_url: &str) -> Option<String> {
        self.episode.has_still.then(|| {
            image_url(base_url, ImageKind::Episode, self.episode.id, ImageVariant::Still)
        })
    }

    /// Series backdrop, else the episode still
    pub fn backdrop_url(&self, base_url: &str) -> Option<String> {
        if self.series.has_backdrop {
            Some(image_url(
                base_url,
                ImageKind::Series,
                self.series.id,
                ImageVariant::Backdrop,
            ))
        } else {
            self.still_url(base_url)
        }
    }

    pub fn back_route(&self) -> Route {
        Route::SeriesDetail(self.from_series.unwrap_or(self.series.id))
    }

    pub fn playable_owner(&self) -> PlayableOwner {
        PlayableOwner::Episode(self.episode.id)
    }
}
