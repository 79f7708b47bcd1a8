// Client navigation surface

use std::fmt;

use crate::models::{EpisodeId, FileId, LibraryId, MovieId, SeriesId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Boot entry point; re-derives everything from the service
    Boot,
    Setup,
    Movies,
    /// Movie detail needs the library it was opened from
    MovieDetail {
        id: MovieId,
        library_id: Option<LibraryId>,
    },
    Series,
    SeriesDetail(SeriesId),
    /// `series_id` is the series the user navigated from, if any
    EpisodeDetail {
        id: EpisodeId,
        series_id: Option<SeriesId>,
    },
    Player(FileId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Boot => write!(f, "/"),
            Route::Setup => write!(f, "/setup"),
            Route::Movies => write!(f, "/movies"),
            Route::MovieDetail { id, .. } => write!(f, "/movies/{}", id),
            Route::Series => write!(f, "/series"),
            Route::SeriesDetail(id) => write!(f, "/series/{}", id),
            Route::EpisodeDetail { id, .. } => write!(f, "/episodes/{}", id),
            Route::Player(file_id) => write!(f, "/player/{}", file_id),
        }
    }
}

impl Route {
    /// Parse a path. Unknown paths fall back to the boot entry point.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["setup"] => Route::Setup,
            ["movies"] => Route::Movies,
            ["movies", id] => id
                .parse()
                .map(|id| Route::MovieDetail {
                    id,
                    library_id: None,
                })
                .unwrap_or(Route::Boot),
            ["series"] => Route::Series,
            ["series", id] => id.parse().map(Route::SeriesDetail).unwrap_or(Route::Boot),
            ["episodes", id] => id
                .parse()
                .map(|id| Route::EpisodeDetail {
                    id,
                    series_id: None,
                })
                .unwrap_or(Route::Boot),
            ["player", id] => id.parse().map(Route::Player).unwrap_or(Route::Boot),
            _ => Route::Boot,
        }
    }
}
