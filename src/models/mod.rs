// Wire types returned by the catalog service

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type LibraryId = i64;
pub type MovieId = i64;
pub type SeriesId = i64;
pub type SeasonId = i64;
pub type EpisodeId = i64;
pub type FileId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    Movies,
    Series,
    /// Any type this client has no listing for (the service also knows
    /// "anime" and "others")
    #[serde(other)]
    Other,
}

impl LibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::Movies => "movies",
            LibraryType::Series => "series",
            LibraryType::Other => "other",
        }
    }
}

impl std::str::FromStr for LibraryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movies" | "movie" => Ok(LibraryType::Movies),
            "series" | "tvshows" | "shows" => Ok(LibraryType::Series),
            other => Err(format!(
                "invalid library type '{}': expected 'movies' or 'series'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    #[serde(rename = "type")]
    pub library_type: LibraryType,
}

/// Body of `POST /libraries`
#[derive(Debug, Clone, Serialize)]
pub struct CreateLibraryRequest {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub library_type: LibraryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default)]
    pub library_id: Option<LibraryId>,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime_min: Option<i32>,
    #[serde(default)]
    pub has_poster: bool,
    #[serde(default)]
    pub has_backdrop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    #[serde(default)]
    pub library_id: Option<LibraryId>,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub has_poster: bool,
    #[serde(default)]
    pub has_backdrop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    /// Not every service version includes the owning series
    #[serde(default)]
    pub series_id: Option<SeriesId>,
    pub number: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub has_poster: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub season_id: SeasonId,
    pub number: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    /// RFC3339 timestamp from the service; a bare `YYYY-MM-DD` is also accepted
    #[serde(default, deserialize_with = "deserialize_air_date")]
    pub air_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub runtime_min: Option<i32>,
    #[serde(default)]
    pub has_still: bool,
}

impl Episode {
    /// Calendar day the episode aired, in UTC
    pub fn aired_on(&self) -> Option<NaiveDate> {
        self.air_date.map(|at| at.date_naive())
    }
}

fn deserialize_air_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(Utc.from_utc_datetime(&midnight)))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid air_date '{}'", raw)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: FileId,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub video_codec: String,
    #[serde(default)]
    pub audio_codec: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub audio_channels: i32,
    /// Duration in seconds
    #[serde(default, alias = "duration_sec")]
    pub duration: i64,
    /// Older services omit this flag; an absent flag means present on disk
    #[serde(default)]
    pub is_missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Incremental: only new or removed files
    Scan,
    /// Full re-index of the library
    Rescan,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Scan => "scan",
            ScanMode::Rescan => "rescan",
        }
    }
}

/// Response of `POST /libraries/{id}/{scan|rescan}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanStarted {
    pub job_id: String,
    pub status: ScanJobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanJobStatus {
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanJob {
    pub id: String,
    pub library_id: LibraryId,
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: ScanJobStatus,
    #[serde(default)]
    pub error: Option<String>,
}

/// Common view of the Series -> Season -> Episode hierarchy
pub trait CollectionNode {
    fn id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;
    /// Position among siblings (season/episode number)
    fn ordinal(&self) -> i32;
    fn display_title(&self) -> String;
}

impl CollectionNode for Series {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        None
    }

    fn ordinal(&self) -> i32 {
        0
    }

    fn display_title(&self) -> String {
        self.title.clone()
    }
}

impl CollectionNode for Season {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.series_id
    }

    fn ordinal(&self) -> i32 {
        self.number
    }

    fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ if self.number == 0 => "Specials".to_string(),
            _ => format!("Season {}", self.number),
        }
    }
}

impl CollectionNode for Episode {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        Some(self.season_id)
    }

    fn ordinal(&self) -> i32 {
        self.number
    }

    fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("Episode {}", self.number)
        } else {
            self.title.clone()
        }
    }
}
