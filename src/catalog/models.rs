use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

use super::MediaKind;

pub type MediaId = u64;

/// TMDB sends `null` for some text fields that are normally present.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn year_of(date: Option<&str>) -> Option<i32> {
    let date = date.filter(|d| !d.is_empty())?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: MediaId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesSummary {
    pub id: MediaId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
}

/// A list entry from any browse or search endpoint, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSummary {
    Movie(MovieSummary),
    Series(SeriesSummary),
}

impl MediaSummary {
    pub fn id(&self) -> MediaId {
        match self {
            MediaSummary::Movie(m) => m.id,
            MediaSummary::Series(s) => s.id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSummary::Movie(_) => MediaKind::Movie,
            MediaSummary::Series(_) => MediaKind::Tv,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaSummary::Movie(m) => &m.title,
            MediaSummary::Series(s) => &s.name,
        }
    }

    pub fn overview(&self) -> &str {
        match self {
            MediaSummary::Movie(m) => &m.overview,
            MediaSummary::Series(s) => &s.overview,
        }
    }

    pub fn vote_average(&self) -> f64 {
        match self {
            MediaSummary::Movie(m) => m.vote_average,
            MediaSummary::Series(s) => s.vote_average,
        }
    }

    pub fn backdrop_path(&self) -> Option<&str> {
        match self {
            MediaSummary::Movie(m) => m.backdrop_path.as_deref(),
            MediaSummary::Series(s) => s.backdrop_path.as_deref(),
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            MediaSummary::Movie(m) => year_of(m.release_date.as_deref()),
            MediaSummary::Series(s) => year_of(s.first_air_date.as_deref()),
        }
    }
}

/// One entry of a multi-kind search. Anything that is not a movie or a
/// series (people, collections) lands in `Other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "media_type")]
pub enum SearchHit {
    #[serde(rename = "movie")]
    Movie(MovieSummary),
    #[serde(rename = "tv")]
    Series(SeriesSummary),
    #[serde(other)]
    Other,
}

impl SearchHit {
    pub fn into_summary(self) -> Option<MediaSummary> {
        match self {
            SearchHit::Movie(m) => Some(MediaSummary::Movie(m)),
            SearchHit::Series(s) => Some(MediaSummary::Series(s)),
            SearchHit::Other => None,
        }
    }
}

/// Envelope of every list endpoint. Only the first page is ever requested.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResults<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub site: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub video_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VideoCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Video>,
}

/// A playable trailer on the supported video platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerRef {
    pub key: String,
    pub name: String,
}

impl TrailerRef {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.key)
    }
}

/// First video typed "Trailer" hosted on YouTube, if any.
pub fn youtube_trailer(videos: &[Video]) -> Option<TrailerRef> {
    videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube" && !v.key.is_empty())
        .map(|v| TrailerRef {
            key: v.key.clone(),
            name: v.name.clone(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeasonSummary {
    pub id: MediaId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub season_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EpisodeSummary {
    pub id: MediaId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub episode_number: u32,
    pub season_number: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub episodes: Vec<EpisodeSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaDetail {
    pub id: MediaId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub videos: Option<VideoCollection>,
    #[serde(default)]
    pub seasons: Option<Vec<SeasonSummary>>,
}

impl MediaDetail {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn year(&self) -> Option<i32> {
        year_of(self.release_date.as_deref()).or_else(|| year_of(self.first_air_date.as_deref()))
    }

    pub fn season_count(&self) -> u32 {
        self.number_of_seasons.unwrap_or(0)
    }

    pub fn trailer(&self) -> Option<TrailerRef> {
        self.videos
            .as_ref()
            .and_then(|v| youtube_trailer(&v.results))
    }

    /// Regular seasons only; season 0 holds specials.
    pub fn playable_seasons(&self) -> Vec<SeasonSummary> {
        self.seasons
            .iter()
            .flatten()
            .filter(|s| s.season_number > 0)
            .cloned()
            .collect()
    }
}
