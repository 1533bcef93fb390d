use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod image;
pub mod models;
mod tmdb;

pub use models::{
    EpisodeSummary, MediaDetail, MediaId, MediaSummary, SearchHit, SeasonSummary, TrailerRef,
};
pub use tmdb::TmdbClient;

/// Upstream kind as it appears in catalog URL paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

/// What the user picked. Anime is a local refinement of series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Movie,
    Series,
    Anime,
}

impl MediaType {
    pub fn catalog_kind(&self) -> MediaKind {
        match self {
            MediaType::Movie => MediaKind::Movie,
            MediaType::Series | MediaType::Anime => MediaKind::Tv,
        }
    }

    pub fn is_series(&self) -> bool {
        self.catalog_kind() == MediaKind::Tv
    }

    pub fn as_display(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Series => "TV Show",
            MediaType::Anime => "Anime",
        }
    }
}

impl From<MediaKind> for MediaType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => MediaType::Movie,
            MediaKind::Tv => MediaType::Series,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

const ANIMATION_GENRE: u32 = 16;
const ANIME_KEYWORDS: [u64; 2] = [210024, 287501];

/// Filters for the discover endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub sort_by: String,
    pub page: u32,
    pub with_genres: Vec<u32>,
    pub with_keywords: Vec<u64>,
    pub original_language: Option<String>,
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self::popular(1)
    }
}

impl DiscoverQuery {
    pub fn popular(page: u32) -> Self {
        Self {
            sort_by: "popularity.desc".to_string(),
            page: page.max(1),
            with_genres: Vec::new(),
            with_keywords: Vec::new(),
            original_language: None,
        }
    }

    /// Japanese animated series tagged with the anime keywords.
    pub fn anime() -> Self {
        Self {
            with_genres: vec![ANIMATION_GENRE],
            with_keywords: ANIME_KEYWORDS.to_vec(),
            original_language: Some("ja".to_string()),
            ..Self::popular(1)
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", self.sort_by.clone()),
            ("page", self.page.to_string()),
        ];

        if !self.with_genres.is_empty() {
            let genres: Vec<String> = self.with_genres.iter().map(|g| g.to_string()).collect();
            params.push(("with_genres", genres.join(",")));
        }

        if !self.with_keywords.is_empty() {
            let keywords: Vec<String> = self.with_keywords.iter().map(|k| k.to_string()).collect();
            params.push(("with_keywords", keywords.join("|")));
        }

        if let Some(lang) = &self.original_language {
            params.push(("with_original_language", lang.clone()));
        }

        params
    }
}

/// Trimmed, non-blank free text for the multi search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    async fn trending(&self, kind: MediaKind, window: TimeWindow) -> Result<Vec<MediaSummary>>;
    async fn popular(&self, kind: MediaKind) -> Result<Vec<MediaSummary>>;
    async fn discover(&self, kind: MediaKind, query: &DiscoverQuery) -> Result<Vec<MediaSummary>>;
    async fn details(&self, kind: MediaKind, id: MediaId) -> Result<MediaDetail>;
    async fn season_details(&self, series_id: MediaId, season: u32)
    -> Result<Vec<EpisodeSummary>>;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}
