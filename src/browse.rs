use std::collections::HashSet;

use tracing::{error, info};

use crate::catalog::{
    CatalogApi, DiscoverQuery, MediaKind, MediaSummary, MediaType, TimeWindow,
};
use crate::error::Result;

const CAROUSEL_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Home,
    Movies,
    TvShows,
    Anime,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Home,
        Category::Movies,
        Category::TvShows,
        Category::Anime,
    ];

    pub fn as_display(&self) -> &'static str {
        match self {
            Category::Home => "Home",
            Category::Movies => "Movies",
            Category::TvShows => "TV Shows",
            Category::Anime => "Anime",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Category::Home => Category::Movies,
            Category::Movies => Category::TvShows,
            Category::TvShows => Category::Anime,
            Category::Anime => Category::Home,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Category::Home => Category::Anime,
            Category::Movies => Category::Home,
            Category::TvShows => Category::Movies,
            Category::Anime => Category::TvShows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub media_type: MediaType,
    pub items: Vec<MediaSummary>,
}

impl Section {
    fn new(title: &'static str, media_type: MediaType, items: Vec<MediaSummary>) -> Self {
        Self {
            title,
            media_type,
            items,
        }
    }
}

/// Everything one category page renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowsePage {
    pub carousel: Vec<MediaSummary>,
    pub sections: Vec<Section>,
}

impl BrowsePage {
    /// Sections worth drawing; empty ones are left out.
    pub fn visible_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.items.is_empty())
    }
}

/// Concatenate result sets, keeping the first entry seen for each id.
pub fn merge_unique(sets: impl IntoIterator<Item = Vec<MediaSummary>>) -> Vec<MediaSummary> {
    let mut seen = HashSet::new();
    sets.into_iter()
        .flatten()
        .filter(|item| seen.insert(item.id()))
        .collect()
}

/// Degrade a failed request to an empty set, logging the cause.
fn or_empty(label: &str, result: Result<Vec<MediaSummary>>) -> Vec<MediaSummary> {
    match result {
        Ok(items) => items,
        Err(e) => {
            error!(section = label, error = %e, "Failed to load section");
            Vec::new()
        }
    }
}

pub async fn load(api: &dyn CatalogApi, category: Category, window: TimeWindow) -> BrowsePage {
    let page = match category {
        Category::Home => load_home(api, window).await,
        Category::Movies => {
            load_merged(api, MediaKind::Movie, window, ("All Movies", "Popular Movies")).await
        }
        Category::TvShows => {
            load_merged(api, MediaKind::Tv, window, ("All TV Shows", "Popular TV Shows")).await
        }
        Category::Anime => load_anime(api).await,
    };

    info!(
        category = category.as_display(),
        sections = page.sections.len(),
        items = page.sections.iter().map(|s| s.items.len()).sum::<usize>(),
        "Category loaded"
    );
    page
}

/// Each branch resolves on its own; one failing request empties only its
/// own section.
async fn load_home(api: &dyn CatalogApi, window: TimeWindow) -> BrowsePage {
    let anime_query = DiscoverQuery::anime();
    let (movies, series, anime) = tokio::join!(
        api.trending(MediaKind::Movie, window),
        api.trending(MediaKind::Tv, window),
        api.discover(MediaKind::Tv, &anime_query),
    );

    let movies = or_empty("trending movies", movies);
    let series = or_empty("trending series", series);
    let anime = or_empty("anime", anime);

    BrowsePage {
        carousel: movies.iter().take(CAROUSEL_SIZE).cloned().collect(),
        sections: vec![
            Section::new("Trending Movies", MediaType::Movie, movies),
            Section::new("Trending TV Shows", MediaType::Series, series),
            Section::new("Popular Anime", MediaType::Anime, anime),
        ],
    }
}

/// Trending and discover merged into one list, plus the popular chart as
/// its own section.
async fn load_merged(
    api: &dyn CatalogApi,
    kind: MediaKind,
    window: TimeWindow,
    (merged_title, popular_title): (&'static str, &'static str),
) -> BrowsePage {
    let discover_query = DiscoverQuery::popular(1);
    let (trending, discovered, popular) = tokio::join!(
        api.trending(kind, window),
        api.discover(kind, &discover_query),
        api.popular(kind),
    );

    let items = merge_unique([
        or_empty("trending", trending),
        or_empty("discover", discovered),
    ]);
    let media_type = MediaType::from(kind);

    BrowsePage {
        carousel: Vec::new(),
        sections: vec![
            Section::new(merged_title, media_type, items),
            Section::new(popular_title, media_type, or_empty("popular", popular)),
        ],
    }
}

async fn load_anime(api: &dyn CatalogApi) -> BrowsePage {
    let anime = api.discover(MediaKind::Tv, &DiscoverQuery::anime()).await;
    BrowsePage {
        carousel: Vec::new(),
        sections: vec![Section::new(
            "Popular Anime",
            MediaType::Anime,
            or_empty("anime", anime),
        )],
    }
}
