use tracing::info;

use crate::catalog::{CatalogApi, MediaSummary, SearchHit, SearchQuery};
use crate::error::Result;

/// Keep only the kinds the detail view can open.
pub fn supported_hits(hits: Vec<SearchHit>) -> Vec<MediaSummary> {
    hits.into_iter().filter_map(SearchHit::into_summary).collect()
}

/// Run a multi-kind search. Blank input fails with `EmptyInput` before any
/// request is made.
pub async fn search(api: &dyn CatalogApi, input: &str) -> Result<Vec<MediaSummary>> {
    let query = SearchQuery::new(input)?;
    let hits = api.search(&query).await?;
    let total = hits.len();
    let results = supported_hits(hits);

    info!(
        query = query.as_str(),
        total,
        kept = results.len(),
        "Search completed"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::tests::{FakeCatalog, movie, series};
    use crate::catalog::MediaKind;
    use crate::error::Error;

    fn hit(summary: MediaSummary) -> SearchHit {
        match summary {
            MediaSummary::Movie(m) => SearchHit::Movie(m),
            MediaSummary::Series(s) => SearchHit::Series(s),
        }
    }

    #[tokio::test]
    async fn test_dune_drops_people() {
        let api = FakeCatalog {
            search_hits: Some(vec![
                hit(movie(438631, "Dune")),
                SearchHit::Other,
                hit(series(90228, "Dune: Prophecy")),
                SearchHit::Other,
            ]),
            ..Default::default()
        };

        let results = search(&api, "dune").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind(), MediaKind::Movie);
        assert_eq!(results[1].kind(), MediaKind::Tv);
        assert_eq!(results[1].title(), "Dune: Prophecy");
    }

    #[tokio::test]
    async fn test_blank_query_issues_no_request() {
        let api = FakeCatalog {
            search_hits: Some(Vec::new()),
            ..Default::default()
        };

        let err = search(&api, "   ").await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
        assert!(api.searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_is_trimmed() {
        let api = FakeCatalog {
            search_hits: Some(Vec::new()),
            ..Default::default()
        };

        search(&api, "  the wire  ").await.unwrap();
        assert_eq!(*api.searches.lock().unwrap(), vec!["the wire".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let api = FakeCatalog::default();
        assert!(search(&api, "dune").await.is_err());
    }
}
