use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

use super::models::{
    EpisodeSummary, MediaDetail, MediaId, MediaSummary, MovieSummary, PagedResults, SearchHit,
    SeasonDetail, SeriesSummary,
};
use super::{CatalogApi, DiscoverQuery, MediaKind, SearchQuery, TimeWindow};

/// TMDB v3 client. Holds no state besides its configuration.
pub struct TmdbClient {
    client: Client,
    config: CatalogConfig,
}

impl TmdbClient {
    pub fn new(config: CatalogConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!("bingepoint/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Full request URL; parameter values are percent-encoded.
    pub fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}",
            self.config.base_url.trim_end_matches('/'),
            path,
            urlencoding::encode(&self.config.api_key)
        );

        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(path, params);
        debug!(endpoint = %path, "Catalog request");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(endpoint = %path, status, "Catalog request rejected");
            return Err(Error::Status {
                status,
                endpoint: path.to_string(),
            });
        }

        let body = response.text().await?;
        parse_body(path, &body)
    }

    async fn fetch_summaries(
        &self,
        kind: MediaKind,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<MediaSummary>> {
        let items = match kind {
            MediaKind::Movie => self
                .fetch::<PagedResults<MovieSummary>>(path, params)
                .await?
                .results
                .into_iter()
                .map(MediaSummary::Movie)
                .collect(),
            MediaKind::Tv => self
                .fetch::<PagedResults<SeriesSummary>>(path, params)
                .await?
                .results
                .into_iter()
                .map(MediaSummary::Series)
                .collect(),
        };
        Ok(items)
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait::async_trait]
impl CatalogApi for TmdbClient {
    async fn trending(&self, kind: MediaKind, window: TimeWindow) -> Result<Vec<MediaSummary>> {
        let path = format!("/trending/{}/{}", kind.as_path(), window.as_path());
        self.fetch_summaries(kind, &path, &[]).await
    }

    async fn popular(&self, kind: MediaKind) -> Result<Vec<MediaSummary>> {
        let path = format!("/{}/popular", kind.as_path());
        self.fetch_summaries(kind, &path, &[("sort_by", "popularity.desc".to_string())])
            .await
    }

    async fn discover(&self, kind: MediaKind, query: &DiscoverQuery) -> Result<Vec<MediaSummary>> {
        let path = format!("/discover/{}", kind.as_path());
        self.fetch_summaries(kind, &path, &query.to_params()).await
    }

    async fn details(&self, kind: MediaKind, id: MediaId) -> Result<MediaDetail> {
        let path = format!("/{}/{}", kind.as_path(), id);
        self.fetch(
            &path,
            &[("append_to_response", "videos,seasons".to_string())],
        )
        .await
    }

    async fn season_details(
        &self,
        series_id: MediaId,
        season: u32,
    ) -> Result<Vec<EpisodeSummary>> {
        let path = format!("/tv/{}/season/{}", series_id, season);
        let detail: SeasonDetail = self.fetch(&path, &[]).await?;
        Ok(detail.episodes)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let page: PagedResults<SearchHit> = self
            .fetch("/search/multi", &[("query", query.as_str().to_string())])
            .await?;
        Ok(page.results)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(CatalogConfig {
            api_key: "test-key".to_string(),
            base_url: "http://localhost:8080/3/".to_string(),
            image_base_url: "http://img.local/t/p".to_string(),
        })
    }

    #[test]
    fn test_endpoint_url_carries_key() {
        let url = client().endpoint_url("/trending/movie/week", &[]);
        assert_eq!(url, "http://localhost:8080/3/trending/movie/week?api_key=test-key");
    }

    #[test]
    fn test_search_text_is_encoded() {
        let query = SearchQuery::new("Tom & Jerry: The Movie").unwrap();
        let url = client().endpoint_url("/search/multi", &[("query", query.as_str().to_string())]);
        assert!(url.ends_with("&query=Tom%20%26%20Jerry%3A%20The%20Movie"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_discover_params_in_url() {
        let url = client().endpoint_url("/discover/tv", &DiscoverQuery::anime().to_params());
        assert!(url.contains("with_genres=16"));
        assert!(url.contains("with_keywords=210024%7C287501"));
        assert!(url.contains("with_original_language=ja"));
        assert!(url.contains("page=1"));
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_body::<PagedResults<MovieSummary>>("/trending/movie/week", "{\"page\":1}")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { ref endpoint, .. } if endpoint == "/trending/movie/week"));

        let err = parse_body::<SeasonDetail>("/tv/1/season/1", "<html>").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_detail_body_with_appended_videos() {
        let body = r#"{
            "id": 603, "title": "The Matrix", "release_date": "1999-03-30",
            "vote_average": 8.2, "runtime": 136,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "videos": {"results": [
                {"key": "vKQi3bBA1y8", "name": "Official Trailer", "site": "YouTube", "type": "Trailer"}
            ]}
        }"#;
        let detail: MediaDetail = parse_body("/movie/603", body).unwrap();
        assert_eq!(detail.runtime, Some(136));
        assert_eq!(detail.genres.len(), 2);
        assert_eq!(detail.trailer().unwrap().key, "vKQi3bBA1y8");
    }

    /// Serve one canned HTTP response on a local port. The handle yields the
    /// request head the client sent.
    async fn serve_once(status: &str, body: &str) -> (TmdbClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        let client = TmdbClient::new(CatalogConfig {
            api_key: "k".to_string(),
            base_url: format!("http://{}/3", addr),
            image_base_url: "http://img.local/t/p".to_string(),
        });
        (client, handle)
    }

    #[tokio::test]
    async fn test_rejected_status() {
        let (client, server) = serve_once("401 Unauthorized", r#"{"status_code":7}"#).await;
        let err = client
            .trending(MediaKind::Movie, TimeWindow::Week)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Status { status: 401, ref endpoint } if endpoint == "/trending/movie/week"
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_body_without_results() {
        let (client, server) = serve_once("200 OK", r#"{"page":1}"#).await;
        let err = client.popular(MediaKind::Tv).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { ref endpoint, .. } if endpoint == "/tv/popular"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let client = TmdbClient::new(CatalogConfig {
            api_key: "k".to_string(),
            base_url: "http://127.0.0.1:1/3".to_string(),
            image_base_url: "http://img.local/t/p".to_string(),
        });
        let err = client.details(MediaKind::Movie, 603).await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }

    #[tokio::test]
    async fn test_popular_request_line() {
        let body = r#"{"page":1,"results":[{"id":603,"title":"The Matrix","vote_average":8.2}],"total_pages":1}"#;
        let (client, server) = serve_once("200 OK", body).await;

        let items = client.popular(MediaKind::Movie).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "The Matrix");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /3/movie/popular?api_key=k&sort_by=popularity.desc "));
    }

    #[tokio::test]
    async fn test_season_episodes_request() {
        let body = r#"{"episodes":[{"id":1,"name":"Pilot","episode_number":1,"season_number":2}]}"#;
        let (client, server) = serve_once("200 OK", body).await;

        let episodes = client.season_details(1399, 2).await.unwrap();
        assert_eq!(episodes[0].name, "Pilot");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /3/tv/1399/season/2?api_key=k "));
    }
}
