//! Hosted catalog client
//!
//! The catalog is a PostgREST endpoint holding `artworks` rows with an
//! embedded `artists` relation. The whole list is fetched in one request,
//! ordered by title. There is no retry and no caching; a failed fetch
//! degrades to an empty gallery.

use gallery_core::Artwork;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::CatalogConfig;

/// Path and query for the artwork listing, relative to the project URL
pub const ARTWORKS_QUERY: &str = "/rest/v1/artworks?select=*,artists(*)&order=title.asc";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not configured")]
    NotConfigured,
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("catalog response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the artwork catalog
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// False when running in no-data mode
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn artworks_url(&self) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), ARTWORKS_QUERY)
    }

    /// Fetch every artwork with its artist
    pub async fn try_fetch_artworks(&self) -> Result<Vec<Artwork>, CatalogError> {
        if !self.is_configured() {
            return Err(CatalogError::NotConfigured);
        }

        let url = self.artworks_url();
        debug!(url = %url, "Fetching artworks");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Status { status, body });
        }

        let artworks: Vec<Artwork> = serde_json::from_str(&body)?;
        info!(count = artworks.len(), "Fetched artworks");
        Ok(artworks)
    }

    /// Like [`try_fetch_artworks`](Self::try_fetch_artworks), but any
    /// failure is logged and reported as an empty list
    pub async fn fetch_artworks(&self) -> Vec<Artwork> {
        match self.try_fetch_artworks().await {
            Ok(artworks) => artworks,
            Err(CatalogError::NotConfigured) => Vec::new(),
            Err(e) => {
                error!(error = %e, "Error fetching artworks");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(url: &str) -> CatalogConfig {
        CatalogConfig {
            url: url.to_string(),
            anon_key: "test-key".to_string(),
            timeout_secs: 5,
        }
    }

    async fn artworks_handler(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<serde_json::Value>, StatusCode> {
        let key = headers.get("apikey").and_then(|v| v.to_str().ok());
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        if key != Some("test-key") || auth != Some("Bearer test-key") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        if params.get("select").map(String::as_str) != Some("*,artists(*)")
            || params.get("order").map(String::as_str) != Some("title.asc")
        {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(Json(serde_json::json!([
            {
                "id": "a1",
                "title": "Blue Hour",
                "artist_id": "x",
                "price": 1250,
                "image_url": "https://img/a1.jpg",
                "description": "Dusk over water",
                "dimensions": "24 x 36 in",
                "is_sold": false,
                "created_at": "2024-01-05T10:00:00Z",
                "artists": {"id": "x", "name": "Ada", "bio": null, "slug": "ada", "avatar_url": null}
            },
            {
                "id": "a2",
                "title": "Quiet",
                "artist_id": null,
                "price": null,
                "image_url": "https://img/a2.jpg",
                "description": null,
                "dimensions": null,
                "is_sold": true,
                "created_at": null,
                "artists": null
            }
        ])))
    }

    #[test]
    fn test_artworks_url() {
        let client = CatalogClient::new(&config("https://abc.supabase.co/")).unwrap();
        assert_eq!(
            client.artworks_url(),
            "https://abc.supabase.co/rest/v1/artworks?select=*,artists(*)&order=title.asc"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_returns_empty() {
        let client = CatalogClient::new(&CatalogConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.try_fetch_artworks().await,
            Err(CatalogError::NotConfigured)
        ));
        assert!(client.fetch_artworks().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_decodes_rows() {
        let base = serve(Router::new().route("/rest/v1/artworks", get(artworks_handler))).await;
        let client = CatalogClient::new(&config(&base)).unwrap();

        let artworks = client.try_fetch_artworks().await.unwrap();
        assert_eq!(artworks.len(), 2);
        assert_eq!(artworks[0].title, "Blue Hour");
        assert_eq!(artworks[0].price, Some(1250.0));
        assert_eq!(artworks[0].artist_name(), Some("Ada"));
        assert!(artworks[0].created_at.is_some());
        assert!(artworks[1].is_sold);
        assert!(artworks[1].artist.is_none());
    }

    #[tokio::test]
    async fn test_error_status_degrades_to_empty() {
        let app = Router::new().route(
            "/rest/v1/artworks",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;
        let client = CatalogClient::new(&config(&base)).unwrap();

        match client.try_fetch_artworks().await {
            Err(CatalogError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {:?}", other.map(|a| a.len())),
        }
        assert!(client.fetch_artworks().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let app = Router::new().route("/rest/v1/artworks", get(|| async { "{not json" }));
        let base = serve(app).await;
        let client = CatalogClient::new(&config(&base)).unwrap();

        assert!(matches!(
            client.try_fetch_artworks().await,
            Err(CatalogError::Decode(_))
        ));
    }
}
