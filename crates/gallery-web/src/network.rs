//! Network client for backend communication
//!
//! The artwork list is requested once per page view. The request runs on
//! the browser's event loop and hands its result back through a shared
//! slot that a Bevy system drains.

use bevy::prelude::*;
use gallery_core::Artwork;
use std::sync::{Arc, Mutex};

use crate::app::ArtworkRegistry;

pub struct NetworkPlugin;

/// Resource storing the server connection configuration
#[derive(Resource, Clone, Default)]
pub struct ServerConfig {
    /// HTTP(S) base URL for REST API (e.g., "http://192.168.1.100:8080")
    pub http_url: String,
}

impl ServerConfig {
    /// Create config from URL query parameters or same-origin fallback
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let location = window.location();

        // Check for ?server= query parameter
        if let Ok(search) = location.search() {
            if let Some(server_param) = Self::parse_query_param(&search, "server") {
                tracing::info!("Using server from URL parameter: {}", server_param);
                return Self::from_server_address(&server_param);
            }
        }

        // Fall back to same-origin
        let host = location.host().unwrap_or_else(|_| "localhost:8080".to_string());
        let is_https = location.protocol().unwrap_or_default() == "https:";

        Self {
            http_url: format!("{}://{}", if is_https { "https" } else { "http" }, host),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }

    /// Create config from a server address (host:port or full URL)
    pub fn from_server_address(addr: &str) -> Self {
        let addr = addr.trim_end_matches('/');
        let http_url = if addr.starts_with("https://") || addr.starts_with("http://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };

        Self { http_url }
    }

    /// Parse a query parameter from a search string
    fn parse_query_param(search: &str, param: &str) -> Option<String> {
        let search = search.trim_start_matches('?');
        for pair in search.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                if key == param {
                    return Some(value.replace("%3A", ":").replace("%2F", "/"));
                }
            }
        }
        None
    }

    pub fn artworks_url(&self) -> String {
        format!("{}/api/artworks", self.http_url)
    }
}

/// Result of the artwork fetch
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Loaded(Vec<Artwork>),
    Failed(String),
}

/// Fetch result waiting to be picked up by [`process_artworks`]
#[derive(Resource, Default)]
pub struct PendingArtworks(pub Arc<Mutex<Option<FetchOutcome>>>);

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        let server_config = ServerConfig::from_browser();

        app.insert_resource(server_config)
            .init_resource::<PendingArtworks>()
            .add_systems(Startup, fetch_artworks)
            .add_systems(Update, process_artworks);
    }
}

/// Decode an `/api/artworks` response body
pub fn parse_artworks(text: &str) -> FetchOutcome {
    match serde_json::from_str::<Vec<Artwork>>(text) {
        Ok(artworks) => FetchOutcome::Loaded(artworks),
        Err(e) => FetchOutcome::Failed(format!("Unexpected response: {}", e)),
    }
}

/// Fetch artworks from REST API on startup
fn fetch_artworks(pending: Res<PendingArtworks>, server_config: Res<ServerConfig>) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen_futures::spawn_local;

        let pending_clone = pending.0.clone();
        let url = server_config.artworks_url();

        spawn_local(async move {
            tracing::info!("Fetching artworks from: {}", url);

            let outcome = match gloo_net::http::Request::get(&url).send().await {
                Ok(response) if response.ok() => match response.text().await {
                    Ok(text) => parse_artworks(&text),
                    Err(e) => FetchOutcome::Failed(format!("{:?}", e)),
                },
                Ok(response) => FetchOutcome::Failed(format!(
                    "Server returned {} {}",
                    response.status(),
                    response.status_text()
                )),
                Err(e) => FetchOutcome::Failed(format!("{:?}", e)),
            };

            if let Ok(mut slot) = pending_clone.lock() {
                *slot = Some(outcome);
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::info!(url = %server_config.artworks_url(), "Artwork fetch not available in native mode");
        if let Ok(mut slot) = pending.0.lock() {
            *slot = Some(FetchOutcome::Loaded(Vec::new()));
        }
    }
}

fn process_artworks(pending: Res<PendingArtworks>, mut registry: ResMut<ArtworkRegistry>) {
    let outcome = match pending.0.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };

    match outcome {
        Some(FetchOutcome::Loaded(artworks)) => {
            tracing::info!("Loaded {} artworks", artworks.len());
            registry.artworks = artworks;
            registry.error = None;
            registry.loaded = true;
        }
        Some(FetchOutcome::Failed(error)) => {
            tracing::error!("Error fetching artworks: {}", error);
            registry.artworks.clear();
            registry.error = Some(error);
            registry.loaded = true;
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address_forms() {
        assert_eq!(
            ServerConfig::from_server_address("192.168.1.5:8080").http_url,
            "http://192.168.1.5:8080"
        );
        assert_eq!(
            ServerConfig::from_server_address("https://gallery.example/").artworks_url(),
            "https://gallery.example/api/artworks"
        );
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            ServerConfig::parse_query_param("?view=shop&server=http%3A%2F%2Fhost%3A9000", "server"),
            Some("http://host:9000".to_string())
        );
        assert_eq!(ServerConfig::parse_query_param("?view=shop", "server"), None);
    }

    #[test]
    fn test_parse_artworks() {
        let body = r#"[{"id": "a", "title": "Amber", "image_url": "a.jpg", "price": 10}]"#;
        match parse_artworks(body) {
            FetchOutcome::Loaded(artworks) => {
                assert_eq!(artworks.len(), 1);
                assert_eq!(artworks[0].price_label(), "$10");
            }
            FetchOutcome::Failed(e) => panic!("unexpected failure: {}", e),
        }

        assert!(matches!(parse_artworks("<html>"), FetchOutcome::Failed(_)));
    }

    #[test]
    fn test_failed_fetch_leaves_empty_registry() {
        let mut app = App::new();
        app.init_resource::<PendingArtworks>()
            .init_resource::<ArtworkRegistry>()
            .add_systems(Update, process_artworks);

        if let Ok(mut slot) = app.world().resource::<PendingArtworks>().0.lock() {
            *slot = Some(FetchOutcome::Failed("offline".into()));
        }
        app.update();

        let registry = app.world().resource::<ArtworkRegistry>();
        assert!(registry.loaded);
        assert!(registry.artworks.is_empty());
        assert_eq!(registry.error.as_deref(), Some("offline"));
    }
}
