//! Web server setup and routing

use anyhow::{ensure, Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::config::TlsConfig;
use crate::state::AppState;

/// API routes, the static frontend and CORS
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/artworks", get(api::list_artworks))
        .route("/api/artworks/{id}", get(api::get_artwork))
        .route("/api/layout", get(api::get_layout))
        .route("/api/status", get(api::get_status))
        .route("/api/checkout", post(api::checkout))
        // Static files (WASM frontend) - must be fallback for root
        .fallback_service(ServeDir::new(&state.config.server.web_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the web server (HTTP or HTTPS depending on config)
pub async fn run(state: Arc<AppState>, bind: &str, tls: Option<&TlsConfig>) -> Result<()> {
    let app = router(state);

    if let Some(tls_config) = tls {
        run_https(app, bind, tls_config).await
    } else {
        run_http(app, bind).await
    }
}

/// Run plain HTTP server
async fn run_http(app: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run HTTPS server with TLS. Both PEM files must exist.
async fn run_https(app: Router, bind: &str, tls: &TlsConfig) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let (cert, key) = (Path::new(&tls.cert), Path::new(&tls.key));
    ensure!(cert.exists(), "TLS certificate file not found: {}", tls.cert);
    ensure!(key.exists(), "TLS key file not found: {}", tls.key);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    let rustls_config = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate")?;

    info!(address = %bind, protocol = "HTTPS", cert = %tls.cert, "Starting web server with TLS");
    axum_server::bind_rustls(addr, rustls_config)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Json;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    fn unconfigured() -> Router {
        router(AppState::new(Config::default()).unwrap())
    }

    /// Router backed by a local fake catalog serving three artworks
    async fn with_catalog() -> Router {
        let rows = serde_json::json!([
            {"id": "a", "title": "Amber", "price": 100, "image_url": "a.jpg", "is_sold": false},
            {"id": "b", "title": "Birch", "price": null, "image_url": "b.jpg", "is_sold": true},
            {"id": "c", "title": "Cobalt", "price": 50.5, "image_url": "c.jpg", "is_sold": false}
        ]);
        let fake = Router::new().route(
            "/rest/v1/artworks",
            get(move || {
                let rows = rows.clone();
                async move { Json(rows) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, fake).await.unwrap();
        });

        let mut config = Config::default();
        config.catalog.url = format!("http://{}", addr);
        config.catalog.anon_key = "test-key".into();
        router(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_unconfigured_catalog_serves_empty_list() {
        let (status, body) = get_json(unconfigured(), "/api/artworks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_artwork_is_404() {
        let (status, body) = get_json(unconfigured(), "/api/artworks/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Artwork not found");
    }

    #[tokio::test]
    async fn test_status_reports_no_data_mode() {
        let app = unconfigured();
        let (_, body) = get_json(app.clone(), "/api/status").await;
        assert_eq!(body["catalog_configured"], false);
        assert!(body["fetched_at"].is_null());
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        get_json(app.clone(), "/api/artworks").await;
        let (_, body) = get_json(app, "/api/status").await;
        assert_eq!(body["artworks"], 0);
        assert!(body["fetched_at"].is_string());
        assert_eq!(body["fetch_ok"], false);
    }

    #[tokio::test]
    async fn test_checkout_is_not_implemented() {
        let response = unconfigured()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body_json(response).await["error"], "Checkout is not available");
    }

    #[tokio::test]
    async fn test_lists_and_finds_artworks() {
        let app = with_catalog().await;

        let (status, body) = get_json(app.clone(), "/api/artworks").await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Amber", "Birch", "Cobalt"]);

        let (status, body) = get_json(app, "/api/artworks/b").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Birch");
        assert_eq!(body["is_sold"], true);
    }

    #[tokio::test]
    async fn test_layout_places_each_artwork() {
        let (status, body) = get_json(with_catalog().await, "/api/layout").await;
        assert_eq!(status, StatusCode::OK);
        let placements = body["placements"].as_array().unwrap();
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0]["wall"], "back");
        assert_eq!(body["room"]["width"], 20.0);

        let (_, body) = get_json(unconfigured(), "/api/layout").await;
        assert!(body["placements"].as_array().unwrap().is_empty());
    }

    fn tls_in(dir: &std::path::Path) -> TlsConfig {
        TlsConfig {
            cert: dir.join("cert.pem").display().to_string(),
            key: dir.join("key.pem").display().to_string(),
        }
    }

    #[tokio::test]
    async fn test_https_requires_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let tls = tls_in(dir.path());

        let err = run(AppState::new(Config::default()).unwrap(), "127.0.0.1:0", Some(&tls))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TLS certificate file not found"));
    }

    #[tokio::test]
    async fn test_https_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let tls = tls_in(dir.path());
        std::fs::write(&tls.cert, "not a real certificate").unwrap();

        let err = run(AppState::new(Config::default()).unwrap(), "127.0.0.1:0", Some(&tls))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TLS key file not found"));
    }
}
