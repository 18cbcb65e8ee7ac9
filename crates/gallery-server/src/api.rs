//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use gallery_core::{FramePlacement, FrameSpec, RoomSpec};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// List all artworks, ordered by title
pub async fn list_artworks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.artworks().await)
}

/// Get a specific artwork by ID
pub async fn get_artwork(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.artwork(&id).await {
        Some(artwork) => Json(artwork).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("Artwork not found")),
        )
            .into_response(),
    }
}

/// Room geometry plus where each artwork hangs
#[derive(Serialize)]
pub struct LayoutResponse {
    pub room: RoomSpec,
    pub frame: FrameSpec,
    /// Placement `i` belongs to artwork `i` of `/api/artworks`
    pub placements: Vec<FramePlacement>,
}

pub async fn get_layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state.artworks().await.len();
    Json(LayoutResponse {
        room: state.room,
        frame: state.frame,
        placements: state.placements(count),
    })
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub catalog_configured: bool,
    /// Artwork count from the last fetch, if any
    pub artworks: Option<usize>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Whether the last fetch reached the catalog
    pub fetch_ok: Option<bool>,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let last = state.last_fetch().await;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        catalog_configured: state.catalog.is_configured(),
        artworks: last.as_ref().map(|l| l.count),
        fetched_at: last.as_ref().map(|l| l.at),
        fetch_ok: last.map(|l| l.ok),
    })
}

/// Payment processing is not wired up
pub async fn checkout() -> impl IntoResponse {
    info!("Checkout requested");
    debug!("No payment provider configured");
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ApiError::new("Checkout is not available")),
    )
}
