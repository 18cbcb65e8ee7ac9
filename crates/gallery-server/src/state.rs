//! Application state management

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gallery_core::{layout_frames, Artwork, FramePlacement, FrameSpec, RoomSpec};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::Config;

/// Outcome of the most recent catalog fetch
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub at: DateTime<Utc>,
    pub count: usize,
    pub ok: bool,
}

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Artwork catalog
    pub catalog: CatalogClient,
    /// Room the frontend renders
    pub room: RoomSpec,
    pub frame: FrameSpec,
    last_fetch: RwLock<Option<FetchSummary>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let catalog = CatalogClient::new(&config.catalog).context("Failed to create catalog client")?;

        if !catalog.is_configured() {
            warn!("Catalog URL or key missing or still a placeholder, serving an empty gallery");
        }

        Ok(Arc::new(Self {
            config,
            catalog,
            room: RoomSpec::default(),
            frame: FrameSpec::default(),
            last_fetch: RwLock::new(None),
        }))
    }

    /// Fetch the current artwork list. Failures are logged and give an
    /// empty list.
    pub async fn artworks(&self) -> Vec<Artwork> {
        let (artworks, ok) = match self.catalog.try_fetch_artworks().await {
            Ok(artworks) => (artworks, true),
            Err(CatalogError::NotConfigured) => (Vec::new(), false),
            Err(e) => {
                error!(error = %e, "Error fetching artworks");
                (Vec::new(), false)
            }
        };

        *self.last_fetch.write().await = Some(FetchSummary {
            at: Utc::now(),
            count: artworks.len(),
            ok,
        });
        artworks
    }

    pub async fn artwork(&self, id: &str) -> Option<Artwork> {
        self.artworks()
            .await
            .into_iter()
            .find(|artwork| artwork.id.as_str() == id)
    }

    /// Frame placements for `count` artworks
    pub fn placements(&self, count: usize) -> Vec<FramePlacement> {
        layout_frames(&self.room, &self.frame, count)
    }

    pub async fn last_fetch(&self) -> Option<FetchSummary> {
        self.last_fetch.read().await.clone()
    }
}
