//! Artwork images for the egui overlays
//!
//! Each artwork's image is loaded through the asset server (the same
//! handle the room's canvases use) and registered with egui once it has
//! loaded. Until then, or if loading fails, overlays draw a grey box.

use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiTextureHandle};
use gallery_core::{Artwork, ArtworkId};

use crate::app::ArtworkRegistry;

const PLACEHOLDER_GREY: egui::Color32 = egui::Color32::from_gray(60);

/// Portrait canvas shape used until the real image size is known
const DEFAULT_ASPECT: f32 = 2.6 / 3.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThumbnailState {
    Loading,
    /// Registered with egui; `aspect` is width over height
    Ready { texture: egui::TextureId, aspect: f32 },
    Failed,
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: Handle<Image>,
    pub state: ThumbnailState,
}

/// Image state per artwork id
#[derive(Resource, Default)]
pub struct Thumbnails {
    entries: HashMap<ArtworkId, Thumbnail>,
}

impl Thumbnails {
    pub fn get(&self, id: &ArtworkId) -> Option<&Thumbnail> {
        self.entries.get(id)
    }

    /// Texture and aspect ratio, once the image is usable
    pub fn ready(&self, id: &ArtworkId) -> Option<(egui::TextureId, f32)> {
        match self.get(id)?.state {
            ThumbnailState::Ready { texture, aspect } => Some((texture, aspect)),
            _ => None,
        }
    }

    /// Drop entries for artworks no longer listed and return the ones
    /// that still need an image requested
    pub fn sync<'a>(&mut self, artworks: &'a [Artwork]) -> Vec<&'a Artwork> {
        self.entries
            .retain(|id, _| artworks.iter().any(|artwork| &artwork.id == id));
        artworks
            .iter()
            .filter(|artwork| !self.entries.contains_key(&artwork.id))
            .collect()
    }

    pub fn insert(&mut self, id: ArtworkId, image: Handle<Image>) {
        self.entries.insert(
            id,
            Thumbnail {
                image,
                state: ThumbnailState::Loading,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Request an image for every newly listed artwork
pub fn request_thumbnails(
    registry: Res<ArtworkRegistry>,
    asset_server: Res<AssetServer>,
    mut thumbnails: ResMut<Thumbnails>,
) {
    if !registry.is_changed() {
        return;
    }
    let missing: Vec<(ArtworkId, String)> = thumbnails
        .sync(&registry.artworks)
        .into_iter()
        .map(|artwork| (artwork.id.clone(), artwork.image_url.clone()))
        .collect();
    for (id, url) in missing {
        thumbnails.insert(id, asset_server.load(url));
    }
    tracing::debug!("Tracking {} artwork thumbnails", thumbnails.len());
}

/// Hand loaded images to egui; failed ones keep the placeholder
pub fn register_thumbnails(
    mut contexts: EguiContexts,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    mut thumbnails: ResMut<Thumbnails>,
) {
    for (id, thumbnail) in thumbnails.entries.iter_mut() {
        if thumbnail.state != ThumbnailState::Loading {
            continue;
        }
        match asset_server.get_load_state(thumbnail.image.id()) {
            Some(LoadState::Loaded) => {
                let aspect = images
                    .get(&thumbnail.image)
                    .map(|image| image.size_f32())
                    .filter(|size| size.x > 0.0 && size.y > 0.0)
                    .map(|size| size.x / size.y)
                    .unwrap_or(DEFAULT_ASPECT);
                let texture = contexts.add_image(EguiTextureHandle::Strong(thumbnail.image.clone()));
                thumbnail.state = ThumbnailState::Ready { texture, aspect };
            }
            Some(LoadState::Failed(err)) => {
                tracing::debug!("No thumbnail for artwork {}: {}", id, err);
                thumbnail.state = ThumbnailState::Failed;
            }
            _ => {}
        }
    }
}

/// Largest size with this aspect ratio that fits in `max`
pub fn fit_size(aspect: f32, max: egui::Vec2) -> egui::Vec2 {
    if !aspect.is_finite() || aspect <= 0.0 || max.x <= 0.0 || max.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    if max.x / max.y > aspect {
        egui::vec2(max.y * aspect, max.y)
    } else {
        egui::vec2(max.x, max.x / aspect)
    }
}

/// Draw the artwork's image inside `max`, or a grey box while there is none
pub fn artwork_image(ui: &mut egui::Ui, thumbnails: &Thumbnails, id: &ArtworkId, max: egui::Vec2) {
    match thumbnails.ready(id) {
        Some((texture, aspect)) => {
            let size = fit_size(aspect, max);
            ui.add(egui::Image::new(egui::load::SizedTexture::new(texture, size)));
        }
        None => {
            let size = fit_size(DEFAULT_ASPECT, max);
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            ui.painter().rect_filled(rect, 4.0, PLACEHOLDER_GREY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: &str) -> Artwork {
        Artwork::new(id, id.to_uppercase(), format!("https://img/{}.jpg", id))
    }

    #[test]
    fn test_fit_size() {
        let max = egui::vec2(200.0, 200.0);
        assert_eq!(fit_size(0.5, max), egui::vec2(100.0, 200.0));
        assert_eq!(fit_size(2.0, max), egui::vec2(200.0, 100.0));
        assert_eq!(fit_size(1.0, egui::vec2(300.0, 120.0)), egui::vec2(120.0, 120.0));
        assert_eq!(fit_size(f32::NAN, max), egui::Vec2::ZERO);
        assert_eq!(fit_size(1.0, egui::vec2(0.0, 10.0)), egui::Vec2::ZERO);
    }

    #[test]
    fn test_sync_requests_only_new_artworks() {
        let mut thumbnails = Thumbnails::default();
        let artworks = vec![art("a"), art("b")];

        let missing: Vec<_> = thumbnails.sync(&artworks).iter().map(|a| a.id.clone()).collect();
        assert_eq!(missing, vec![ArtworkId::from("a"), ArtworkId::from("b")]);
        for id in missing {
            thumbnails.insert(id, Handle::default());
        }
        assert!(thumbnails.sync(&artworks).is_empty());
        assert_eq!(thumbnails.get(&ArtworkId::from("a")).map(|t| t.state), Some(ThumbnailState::Loading));
        assert!(thumbnails.ready(&ArtworkId::from("a")).is_none());

        let relisted = vec![art("b"), art("c")];
        let missing: Vec<_> = thumbnails.sync(&relisted).iter().map(|a| a.id.clone()).collect();
        assert_eq!(missing, vec![ArtworkId::from("c")]);
        assert_eq!(thumbnails.len(), 1);
        assert!(thumbnails.get(&ArtworkId::from("a")).is_none());
    }

    #[test]
    fn test_ready_exposes_texture() {
        let mut thumbnails = Thumbnails::default();
        let id = ArtworkId::from("a");
        thumbnails.insert(id.clone(), Handle::default());
        if let Some(entry) = thumbnails.entries.get_mut(&id) {
            entry.state = ThumbnailState::Ready {
                texture: egui::TextureId::User(7),
                aspect: 0.5,
            };
        }
        assert_eq!(thumbnails.ready(&id), Some((egui::TextureId::User(7), 0.5)));

        if let Some(entry) = thumbnails.entries.get_mut(&id) {
            entry.state = ThumbnailState::Failed;
        }
        assert!(thumbnails.ready(&id).is_none());
    }
}
