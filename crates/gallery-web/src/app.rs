//! Bevy application setup and shared resources

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{DefaultPickingPlugins, prelude::MeshPickingPlugin};
use gallery_core::{Artwork, ArtworkId, GalleryStore};

use crate::network::NetworkPlugin;
use crate::scene::ScenePlugin;
use crate::ui::UiPlugin;

/// Artworks received from the server
#[derive(Debug, Clone, Resource, Default)]
pub struct ArtworkRegistry {
    pub artworks: Vec<Artwork>,
    /// Set once the initial fetch has finished, successfully or not
    pub loaded: bool,
    pub error: Option<String>,
}

impl ArtworkRegistry {
    pub fn get(&self, id: &ArtworkId) -> Option<&Artwork> {
        self.artworks.iter().find(|artwork| &artwork.id == id)
    }
}

/// The one selection/cart store shared by the scene and every overlay
#[derive(Debug, Clone, Resource, Default, Deref, DerefMut)]
pub struct GalleryStoreRes(pub GalleryStore);

/// Which page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource, Default)]
pub enum ActiveView {
    #[default]
    Landing,
    Gallery,
    Shop,
}

impl ActiveView {
    /// Pick the initial view from a `?view=` query parameter
    pub fn from_query(search: &str) -> Self {
        let view = search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "view")
            .map(|(_, value)| value);

        match view {
            Some("gallery") => ActiveView::Gallery,
            Some("shop") => ActiveView::Shop,
            _ => ActiveView::Landing,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .map(|search| Self::from_query(&search))
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }
}

/// Run condition for systems that only make sense in the 3D view
pub fn in_gallery(view: Res<ActiveView>) -> bool {
    *view == ActiveView::Gallery
}

/// A frame in the room was clicked
#[derive(Message, Debug, Clone)]
pub struct ArtworkActivated(pub ArtworkId);

/// "Add to Cart" was pressed somewhere in the UI
#[derive(Message, Debug, Clone)]
pub struct AddToCart(pub Artwork);

/// Feed scene and UI messages into the store
pub fn apply_store_messages(
    mut activated: MessageReader<ArtworkActivated>,
    mut added: MessageReader<AddToCart>,
    registry: Res<ArtworkRegistry>,
    mut store: ResMut<GalleryStoreRes>,
) {
    for ArtworkActivated(id) in activated.read() {
        match registry.get(id) {
            Some(artwork) => store.select_artwork(Some(artwork.clone())),
            None => tracing::warn!("Clicked artwork {} is no longer in the catalog", id),
        }
    }

    for AddToCart(artwork) in added.read() {
        store.add_to_cart(artwork.clone());
    }
}

/// UI layout settings for responsive design
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    /// Current screen width
    pub screen_width: f32,
    /// Current screen height
    pub screen_height: f32,
    /// Whether we're on a small screen (mobile/tablet)
    pub is_mobile: bool,
    /// Scale factor for UI elements on mobile
    pub ui_scale: f32,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            screen_width: 1920.0,
            screen_height: 1080.0,
            is_mobile: false,
            ui_scale: 1.0,
        }
    }
}

impl UiLayout {
    /// Update layout based on screen dimensions
    pub fn update_for_screen(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;

        // Consider mobile if width < 800 or if it's a portrait orientation with width < 600
        self.is_mobile = width < 800.0 || (width < height && width < 600.0);

        // Scale up UI elements on mobile for better touch targets
        self.ui_scale = if self.is_mobile { 1.3 } else { 1.0 };
    }

    /// Width of the details panel and cart drawer
    pub fn panel_width(&self) -> f32 {
        if self.is_mobile {
            self.screen_width * 0.9
        } else {
            (self.screen_width * 0.3).clamp(320.0, 420.0)
        }
    }

    /// Cards per row in the shop grid
    pub fn shop_columns(&self) -> usize {
        if self.is_mobile {
            1
        } else if self.screen_width < 1200.0 {
            2
        } else {
            3
        }
    }
}

/// Run the Bevy application
pub fn run() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.07, 0.07, 0.08)))
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Gallery".to_string(),
                    canvas: Some("#gallery-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: "".to_string(),
                // Image hosts don't serve .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // These must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .init_resource::<ArtworkRegistry>()
        .init_resource::<GalleryStoreRes>()
        .insert_resource(ActiveView::from_browser())
        .init_resource::<UiLayout>()
        .add_message::<ArtworkActivated>()
        .add_message::<AddToCart>()
        .add_plugins(NetworkPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(UiPlugin)
        .add_systems(Update, apply_store_messages)
        .run();
}
