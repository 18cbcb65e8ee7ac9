//! Gallery Web - Bevy frontend for the virtual art gallery
//!
//! Renders the walkable 3D room with the artworks on its walls, plus the
//! egui overlays: navigation, shop grid, artwork details and the cart.

mod app;
mod network;
mod scene;
mod thumbnails;
mod ui;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run();
}
