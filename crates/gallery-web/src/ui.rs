//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use gallery_core::{Artwork, ArtworkId, GalleryStore};

use crate::app::{ActiveView, AddToCart, ArtworkRegistry, GalleryStoreRes, UiLayout};
use crate::thumbnails::{artwork_image, register_thumbnails, request_thumbnails, Thumbnails};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CheckoutNotice>()
            .init_resource::<Thumbnails>()
            .add_systems(Update, (update_ui_layout, close_on_escape, request_thumbnails))
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, (register_thumbnails, ui_system).chain());
    }
}

const GOLD: egui::Color32 = egui::Color32::from_rgb(255, 215, 0);
const SOLD_RED: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

/// Shown in the cart after the stub checkout button is pressed
#[derive(Resource, Default)]
pub struct CheckoutNotice(pub bool);

/// Update UI layout based on window size
fn update_ui_layout(
    windows: Query<&Window>,
    mut ui_layout: ResMut<UiLayout>,
) {
    if let Ok(window) = windows.single() {
        let width = window.width();
        let height = window.height();

        // Only update if dimensions changed significantly
        if (ui_layout.screen_width - width).abs() > 1.0
            || (ui_layout.screen_height - height).abs() > 1.0
        {
            ui_layout.update_for_screen(width, height);
        }
    }
}

/// Escape closes the details panel, or the cart if no details are showing
fn close_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut store: ResMut<GalleryStoreRes>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }
    if store.is_details_open() {
        store.set_details_panel_open(false);
    } else if store.is_cart_open() {
        store.set_cart_open(false);
    }
}

/// Change page. The selection belongs to the page it was made on.
fn switch_view(view: &mut ActiveView, store: &mut GalleryStore, next: ActiveView) {
    if *view != next {
        store.select_artwork(None);
        *view = next;
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    registry: Res<ArtworkRegistry>,
    thumbnails: Res<Thumbnails>,
    mut store: ResMut<GalleryStoreRes>,
    mut view: ResMut<ActiveView>,
    ui_layout: Res<UiLayout>,
    mut checkout_notice: ResMut<CheckoutNotice>,
    mut add_to_cart: MessageWriter<AddToCart>,
) {
    let ui_scale = ui_layout.ui_scale;
    let panel_width = ui_layout.panel_width();

    // Get the egui context - early return if not available
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Read the view without tripping change detection every frame
    let mut current = *view;

    egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui
                .button(egui::RichText::new("Gallery.").strong().size(20.0 * ui_scale))
                .clicked()
            {
                switch_view(&mut current, &mut store, ActiveView::Landing);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let cart_text = match store.cart_len() {
                    0 => "Cart".to_string(),
                    n => format!("Cart ({})", n),
                };
                if ui
                    .selectable_label(store.is_cart_open(), egui::RichText::new(cart_text).size(14.0 * ui_scale))
                    .clicked()
                {
                    let open = !store.is_cart_open();
                    store.set_cart_open(open);
                }

                if ui
                    .selectable_label(current == ActiveView::Shop, egui::RichText::new("Shop").size(14.0 * ui_scale))
                    .clicked()
                {
                    switch_view(&mut current, &mut store, ActiveView::Shop);
                }
                if ui
                    .selectable_label(current == ActiveView::Gallery, egui::RichText::new("3D Gallery").size(14.0 * ui_scale))
                    .clicked()
                {
                    switch_view(&mut current, &mut store, ActiveView::Gallery);
                }
            });
        });
    });

    if store.is_cart_open() {
        cart_panel(ctx, &mut store, &thumbnails, &mut checkout_notice, panel_width, ui_scale);
    } else {
        checkout_notice.0 = false;
    }

    if current != ActiveView::Landing {
        if let Some(artwork) = store.active_artwork().cloned() {
            details_panel(ctx, &artwork, &mut store, &thumbnails, &mut add_to_cart, panel_width, ui_scale);
        }
    }

    match current {
        ActiveView::Landing => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.25);
                    ui.heading(egui::RichText::new("Gallery.").size(48.0 * ui_scale).strong());
                    ui.label(
                        egui::RichText::new("Contemporary works, hung in a room you can walk through")
                            .size(16.0 * ui_scale)
                            .color(egui::Color32::GRAY),
                    );
                    ui.add_space(24.0);
                    if ui
                        .button(egui::RichText::new("Enter 3D Gallery").size(18.0 * ui_scale))
                        .clicked()
                    {
                        switch_view(&mut current, &mut store, ActiveView::Gallery);
                    }
                    ui.add_space(8.0);
                    if ui
                        .button(egui::RichText::new("Browse Shop").size(18.0 * ui_scale))
                        .clicked()
                    {
                        switch_view(&mut current, &mut store, ActiveView::Shop);
                    }
                });
            });
        }
        ActiveView::Shop => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading(egui::RichText::new("Shop").size(28.0 * ui_scale));
                ui.add_space(8.0);

                if !registry.loaded {
                    ui.label("Loading artworks...");
                    return;
                }
                if registry.artworks.is_empty() {
                    empty_state(ui, &registry);
                    return;
                }

                let columns = ui_layout.shop_columns();
                let spacing = 16.0;
                let card_width =
                    ((ui.available_width() - spacing * (columns as f32 - 1.0)) / columns as f32 - 16.0).max(120.0);

                let mut selected: Option<Artwork> = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("shop_grid")
                        .num_columns(columns)
                        .spacing([spacing, spacing])
                        .show(ui, |ui| {
                            for (i, artwork) in registry.artworks.iter().enumerate() {
                                let in_cart = store.in_cart(&artwork.id);
                                egui::Frame::group(ui.style()).show(ui, |ui| {
                                    ui.set_width(card_width);
                                    ui.vertical_centered(|ui| {
                                        artwork_image(
                                            ui,
                                            &thumbnails,
                                            &artwork.id,
                                            egui::vec2(card_width, card_width * 0.9),
                                        );
                                    });
                                    ui.add_space(6.0);
                                    ui.label(egui::RichText::new(&artwork.title).strong().size(16.0 * ui_scale));
                                    if let Some(artist) = artwork.artist_name() {
                                        ui.label(egui::RichText::new(artist).color(egui::Color32::GRAY));
                                    }
                                    if let Some(description) = &artwork.description {
                                        ui.add(egui::Label::new(egui::RichText::new(description).small()).truncate());
                                    }
                                    if let Some(dimensions) = &artwork.dimensions {
                                        ui.label(egui::RichText::new(dimensions).small().color(egui::Color32::GRAY));
                                    }
                                    ui.label(egui::RichText::new(artwork.price_label()).size(15.0 * ui_scale));

                                    ui.horizontal(|ui| {
                                        if !artwork.is_purchasable() {
                                            ui.colored_label(SOLD_RED, "Sold");
                                        } else if in_cart {
                                            ui.add_enabled(false, egui::Button::new("In Cart"));
                                        } else if ui.button("Add to Cart").clicked() {
                                            add_to_cart.write(AddToCart(artwork.clone()));
                                        }
                                        if ui.small_button("Details").clicked() {
                                            selected = Some(artwork.clone());
                                        }
                                    });
                                });
                                if (i + 1) % columns == 0 {
                                    ui.end_row();
                                }
                            }
                        });
                });

                if selected.is_some() {
                    store.select_artwork(selected);
                }
            });
        }
        ActiveView::Gallery => {
            let overlay = if !registry.loaded {
                Some("Loading gallery...".to_string())
            } else if registry.artworks.is_empty() {
                Some(match &registry.error {
                    Some(error) => format!("No artworks found ({})", error),
                    None => "No artworks found".to_string(),
                })
            } else {
                None
            };

            if let Some(text) = overlay {
                egui::Area::new(egui::Id::new("gallery_status"))
                    .anchor(egui::Align2::CENTER_TOP, [0.0, 80.0])
                    .show(ctx, |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            ui.label(egui::RichText::new(text).size(16.0 * ui_scale));
                        });
                    });
            }

            egui::Area::new(egui::Id::new("gallery_hint"))
                .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(
                            egui::RichText::new("Drag to look • WASD to move • Click art to view details")
                                .size(13.0 * ui_scale),
                        );
                    });
                });
        }
    }

    if current != *view {
        *view = current;
    }
}

fn empty_state(ui: &mut egui::Ui, registry: &ArtworkRegistry) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new("No artworks found").size(18.0));
        if let Some(error) = &registry.error {
            ui.label(egui::RichText::new(error).small().color(egui::Color32::GRAY));
        }
    });
}

/// Selected artwork: title, artist, description, price and purchase
fn details_panel(
    ctx: &egui::Context,
    artwork: &Artwork,
    store: &mut GalleryStore,
    thumbnails: &Thumbnails,
    add_to_cart: &mut MessageWriter<AddToCart>,
    panel_width: f32,
    ui_scale: f32,
) {
    egui::SidePanel::right("details_panel")
        .default_width(panel_width)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new(&artwork.title).size(22.0 * ui_scale));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(egui::RichText::new("✕").size(18.0 * ui_scale)).clicked() {
                        store.set_details_panel_open(false);
                    }
                });
            });
            if let Some(artist) = artwork.artist_name() {
                ui.label(egui::RichText::new(format!("by {}", artist)).color(egui::Color32::GRAY));
            }

            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    let width = ui.available_width();
                    artwork_image(ui, thumbnails, &artwork.id, egui::vec2(width, 320.0 * ui_scale));
                });
                ui.add_space(8.0);
                match &artwork.description {
                    Some(description) => ui.label(description),
                    None => ui.label(egui::RichText::new("No description available.").italics()),
                };
                ui.add_space(8.0);

                if let Some(dimensions) = &artwork.dimensions {
                    ui.label(format!("Dimensions: {}", dimensions));
                }
                if let Some(bio) = artwork.artist.as_ref().and_then(|a| a.bio.as_ref()) {
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new(bio).small().color(egui::Color32::GRAY));
                }

                ui.add_space(12.0);
                ui.label(egui::RichText::new(artwork.price_label()).size(24.0 * ui_scale).color(GOLD));
                ui.add_space(8.0);

                if !artwork.is_purchasable() {
                    ui.colored_label(SOLD_RED, egui::RichText::new("Sold").strong());
                } else if store.in_cart(&artwork.id) {
                    ui.add_enabled(false, egui::Button::new("In Cart"));
                } else if ui
                    .button(egui::RichText::new("Add to Cart").size(16.0 * ui_scale))
                    .clicked()
                {
                    add_to_cart.write(AddToCart(artwork.clone()));
                    store.set_details_panel_open(false);
                }
            });
        });
}

/// Cart drawer with totals and the stub checkout
fn cart_panel(
    ctx: &egui::Context,
    store: &mut GalleryStore,
    thumbnails: &Thumbnails,
    checkout_notice: &mut CheckoutNotice,
    panel_width: f32,
    ui_scale: f32,
) {
    egui::SidePanel::right("cart_panel")
        .default_width(panel_width)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("Your Cart").size(20.0 * ui_scale));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(egui::RichText::new("✕").size(18.0 * ui_scale)).clicked() {
                        store.set_cart_open(false);
                    }
                });
            });
            ui.separator();

            if store.cart().is_empty() {
                ui.label(egui::RichText::new("Your cart is empty.").color(egui::Color32::GRAY));
                return;
            }

            let mut remove: Option<ArtworkId> = None;
            egui::ScrollArea::vertical().max_height(ui.available_height() - 120.0).show(ui, |ui| {
                for item in store.cart().iter() {
                    ui.horizontal(|ui| {
                        artwork_image(ui, thumbnails, &item.id, egui::vec2(64.0, 64.0) * ui_scale);
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&item.title).strong());
                            ui.label(item.price_label());
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Remove").clicked() {
                                remove = Some(item.id.clone());
                            }
                        });
                    });
                    ui.separator();
                }
            });
            if let Some(id) = remove {
                store.remove_from_cart(&id);
            }

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Total").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(store.cart().total_label()).strong().size(18.0 * ui_scale));
                });
            });
            ui.add_space(8.0);

            if ui
                .add_sized([ui.available_width(), 32.0 * ui_scale], egui::Button::new("Checkout"))
                .clicked()
            {
                tracing::info!("Checkout requested for {} items", store.cart_len());
                checkout_notice.0 = true;
            }
            if checkout_notice.0 {
                ui.label(egui::RichText::new("Checkout is not available yet.").small().color(egui::Color32::GRAY));
            }
            if ui.small_button("Clear cart").clicked() {
                store.clear_cart();
                checkout_notice.0 = false;
            }
        });
}
