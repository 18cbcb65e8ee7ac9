//! Shared UI state: active selection, cart, and panel visibility
//!
//! The store is a plain struct with a fixed set of mutators. Whoever needs
//! to read or change it gets it by reference; the 3D scene, the shop grid
//! and every overlay panel all go through the same instance.
//!
//! The details panel is visible exactly when an artwork is selected. The
//! flag is derived from the selection rather than stored, so the two can
//! never disagree.

use tracing::debug;

use crate::artwork::{Artwork, ArtworkId};
use crate::cart::Cart;

/// A single mutation of the store
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryAction {
    SelectArtwork(Option<Artwork>),
    SetDetailsPanelOpen(bool),
    AddToCart(Artwork),
    RemoveFromCart(ArtworkId),
    ClearCart,
    SetCartOpen(bool),
}

/// Selection and cart state for one browsing session
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    active: Option<Artwork>,
    cart: Cart,
    cart_open: bool,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the active artwork. The details panel follows.
    pub fn select_artwork(&mut self, artwork: Option<Artwork>) {
        match &artwork {
            Some(art) => debug!(artwork = %art.id, "Artwork selected"),
            None => debug!("Selection cleared"),
        }
        self.active = artwork;
    }

    /// Show or hide the details panel.
    ///
    /// Closing clears the selection. Opening requires a selection: without
    /// one the request is refused and the panel stays closed. Returns the
    /// resulting visibility.
    pub fn set_details_panel_open(&mut self, open: bool) -> bool {
        if !open {
            self.select_artwork(None);
        } else if self.active.is_none() {
            debug!("Ignoring request to open details panel with nothing selected");
        }
        self.is_details_open()
    }

    /// Returns whether the artwork was added (false if already in the cart)
    pub fn add_to_cart(&mut self, artwork: Artwork) -> bool {
        let id = artwork.id.clone();
        let added = self.cart.add(artwork);
        debug!(artwork = %id, added, size = self.cart.len(), "Add to cart");
        added
    }

    pub fn remove_from_cart(&mut self, id: &ArtworkId) -> bool {
        let removed = self.cart.remove(id);
        debug!(artwork = %id, removed, size = self.cart.len(), "Remove from cart");
        removed
    }

    pub fn clear_cart(&mut self) {
        debug!(size = self.cart.len(), "Cart cleared");
        self.cart.clear();
    }

    pub fn set_cart_open(&mut self, open: bool) {
        self.cart_open = open;
    }

    /// Apply a message-style action
    pub fn apply(&mut self, action: GalleryAction) {
        match action {
            GalleryAction::SelectArtwork(artwork) => self.select_artwork(artwork),
            GalleryAction::SetDetailsPanelOpen(open) => {
                self.set_details_panel_open(open);
            }
            GalleryAction::AddToCart(artwork) => {
                self.add_to_cart(artwork);
            }
            GalleryAction::RemoveFromCart(id) => {
                self.remove_from_cart(&id);
            }
            GalleryAction::ClearCart => self.clear_cart(),
            GalleryAction::SetCartOpen(open) => self.set_cart_open(open),
        }
    }

    pub fn active_artwork(&self) -> Option<&Artwork> {
        self.active.as_ref()
    }

    pub fn is_details_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_len(&self) -> usize {
        self.cart.len()
    }

    pub fn in_cart(&self, id: &ArtworkId) -> bool {
        self.cart.contains(id)
    }

    pub fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: &str, price: Option<f64>) -> Artwork {
        Artwork::new(id, id.to_uppercase(), format!("https://img/{}.jpg", id)).with_price(price)
    }

    #[test]
    fn test_select_opens_and_clears_details() {
        let mut store = GalleryStore::new();
        assert!(!store.is_details_open());

        store.select_artwork(Some(art("a", None)));
        assert!(store.is_details_open());
        assert_eq!(store.active_artwork().map(|a| a.id.as_str()), Some("a"));

        // Selecting the same artwork again changes nothing
        store.select_artwork(Some(art("a", None)));
        assert!(store.is_details_open());

        store.select_artwork(None);
        assert!(!store.is_details_open());
        assert!(store.active_artwork().is_none());
    }

    #[test]
    fn test_closing_details_clears_selection() {
        let mut store = GalleryStore::new();
        store.select_artwork(Some(art("a", None)));
        assert!(!store.set_details_panel_open(false));
        assert!(store.active_artwork().is_none());
    }

    #[test]
    fn test_opening_details_without_selection_is_refused() {
        let mut store = GalleryStore::new();
        assert!(!store.set_details_panel_open(true));
        assert!(!store.is_details_open());
        assert!(store.active_artwork().is_none());

        store.select_artwork(Some(art("b", None)));
        assert!(store.set_details_panel_open(true));
        assert_eq!(store.active_artwork().map(|a| a.id.as_str()), Some("b"));
    }

    #[test]
    fn test_cart_operations() {
        let mut store = GalleryStore::new();
        assert!(store.add_to_cart(art("a", Some(100.0))));
        assert!(!store.add_to_cart(art("a", Some(100.0))));
        assert_eq!(store.cart_len(), 1);

        assert!(!store.remove_from_cart(&ArtworkId::from("missing")));
        assert_eq!(store.cart_len(), 1);

        store.add_to_cart(art("b", None));
        store.add_to_cart(art("c", Some(50.0)));
        assert_eq!(store.cart_total(), 150.0);
        assert!(store.in_cart(&ArtworkId::from("b")));

        store.clear_cart();
        assert_eq!(store.cart_len(), 0);
        assert_eq!(store.cart_total(), 0.0);
    }

    #[test]
    fn test_cart_drawer_is_independent() {
        let mut store = GalleryStore::new();
        store.set_cart_open(true);
        assert!(store.is_cart_open());
        assert_eq!(store.cart_len(), 0);

        store.add_to_cart(art("a", None));
        store.clear_cart();
        assert!(store.is_cart_open());

        store.select_artwork(Some(art("a", None)));
        store.set_cart_open(false);
        assert!(store.is_details_open());
    }

    #[test]
    fn test_apply_actions() {
        let mut store = GalleryStore::new();
        let actions = vec![
            GalleryAction::AddToCart(art("a", Some(10.0))),
            GalleryAction::AddToCart(art("b", Some(20.0))),
            GalleryAction::AddToCart(art("a", Some(10.0))),
            GalleryAction::SelectArtwork(Some(art("b", Some(20.0)))),
            GalleryAction::SetCartOpen(true),
            GalleryAction::RemoveFromCart(ArtworkId::from("a")),
        ];
        for action in actions {
            store.apply(action);
        }
        assert_eq!(store.cart_len(), 1);
        assert_eq!(store.cart_total(), 20.0);
        assert!(store.is_details_open());
        assert!(store.is_cart_open());

        store.apply(GalleryAction::SetDetailsPanelOpen(false));
        store.apply(GalleryAction::ClearCart);
        assert!(!store.is_details_open());
        assert!(store.cart().is_empty());
    }
}
