//! In-memory shopping cart keyed by artwork id

use serde::{Deserialize, Serialize};

use crate::artwork::{format_price, Artwork, ArtworkId};

/// Ordered collection of artworks, at most one entry per id.
///
/// Artworks are unique physical pieces, so there are no quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<Artwork>,
}

impl Cart {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append the artwork unless an entry with the same id is present.
    /// Returns whether it was added.
    pub fn add(&mut self, artwork: Artwork) -> bool {
        if self.contains(&artwork.id) {
            return false;
        }
        self.items.push(artwork);
        true
    }

    /// Remove the entry with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ArtworkId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &ArtworkId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artwork> {
        self.items.iter()
    }

    /// Sum of listed prices; unpriced entries count as zero
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price.unwrap_or(0.0)).sum()
    }

    /// Total as shown in the cart drawer, e.g. "$1,250"
    pub fn total_label(&self) -> String {
        format!("${}", format_price(self.total()))
    }
}
