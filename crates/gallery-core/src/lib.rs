//! Gallery Core - Domain types and interaction state for the virtual gallery
//!
//! This crate provides the foundational pieces shared by the server and
//! the browser frontend:
//! - Artwork and artist types as returned by the hosted catalog
//! - The UI state container (selection, cart, panel visibility)
//! - The first-person movement controller
//! - Room description and picture-frame layout

pub mod artwork;
pub mod cart;
pub mod layout;
pub mod movement;
pub mod store;

pub use glam;

pub use artwork::{format_price, Artist, Artwork, ArtworkId, Dimensions, DimensionsError};
pub use cart::Cart;
pub use layout::{layout_frames, pick_frame, FramePlacement, FrameSpec, RoomSpec, Wall, WallSpec};
pub use movement::{FirstPersonController, LookAngles, MoveDirection, MovementKeys, RoomBounds, WalkSettings};
pub use store::{GalleryAction, GalleryStore};
