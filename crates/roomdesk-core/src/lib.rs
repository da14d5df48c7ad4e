#![forbid(unsafe_code)]

//! Core: entity model, scene container, geometry, and configuration.
//!
//! # Role in Roomdesk
//! `roomdesk-core` is the data layer. It owns the entity model (items,
//! piles, widgets), the scene aggregate the whole engine shares, the
//! geometric primitives interaction is built from, and the configuration
//! structs every tick consumes.
//!
//! # How it fits in the system
//! The solver (`roomdesk-sim`) mutates `SceneState` on the simulation
//! cadence; the interaction engine (`roomdesk-interact`) mutates it in
//! response to pointer input; the runtime (`roomdesk-runtime`) owns the
//! single shared instance and serializes both onto one queue. The external
//! renderer only ever reads.

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod item;
pub mod pile;
pub mod scene;
pub mod widget;

pub use config::{RoomBounds, SimConfig};
pub use error::{Result, RoomdeskError};
pub use events::{FeedbackEvent, PointerEvent, PointerPhase, WidgetInput};
pub use geometry::{Ray, point_in_polygon_xz};
pub use item::{AppBinding, DeskItem, ItemKind, Rgba, Surface, TextureHandle};
pub use pile::{EXPANDED_PAGE_SIZE, MIN_PILE_SIZE, Pile, PileLayout};
pub use scene::{ItemId, PileId, SceneState, WidgetId};
pub use widget::{WIDGET_MAX_HALF, WIDGET_MIN_HALF, WidgetItem};

// Re-export the math types used throughout the public API.
pub use glam::{Mat4, Vec2, Vec3, Vec4};
