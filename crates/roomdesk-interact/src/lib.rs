#![forbid(unsafe_code)]

//! Interaction layer for the Roomdesk spatial desktop.
//!
//! - [`raycast`]: screen-space ray construction plus pure hit tests
//!   against items, widgets, and room surfaces.
//! - [`gesture`]: the per-pointer state machine turning pointer events
//!   into scene mutations and feedback events.
//! - [`undo`]: the linear undo/redo command history.

pub mod gesture;
pub mod raycast;
pub mod undo;

pub use gesture::{GestureConfig, GestureEngine, PointerContext};
pub use raycast::{SurfaceHit, WidgetHit, hit_test_items, hit_test_surface, hit_test_widgets, ray_from_screen};
pub use undo::{Command, History};
