#![forbid(unsafe_code)]

//! Simulation layer for the Roomdesk spatial desktop.
//!
//! Three concerns live here:
//!
//! - [`layout`]: pure per-member target computation for piles (stack,
//!   grid, carousel, fan-out, open-folder pagination).
//! - [`solver`]: the per-tick physics pass — pile settling, free-item
//!   gravity and friction, room containment, sphere collisions.
//! - [`camera`]: view-mode state machine with exponentially smoothed
//!   camera pose.
//!
//! # Invariants
//!
//! - [`solver::advance`] runs its passes in a fixed order (piles, then
//!   free items, then collisions) so pile membership observed at the top
//!   of a tick holds throughout it.
//! - Layout functions never mutate the scene; only the solver writes item
//!   positions.

pub mod camera;
pub mod layout;
pub mod solver;

pub use camera::{CameraController, ViewMode};
pub use layout::{LayoutTarget, member_target};
pub use solver::advance;
