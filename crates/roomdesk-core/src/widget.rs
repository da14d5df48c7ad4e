#![forbid(unsafe_code)]

//! Embedded widgets: proxies for externally hosted views.
//!
//! A [`WidgetItem`] is independent of [`DeskItem`](crate::item::DeskItem):
//! it never joins a pile, is not simulated by the physics pass, and is
//! manipulated only by direct drag and corner resize.
//!
//! # Invariants
//!
//! 1. Half extents stay within [`WIDGET_MIN_HALF`]..=[`WIDGET_MAX_HALF`]
//!    per axis, enforced on every mutation path.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::item::{Surface, TextureHandle};

/// Minimum widget half extent per axis.
pub const WIDGET_MIN_HALF: f32 = 1.0;
/// Maximum widget half extent per axis.
pub const WIDGET_MAX_HALF: f32 = 5.0;

/// An embedded external view mounted on a room surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetItem {
    /// Host-side widget identity (opaque to the core).
    pub widget_id: u64,
    /// Center of the widget on its mounting plane.
    pub position: Vec3,
    /// Half extents along the surface's (primary, secondary) axes.
    half_extent: Vec2,
    /// Mounting surface.
    pub surface: Surface,
    /// Renderer-owned texture handle for the widget snapshot.
    pub texture: TextureHandle,
}

impl WidgetItem {
    /// Create a widget at a position on a surface with clamped extents.
    #[must_use]
    pub fn new(widget_id: u64, position: Vec3, half_extent: Vec2, surface: Surface) -> Self {
        Self {
            widget_id,
            position,
            half_extent: clamp_half(half_extent),
            surface,
            texture: TextureHandle::UNSET,
        }
    }

    /// Current half extents. Each axis lies in `[1.0, 5.0]`.
    #[inline]
    #[must_use]
    pub fn half_extent(&self) -> Vec2 {
        self.half_extent
    }

    /// Set the half extents, clamping each axis.
    pub fn set_half_extent(&mut self, half: Vec2) {
        self.half_extent = clamp_half(half);
    }

    /// Map a point on the mounting plane to widget-local UV in `[0, 1]²`,
    /// or `None` if the point lies outside the footprint.
    #[must_use]
    pub fn uv_at(&self, point: Vec3) -> Option<Vec2> {
        let rel = point - self.position;
        let u = rel.dot(self.surface.primary_axis());
        let v = rel.dot(self.surface.secondary_axis());
        if u.abs() <= self.half_extent.x && v.abs() <= self.half_extent.y {
            Some(Vec2::new(
                (u / self.half_extent.x + 1.0) * 0.5,
                (v / self.half_extent.y + 1.0) * 0.5,
            ))
        } else {
            None
        }
    }
}

fn clamp_half(half: Vec2) -> Vec2 {
    Vec2::new(
        half.x.clamp(WIDGET_MIN_HALF, WIDGET_MAX_HALF),
        half.y.clamp(WIDGET_MIN_HALF, WIDGET_MAX_HALF),
    )
}
