#![forbid(unsafe_code)]

//! Desk items: the spatial/visual unit of the desktop.
//!
//! A [`DeskItem`] is a bag of independent aspects rather than a class
//! hierarchy: the transform and appearance aspects are always present as
//! plain fields, while the app binding and text aspects are `Option`s.
//! "Every item has a transform" is therefore a type-level guarantee, not
//! a runtime lookup.
//!
//! # Invariants
//!
//! 1. `scale > 0` — enforced by [`DeskItem::set_scale`] (clamped to a
//!    minimum), never by callers.
//! 2. `surface` is always one of the four room planes.
//! 3. Pinned items are ignored by gravity and collision response but may
//!    still be repositioned by an explicit drag.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest scale an item may take. Keeps mass (`scale²`) non-zero.
pub const MIN_ITEM_SCALE: f32 = 0.05;

/// One of the four mounting planes of the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Floor,
    BackWall,
    LeftWall,
    RightWall,
}

impl Surface {
    /// Outward unit normal (pointing into the room).
    #[must_use]
    pub const fn normal(self) -> Vec3 {
        match self {
            Surface::Floor => Vec3::Y,
            Surface::BackWall => Vec3::Z,
            Surface::LeftWall => Vec3::X,
            Surface::RightWall => Vec3::NEG_X,
        }
    }

    /// Primary in-plane axis, used by carousel and fan layouts.
    ///
    /// Floor and back wall run along world X; the side walls run along
    /// world Z.
    #[must_use]
    pub const fn primary_axis(self) -> Vec3 {
        match self {
            Surface::Floor | Surface::BackWall => Vec3::X,
            Surface::LeftWall | Surface::RightWall => Vec3::Z,
        }
    }

    /// Secondary in-plane axis (completes the plane basis).
    #[must_use]
    pub const fn secondary_axis(self) -> Vec3 {
        match self {
            Surface::Floor => Vec3::Z,
            Surface::BackWall | Surface::LeftWall | Surface::RightWall => Vec3::Y,
        }
    }

    /// Whether this surface is one of the three walls.
    #[inline]
    #[must_use]
    pub const fn is_wall(self) -> bool {
        !matches!(self, Surface::Floor)
    }
}

/// What an item looks like / behaves as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    App,
    StickyNote,
    PhotoFrame,
    WebWidget,
    RecentApp,
    AppDrawer,
}

/// Render color, straight-alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Opaque GPU texture handle owned by the external renderer.
///
/// The core never dereferences these; it only stores them and resets them
/// to [`TextureHandle::UNSET`] when the underlying image must be re-uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Sentinel for "no texture uploaded yet".
    pub const UNSET: TextureHandle = TextureHandle(u32::MAX);

    /// Whether a real handle is present.
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0 != u32::MAX
    }

    /// Reset to the unset sentinel, forcing the renderer to re-upload.
    pub fn invalidate(&mut self) {
        *self = TextureHandle::UNSET;
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        TextureHandle::UNSET
    }
}

/// Reference to an external application descriptor.
///
/// The core treats all of this as opaque value data supplied by the app
/// catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppBinding {
    /// Package identity, e.g. `org.example.notes`.
    pub package: String,
    /// Human-readable label.
    pub label: String,
    /// Icon texture handle (renderer-owned).
    pub icon: TextureHandle,
    /// Optional window snapshot texture handle.
    pub snapshot: TextureHandle,
    /// Catalog category, used for category grouping.
    pub category: Option<String>,
}

impl AppBinding {
    #[must_use]
    pub fn new(package: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            label: label.into(),
            icon: TextureHandle::UNSET,
            snapshot: TextureHandle::UNSET,
            category: None,
        }
    }
}

/// A desk item: icon, note, photo, or drawer living in the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskItem {
    // Transform aspect (always present).
    pub position: Vec3,
    pub velocity: Vec3,
    scale: f32,
    pub pinned: bool,
    pub surface: Surface,

    // Appearance aspect (always present).
    pub kind: ItemKind,
    pub color: Rgba,
    pub texture: TextureHandle,

    // Optional aspects.
    pub app: Option<AppBinding>,
    pub text: Option<String>,
}

impl DeskItem {
    /// Create an item of the given kind at a position on a surface.
    ///
    /// Velocity starts at zero; scale at `1.0`; unpinned.
    #[must_use]
    pub fn new(kind: ItemKind, position: Vec3, surface: Surface) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            scale: 1.0,
            pinned: false,
            surface,
            kind,
            color: Rgba::WHITE,
            texture: TextureHandle::UNSET,
            app: None,
            text: None,
        }
    }

    /// Attach an application binding.
    #[must_use]
    pub fn with_app(mut self, app: AppBinding) -> Self {
        self.app = Some(app);
        self
    }

    /// Attach free-form text (note body, URL).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Current scale. Always `> 0`.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the scale, clamped to [`MIN_ITEM_SCALE`].
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() {
            scale.max(MIN_ITEM_SCALE)
        } else {
            MIN_ITEM_SCALE
        };
    }

    /// Collision mass. Area-proportional (`scale²`), not volume, so small
    /// icons are not trivially flung by large ones.
    #[inline]
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.scale * self.scale
    }

    /// Package id of the bound app, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.app.as_ref().map(|a| a.package.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_clamped_positive() {
        let mut item = DeskItem::new(ItemKind::App, Vec3::ZERO, Surface::Floor);
        item.set_scale(-3.0);
        assert_eq!(item.scale(), MIN_ITEM_SCALE);
        item.set_scale(f32::NAN);
        assert_eq!(item.scale(), MIN_ITEM_SCALE);
        item.set_scale(2.5);
        assert_eq!(item.scale(), 2.5);
    }

    #[test]
    fn mass_is_area_proportional() {
        let mut item = DeskItem::new(ItemKind::App, Vec3::ZERO, Surface::Floor);
        item.set_scale(3.0);
        assert_eq!(item.mass(), 9.0);
    }

    #[test]
    fn surface_axes_are_orthonormal() {
        for s in [
            Surface::Floor,
            Surface::BackWall,
            Surface::LeftWall,
            Surface::RightWall,
        ] {
            assert!(s.normal().dot(s.primary_axis()).abs() < 1e-6);
            assert!(s.normal().dot(s.secondary_axis()).abs() < 1e-6);
            assert!(s.primary_axis().dot(s.secondary_axis()).abs() < 1e-6);
        }
    }

    #[test]
    fn texture_handle_sentinel() {
        let mut h = TextureHandle(7);
        assert!(h.is_set());
        h.invalidate();
        assert!(!h.is_set());
        assert_eq!(h, TextureHandle::UNSET);
    }

    #[test]
    fn only_floor_is_not_a_wall() {
        assert!(!Surface::Floor.is_wall());
        assert!(Surface::BackWall.is_wall());
        assert!(Surface::LeftWall.is_wall());
        assert!(Surface::RightWall.is_wall());
    }
}
