#![forbid(unsafe_code)]

//! Simulation configuration and room bounds.
//!
//! Tunables are external configuration consumed on every solver tick; the
//! solver keeps no internal copies that could silently diverge from the
//! last applied values.

use serde::{Deserialize, Serialize};

use crate::item::Surface;

/// Room bounds and mode-dependent extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    /// Half extent of the finite room along x and z; walls sit at ±this.
    pub half_extent: f32,
    /// Enlarged floor half extent used in infinite mode.
    pub infinite_half_extent: f32,
    /// Room height (ceiling y).
    pub height: f32,
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            half_extent: 10.0,
            infinite_half_extent: 50.0,
            height: 12.0,
        }
    }
}

impl RoomBounds {
    /// Horizontal half extent active under the given mode.
    #[inline]
    #[must_use]
    pub fn active_half_extent(&self, infinite_mode: bool) -> f32 {
        if infinite_mode {
            self.infinite_half_extent
        } else {
            self.half_extent
        }
    }

    /// Coordinate of a wall plane. In infinite mode walls are disabled and
    /// this returns `None`.
    #[must_use]
    pub fn wall_plane(&self, surface: Surface, infinite_mode: bool) -> Option<(usize, f32)> {
        if infinite_mode {
            return None;
        }
        match surface {
            Surface::Floor => None,
            Surface::BackWall => Some((2, -self.half_extent)),
            Surface::LeftWall => Some((0, -self.half_extent)),
            Surface::RightWall => Some((0, self.half_extent)),
        }
    }
}

/// Per-tick physics and layout tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Velocity retained per tick (exponential decay multiplier).
    pub friction: f32,
    /// Bounce energy retention on constraint and collision response.
    pub restitution: f32,
    /// Per-tick downward velocity delta applied to wall-mounted items.
    pub gravity: f32,
    /// Fallback item scale for newly placed items.
    pub default_scale: f32,
    /// Base spacing unit for stack/grid layouts.
    pub grid_spacing_base: f32,
    /// Disables wall surfaces and widens the floor bound.
    pub infinite_mode: bool,
    /// Room geometry.
    pub room: RoomBounds,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.5,
            gravity: 0.1,
            default_scale: 1.0,
            grid_spacing_base: 2.0,
            infinite_mode: false,
            room: RoomBounds::default(),
        }
    }
}

impl SimConfig {
    /// Enable or disable infinite mode.
    #[must_use]
    pub fn with_infinite_mode(mut self, on: bool) -> Self {
        self.infinite_mode = on;
        self
    }

    /// Override friction (velocity decay per tick).
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Override gravity (per-tick velocity delta on wall items).
    #[must_use]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Override restitution (bounce energy retention).
    #[must_use]
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_mode_widens_floor_and_drops_walls() {
        let room = RoomBounds::default();
        assert_eq!(room.active_half_extent(false), 10.0);
        assert_eq!(room.active_half_extent(true), 50.0);
        assert!(room.wall_plane(Surface::BackWall, false).is_some());
        assert!(room.wall_plane(Surface::BackWall, true).is_none());
    }

    #[test]
    fn wall_planes_sit_at_half_extent() {
        let room = RoomBounds::default();
        assert_eq!(room.wall_plane(Surface::BackWall, false), Some((2, -10.0)));
        assert_eq!(room.wall_plane(Surface::LeftWall, false), Some((0, -10.0)));
        assert_eq!(room.wall_plane(Surface::RightWall, false), Some((0, 10.0)));
        assert_eq!(room.wall_plane(Surface::Floor, false), None);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let cfg = SimConfig::default().with_infinite_mode(true).with_gravity(0.2);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
