#![forbid(unsafe_code)]

//! Pile layout algorithms: pure target computation.
//!
//! Each function answers "where should member `i` of this pile be, and at
//! what scale" — nothing here mutates the scene. The solver integrates
//! items 10%-of-the-way toward these targets each tick, which is what
//! produces the smooth settling.
//!
//! Layout precedence: an **expanded** pile always uses the open-folder
//! grid; a **fanned-out** pile uses the symmetric fan; otherwise the
//! pile's [`PileLayout`] mode applies.

use glam::Vec3;
use roomdesk_core::config::SimConfig;
use roomdesk_core::pile::{EXPANDED_PAGE_SIZE, Pile, PileLayout};

/// Per-index offset along the surface normal in a stacked deck, scaled by
/// pile scale. Small enough to read as fanned leaves.
pub const STACK_LEAF_STEP: f32 = 0.05;

/// How far the current leaf is raised out of a stacked deck, scaled by
/// pile scale.
pub const STACK_RAISE: f32 = 1.0;

/// Carousel spacing multiplier per index step.
pub const CAROUSEL_SPACING: f32 = 3.5;

/// Columns in the open-folder grid.
pub const EXPANDED_COLUMNS: usize = 4;

/// Height of the open-folder grid above the floor plane.
pub const EXPANDED_HEIGHT: f32 = 3.05;

/// Parking coordinate for off-page members of an expanded pile. Items are
/// parked, not removed, so pagination math keeps stable indices.
pub const PARKED_Y: f32 = -10.0;

/// Where a pile member should head, and at what scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTarget {
    pub position: Vec3,
    pub scale: f32,
}

/// Compute the layout target for member `index` of `pile`.
///
/// `index` must be less than `pile.len()`; callers iterate the member
/// list, so this holds by construction.
#[must_use]
pub fn member_target(pile: &Pile, index: usize, config: &SimConfig) -> LayoutTarget {
    if pile.expanded {
        return expanded_target(pile, index, config);
    }
    let spacing = config.grid_spacing_base * pile.scale;
    let position = if pile.fanned_out {
        fan_position(pile, index, spacing)
    } else {
        match pile.layout {
            PileLayout::Stack => stack_position(pile, index),
            PileLayout::Grid => grid_position(pile, index, spacing),
            PileLayout::Carousel => carousel_position(pile, index),
        }
    };
    LayoutTarget {
        position,
        scale: pile.scale,
    }
}

/// Stacked deck: leaves offset along the surface normal; the current leaf
/// is raised out of the pile.
fn stack_position(pile: &Pile, index: usize) -> Vec3 {
    let normal = pile.surface.normal();
    let mut pos = pile.anchor + normal * (index as f32 * STACK_LEAF_STEP * pile.scale);
    if index == pile.current_index {
        pos += normal * (STACK_RAISE * pile.scale);
    }
    pos
}

/// `ceil(sqrt(n))`-column grid centered on the anchor, on the surface plane.
fn grid_position(pile: &Pile, index: usize, spacing: f32) -> Vec3 {
    let n = pile.len().max(1);
    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let (col, row) = (index % cols, index / cols);
    let u = (col as f32 - (cols - 1) as f32 * 0.5) * spacing;
    let v = (row as f32 - (rows - 1) as f32 * 0.5) * spacing;
    pile.anchor + pile.surface.primary_axis() * u + pile.surface.secondary_axis() * v
}

/// Linear strip along the surface's primary axis, centered on the current
/// index. Far members are off-frame but logically present.
fn carousel_position(pile: &Pile, index: usize) -> Vec3 {
    let offset = (index as f32 - pile.current_index as f32) * CAROUSEL_SPACING * pile.scale;
    pile.anchor + pile.surface.primary_axis() * offset
}

/// Symmetric spread around the anchor (fan-out override, any layout mode).
fn fan_position(pile: &Pile, index: usize, spacing: f32) -> Vec3 {
    let n = pile.len().max(1);
    let offset = (index as f32 - (n - 1) as f32 * 0.5) * spacing;
    pile.anchor + pile.surface.primary_axis() * offset
}

/// Open-folder grid: fixed 4 columns at a constant height above the floor,
/// paginated; off-page members park below the floor.
fn expanded_target(pile: &Pile, index: usize, config: &SimConfig) -> LayoutTarget {
    let page_start = pile.scroll_index * EXPANDED_PAGE_SIZE;
    let on_page = index >= page_start && index < page_start + EXPANDED_PAGE_SIZE;
    let spacing = config.grid_spacing_base * pile.scale;
    let position = if on_page {
        let local = index - page_start;
        let (col, row) = (local % EXPANDED_COLUMNS, local / EXPANDED_COLUMNS);
        let u = (col as f32 - (EXPANDED_COLUMNS - 1) as f32 * 0.5) * spacing;
        let v = (row as f32 - 1.5) * spacing;
        Vec3::new(pile.anchor.x + u, EXPANDED_HEIGHT, pile.anchor.z + v)
    } else {
        Vec3::new(pile.anchor.x, PARKED_Y, pile.anchor.z)
    };
    LayoutTarget {
        position,
        scale: config.default_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomdesk_core::item::Surface;
    use roomdesk_core::scene::ItemId;

    fn pile(n: usize, surface: Surface) -> Pile {
        Pile::new(
            (0..n as u32).map(ItemId).collect(),
            Vec3::new(0.0, 1.0, 0.0),
            surface,
        )
    }

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn stack_raises_current_leaf() {
        let mut p = pile(5, Surface::Floor);
        p.current_index = 2;
        let raised = member_target(&p, 2, &cfg()).position;
        let flat = member_target(&p, 3, &cfg()).position;
        // Floor normal is +Y; the raised leaf clears its neighbors.
        assert!(raised.y > flat.y);
        assert!((raised.y - (1.0 + 2.0 * STACK_LEAF_STEP + STACK_RAISE)).abs() < 1e-6);
    }

    #[test]
    fn stack_on_wall_offsets_along_normal() {
        let p = pile(3, Surface::BackWall);
        let a = member_target(&p, 1, &cfg()).position;
        // BackWall normal is +Z.
        assert!((a.z - STACK_LEAF_STEP).abs() < 1e-6);
        assert_eq!(a.x, 0.0);
    }

    #[test]
    fn grid_uses_square_column_count() {
        let p = {
            let mut p = pile(9, Surface::Floor);
            p.layout = PileLayout::Grid;
            p
        };
        // 9 items -> 3 columns; spacing 2.0 * scale 1.0.
        let first = member_target(&p, 0, &cfg()).position;
        let last = member_target(&p, 8, &cfg()).position;
        assert!((first.x - (-2.0)).abs() < 1e-6);
        assert!((last.x - 2.0).abs() < 1e-6);
        assert!((last.z - first.z - 4.0).abs() < 1e-6);
    }

    #[test]
    fn carousel_centers_current_index() {
        let mut p = pile(7, Surface::BackWall);
        p.layout = PileLayout::Carousel;
        p.current_index = 3;
        let center = member_target(&p, 3, &cfg()).position;
        let next = member_target(&p, 4, &cfg()).position;
        assert_eq!(center, p.anchor);
        // BackWall primary axis is +X; one step is 3.5 * scale.
        assert!((next.x - CAROUSEL_SPACING).abs() < 1e-6);
    }

    #[test]
    fn fan_is_symmetric() {
        let mut p = pile(5, Surface::Floor);
        p.fanned_out = true;
        let left = member_target(&p, 0, &cfg()).position;
        let mid = member_target(&p, 2, &cfg()).position;
        let right = member_target(&p, 4, &cfg()).position;
        assert_eq!(mid, p.anchor);
        assert!((left.x + right.x).abs() < 1e-6);
    }

    #[test]
    fn fan_overrides_layout_mode() {
        let mut p = pile(3, Surface::Floor);
        p.layout = PileLayout::Grid;
        p.fanned_out = true;
        let mid = member_target(&p, 1, &cfg()).position;
        assert_eq!(mid, p.anchor);
    }

    #[test]
    fn expanded_places_active_page_and_parks_rest() {
        let mut p = pile(20, Surface::Floor);
        p.expanded = true;
        p.scroll_index = 0;
        let on_page = member_target(&p, 0, &cfg());
        let off_page = member_target(&p, 17, &cfg());
        assert!((on_page.position.y - EXPANDED_HEIGHT).abs() < 1e-6);
        assert_eq!(off_page.position.y, PARKED_Y);

        p.scroll_index = 1;
        let now_on = member_target(&p, 17, &cfg());
        let now_off = member_target(&p, 0, &cfg());
        assert!((now_on.position.y - EXPANDED_HEIGHT).abs() < 1e-6);
        assert_eq!(now_off.position.y, PARKED_Y);
    }

    #[test]
    fn expanded_grid_is_four_wide() {
        let mut p = pile(16, Surface::Floor);
        p.expanded = true;
        let row0 = member_target(&p, 3, &cfg()).position;
        let row1 = member_target(&p, 4, &cfg()).position;
        // Index 4 wraps to the next row: x resets, z advances.
        assert!(row1.x < row0.x);
        assert!(row1.z > row0.z);
    }
}
