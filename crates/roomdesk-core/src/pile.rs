#![forbid(unsafe_code)]

//! Piles: user-grouped, ordered collections of desk items.
//!
//! A pile owns its members by id; an item belongs to at most one pile at
//! a time, and a piled item is never in the scene's free set (membership
//! is exclusive — audited by [`SceneState`](crate::scene::SceneState)).
//!
//! # Invariants
//!
//! 1. A live pile has at least [`MIN_PILE_SIZE`] members; dropping below
//!    that dissolves it.
//! 2. `current_index < members.len()` whenever the pile is non-empty.
//! 3. System piles (e.g. "Recents") are never user-deletable.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::item::Surface;
use crate::scene::ItemId;

/// Minimum membership for a pile to exist.
pub const MIN_PILE_SIZE: usize = 2;

/// Items per page when a pile is expanded as an open folder.
pub const EXPANDED_PAGE_SIZE: usize = 16;

/// How pile members are arranged by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PileLayout {
    /// Leafed deck along the surface normal; the current leaf is raised.
    #[default]
    Stack,
    /// `ceil(sqrt(n))`-column grid on the surface plane.
    Grid,
    /// Linear strip along the surface's primary axis, centered on the
    /// current index.
    Carousel,
}

/// An ordered collection of desk items sharing one anchor and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pile {
    /// Member item ids, in leaf order.
    pub members: Vec<ItemId>,
    /// Anchor position on the active surface.
    pub anchor: Vec3,
    /// Surface the pile is mounted on.
    pub surface: Surface,
    /// Active layout algorithm.
    pub layout: PileLayout,
    /// Open-folder mode: paginated 4-column grid above the floor.
    pub expanded: bool,
    /// Fan-out override: members spread symmetrically around the anchor.
    pub fanned_out: bool,
    /// Pile scale; member targets and spacing scale with it.
    pub scale: f32,
    /// Non-deletable system pile (e.g. "Recents").
    pub system: bool,
    /// Which leaf is frontmost (stack) or centered (carousel).
    pub current_index: usize,
    /// Page index while expanded.
    pub scroll_index: usize,
}

impl Pile {
    /// Create a pile from members at an anchor.
    #[must_use]
    pub fn new(members: Vec<ItemId>, anchor: Vec3, surface: Surface) -> Self {
        Self {
            members,
            anchor,
            surface,
            layout: PileLayout::Stack,
            expanded: false,
            fanned_out: false,
            scale: 1.0,
            system: false,
            current_index: 0,
            scroll_index: 0,
        }
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pile has no members (pending dissolution).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether this id is a member.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.members.contains(&id)
    }

    /// Advance the current leaf by `steps` (may be negative), wrapping.
    pub fn advance_leaf(&mut self, steps: i64) {
        let n = self.members.len();
        if n == 0 {
            return;
        }
        let n_i = n as i64;
        let next = (self.current_index as i64 + steps).rem_euclid(n_i);
        self.current_index = next as usize;
    }

    /// Clamp `current_index` and `scroll_index` after membership changes.
    pub fn clamp_indices(&mut self) {
        let n = self.members.len();
        if n == 0 {
            self.current_index = 0;
            self.scroll_index = 0;
            return;
        }
        self.current_index = self.current_index.min(n - 1);
        let last_page = (n - 1) / EXPANDED_PAGE_SIZE;
        self.scroll_index = self.scroll_index.min(last_page);
    }

    /// Clearance radius the pile needs on its surface.
    ///
    /// Grows with member count and layout: a carousel strip is much wider
    /// than a stack, a grid sits in between. Used when clamping the anchor
    /// inside the room.
    #[must_use]
    pub fn footprint_radius(&self, grid_spacing_base: f32) -> f32 {
        let n = self.len().max(1) as f32;
        let spacing = grid_spacing_base * self.scale;
        if self.expanded {
            // Fixed 4-column grid.
            2.0 * spacing
        } else if self.fanned_out {
            n * 0.5 * spacing
        } else {
            match self.layout {
                PileLayout::Stack => self.scale,
                PileLayout::Grid => n.sqrt().ceil() * 0.5 * spacing,
                PileLayout::Carousel => 3.5 * self.scale,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pile(n: usize) -> Pile {
        Pile::new(
            (0..n as u32).map(ItemId).collect(),
            Vec3::ZERO,
            Surface::Floor,
        )
    }

    #[test]
    fn leaf_wraps_forward_and_back() {
        let mut p = pile(3);
        p.advance_leaf(1);
        assert_eq!(p.current_index, 1);
        p.advance_leaf(2);
        assert_eq!(p.current_index, 0);
        p.advance_leaf(-1);
        assert_eq!(p.current_index, 2);
        p.advance_leaf(-7);
        assert_eq!(p.current_index, 1);
    }

    #[test]
    fn leaf_on_empty_pile_is_noop() {
        let mut p = pile(0);
        p.advance_leaf(5);
        assert_eq!(p.current_index, 0);
    }

    #[test]
    fn clamp_indices_after_shrink() {
        let mut p = pile(20);
        p.current_index = 19;
        p.scroll_index = 1;
        p.members.truncate(4);
        p.clamp_indices();
        assert_eq!(p.current_index, 3);
        assert_eq!(p.scroll_index, 0);
    }

    proptest::proptest! {
        #[test]
        fn leaf_index_stays_in_bounds(
            n in 1usize..24,
            steps in proptest::collection::vec(-5i64..5, 0..16),
        ) {
            let mut p = pile(n);
            for s in steps {
                p.advance_leaf(s);
                proptest::prop_assert!(p.current_index < n);
            }
        }
    }

    #[test]
    fn footprint_grows_with_count() {
        let small = pile(2).footprint_radius(2.0);
        let mut big = pile(30);
        big.layout = PileLayout::Grid;
        let mut small_grid = pile(2);
        small_grid.layout = PileLayout::Grid;
        assert!(big.footprint_radius(2.0) > small_grid.footprint_radius(2.0));
        assert!(small > 0.0);
    }
}
