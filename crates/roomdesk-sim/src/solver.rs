#![forbid(unsafe_code)]

//! The per-tick physics and layout solver.
//!
//! [`advance`] runs once per fixed simulation tick (~16 ms target) and
//! mutates the scene in place. Pass order matters and is part of the
//! contract:
//!
//! 1. **Pile pass** — anchors are clamped into the room, then members
//!    integrate 10%-of-the-way toward their layout targets (critically
//!    damped exponential approach, not physical motion).
//! 2. **Free pass** — free items are dynamics bodies: wall gravity,
//!    position integration, exponential friction, then room-bound
//!    constraints with restitution bounces and wall→floor demotion.
//! 3. **Collision pass** — pairwise same-surface resolution with
//!    area-proportional mass (`scale²`), positional correction by mass
//!    ratio, and a restitution impulse only when the pair is closing.
//!
//! Free items may rest against anchors the pile pass just finalized, which
//! is why piles settle first.
//!
//! # Invariants
//!
//! 1. Pinned items and the currently dragged item are never moved by this
//!    pass (they act as infinite-mass anchors in collisions).
//! 2. All tunables come from the [`SimConfig`] passed in; the solver holds
//!    no state between ticks.
//!
//! Bumps (bounces and collision impulses above [`BUMP_THRESHOLD`]) are
//! reported through the sink closure; callers drive audio/haptics from
//! them.

use glam::Vec3;
use roomdesk_core::config::SimConfig;
use roomdesk_core::item::Surface;
use roomdesk_core::scene::{ItemId, SceneState};

use crate::layout;

/// Fraction of the remaining distance a pile member covers per tick.
pub const APPROACH_RATE: f32 = 0.1;

/// Minimum bounce/impulse magnitude worth reporting as a bump.
pub const BUMP_THRESHOLD: f32 = 0.1;

/// Advance the simulation by one tick.
///
/// `bump` receives the magnitude of every bounce or collision impulse
/// above [`BUMP_THRESHOLD`].
pub fn advance(scene: &mut SceneState, config: &SimConfig, bump: &mut dyn FnMut(f32)) {
    pile_pass(scene, config);
    free_pass(scene, config, bump);
    collision_pass(scene, config, bump);
}

// ---------------------------------------------------------------------------
// Pile pass
// ---------------------------------------------------------------------------

fn pile_pass(scene: &mut SceneState, config: &SimConfig) {
    let pile_ids: Vec<_> = scene.pile_ids().collect();
    let dragged = scene.dragged_item;
    for pid in pile_ids {
        let snapshot = {
            let Some(pile) = scene.pile_mut(pid) else { continue };
            clamp_anchor(pile, config);
            pile.clone()
        };
        for (index, &member) in snapshot.members.iter().enumerate() {
            if dragged == Some(member) {
                continue;
            }
            let target = layout::member_target(&snapshot, index, config);
            let Some(item) = scene.item_mut(member) else {
                continue;
            };
            item.position += (target.position - item.position) * APPROACH_RATE;
            let scale = item.scale();
            item.set_scale(scale + (target.scale - scale) * APPROACH_RATE);
            item.velocity = Vec3::ZERO;
        }
    }
}

/// Keep a pile's anchor (and height) inside the room given its footprint.
/// Larger piles need larger clearance.
fn clamp_anchor(pile: &mut roomdesk_core::pile::Pile, config: &SimConfig) {
    let footprint = pile.footprint_radius(config.grid_spacing_base);
    let half = (config.room.active_half_extent(config.infinite_mode) - footprint).max(0.0);
    pile.anchor.x = pile.anchor.x.clamp(-half, half);
    pile.anchor.z = pile.anchor.z.clamp(-half, half);
    let ceiling = (config.room.height - pile.scale).max(pile.scale);
    pile.anchor.y = pile.anchor.y.clamp(pile.scale, ceiling);
}

// ---------------------------------------------------------------------------
// Free pass
// ---------------------------------------------------------------------------

fn free_pass(scene: &mut SceneState, config: &SimConfig, bump: &mut dyn FnMut(f32)) {
    let ids: Vec<ItemId> = scene.free_items().to_vec();
    let dragged = scene.dragged_item;
    for id in ids {
        if dragged == Some(id) {
            continue;
        }
        let Some(item) = scene.item_mut(id) else {
            continue;
        };
        if item.pinned {
            continue;
        }

        // Wall-mounted items fall; floor items already rest on the plane.
        if item.surface.is_wall() {
            item.velocity.y -= config.gravity;
        }
        item.position += item.velocity;
        item.velocity *= config.friction;

        constrain_to_room(item, config, bump);

        // Wall items that reach the floor fall off the wall.
        if item.surface.is_wall() && item.position.y <= item.scale() {
            tracing::trace!(item = id.0, "wall item demoted to floor");
            item.surface = Surface::Floor;
        }
    }
}

/// Clamp an item into the room, reflecting the offending velocity
/// component by `-restitution` and reporting bounce magnitudes.
fn constrain_to_room(
    item: &mut roomdesk_core::item::DeskItem,
    config: &SimConfig,
    bump: &mut dyn FnMut(f32),
) {
    let scale = item.scale();
    let half = config.room.active_half_extent(config.infinite_mode) - scale;
    let half = half.max(0.0);
    let floor = scale;
    let ceiling = (config.room.height - scale).max(floor);

    for (axis, min, max) in [
        (0usize, -half, half),
        (1usize, floor, ceiling),
        (2usize, -half, half),
    ] {
        let p = item.position[axis];
        if p < min || p > max {
            item.position[axis] = p.clamp(min, max);
            let impact = item.velocity[axis].abs();
            item.velocity[axis] = -item.velocity[axis] * config.restitution;
            if impact > BUMP_THRESHOLD {
                bump(impact);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Collision pass
// ---------------------------------------------------------------------------

fn collision_pass(scene: &mut SceneState, config: &SimConfig, bump: &mut dyn FnMut(f32)) {
    let ids: Vec<ItemId> = scene.free_items().to_vec();
    let dragged = scene.dragged_item;
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            resolve_pair(scene, ids[i], ids[j], dragged, config, bump);
        }
    }
}

fn resolve_pair(
    scene: &mut SceneState,
    a: ItemId,
    b: ItemId,
    dragged: Option<ItemId>,
    config: &SimConfig,
    bump: &mut dyn FnMut(f32),
) {
    let Some((first, second)) = scene.item_pair_mut(a, b) else {
        return;
    };
    if first.surface != second.surface {
        return;
    }
    let delta = second.position - first.position;
    let dist = delta.length();
    let sum = first.scale() + second.scale();
    if dist >= sum {
        return;
    }

    // Coincident centers get an arbitrary but deterministic normal.
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::X };
    let overlap = sum - dist;

    // Pinned and dragged items are immovable anchors: infinite mass.
    let immovable_a = first.pinned || dragged == Some(a);
    let immovable_b = second.pinned || dragged == Some(b);
    let inv_a = if immovable_a { 0.0 } else { 1.0 / first.mass() };
    let inv_b = if immovable_b { 0.0 } else { 1.0 / second.mass() };
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    // Positional correction proportional to the other body's share of mass.
    first.position -= normal * (overlap * inv_a / inv_sum);
    second.position += normal * (overlap * inv_b / inv_sum);

    // Impulse only when the pair is closing.
    let closing = (first.velocity - second.velocity).dot(normal);
    if closing > 0.0 {
        let impulse = (1.0 + config.restitution) * closing / inv_sum;
        first.velocity -= normal * (impulse * inv_a);
        second.velocity += normal * (impulse * inv_b);
        if impulse > BUMP_THRESHOLD {
            bump(impulse);
        }
    }
}
