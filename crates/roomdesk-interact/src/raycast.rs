#![forbid(unsafe_code)]

//! Screen-space ray construction and world hit testing.
//!
//! A touch point becomes a world ray by unprojecting its near-plane and
//! far-plane clip coordinates through the inverse view-projection matrix
//! (with perspective divide). Hit tests then run against items (sphere
//! threshold around the center), widgets (footprint on the mounting
//! plane), and the room surfaces themselves.
//!
//! # Failure Modes
//!
//! Every function here is total: a degenerate ray, a singular matrix, or
//! any non-finite intermediate yields `None`, never a panic or NaN leak.
//! Hit tests are pure; they read the scene and touch nothing.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use roomdesk_core::config::SimConfig;
use roomdesk_core::geometry::Ray;
use roomdesk_core::item::Surface;
use roomdesk_core::scene::{ItemId, SceneState, WidgetId};
use roomdesk_core::widget::WidgetItem;
use roomdesk_sim::camera::CameraController;

/// Pick-sphere radius as a multiple of item scale. Deliberately generous
/// for touch input.
pub const HIT_RADIUS_FACTOR: f32 = 1.8;

/// UV band (from each edge) that counts as a resize corner on a widget.
pub const CORNER_UV: f32 = 0.15;

/// A surface hit: which plane, where, and how far along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub surface: Surface,
    pub point: Vec3,
    pub t: f32,
}

/// A widget hit, with the UV coordinate inside the widget footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetHit {
    pub id: WidgetId,
    pub point: Vec3,
    pub uv: Vec2,
    pub t: f32,
}

impl WidgetHit {
    /// Whether the hit lands in a corner band (resize handle region).
    #[must_use]
    pub fn is_corner(&self) -> bool {
        let near_edge = |c: f32| c <= CORNER_UV || c >= 1.0 - CORNER_UV;
        near_edge(self.uv.x) && near_edge(self.uv.y)
    }
}

/// Build a world ray from a screen position.
///
/// `screen` is in pixels with origin top-left; `viewport` is the surface
/// size in pixels. Returns `None` for an empty viewport or a degenerate
/// unprojection.
#[must_use]
pub fn ray_from_screen(screen: Vec2, viewport: Vec2, camera: &CameraController) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        1.0 - screen.y / viewport.y * 2.0,
    );
    let view_proj = camera.projection_matrix(viewport.x / viewport.y) * camera.view_matrix();
    let inverse = view_proj.inverse();
    // glam's perspective_rh maps the near plane to depth 0, far to 1.
    let origin = unproject(inverse, ndc, 0.0)?;
    let end = unproject(inverse, ndc, 1.0)?;
    let ray = Ray::new(origin, end);
    ray.is_valid().then_some(ray)
}

fn unproject(inverse: Mat4, ndc: Vec2, depth: f32) -> Option<Vec3> {
    let clip = inverse * Vec4::new(ndc.x, ndc.y, depth, 1.0);
    if !clip.is_finite() || clip.w.abs() <= f32::EPSILON {
        return None;
    }
    let world = clip.xyz() / clip.w;
    world.is_finite().then_some(world)
}

/// Nearest item under the ray, free or piled.
///
/// An item counts as hit when the ray's closest approach to its center is
/// within [`HIT_RADIUS_FACTOR`] times its scale; among hits, the smallest
/// positive ray parameter wins.
#[must_use]
pub fn hit_test_items(scene: &SceneState, ray: Ray) -> Option<(ItemId, f32)> {
    let mut best: Option<(ItemId, f32)> = None;
    for id in scene.all_item_ids() {
        let Some(item) = scene.item(id) else { continue };
        let Some((t, dist)) = ray.closest_approach(item.position) else {
            continue;
        };
        if t <= 0.0 || dist > HIT_RADIUS_FACTOR * item.scale() {
            continue;
        }
        if best.is_none_or(|(_, bt)| t < bt) {
            best = Some((id, t));
        }
    }
    best
}

/// Nearest widget whose footprint contains the ray/plane intersection.
#[must_use]
pub fn hit_test_widgets(scene: &SceneState, ray: Ray) -> Option<WidgetHit> {
    let mut best: Option<WidgetHit> = None;
    for id in scene.widget_ids() {
        let Some(widget) = scene.widget(id) else {
            continue;
        };
        let (axis, value) = mounting_plane(widget);
        let Some(t) = ray.plane_hit_t(axis, value) else {
            continue;
        };
        if t <= 0.0 {
            continue;
        }
        let point = ray.point_at(t);
        let Some(uv) = widget.uv_at(point) else {
            continue;
        };
        if best.is_none_or(|b| t < b.t) {
            best = Some(WidgetHit { id, point, uv, t });
        }
    }
    best
}

/// Axis-aligned plane a widget is mounted on.
fn mounting_plane(widget: &WidgetItem) -> (usize, f32) {
    match widget.surface {
        Surface::Floor => (1, widget.position.y),
        Surface::BackWall => (2, widget.position.z),
        Surface::LeftWall | Surface::RightWall => (0, widget.position.x),
    }
}

/// Nearest room surface hit within the room's finite extent.
///
/// Walls are excluded in infinite mode; the floor always participates,
/// with its extent widened accordingly.
#[must_use]
pub fn hit_test_surface(ray: Ray, config: &SimConfig) -> Option<SurfaceHit> {
    let room = &config.room;
    let half = room.active_half_extent(config.infinite_mode);
    let mut best: Option<SurfaceHit> = None;
    let mut consider = |surface: Surface, t: f32, point: Vec3| {
        if best.is_none_or(|b| t < b.t) {
            best = Some(SurfaceHit { surface, point, t });
        }
    };

    if let Some(t) = ray.plane_hit_t(1, 0.0)
        && t > 0.0
    {
        let p = ray.point_at(t);
        if p.x.abs() <= half && p.z.abs() <= half {
            consider(Surface::Floor, t, p);
        }
    }

    for wall in [Surface::BackWall, Surface::LeftWall, Surface::RightWall] {
        let Some((axis, value)) = room.wall_plane(wall, config.infinite_mode) else {
            continue;
        };
        let Some(t) = ray.plane_hit_t(axis, value) else {
            continue;
        };
        if t <= 0.0 {
            continue;
        }
        let p = ray.point_at(t);
        let lateral = if wall == Surface::BackWall { p.x } else { p.z };
        if lateral.abs() <= half && p.y >= 0.0 && p.y <= room.height {
            consider(wall, t, p);
        }
    }
    best
}
