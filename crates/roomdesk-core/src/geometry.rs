#![forbid(unsafe_code)]

//! Geometric primitives for ray-cast interaction.
//!
//! All vector math is `glam`-based ([`Vec3`], [`Mat4`] are re-exported from
//! the crate root). This module adds the pieces glam does not carry: a
//! two-point [`Ray`], safe axis-aligned plane intersection, closest-approach
//! queries, and the even-odd point-in-polygon test used by lasso selection.
//!
//! # Failure Modes
//!
//! Degenerate geometry is never an error. A zero-length ray direction, a
//! ray parallel to a plane, or any non-finite intermediate value makes the
//! query answer "no intersection" (`None`). Callers must not observe NaN
//! or a division by zero from any function here.

use glam::Vec3;

/// Squared-length below which a ray direction is considered degenerate.
const DEGENERATE_DIR_SQ: f32 = 1e-12;

/// A world-space ray described by its origin and a second point along it.
///
/// Storing an end point (rather than a normalized direction) matches how
/// the ray is produced: near-plane and far-plane unprojections of a screen
/// coordinate. `t = 0` is the origin, `t = 1` is the end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Near-plane unprojection (camera side).
    pub origin: Vec3,
    /// Far-plane unprojection.
    pub end: Vec3,
}

impl Ray {
    /// Create a ray from two points.
    #[inline]
    #[must_use]
    pub const fn new(origin: Vec3, end: Vec3) -> Self {
        Self { origin, end }
    }

    /// Un-normalized direction (`end - origin`).
    #[inline]
    #[must_use]
    pub fn dir(&self) -> Vec3 {
        self.end - self.origin
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.dir() * t
    }

    /// Whether the ray has a usable direction and finite endpoints.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin.is_finite() && self.end.is_finite() && self.dir().length_squared() > DEGENERATE_DIR_SQ
    }

    /// Closest approach of the ray to a point.
    ///
    /// Returns `(t, distance)` where `t` is the ray parameter of the closest
    /// point and `distance` is the separation there. `None` if the ray is
    /// degenerate or the result is non-finite.
    #[must_use]
    pub fn closest_approach(&self, center: Vec3) -> Option<(f32, f32)> {
        let d = self.dir();
        let len_sq = d.length_squared();
        if len_sq <= DEGENERATE_DIR_SQ {
            return None;
        }
        let t = (center - self.origin).dot(d) / len_sq;
        let dist = (center - self.point_at(t)).length();
        if t.is_finite() && dist.is_finite() {
            Some((t, dist))
        } else {
            None
        }
    }

    /// Intersection parameter with an axis-aligned plane `axis == value`.
    ///
    /// `axis` selects the coordinate (0 = x, 1 = y, 2 = z). Returns `None`
    /// when the ray is parallel to the plane or the parameter is non-finite.
    /// The caller decides whether negative `t` (behind the origin) counts.
    #[must_use]
    pub fn plane_hit_t(&self, axis: usize, value: f32) -> Option<f32> {
        let d = self.dir();
        let denom = d[axis];
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let t = (value - self.origin[axis]) / denom;
        t.is_finite().then_some(t)
    }
}

/// Even-odd test: does `(x, z)` fall inside the polygon's floor projection?
///
/// `polygon` is the lasso vertex buffer; only the x/z components are used.
/// Fewer than three vertices never contain anything.
#[must_use]
pub fn point_in_polygon_xz(x: f32, z: f32, polygon: &[Vec3]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, zi) = (polygon[i].x, polygon[i].z);
        let (xj, zj) = (polygon[j].x, polygon[j].z);
        // Edge crosses the horizontal ray from (x, z) toward +x.
        if ((zi > z) != (zj > z)) && x < (xj - xi) * (z - zi) / (zj - zi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn ray_point_at() {
        let ray = Ray::new(v(0.0, 0.0, 0.0), v(0.0, 0.0, 10.0));
        assert_eq!(ray.point_at(0.5), v(0.0, 0.0, 5.0));
    }

    #[test]
    fn closest_approach_perpendicular() {
        let ray = Ray::new(v(0.0, 0.0, 0.0), v(10.0, 0.0, 0.0));
        let (t, dist) = ray.closest_approach(v(5.0, 3.0, 0.0)).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        assert!((dist - 3.0).abs() < 1e-6);
    }

    #[test]
    fn closest_approach_degenerate_ray() {
        let ray = Ray::new(v(1.0, 1.0, 1.0), v(1.0, 1.0, 1.0));
        assert!(ray.closest_approach(v(0.0, 0.0, 0.0)).is_none());
        assert!(!ray.is_valid());
    }

    #[test]
    fn plane_hit_basic() {
        let ray = Ray::new(v(0.0, 5.0, 0.0), v(0.0, -5.0, 0.0));
        let t = ray.plane_hit_t(1, 0.0).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        assert_eq!(ray.point_at(t).y, 0.0);
    }

    #[test]
    fn plane_hit_parallel_is_none() {
        let ray = Ray::new(v(0.0, 5.0, 0.0), v(10.0, 5.0, 0.0));
        assert!(ray.plane_hit_t(1, 0.0).is_none());
    }

    #[test]
    fn plane_hit_behind_origin_is_negative() {
        let ray = Ray::new(v(0.0, 5.0, 0.0), v(0.0, 6.0, 0.0));
        let t = ray.plane_hit_t(1, 0.0).unwrap();
        assert!(t < 0.0);
    }

    #[test]
    fn polygon_contains_interior_point() {
        let quad = [
            v(-1.0, 0.0, -1.0),
            v(1.0, 0.0, -1.0),
            v(1.0, 0.0, 1.0),
            v(-1.0, 0.0, 1.0),
        ];
        assert!(point_in_polygon_xz(0.0, 0.0, &quad));
        assert!(point_in_polygon_xz(0.9, -0.9, &quad));
    }

    #[test]
    fn polygon_excludes_exterior_point() {
        let quad = [
            v(-1.0, 0.0, -1.0),
            v(1.0, 0.0, -1.0),
            v(1.0, 0.0, 1.0),
            v(-1.0, 0.0, 1.0),
        ];
        assert!(!point_in_polygon_xz(2.0, 0.0, &quad));
        assert!(!point_in_polygon_xz(0.0, 0.0, &quad[..2]));
    }

    #[test]
    fn polygon_concave() {
        // L-shape: the notch at (1.5, 1.5) is outside.
        let poly = [
            v(0.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(2.0, 0.0, 1.0),
            v(1.0, 0.0, 1.0),
            v(1.0, 0.0, 2.0),
            v(0.0, 0.0, 2.0),
        ];
        assert!(point_in_polygon_xz(0.5, 0.5, &poly));
        assert!(!point_in_polygon_xz(1.5, 1.5, &poly));
    }
}
