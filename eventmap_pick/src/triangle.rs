// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glam::Vec3;

use crate::RayHitTest;
use crate::ray::Ray;

const PARALLEL_EPSILON: f32 = 1e-8;

/// Outcome of a ray/triangle test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RayHit {
    /// The triangle has no area.
    Degenerate,
    /// The ray misses the triangle (or points away from its plane).
    Miss,
    /// The ray lies in the triangle's plane.
    ///
    /// Pickers treat this as a miss; it is reported separately so callers
    /// can tell edge-on geometry from a plain miss.
    Coplanar,
    /// The ray crosses the triangle at the given point.
    Hit(Vec3),
}

impl RayHit {
    /// `true` only for [`RayHit::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// A triangle in eye space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: Vec3,
    /// Second corner.
    pub b: Vec3,
    /// Third corner.
    pub c: Vec3,
}

impl Triangle {
    /// Creates a triangle from three corners.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Intersects `ray` with this triangle.
    ///
    /// The ray is intersected with the triangle's plane first; the crossing
    /// point is then tested with parametric (barycentric) coordinates. Edges
    /// and corners count as inside.
    pub fn intersect(&self, ray: &Ray) -> RayHit {
        let u = self.b - self.a;
        let v = self.c - self.a;
        let n = u.cross(v);
        if n == Vec3::ZERO {
            return RayHit::Degenerate;
        }

        let dir = ray.direction();
        let w0 = ray.near - self.a;
        let a = -n.dot(w0);
        let b = n.dot(dir);
        if b.abs() < PARALLEL_EPSILON {
            return if a == 0.0 {
                RayHit::Coplanar
            } else {
                RayHit::Miss
            };
        }

        let r = a / b;
        if r < 0.0 {
            return RayHit::Miss;
        }
        let point = ray.near + dir * r;

        let uu = u.dot(u);
        let uv = u.dot(v);
        let vv = v.dot(v);
        let w = point - self.a;
        let wu = w.dot(u);
        let wv = w.dot(v);
        let d = uv * uv - uu * vv;

        let s = (uv * wv - vv * wu) / d;
        if !(0.0..=1.0).contains(&s) {
            return RayHit::Miss;
        }
        let t = (uv * wu - uu * wv) / d;
        if t < 0.0 || s + t > 1.0 {
            return RayHit::Miss;
        }
        RayHit::Hit(point)
    }
}

impl RayHitTest for Triangle {
    fn hit_test_ray(&self, ray: &Ray) -> RayHit {
        self.intersect(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 10.0), Vec3::new(x, y, -10.0))
    }

    fn unit() -> Triangle {
        Triangle::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0))
    }

    #[test]
    fn hit_inside_reports_crossing_point() {
        assert_eq!(
            unit().intersect(&down_at(0.25, -0.75)),
            RayHit::Hit(Vec3::new(0.25, -0.75, 0.0))
        );
    }

    #[test]
    fn corners_and_edges_are_inside() {
        assert!(unit().intersect(&down_at(0.0, 0.0)).is_hit());
        assert!(unit().intersect(&down_at(0.5, -1.0)).is_hit());
    }

    #[test]
    fn outside_points_miss() {
        assert_eq!(unit().intersect(&down_at(0.9, -0.1)), RayHit::Miss);
        assert_eq!(unit().intersect(&down_at(-0.1, -0.5)), RayHit::Miss);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.25, -0.75, 1.0), Vec3::new(0.25, -0.75, 2.0));
        assert_eq!(unit().intersect(&ray), RayHit::Miss);
    }

    #[test]
    fn degenerate_and_coplanar_cases() {
        let flat = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(flat.intersect(&down_at(0.5, 0.0)), RayHit::Degenerate);

        let in_plane = Ray::new(Vec3::new(-1.0, -0.5, 0.0), Vec3::new(2.0, -0.5, 0.0));
        let hit = unit().intersect(&in_plane);
        assert_eq!(hit, RayHit::Coplanar);
        assert!(!hit.is_hit());

        let parallel = Ray::new(Vec3::new(-1.0, -0.5, 1.0), Vec3::new(2.0, -0.5, 1.0));
        assert_eq!(unit().intersect(&parallel), RayHit::Miss);
    }
}
