// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glam::{Mat4, Vec3};

use crate::RayHitTest;
use crate::ray::{Ray, homogenize};
use crate::triangle::{RayHit, Triangle};

/// Floats per packed quad: four `x, y, z` vertices.
const QUAD_FLOATS: usize = 12;

/// A quad with corners in top-left, bottom-left, bottom-right, top-right
/// order, split into the triangles `{0, 1, 2}` and `{0, 2, 3}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// The four corners.
    pub corners: [Vec3; 4],
}

impl Quad {
    /// Reads a quad from 12 packed floats.
    pub fn from_packed(packed: &[f32; QUAD_FLOATS]) -> Self {
        let v = |i: usize| Vec3::new(packed[i * 3], packed[i * 3 + 1], packed[i * 3 + 2]);
        Self {
            corners: [v(0), v(1), v(2), v(3)],
        }
    }

    /// Applies `m` with perspective divide to every corner.
    ///
    /// Returns `None` if any corner lands at infinity.
    pub fn transformed(&self, m: &Mat4) -> Option<Self> {
        let mut corners = self.corners;
        for c in &mut corners {
            *c = homogenize(*m * c.extend(1.0))?;
        }
        Some(Self { corners })
    }

    /// The two triangles covering the quad.
    pub fn triangles(&self) -> [Triangle; 2] {
        let [a, b, c, d] = self.corners;
        [Triangle::new(a, b, c), Triangle::new(a, c, d)]
    }
}

impl RayHitTest for Quad {
    fn hit_test_ray(&self, ray: &Ray) -> RayHit {
        let [first, second] = self.triangles();
        let hit = first.intersect(ray);
        if hit.is_hit() {
            return hit;
        }
        second.intersect(ray)
    }
}

/// Tests packed seat quads against one pick ray.
///
/// Quads are stored in world space; each is moved into eye space through the
/// frame's model-view before testing, so the picker must be built from the
/// same matrices the frame is drawn with.
#[derive(Clone, Copy, Debug)]
pub struct QuadPicker {
    ray: Ray,
    model_view: Mat4,
}

impl QuadPicker {
    /// Creates a picker for an eye-space `ray` under `model_view`.
    pub fn new(ray: Ray, model_view: Mat4) -> Self {
        Self { ray, model_view }
    }

    /// The ray being tested.
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Whether the ray crosses either triangle of one packed quad.
    pub fn hits_quad(&self, packed: &[f32; QUAD_FLOATS]) -> bool {
        Quad::from_packed(packed)
            .transformed(&self.model_view)
            .is_some_and(|q| q.hit_test_ray(&self.ray).is_hit())
    }

    /// Index of the first quad in `vertices` that the ray crosses.
    ///
    /// `vertices` is a packed buffer of 12 floats per quad; a trailing partial
    /// quad is ignored. Quads are tested in buffer order and the first match
    /// wins; there is no depth sorting.
    pub fn first_hit(&self, vertices: &[f32]) -> Option<usize> {
        vertices
            .chunks_exact(QUAD_FLOATS)
            .position(|chunk| chunk.try_into().is_ok_and(|q| self.hits_quad(q)))
    }
}

#[cfg(test)]
mod tests {
    use eventmap_camera::{Camera, MapBounds};
    use kurbo::{Point, Size};

    use super::*;

    const SQUARE: [f32; QUAD_FLOATS] = [
        -1.0, 1.0, 0.0, //
        -1.0, -1.0, 0.0, //
        1.0, -1.0, 0.0, //
        1.0, 1.0, 0.0,
    ];

    #[test]
    fn identity_picker_hits_both_halves() {
        let picker = QuadPicker::new(
            Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::new(0.5, 0.5, -5.0)),
            Mat4::IDENTITY,
        );
        assert!(picker.hits_quad(&SQUARE));

        let other_half = QuadPicker::new(
            Ray::new(Vec3::new(-0.5, -0.5, 5.0), Vec3::new(-0.5, -0.5, -5.0)),
            Mat4::IDENTITY,
        );
        assert!(other_half.hits_quad(&SQUARE));
    }

    #[test]
    fn first_hit_prefers_buffer_order() {
        let mut shifted = SQUARE;
        for x in shifted.iter_mut().step_by(3) {
            *x += 10.0;
        }
        let mut buffer = alloc_buffer(&[shifted, SQUARE, SQUARE]);
        let picker = QuadPicker::new(
            Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -5.0)),
            Mat4::IDENTITY,
        );
        assert_eq!(picker.first_hit(&buffer), Some(1));

        // A trailing partial quad is ignored.
        buffer.truncate(QUAD_FLOATS + 5);
        assert_eq!(picker.first_hit(&buffer), None);
    }

    #[test]
    fn screen_ray_hits_projected_seat() {
        let mut camera = Camera::new(MapBounds::new(1000.0, 800.0).unwrap());
        camera.apply_scale(3.0);
        camera.pan(kurbo::Vec2::new(-200.0, 100.0));
        camera.clamp_offset();
        let projection = camera.compute_projection(Size::new(640.0, 480.0)).unwrap();
        let mv = camera.model_view();

        // World-space quad for map rect (100,100)-(150,150).
        let quad: [f32; QUAD_FLOATS] = [
            -400.0, 300.0, 0.0, //
            -400.0, 250.0, 0.0, //
            -350.0, 250.0, 0.0, //
            -350.0, 300.0, 0.0,
        ];
        let centre = camera
            .project_to_screen(Point::new(-375.0, 275.0), &projection)
            .unwrap();
        let ray = Ray::from_screen(centre, &projection, &mv).unwrap();
        assert!(QuadPicker::new(ray, mv).hits_quad(&quad));

        let outside = camera
            .project_to_screen(Point::new(-300.0, 275.0), &projection)
            .unwrap();
        let ray = Ray::from_screen(outside, &projection, &mv).unwrap();
        assert!(!QuadPicker::new(ray, mv).hits_quad(&quad));
    }

    fn alloc_buffer(quads: &[[f32; QUAD_FLOATS]]) -> alloc::vec::Vec<f32> {
        quads.iter().flatten().copied().collect()
    }
}
