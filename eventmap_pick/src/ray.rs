// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use eventmap_camera::Projection;
use glam::{Mat4, Vec3, Vec4};
use kurbo::Point;

/// A pick ray in eye space, given by the points where it crosses the near
/// and far planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Point on the near plane.
    pub near: Vec3,
    /// Point on the far plane.
    pub far: Vec3,
}

impl Ray {
    /// Creates a ray through two points.
    pub fn new(near: Vec3, far: Vec3) -> Self {
        Self { near, far }
    }

    /// Unprojects a pixel position into an eye-space ray.
    ///
    /// The pixel is lifted to the near and far clip planes, mapped back to
    /// world space through `inverse(projection · model_view)` and then
    /// forward through `model_view`, matching the space the picker moves
    /// quads into.
    ///
    /// Returns `None` when the combined matrix is singular or the result is
    /// not finite.
    pub fn from_screen(screen: Point, projection: &Projection, model_view: &Mat4) -> Option<Self> {
        let combined = projection.matrix() * *model_view;
        if combined.determinant() == 0.0 {
            return None;
        }
        let inverse = combined.inverse();
        let ndc = projection.screen_to_ndc(screen);

        let lift = |z: f32| -> Option<Vec3> {
            let world = homogenize(inverse * Vec4::new(ndc.x, ndc.y, z, 1.0))?;
            homogenize(*model_view * world.extend(1.0))
        };

        Some(Self {
            near: lift(-1.0)?,
            far: lift(1.0)?,
        })
    }

    /// Direction from the near point to the far point (not normalized).
    pub fn direction(&self) -> Vec3 {
        self.far - self.near
    }
}

pub(crate) fn homogenize(v: Vec4) -> Option<Vec3> {
    if v.w == 0.0 {
        return None;
    }
    let p = v.truncate() / v.w;
    p.is_finite().then_some(p)
}
