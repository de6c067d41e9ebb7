// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use eventmap_geometry::MapBounds;
use glam::{Mat4, Vec2 as GVec2, Vec4};
use kurbo::{Point, Rect, Size};

use crate::to_f32;

/// Error returned when a projection cannot be built for a viewport.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// The viewport has no area (or a non-finite dimension).
    #[error("viewport {width}x{height} has no drawable area")]
    Empty {
        /// Rejected width in pixels.
        width: f64,
        /// Rejected height in pixels.
        height: f64,
    },
}

/// Orthographic projection for a map shown in a pixel viewport.
///
/// The map's bounding square (side `max(width, height)`) is centred on the
/// origin and then widened along the longer viewport axis, so one world unit
/// covers the same number of pixels horizontally and vertically. The camera
/// sits on `+Z` at a distance equal to the square's side, with the near plane
/// at `1` and the far plane at `1 + side`, so the map plane (`z = 0`) is always
/// inside the depth range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    viewport: Size,
    frustum: Rect,
    near: f64,
    far: f64,
    eye_distance: f64,
    matrix: Mat4,
}

impl Projection {
    /// Builds the projection for `viewport` (in pixels) and `bounds`.
    pub fn orthographic(viewport: Size, bounds: &MapBounds) -> Result<Self, ViewportError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(viewport.width) || !valid(viewport.height) {
            return Err(ViewportError::Empty {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let diameter = bounds.diameter();
        let half = diameter / 2.0;
        let aspect = viewport.width / viewport.height;
        let (half_x, half_y) = if aspect >= 1.0 {
            (half * aspect, half)
        } else {
            (half, half / aspect)
        };
        let frustum = Rect::new(-half_x, -half_y, half_x, half_y);
        let near = 1.0;
        let far = near + diameter;

        let matrix = Mat4::orthographic_rh_gl(
            to_f32(frustum.x0),
            to_f32(frustum.x1),
            to_f32(frustum.y0),
            to_f32(frustum.y1),
            to_f32(near),
            to_f32(far),
        );

        Ok(Self {
            viewport,
            frustum,
            near,
            far,
            eye_distance: diameter,
            matrix,
        })
    }

    /// The projection matrix (OpenGL clip conventions).
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// The viewport this projection was built for.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Left/right/bottom/top extent of the view volume in eye space.
    pub fn frustum(&self) -> Rect {
        self.frustum
    }

    /// Near plane distance.
    pub fn near(&self) -> f64 {
        self.near
    }

    /// Far plane distance.
    pub fn far(&self) -> f64 {
        self.far
    }

    /// Distance from the eye to the map plane.
    pub fn eye_distance(&self) -> f64 {
        self.eye_distance
    }

    /// Eye-space units covered by one pixel (identical on both axes).
    pub fn units_per_pixel(&self) -> f64 {
        self.frustum.width() / self.viewport.width
    }

    /// Converts a pixel position (origin top-left, Y down) into normalized
    /// device coordinates (origin centre, Y up).
    pub fn screen_to_ndc(&self, pt: Point) -> GVec2 {
        let x = 2.0 * pt.x / self.viewport.width - 1.0;
        let y = 1.0 - 2.0 * pt.y / self.viewport.height;
        GVec2::new(to_f32(x), to_f32(y))
    }

    /// Converts normalized device coordinates back into a pixel position.
    pub fn ndc_to_screen(&self, ndc: GVec2) -> Point {
        let x = (f64::from(ndc.x) + 1.0) * 0.5 * self.viewport.width;
        let y = (1.0 - f64::from(ndc.y)) * 0.5 * self.viewport.height;
        Point::new(x, y)
    }

    /// Projects a world-space point on the map plane to pixels through
    /// `model_view`.
    ///
    /// Returns `None` if the clip-space `w` vanishes.
    pub fn project(&self, model_view: &Mat4, world: Point) -> Option<Point> {
        let clip = self.matrix * *model_view * Vec4::new(to_f32(world.x), to_f32(world.y), 0.0, 1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        ndc.is_finite().then(|| self.ndc_to_screen(ndc.truncate()))
    }
}
