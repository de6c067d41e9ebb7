// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use eventmap_geometry::MapBounds;
use glam::{Mat4, Vec3};
use kurbo::{Point, Rect, Size, Vec2};

use crate::projection::{Projection, ViewportError};
use crate::to_f32;

/// Pan + zoom state over a centred map.
///
/// `Camera` tracks a uniform scale factor (never below `1.0`) and a pan
/// offset in eye-space units. Pan bounds are derived from the map extent
/// and the scale so that the scaled map edge can never scroll into view:
///
/// ```text
/// max_offset = (extent * scale - extent) / 2
/// ```
///
/// Input is accepted unclamped; callers clamp once per frame with
/// [`Camera::clamp_offset`] before building matrices.
#[derive(Clone, Debug)]
pub struct Camera {
    bounds: MapBounds,
    scale: f64,
    offset: Vec2,
    pan_bounds: Rect,
}

impl Camera {
    /// Creates a camera at scale `1.0` with zero offset.
    #[must_use]
    pub fn new(bounds: MapBounds) -> Self {
        let mut camera = Self {
            bounds,
            scale: 1.0,
            offset: Vec2::ZERO,
            pan_bounds: Rect::ZERO,
        };
        camera.rebuild_pan_bounds();
        camera
    }

    /// The map extent the camera is constrained to.
    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    /// Replaces the map extent and recomputes pan bounds.
    pub fn set_bounds(&mut self, bounds: MapBounds) {
        self.bounds = bounds;
        self.rebuild_pan_bounds();
    }

    /// Current scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Multiplies the scale by `multiplier`, flooring the result at `1.0`.
    ///
    /// Non-finite or non-positive multipliers are ignored. Returns the new
    /// scale.
    pub fn apply_scale(&mut self, multiplier: f64) -> f64 {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return self.scale;
        }
        self.scale = (self.scale * multiplier).max(1.0);
        self.rebuild_pan_bounds();
        self.scale
    }

    /// Current pan offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Accumulates `delta` into the offset without clamping.
    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.offset += delta;
        }
    }

    /// Replaces the offset without clamping.
    pub fn set_offset(&mut self, offset: Vec2) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    /// The rectangle the offset is clamped into.
    ///
    /// Symmetric around zero; a single point at scale `1.0`.
    pub fn pan_bounds(&self) -> Rect {
        self.pan_bounds
    }

    /// Clamps the offset into [`Camera::pan_bounds`].
    pub fn clamp_offset(&mut self) {
        let b = self.pan_bounds;
        self.offset = Vec2::new(
            self.offset.x.clamp(b.x0, b.x1),
            self.offset.y.clamp(b.y0, b.y1),
        );
    }

    /// The model-view matrix for the current offset and scale.
    ///
    /// `translate(offset) · scale(s, s, 1) · look_at(eye = (0, 0, d))` where
    /// `d` is the side of the map's bounding square.
    pub fn model_view(&self) -> Mat4 {
        let eye = Vec3::new(0.0, 0.0, to_f32(self.bounds.diameter()));
        let scale = to_f32(self.scale);
        Mat4::from_translation(Vec3::new(
            to_f32(self.offset.x),
            to_f32(self.offset.y),
            0.0,
        )) * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
            * Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
    }

    /// Builds the orthographic projection for `viewport` over this camera's
    /// map.
    pub fn compute_projection(&self, viewport: Size) -> Result<Projection, ViewportError> {
        Projection::orthographic(viewport, &self.bounds)
    }

    /// Projects a world-space point to pixels using the current model-view.
    pub fn project_to_screen(&self, world: Point, projection: &Projection) -> Option<Point> {
        projection.project(&self.model_view(), world)
    }

    /// Projects a world-space rectangle to a pixel rectangle.
    pub fn world_rect_to_screen(&self, world: Rect, projection: &Projection) -> Option<Rect> {
        let mv = self.model_view();
        let a = projection.project(&mv, Point::new(world.x0, world.y0))?;
        let b = projection.project(&mv, Point::new(world.x1, world.y1))?;
        Some(Rect::from_points(a, b))
    }

    /// Snapshot of the current camera state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> CameraDebugInfo {
        CameraDebugInfo {
            map_size: self.bounds.size(),
            scale: self.scale,
            offset: self.offset,
            pan_bounds: self.pan_bounds,
        }
    }

    fn rebuild_pan_bounds(&mut self) {
        let size = self.bounds.size();
        let max_x = (size.width * self.scale - size.width) / 2.0;
        let max_y = (size.height * self.scale - size.height) / 2.0;
        self.pan_bounds = Rect::new(-max_x, -max_y, max_x, max_y);
    }
}

/// Debug snapshot of a [`Camera`] state.
#[derive(Clone, Copy, Debug)]
pub struct CameraDebugInfo {
    /// Map extent.
    pub map_size: Size,
    /// Current scale factor.
    pub scale: f64,
    /// Current (possibly unclamped) offset.
    pub offset: Vec2,
    /// Current pan bounds.
    pub pan_bounds: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(MapBounds::new(1000.0, 800.0).unwrap())
    }

    #[test]
    fn scale_is_floored_at_one() {
        let mut cam = camera();
        assert_eq!(cam.apply_scale(2.0), 2.0);
        assert_eq!(cam.apply_scale(0.5), 1.0);
        assert_eq!(cam.apply_scale(0.25), 1.0);
        assert_eq!(cam.apply_scale(3.0), 3.0);
        assert_eq!(cam.apply_scale(f64::NAN), 3.0);
        assert_eq!(cam.apply_scale(-2.0), 3.0);
    }

    #[test]
    fn repeated_multipliers_match_clamped_product() {
        let mut cam = camera();
        let mut expected = 1.0_f64;
        for m in [1.5, 0.3, 4.0, 0.9, 0.1, 7.0, 1.0, 0.5] {
            expected = (expected * m).max(1.0);
            assert_eq!(cam.apply_scale(m), expected);
            assert!(cam.scale() >= 1.0);
        }
    }

    #[test]
    fn pan_bounds_collapse_at_native_scale() {
        let mut cam = camera();
        assert_eq!(cam.pan_bounds(), Rect::new(0.0, 0.0, 0.0, 0.0));
        cam.pan(Vec2::new(300.0, -200.0));
        // Clamping only happens on request.
        assert_eq!(cam.offset(), Vec2::new(300.0, -200.0));
        cam.clamp_offset();
        assert_eq!(cam.offset(), Vec2::ZERO);
    }

    #[test]
    fn pan_bounds_follow_scale() {
        let mut cam = camera();
        cam.apply_scale(2.0);
        assert_eq!(cam.pan_bounds(), Rect::new(-500.0, -400.0, 500.0, 400.0));

        for delta in [(900.0, 0.0), (-3000.0, 650.0), (10.0, -2000.0), (1.0, 1.0)] {
            cam.pan(delta.into());
            cam.clamp_offset();
            let o = cam.offset();
            let b = cam.pan_bounds();
            assert!(o.x >= b.x0 && o.x <= b.x1, "x {} escaped {b:?}", o.x);
            assert!(o.y >= b.y0 && o.y <= b.y1, "y {} escaped {b:?}", o.y);
        }
    }

    #[test]
    fn map_point_lands_on_expected_pixel() {
        let cam = camera();
        let projection = cam.compute_projection(Size::new(1000.0, 800.0)).unwrap();
        let world = cam.bounds().to_world(Point::new(125.0, 125.0));
        let px = cam.project_to_screen(world, &projection).unwrap();
        assert!((px.x - 200.0).abs() < 1e-3, "{px:?}");
        assert!((px.y - 180.0).abs() < 1e-3, "{px:?}");
    }

    #[test]
    fn zoom_and_pan_move_projected_points() {
        let mut cam = camera();
        let projection = cam.compute_projection(Size::new(1000.0, 800.0)).unwrap();
        let centre = cam.project_to_screen(Point::ZERO, &projection).unwrap();
        assert!((centre.x - 500.0).abs() < 1e-3 && (centre.y - 400.0).abs() < 1e-3);

        cam.apply_scale(2.0);
        let p = cam.project_to_screen(Point::new(100.0, 0.0), &projection).unwrap();
        // 100 world units at scale 2 cover 200 eye units = 160 px.
        assert!((p.x - 660.0).abs() < 1e-3, "{p:?}");

        cam.set_offset(Vec2::new(125.0, 0.0));
        let p = cam.project_to_screen(Point::ZERO, &projection).unwrap();
        assert!((p.x - 600.0).abs() < 1e-3, "{p:?}");
    }

    #[test]
    fn debug_info_reflects_state() {
        let mut cam = camera();
        cam.apply_scale(1.5);
        cam.pan(Vec2::new(10.0, 20.0));
        let info = cam.debug_info();
        assert_eq!(info.scale, 1.5);
        assert_eq!(info.offset, Vec2::new(10.0, 20.0));
        assert_eq!(info.map_size, Size::new(1000.0, 800.0));
    }
}
