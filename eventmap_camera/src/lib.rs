// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Camera: pan/zoom state and orthographic projection.
//!
//! This crate provides a small, headless camera model for a centred map
//! drawn under an orthographic projection. It focuses on:
//! - Zoom as an accumulated scale factor, floored at `1.0`.
//! - Pan as an offset that is clamped to scale-dependent pan bounds, once per
//!   frame rather than on every input event.
//! - An aspect-preserving projection sized to the map's bounding square.
//! - Conversion between pixels, normalized device coordinates and world
//!   space.
//!
//! It does **not** own input handling or a render backend. Callers are
//! expected to:
//! - Apply gesture deltas with [`Camera::pan`] / [`Camera::apply_scale`].
//! - Call [`Camera::clamp_offset`] at the start of each frame.
//! - Feed [`Camera::model_view`] and [`Projection::matrix`] to their
//!   backend, and to the picker.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size, Vec2};
//! use eventmap_camera::{Camera, MapBounds};
//!
//! let mut camera = Camera::new(MapBounds::new(1000.0, 800.0).unwrap());
//! camera.apply_scale(2.0);
//! camera.pan(Vec2::new(10_000.0, 0.0));
//!
//! // Pan input is never rejected; it is clamped when a frame is prepared.
//! camera.clamp_offset();
//! assert_eq!(camera.offset(), Vec2::new(500.0, 0.0));
//!
//! let projection = camera.compute_projection(Size::new(1000.0, 800.0)).unwrap();
//! let centre = camera.project_to_screen(Point::ZERO, &projection).unwrap();
//! assert!((centre.x - 900.0).abs() < 1e-3);
//! ```
//!
//! ## Design notes
//!
//! - Matrices are single precision `glam` types, matching what GPU backends
//!   consume.
//! - Zoom is not anchored at the gesture focus; it always scales around the
//!   map centre in eye space.
//!
//! This crate is `no_std`.

#![no_std]

mod camera;
mod projection;

pub use camera::{Camera, CameraDebugInfo};
pub use eventmap_geometry::MapBounds;
pub use projection::{Projection, ViewportError};

#[allow(
    clippy::cast_possible_truncation,
    reason = "matrices and vertex data are single precision"
)]
#[inline]
pub(crate) fn to_f32(v: f64) -> f32 {
    v as f32
}
