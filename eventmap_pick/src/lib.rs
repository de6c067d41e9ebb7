// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Pick: ray-based hit testing for packed seat quads.
//!
//! Picking works the way a fixed-function GL pipeline would: a tapped pixel
//! is unprojected at the near and far planes into a [`Ray`], each packed
//! quad is moved into the same eye space by the frame's model-view, and the
//! ray is intersected with the quad's two [`Triangle`]s.
//!
//! - [`Ray::from_screen`] builds the ray from a pixel, a
//!   [`Projection`](eventmap_camera::Projection) and a model-view matrix.
//! - [`Triangle::intersect`] classifies a ray against one triangle.
//! - [`QuadPicker`] walks a packed vertex buffer and reports the first quad
//!   that is hit.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use eventmap_camera::{Camera, MapBounds};
//! use eventmap_pick::{QuadPicker, Ray};
//!
//! let camera = Camera::new(MapBounds::new(100.0, 100.0).unwrap());
//! let projection = camera.compute_projection(Size::new(100.0, 100.0)).unwrap();
//! let mv = camera.model_view();
//!
//! // One quad covering the whole map, in world space.
//! let quad = [
//!     -50.0, 50.0, 0.0, -50.0, -50.0, 0.0, 50.0, -50.0, 0.0, 50.0, 50.0, 0.0_f32,
//! ];
//! let ray = Ray::from_screen(Point::new(10.0, 90.0), &projection, &mv).unwrap();
//! assert_eq!(QuadPicker::new(ray, mv).first_hit(&quad), Some(0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod quad;
mod ray;
mod triangle;

pub use quad::{Quad, QuadPicker};
pub use ray::Ray;
pub use triangle::{RayHit, Triangle};

/// Ray hit testing for eye-space geometry.
///
/// Implementations classify how a [`Ray`] meets the shape. Callers that only
/// need a yes/no answer use [`RayHit::is_hit`].
pub trait RayHitTest {
    /// Tests `ray` against this shape.
    fn hit_test_ray(&self, ray: &Ray) -> RayHit;
}
