// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Geometry: seat shapes, map bounds, and batched quad packing.
//!
//! This crate holds the plain data model of an event (seating) map and the
//! packer that turns same-kind seats into flat GPU-friendly buffers. It
//! focuses on:
//! - Seat and figure descriptions ([`Seat`], [`Figure`]) built from a tagged
//!   [`Shape`] variant.
//! - The logical map extent ([`MapBounds`]) and the mapping from Y-down map
//!   coordinates into the centred, Y-up world space used for rendering.
//! - Packing ([`ShapeBatch`]): 4 vertices, 6 indices, 16 colour floats and
//!   optional UVs per seat, with stable slot ordering.
//!
//! It does **not** own any rendering backend, camera, or seat storage. Callers
//! are expected to keep their own ordered seat lists per [`ShapeKind`] and to
//! rebuild a batch whenever membership changes.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use eventmap_geometry::{MapBounds, Seat, ShapeBatch, ShapeKind, argb_to_color};
//!
//! let bounds = MapBounds::new(1000.0, 800.0).unwrap();
//! let seats = [
//!     Seat::rectangle(Rect::new(100.0, 100.0, 150.0, 150.0), argb_to_color(0xFF00_80FF)),
//!     Seat::rectangle(Rect::new(200.0, 100.0, 250.0, 150.0), argb_to_color(0xFFFF_0000)),
//! ];
//!
//! let batch = ShapeBatch::pack(
//!     ShapeKind::Rectangle,
//!     &bounds,
//!     false,
//!     seats.iter().map(|s| (s.bounds(), s.color())),
//! )
//! .unwrap();
//!
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.vertices().len(), 24);
//! assert_eq!(batch.indices()[6..], [4, 5, 6, 4, 6, 7]);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod batch;
mod bounds;
mod color;
mod seat;
mod shape;

pub use batch::{
    COLOR_COMPONENTS, COORDS_PER_VERTEX, QUAD_INDEX_TEMPLATE, ShapeBatch, UNIT_QUAD_UVS,
    UV_COMPONENTS, VERTICES_PER_QUAD, quad_positions,
};
pub use bounds::{BoundsError, MapBounds};
pub use color::{argb_to_color, color_components, color_to_argb};
pub use seat::{Figure, Seat, caption_text_size};
pub use shape::{Shape, ShapeKind};
