// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Scene: seats, batches, drawing and picking for event maps.
//!
//! An event map is a seating chart: rectangular and circular seats, overlay
//! figures, and an optional background image, laid out on a fixed map extent.
//! This crate keeps that content, packs it into per-shape GPU batches, draws
//! it through an [`eventmap_render`] backend, and resolves taps back to seats.
//!
//! ## API overview
//!
//! - [`EventMap`]: the seat table, batch store and background of one map.
//! - [`SeatId`]: generational handle returned by [`EventMap::add`].
//! - [`EntryFlags`]: per-entry visibility and picking controls.
//! - [`BatchStore`] / [`KindBatch`]: packed buffers, one batch per shape kind.
//! - [`FrameView`]: the projection and model-view a frame is drawn and picked
//!   with.
//! - [`RenderLoop`] / [`InputClient`]: the render-thread driver and the
//!   thread-safe handle input threads feed it through.
//! - [`TouchDispatcher`] / [`SeatTouchListener`]: pressed, clicked and
//!   unpressed notifications from recognised gestures.
//!
//! ## Frame lifecycle
//!
//! Edits only touch the seat table and mark the map dirty:
//! - membership changes (add, duplicate add, replace, flag changes) are
//!   structural and repack every batch on the next frame;
//! - colour changes on a clean map are patched into the packed colour buffer
//!   in place, leaving vertices and indices untouched.
//!
//! [`EventMap::prepare`] settles the dirty state and uploads textures;
//! [`EventMap::draw`] prepares and then draws the background, rectangles,
//! circles and captions, in that order. [`EventMap::find_intersection`]
//! casts a ray through a pixel using the same [`FrameView`] as the frame, so
//! a tap resolves against exactly what was drawn.
//!
//! ## Threads
//!
//! The map and the camera belong to the render thread. Input threads hold
//! [`InputClient`]s: camera gestures are coalesced until the next
//! [`RenderLoop::on_frame_tick`], and [`InputClient::tap_at`] blocks until
//! that tick resolves the tap, or until a timeout.
//!
//! ## Minimal example
//!
//! ```
//! use eventmap_geometry::{MapBounds, Seat, argb_to_color};
//! use eventmap_render_ref::{RecordingBackend, RecordingText};
//! use eventmap_scene::{EventMap, FrameView, SceneConfig};
//! use eventmap_camera::{Camera, Projection};
//! use kurbo::{Point, Rect, Size};
//!
//! let bounds = MapBounds::new(1000.0, 800.0).unwrap();
//! let mut map = EventMap::new(bounds, SceneConfig::default());
//! let seat = map
//!     .add(Seat::rectangle(
//!         Rect::new(100.0, 100.0, 150.0, 150.0),
//!         argb_to_color(0xFF00_80FF),
//!     ))
//!     .unwrap();
//!
//! let camera = Camera::new(bounds);
//! let projection = Projection::orthographic(Size::new(1000.0, 800.0), &bounds).unwrap();
//! let view = FrameView::new(&camera, projection);
//!
//! let mut backend = RecordingBackend::with_max_texture_size(2048);
//! map.draw(&mut backend, &mut RecordingText::default(), &view);
//!
//! // Map point (125, 125) lands on pixel (200, 180) in this viewport.
//! assert_eq!(map.find_intersection(Point::new(200.0, 180.0), &view), Some(seat));
//! assert_eq!(map.find_intersection(Point::new(0.0, 0.0), &view), None);
//! ```

mod arena;
mod background;
mod driver;
mod error;
mod scene;
mod store;
mod touch;

pub use arena::{EntryFlags, SeatId};
pub use background::{normalize_background, power_of_two_dimension};
pub use driver::{InputClient, LoopConfig, PickError, RenderLoop};
pub use error::SceneError;
pub use scene::{DirtyState, EventMap, FrameView, SceneConfig};
pub use store::{BatchStore, KindBatch};
pub use touch::{SeatTouchListener, TouchDispatcher};
