// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Render: backend-agnostic mesh, texture and caption interfaces.
//!
//! This crate defines the small surface the event map engine draws through.
//! It sits between the scene (which owns packed seat batches and a
//! background) and concrete renderers (GL, wgpu, a software rasterizer, or
//! the recording backend used in tests).
//!
//! # Core concepts
//!
//! - **Resources**: opaque [`TextureId`] handles whose lifetimes are managed
//!   via [`ResourceBackend`]. The backend also reports the platform's
//!   [`ResourceBackend::max_texture_size`].
//! - **Frames**: [`RenderBackend::begin_frame`] receives the clear colour and
//!   the frame's projection and model-view matrices; every
//!   [`RenderBackend::draw_mesh`] call until [`RenderBackend::end_frame`] is
//!   drawn under them.
//! - **Meshes**: [`MeshDraw`] borrows flat position/colour/UV/index buffers,
//!   so packed batches are handed over without copying.
//! - **Captions**: text layout is a host service. The engine only hands a
//!   [`CaptionRequest`] (string, screen rectangle and size bucket) to a
//!   [`TextRenderer`].
//! - **Images**: [`Bitmap`] holds decoded RGBA8 pixels; [`ImageScaler`]
//!   resamples them (a [`NearestScaler`] ships here) and [`circle_mask`]
//!   generates the shared mask used for circular seats.
//!
//! # Example
//!
//! ```ignore
//! # use eventmap_render::*;
//! # struct MyBackend { /* implements ResourceBackend + RenderBackend */ }
//! let mut backend = MyBackend { /* ... */ };
//! let mask = circle_mask(64);
//! let texture = backend
//!     .create_texture(mask.texture_desc(TextureFilter::Linear), mask.pixels())
//!     .unwrap();
//!
//! render_frame(&mut backend, &frame, |b| {
//!     b.draw_mesh(&MeshDraw {
//!         positions: &positions,
//!         colors: Some(&colors),
//!         uvs: Some(&uvs),
//!         indices: &indices,
//!         texture: Some(texture),
//!         blend: Some(BlendMode::default()),
//!     });
//! });
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod bitmap;

use kurbo::Rect;
use peniko::Color;

pub use bitmap::{Bitmap, BitmapError, ImageScaler, NearestScaler, circle_mask};
pub use peniko::{BlendMode, ImageAlphaType, ImageFormat};

/// Identifier for a texture resource.
///
/// This is a small, opaque handle that is stable for the lifetime of the
/// resource. Textures are created once and reused across frames until
/// explicitly destroyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Sampling filter for a texture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear filtering.
    #[default]
    Linear,
}

/// Description of a texture resource.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDesc {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Pixel format of the uploaded buffer.
    pub format: ImageFormat,
    /// Alpha encoding of the pixels (straight vs premultiplied).
    pub alpha_type: ImageAlphaType,
    /// Minification and magnification filter.
    pub filter: TextureFilter,
}

/// Error returned when a backend cannot create a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    /// A dimension exceeds what the backend supports.
    #[error("texture {width}x{height} exceeds the maximum size {max}")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest supported dimension.
        max: u32,
    },
    /// The pixel buffer does not match the description.
    #[error("expected {expected} bytes of pixels, got {actual}")]
    PixelLength {
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        actual: usize,
    },
    /// The backend has run out of texture handles.
    #[error("no texture handles left")]
    Exhausted,
}

/// Resource lifetime interface.
///
/// Backends implement this to manage their own texture storage. IDs must
/// remain valid and refer to the same texture until
/// [`ResourceBackend::destroy_texture`] is called.
pub trait ResourceBackend {
    /// Largest supported texture dimension, if the platform reports one.
    fn max_texture_size(&self) -> Option<u32>;

    /// Create a texture from raw pixels.
    ///
    /// The `pixels` slice is tightly packed, row-major data in the format
    /// named by `desc`.
    fn create_texture(&mut self, desc: TextureDesc, pixels: &[u8])
    -> Result<TextureId, TextureError>;

    /// Destroy a previously created texture. Unknown IDs are ignored.
    fn destroy_texture(&mut self, id: TextureId);
}

/// Per-frame state handed to [`RenderBackend::begin_frame`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameDesc {
    /// Viewport size in pixels.
    pub viewport: (u32, u32),
    /// Colour the frame is cleared to.
    pub clear_color: Color,
    /// Column-major projection matrix.
    pub projection: [f32; 16],
    /// Column-major model-view matrix.
    pub model_view: [f32; 16],
}

/// One indexed triangle-list draw.
///
/// Buffers use the packed seat layout: 3 floats per position, 4 per colour,
/// 2 per UV, and `u32` indices into the vertex arrays.
#[derive(Copy, Clone, Debug)]
pub struct MeshDraw<'a> {
    /// Vertex positions (`x, y, z`).
    pub positions: &'a [f32],
    /// Per-vertex RGBA colours; `None` draws white.
    pub colors: Option<&'a [f32]>,
    /// Per-vertex texture coordinates; required when `texture` is set.
    pub uvs: Option<&'a [f32]>,
    /// Triangle indices.
    pub indices: &'a [u32],
    /// Texture modulated with the vertex colour.
    pub texture: Option<TextureId>,
    /// Blend mode; `None` overwrites the target.
    pub blend: Option<BlendMode>,
}

impl MeshDraw<'_> {
    /// Number of vertices described by `positions`.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles described by `indices`.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Minimal frame-oriented render backend.
///
/// The engine is single threaded per frame: one `begin_frame`, any number of
/// `draw_mesh` calls, then `end_frame`.
pub trait RenderBackend: ResourceBackend {
    /// Starts a frame: clear the target and load the frame's matrices.
    fn begin_frame(&mut self, frame: &FrameDesc);

    /// Draws one mesh under the current frame state.
    fn draw_mesh(&mut self, mesh: &MeshDraw<'_>);

    /// Finishes the frame.
    fn end_frame(&mut self);
}

/// Runs `f` between [`RenderBackend::begin_frame`] and
/// [`RenderBackend::end_frame`].
pub fn render_frame<B, F, R>(backend: &mut B, frame: &FrameDesc, f: F) -> R
where
    B: RenderBackend + ?Sized,
    F: FnOnce(&mut B) -> R,
{
    backend.begin_frame(frame);
    let result = f(backend);
    backend.end_frame();
    result
}

/// One caption to draw, already placed in screen space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CaptionRequest<'a> {
    /// The caption text.
    pub text: &'a str,
    /// Pixel rectangle of the seat; text is centred inside it.
    pub screen_rect: Rect,
    /// Size bucket derived from the seat's map-space size.
    pub text_size: u32,
}

/// Caption drawing service supplied by the host.
pub trait TextRenderer {
    /// Called once before the captions of a frame.
    fn begin(&mut self) {}

    /// Draws one caption.
    fn draw_caption(&mut self, caption: &CaptionRequest<'_>);

    /// Called once after the captions of a frame.
    fn end(&mut self) {}
}

/// A [`TextRenderer`] that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoText;

impl TextRenderer for NoText {
    fn draw_caption(&mut self, _caption: &CaptionRequest<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Trivial in-memory backend that counts calls for testing.
    #[derive(Default)]
    struct CountingBackend {
        next_texture: u32,
        frames: Vec<&'static str>,
    }

    impl ResourceBackend for CountingBackend {
        fn max_texture_size(&self) -> Option<u32> {
            Some(256)
        }

        fn create_texture(
            &mut self,
            desc: TextureDesc,
            _pixels: &[u8],
        ) -> Result<TextureId, TextureError> {
            if desc.width > 256 || desc.height > 256 {
                return Err(TextureError::TooLarge {
                    width: desc.width,
                    height: desc.height,
                    max: 256,
                });
            }
            let id = self.next_texture;
            self.next_texture += 1;
            Ok(TextureId(id))
        }

        fn destroy_texture(&mut self, _id: TextureId) {}
    }

    impl RenderBackend for CountingBackend {
        fn begin_frame(&mut self, _frame: &FrameDesc) {
            self.frames.push("begin");
        }

        fn draw_mesh(&mut self, _mesh: &MeshDraw<'_>) {
            self.frames.push("draw");
        }

        fn end_frame(&mut self) {
            self.frames.push("end");
        }
    }

    fn frame() -> FrameDesc {
        FrameDesc {
            viewport: (10, 10),
            clear_color: Color::BLACK,
            projection: [0.0; 16],
            model_view: [0.0; 16],
        }
    }

    #[test]
    fn render_frame_brackets_draws() {
        let mut backend = CountingBackend::default();
        let drawn = render_frame(&mut backend, &frame(), |b| {
            let mesh = MeshDraw {
                positions: &[0.0; 12],
                colors: None,
                uvs: None,
                indices: &[0, 1, 2, 0, 2, 3],
                texture: None,
                blend: None,
            };
            b.draw_mesh(&mesh);
            mesh.triangle_count()
        });
        assert_eq!(drawn, 2);
        assert_eq!(backend.frames, ["begin", "draw", "end"]);
    }

    #[test]
    fn mask_texture_round_trips_through_backend() {
        let mut backend = CountingBackend::default();
        let mask = circle_mask(64);
        let id = backend
            .create_texture(mask.texture_desc(TextureFilter::Linear), mask.pixels())
            .unwrap();
        assert_eq!(id, TextureId(0));

        let big = circle_mask(512);
        assert!(matches!(
            backend.create_texture(big.texture_desc(TextureFilter::Linear), big.pixels()),
            Err(TextureError::TooLarge { max: 256, .. })
        ));
    }
}
