// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventmap Render Reference Backend.
//!
//! This crate provides a small, stateful implementation of
//! [`RenderBackend`] and [`ResourceBackend`] that **records** what it is
//! asked to do, plus a [`RecordingText`] caption sink.
//!
//! It is not a renderer:
//! - It does **not** rasterize to pixels.
//! - It keeps owned copies of every mesh it is handed, so tests can assert on
//!   packed buffers, textures and blend state after a frame completes.
//! - It enforces texture limits and pixel lengths the way a GPU driver
//!   would, so error paths can be exercised headlessly.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use eventmap_render::{
    BlendMode, CaptionRequest, FrameDesc, MeshDraw, RenderBackend, ResourceBackend, TextRenderer,
    TextureDesc, TextureError, TextureId,
};
use kurbo::Rect;

const BYTES_PER_PIXEL: usize = 4;

/// Owned copy of one [`MeshDraw`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeshRecord {
    /// Vertex positions.
    pub positions: Vec<f32>,
    /// Per-vertex colours, if supplied.
    pub colors: Option<Vec<f32>>,
    /// Texture coordinates, if supplied.
    pub uvs: Option<Vec<f32>>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Bound texture.
    pub texture: Option<TextureId>,
    /// Blend mode.
    pub blend: Option<BlendMode>,
}

impl MeshRecord {
    fn from_draw(mesh: &MeshDraw<'_>) -> Self {
        Self {
            positions: mesh.positions.to_vec(),
            colors: mesh.colors.map(<[f32]>::to_vec),
            uvs: mesh.uvs.map(<[f32]>::to_vec),
            indices: mesh.indices.to_vec(),
            texture: mesh.texture,
            blend: mesh.blend,
        }
    }

    /// Number of quads, assuming the packed four-vertices-per-quad layout.
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 12
    }
}

/// Event recorded by the reference backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A frame began.
    BeginFrame(FrameDesc),
    /// A mesh was drawn.
    DrawMesh(MeshRecord),
    /// The current frame ended.
    EndFrame,
}

/// Recording backend.
///
/// Texture IDs are indices into an internal table; destroyed slots are not
/// reused so stale IDs stay detectable.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    max_texture_size: Option<u32>,
    textures: Vec<Option<(TextureDesc, Vec<u8>)>>,
    events: Vec<Event>,
    in_frame: bool,
    frames_completed: u32,
}

impl RecordingBackend {
    /// A backend that reports no texture limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that reports and enforces `max` as its texture limit.
    pub fn with_max_texture_size(max: u32) -> Self {
        Self {
            max_texture_size: Some(max),
            ..Self::default()
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The meshes recorded since the last [`RecordingBackend::clear_events`].
    pub fn draws(&self) -> impl Iterator<Item = &MeshRecord> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::DrawMesh(m) => Some(m),
            _ => None,
        })
    }

    /// The most recent frame description.
    pub fn last_frame(&self) -> Option<&FrameDesc> {
        self.events.iter().rev().find_map(|e| match e {
            Event::BeginFrame(f) => Some(f),
            _ => None,
        })
    }

    /// Forgets recorded events; textures are kept.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of textures that have been created and not destroyed.
    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    /// Description and pixels of a live texture.
    pub fn texture(&self, id: TextureId) -> Option<(&TextureDesc, &[u8])> {
        let (desc, pixels) = self.textures.get(id.0 as usize)?.as_ref()?;
        Some((desc, pixels))
    }

    /// Number of frames that reached `end_frame`.
    pub fn frames_completed(&self) -> u32 {
        self.frames_completed
    }
}

impl ResourceBackend for RecordingBackend {
    fn max_texture_size(&self) -> Option<u32> {
        self.max_texture_size
    }

    fn create_texture(
        &mut self,
        desc: TextureDesc,
        pixels: &[u8],
    ) -> Result<TextureId, TextureError> {
        if let Some(max) = self.max_texture_size {
            if desc.width > max || desc.height > max {
                return Err(TextureError::TooLarge {
                    width: desc.width,
                    height: desc.height,
                    max,
                });
            }
        }
        let expected = desc.width as usize * desc.height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(TextureError::PixelLength {
                expected,
                actual: pixels.len(),
            });
        }
        let id = u32::try_from(self.textures.len()).map_err(|_| TextureError::Exhausted)?;
        self.textures.push(Some((desc, pixels.to_vec())));
        Ok(TextureId(id))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if let Some(slot) = self.textures.get_mut(id.0 as usize) {
            *slot = None;
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, frame: &FrameDesc) {
        debug_assert!(!self.in_frame, "begin_frame called twice without end_frame");
        self.in_frame = true;
        self.events.push(Event::BeginFrame(*frame));
    }

    fn draw_mesh(&mut self, mesh: &MeshDraw<'_>) {
        self.events.push(Event::DrawMesh(MeshRecord::from_draw(mesh)));
    }

    fn end_frame(&mut self) {
        if self.in_frame {
            self.in_frame = false;
            self.frames_completed += 1;
        }
        self.events.push(Event::EndFrame);
    }
}

/// One caption captured by [`RecordingText`].
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionRecord {
    /// Caption text.
    pub text: String,
    /// Screen rectangle it was placed in.
    pub screen_rect: Rect,
    /// Size bucket.
    pub text_size: u32,
}

/// A [`TextRenderer`] that keeps every caption it is asked to draw.
#[derive(Clone, Debug, Default)]
pub struct RecordingText {
    /// Captions in draw order.
    pub captions: Vec<CaptionRecord>,
    /// Number of completed `begin`/`end` passes.
    pub passes: u32,
}

impl TextRenderer for RecordingText {
    fn begin(&mut self) {
        self.captions.clear();
    }

    fn draw_caption(&mut self, caption: &CaptionRequest<'_>) {
        self.captions.push(CaptionRecord {
            text: caption.text.to_string(),
            screen_rect: caption.screen_rect,
            text_size: caption.text_size,
        });
    }

    fn end(&mut self) {
        self.passes += 1;
    }
}
