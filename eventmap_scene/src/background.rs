// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background image placement and power-of-two normalisation.

use eventmap_geometry::{MapBounds, QUAD_INDEX_TEMPLATE, UNIT_QUAD_UVS, quad_positions};
use eventmap_render::{
    BlendMode, Bitmap, ImageScaler, MeshDraw, RenderBackend, ResourceBackend, TextureFilter,
    TextureId,
};
use tracing::{debug, warn};

use crate::SceneError;

/// Largest power of two that is `<= n`. `n` must be non-zero.
fn floor_power_of_two(n: u32) -> u32 {
    1 << (u32::BITS - 1 - n.leading_zeros())
}

/// Power-of-two replacement for one image dimension.
///
/// Dimensions above `max` shrink to the largest power of two that fits;
/// everything else grows to the next power of two, unless that would pass
/// `max`.
pub fn power_of_two_dimension(dim: u32, max: u32) -> u32 {
    let max = max.max(1);
    let cap = floor_power_of_two(max);
    if dim > max {
        return cap;
    }
    dim.max(1)
        .checked_next_power_of_two()
        .filter(|p| *p <= max)
        .unwrap_or(cap)
}

/// Resamples `image` to power-of-two dimensions that fit `max`.
///
/// Returns the input unchanged when it already conforms.
pub fn normalize_background(image: Bitmap, max: u32, scaler: &dyn ImageScaler) -> Bitmap {
    let width = power_of_two_dimension(image.width(), max);
    let height = power_of_two_dimension(image.height(), max);
    if width == image.width() && height == image.height() {
        return image;
    }
    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "resampling background"
    );
    scaler.scale(&image, width, height)
}

/// The background layer of a scene: a normalised image and its texture.
#[derive(Debug, Default)]
pub(crate) struct BackgroundLayer {
    image: Option<Bitmap>,
    texture: Option<TextureId>,
    uploaded: bool,
}

impl BackgroundLayer {
    /// Replaces the image. The texture is re-created on the next upload.
    pub(crate) fn set(&mut self, image: Option<Bitmap>) {
        self.image = image;
        self.uploaded = false;
    }

    pub(crate) fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    pub(crate) fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    /// Forgets the texture handle without freeing it (the surface is gone).
    pub(crate) fn invalidate(&mut self) {
        self.texture = None;
        self.uploaded = false;
    }

    /// Re-creates the texture if the image changed.
    pub(crate) fn upload<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.uploaded {
            return;
        }
        self.uploaded = true;
        if let Some(old) = self.texture.take() {
            backend.destroy_texture(old);
        }
        let Some(image) = &self.image else {
            return;
        };
        match backend.create_texture(image.texture_desc(TextureFilter::Linear), image.pixels()) {
            Ok(id) => {
                debug!(
                    width = image.width(),
                    height = image.height(),
                    "uploaded background"
                );
                self.texture = Some(id);
            }
            Err(err) => warn!(%err, "background upload failed, drawing without it"),
        }
    }

    pub(crate) fn release<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(old) = self.texture.take() {
            backend.destroy_texture(old);
        }
        self.uploaded = false;
    }

    /// Draws the image stretched over the whole map.
    pub(crate) fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, bounds: &MapBounds) {
        let Some(texture) = self.texture else {
            return;
        };
        let positions = quad_positions(bounds.world_rect());
        backend.draw_mesh(&MeshDraw {
            positions: &positions,
            colors: None,
            uvs: Some(&UNIT_QUAD_UVS),
            indices: &QUAD_INDEX_TEMPLATE,
            texture: Some(texture),
            blend: Some(BlendMode::default()),
        });
    }
}

/// Validates raw RGBA8 background pixels.
///
/// Malformed input is logged and treated as no background.
pub(crate) fn decode_background(width: u32, height: u32, pixels: Vec<u8>) -> Option<Bitmap> {
    match Bitmap::new(width, height, pixels) {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(%err, "ignoring malformed background");
            None
        }
    }
}

/// Fits `image` to `max`, failing closed when no limit is known.
pub(crate) fn fit_background(
    image: Bitmap,
    max: Option<u32>,
    scaler: &dyn ImageScaler,
) -> Result<Bitmap, SceneError> {
    match max.filter(|m| *m > 0) {
        Some(max) => Ok(normalize_background(image, max, scaler)),
        None => Err(SceneError::TextureLimitUnknown {
            width: image.width(),
            height: image.height(),
        }),
    }
}
