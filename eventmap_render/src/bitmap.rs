// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded RGBA8 images and the helpers that produce them.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `sqrt`
use kurbo::Size;

use crate::{ImageAlphaType, ImageFormat, TextureDesc, TextureFilter};

const BYTES_PER_PIXEL: usize = 4;

/// Error returned when raw pixels do not describe a usable bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    /// Width or height is zero.
    #[error("bitmap {width}x{height} has no pixels")]
    Empty {
        /// Rejected width.
        width: u32,
        /// Rejected height.
        height: u32,
    },
    /// The pixel buffer length does not match `width * height * 4`.
    #[error("expected {expected} bytes of RGBA8 pixels, got {actual}")]
    PixelLength {
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        actual: usize,
    },
}

/// A decoded image: tightly packed, row-major, straight-alpha RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("[{} bytes]", self.pixels.len()))
            .finish()
    }
}

impl Bitmap {
    /// Wraps decoded pixels, validating dimensions and length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        let expected = byte_len(width, height).ok_or(BitmapError::Empty { width, height })?;
        if pixels.len() != expected {
            return Err(BitmapError::PixelLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BitmapError> {
        let len = byte_len(width, height).ok_or(BitmapError::Empty { width, height })?;
        let mut pixels = vec![0; len];
        for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Raw RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.pixels.get(start..start + BYTES_PER_PIXEL)?.try_into().ok()
    }

    /// Texture description for uploading this bitmap.
    pub fn texture_desc(&self, filter: TextureFilter) -> TextureDesc {
        TextureDesc {
            width: self.width,
            height: self.height,
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            filter,
        }
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    if width == 0 || height == 0 {
        return None;
    }
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Generates a white, anti-aliased disc on a transparent `size × size`
/// square.
///
/// Coverage is stored in alpha, so modulating the mask with a vertex colour
/// yields a disc of that colour. A `size` of zero is treated as one.
#[allow(
    clippy::cast_possible_truncation,
    reason = "coverage is clamped into [0, 255] before the cast"
)]
pub fn circle_mask(size: u32) -> Bitmap {
    let size = size.max(1);
    let side = size as usize;
    let centre = f64::from(size) / 2.0;
    let radius = centre;
    let mut pixels = vec![0_u8; side * side * BYTES_PER_PIXEL];

    for (i, px) in pixels.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        let x = (i % side) as f64 + 0.5 - centre;
        let y = (i / side) as f64 + 0.5 - centre;
        let distance = (x * x + y * y).sqrt();
        let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
        px.copy_from_slice(&[255, 255, 255, (coverage * 255.0 + 0.5) as u8]);
    }

    Bitmap {
        width: size,
        height: size,
        pixels,
    }
}

/// Resamples bitmaps to new dimensions.
///
/// Hosts with a platform image pipeline can plug it in here; the engine only
/// needs the result to have exactly the requested size.
pub trait ImageScaler {
    /// Returns `src` resampled to `width × height`.
    ///
    /// Both dimensions are non-zero.
    fn scale(&self, src: &Bitmap, width: u32, height: u32) -> Bitmap;
}

/// Nearest-neighbour resampling, without filtering.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestScaler;

impl ImageScaler for NearestScaler {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "source coordinates are below the source dimensions, which fit in u32"
    )]
    fn scale(&self, src: &Bitmap, width: u32, height: u32) -> Bitmap {
        let width = width.max(1);
        let height = height.max(1);
        if width == src.width && height == src.height {
            return src.clone();
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for y in 0..height {
            let sy = (u64::from(y) * u64::from(src.height) / u64::from(height)) as u32;
            for x in 0..width {
                let sx = (u64::from(x) * u64::from(src.width) / u64::from(width)) as u32;
                let px = src.pixel(sx, sy).unwrap_or([0; 4]);
                pixels.extend_from_slice(&px);
            }
        }

        Bitmap {
            width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_bad_buffers() {
        assert_eq!(
            Bitmap::new(0, 4, Vec::new()),
            Err(BitmapError::Empty {
                width: 0,
                height: 4
            })
        );
        assert_eq!(
            Bitmap::new(2, 2, vec![0; 15]),
            Err(BitmapError::PixelLength {
                expected: 16,
                actual: 15
            })
        );
        assert!(Bitmap::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn circle_mask_is_opaque_inside_and_clear_outside() {
        let mask = circle_mask(64);
        assert_eq!(mask.width(), 64);
        assert_eq!(mask.height(), 64);
        assert_eq!(mask.pixel(32, 32), Some([255, 255, 255, 255]));
        assert_eq!(mask.pixel(0, 0), Some([255, 255, 255, 0]));
        assert_eq!(mask.pixel(63, 63), Some([255, 255, 255, 0]));

        // The rim is partially covered.
        let rim = mask.pixel(0, 32).unwrap()[3];
        assert!(rim > 0 && rim < 255, "rim alpha {rim}");
    }

    #[test]
    fn nearest_scaler_replicates_pixels() {
        let mut pixels = Vec::new();
        for v in [10_u8, 20, 30, 40] {
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        let src = Bitmap::new(2, 2, pixels).unwrap();

        let up = NearestScaler.scale(&src, 4, 4);
        assert_eq!(up.pixel(0, 0), Some([10, 10, 10, 255]));
        assert_eq!(up.pixel(1, 1), Some([10, 10, 10, 255]));
        assert_eq!(up.pixel(3, 0), Some([20, 20, 20, 255]));
        assert_eq!(up.pixel(0, 3), Some([30, 30, 30, 255]));
        assert_eq!(up.pixel(3, 3), Some([40, 40, 40, 255]));

        let down = NearestScaler.scale(&up, 1, 1);
        assert_eq!(down.pixels(), &[10, 10, 10, 255]);
    }
}
