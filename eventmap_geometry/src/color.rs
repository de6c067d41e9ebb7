// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between packed ARGB integers and peniko colours.

use peniko::Color;

/// Converts a packed `0xAARRGGBB` value into a colour.
#[inline]
pub const fn argb_to_color(argb: u32) -> Color {
    let [a, r, g, b] = argb.to_be_bytes();
    Color::from_rgba8(r, g, b, a)
}

/// Converts a colour back into a packed `0xAARRGGBB` value.
///
/// Components are clamped into `[0, 1]` and rounded to the nearest 8-bit step.
pub fn color_to_argb(color: Color) -> u32 {
    let [r, g, b, a] = color.components.map(unit_to_u8);
    u32::from_be_bytes([a, r, g, b])
}

/// Returns the colour as straight RGBA floats, each in `[0, 1]`.
#[inline]
pub fn color_components(color: Color) -> [f32; 4] {
    color.components.map(|c| c.clamp(0.0, 1.0))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "value is clamped into [0.5, 255.5] and truncates into u8 range"
)]
fn unit_to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_channels_map_to_components() {
        let c = argb_to_color(0x80FF_0000);
        let [r, g, b, a] = color_components(c);
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
        assert!((a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn argb_roundtrips_through_color() {
        for argb in [0xFF00_0000, 0xFFFF_FFFF, 0x1234_5678, 0x00AB_CDEF] {
            assert_eq!(color_to_argb(argb_to_color(argb)), argb);
        }
    }
}
