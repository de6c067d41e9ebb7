// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seats and overlay figures.

use alloc::string::String;

use kurbo::{Point, Rect};
use peniko::Color;

use crate::shape::{Shape, ShapeKind};

/// A pickable seat glyph.
///
/// A seat owns its colour and caption; the scene owns how it is batched. The
/// colour is expected to change often (selection, press feedback), while the
/// shape is fixed for the seat's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Seat {
    shape: Shape,
    color: Color,
    caption: Option<String>,
}

impl Seat {
    /// Creates a seat from a shape and colour, without a caption.
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            caption: None,
        }
    }

    /// Creates a rectangular seat.
    pub fn rectangle(rect: Rect, color: Color) -> Self {
        Self::new(Shape::rect(rect), color)
    }

    /// Creates a circular seat.
    pub fn circle(center: Point, radius: f64, color: Color) -> Self {
        Self::new(Shape::circle(center, radius), color)
    }

    /// Builder-style caption setter.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// The seat geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shorthand for `self.shape().kind()`.
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Bounds in map coordinates.
    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    /// Current colour.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Replaces the colour.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Current caption, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Replaces (or clears) the caption.
    pub fn set_caption(&mut self, caption: Option<String>) {
        self.caption = caption;
    }
}

/// A decorative overlay drawn with the seats but never picked.
///
/// Figures are used for stage outlines, section labels and similar
/// annotations. They share the seat's shape model; the label is called a
/// *title*.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    shape: Shape,
    color: Color,
    title: Option<String>,
}

impl Figure {
    /// Creates a figure from a shape and colour, without a title.
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            title: None,
        }
    }

    /// Creates a rectangular figure.
    pub fn rectangle(rect: Rect, color: Color) -> Self {
        Self::new(Shape::rect(rect), color)
    }

    /// Builder-style title setter.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The figure geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Current colour.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Replaces the colour.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Current title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Replaces (or clears) the title.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }
}

impl From<Figure> for Seat {
    /// Reuses the seat representation for storage; pickability is tracked by
    /// the owner, not the value.
    fn from(figure: Figure) -> Self {
        Self {
            shape: figure.shape,
            color: figure.color,
            caption: figure.title,
        }
    }
}

/// Text size bucket for a caption drawn inside `rect`.
///
/// Half of the shorter side, truncated to whole units. Captions sharing a
/// bucket can share one glyph atlas.
#[allow(
    clippy::cast_possible_truncation,
    reason = "caption sizes are small positive integers; truncation is the intended rounding"
)]
pub fn caption_text_size(rect: Rect) -> u32 {
    let side = rect.width().abs().min(rect.height().abs());
    if !side.is_finite() || side <= 0.0 {
        return 0;
    }
    (side as u32) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argb_to_color;

    #[test]
    fn seat_colour_and_caption_are_mutable() {
        let mut seat = Seat::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE)
            .with_caption("A1");
        assert_eq!(seat.caption(), Some("A1"));
        assert_eq!(seat.kind(), ShapeKind::Rectangle);

        let red = argb_to_color(0xFFFF_0000);
        seat.set_color(red);
        seat.set_caption(None);
        assert_eq!(seat.color(), red);
        assert_eq!(seat.caption(), None);
    }

    #[test]
    fn figure_title_becomes_caption() {
        let figure =
            Figure::rectangle(Rect::new(0.0, 0.0, 400.0, 40.0), Color::BLACK).with_title("Stage");
        let seat = Seat::from(figure);
        assert_eq!(seat.caption(), Some("Stage"));
    }

    #[test]
    fn caption_size_is_half_the_short_side() {
        assert_eq!(caption_text_size(Rect::new(0.0, 0.0, 50.0, 30.0)), 15);
        assert_eq!(caption_text_size(Rect::new(0.0, 0.0, 25.9, 100.0)), 12);
        assert_eq!(caption_text_size(Rect::new(10.0, 10.0, 10.0, 40.0)), 0);
    }
}
