// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Discriminator between the seat rendering variants.
///
/// Every kind gets its own packed batch. The declaration order is also the
/// draw and pick order of the batches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// Axis-aligned rectangle, drawn as a flat-coloured quad.
    Rectangle,
    /// Circle, drawn as a quad over its bounding square masked by a shared
    /// circle texture.
    Circle,
}

impl ShapeKind {
    /// All kinds in draw/pick order.
    pub const ALL: [Self; 2] = [Self::Rectangle, Self::Circle];

    /// Position of this kind in [`ShapeKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Rectangle => 0,
            Self::Circle => 1,
        }
    }
}

/// Seat geometry in map coordinates (Y down).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// A rectangle given by its corners.
    Rectangle {
        /// Rectangle in map coordinates.
        rect: Rect,
    },
    /// A circle given by centre and radius.
    Circle {
        /// Centre in map coordinates.
        center: Point,
        /// Radius in map units.
        radius: f64,
    },
}

impl Shape {
    /// Creates a rectangle shape.
    #[inline]
    pub const fn rect(rect: Rect) -> Self {
        Self::Rectangle { rect }
    }

    /// Creates a circle shape.
    #[inline]
    pub const fn circle(center: Point, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    /// Returns the kind used to select the batch for this shape.
    #[inline]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Axis-aligned bounds in map coordinates.
    ///
    /// Rectangles are normalized so that `x0 <= x1` and `y0 <= y1`; circles
    /// return their enclosing square.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rectangle { rect } => rect.abs(),
            Self::Circle { center, radius } => {
                let r = radius.abs();
                Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_bounds_enclose_the_circle() {
        let shape = Shape::circle(Point::new(10.0, 20.0), 5.0);
        assert_eq!(shape.kind(), ShapeKind::Circle);
        assert_eq!(shape.bounds(), Rect::new(5.0, 15.0, 15.0, 25.0));
    }

    #[test]
    fn rectangle_bounds_are_normalized() {
        let shape = Shape::rect(Rect::new(50.0, 40.0, 10.0, 20.0));
        assert_eq!(shape.bounds(), Rect::new(10.0, 20.0, 50.0, 40.0));
    }

    #[test]
    fn kind_order_matches_all() {
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
