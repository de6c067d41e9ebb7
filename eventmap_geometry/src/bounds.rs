// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical map extent and the map → world coordinate mapping.

use kurbo::{Point, Rect, Size};

/// Error returned when a map extent cannot be used for projection math.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum BoundsError {
    /// Width or height is zero, negative, or not finite.
    #[error("map extent {width}x{height} is degenerate")]
    Degenerate {
        /// Rejected width.
        width: f64,
        /// Rejected height.
        height: f64,
    },
    /// No seat rectangles were available to infer the extent from.
    #[error("cannot infer map extent from an empty seat set")]
    Empty,
}

/// The logical extent of an event map.
///
/// Seat rectangles are given in *map* coordinates: origin at the top-left
/// corner, Y growing downwards. Rendering happens in *world* coordinates:
/// origin at the map centre, Y growing upwards. `MapBounds` owns that mapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapBounds {
    width: f64,
    height: f64,
}

impl MapBounds {
    /// Creates bounds for a `width × height` map.
    ///
    /// Both dimensions must be finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, BoundsError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(BoundsError::Degenerate { width, height });
        }
        Ok(Self { width, height })
    }

    /// Infers the extent as the furthest right and bottom edge over `rects`.
    ///
    /// This mirrors maps that omit their declared size: the top-left corner is
    /// assumed to be the map origin.
    pub fn infer(rects: impl IntoIterator<Item = Rect>) -> Result<Self, BoundsError> {
        let mut any = false;
        let (mut width, mut height) = (0.0_f64, 0.0_f64);
        for rect in rects {
            let rect = rect.abs();
            any = true;
            width = width.max(rect.x1);
            height = height.max(rect.y1);
        }
        if !any {
            return Err(BoundsError::Empty);
        }
        Self::new(width, height)
    }

    /// Map width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Map height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Map size.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Side of the bounding square, `max(width, height)`.
    #[inline]
    pub fn diameter(&self) -> f64 {
        self.width.max(self.height)
    }

    /// The map extent in world space, centred on the origin.
    pub fn world_rect(&self) -> Rect {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Rect::new(-hw, -hh, hw, hh)
    }

    /// Maps a point from map space (Y down) into world space (Y up, centred).
    #[inline]
    pub fn to_world(&self, pt: Point) -> Point {
        Point::new(pt.x - self.width / 2.0, self.height / 2.0 - pt.y)
    }

    /// Maps a world-space point back into map space.
    #[inline]
    pub fn to_map(&self, pt: Point) -> Point {
        Point::new(pt.x + self.width / 2.0, self.height / 2.0 - pt.y)
    }

    /// Maps a map-space rectangle into world space.
    ///
    /// The result is normalized, so the map-space top edge becomes `y1`.
    pub fn to_world_rect(&self, rect: Rect) -> Rect {
        let a = self.to_world(Point::new(rect.x0, rect.y0));
        let b = self.to_world(Point::new(rect.x1, rect.y1));
        Rect::from_points(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_extents_are_rejected() {
        assert!(MapBounds::new(0.0, 10.0).is_err());
        assert!(MapBounds::new(10.0, -1.0).is_err());
        assert!(MapBounds::new(f64::NAN, 10.0).is_err());
        assert!(MapBounds::new(f64::INFINITY, 10.0).is_err());
        assert!(MapBounds::new(10.0, 10.0).is_ok());
    }

    #[test]
    fn infer_uses_furthest_edges() {
        let bounds = MapBounds::infer([
            Rect::new(0.0, 0.0, 10.0, 20.0),
            Rect::new(30.0, 5.0, 40.0, 15.0),
        ])
        .unwrap();
        assert_eq!(bounds.size(), Size::new(40.0, 20.0));
        assert_eq!(MapBounds::infer([]), Err(BoundsError::Empty));
    }

    #[test]
    fn world_mapping_flips_y_and_recentres() {
        let bounds = MapBounds::new(1000.0, 800.0).unwrap();
        assert_eq!(bounds.to_world(Point::ZERO), Point::new(-500.0, 400.0));
        assert_eq!(bounds.to_world(Point::new(500.0, 400.0)), Point::ZERO);

        let world = bounds.to_world_rect(Rect::new(100.0, 100.0, 150.0, 150.0));
        assert_eq!(world, Rect::new(-400.0, 250.0, -350.0, 300.0));

        let back = bounds.to_map(Point::new(-375.0, 275.0));
        assert_eq!(back, Point::new(125.0, 125.0));
    }

    #[test]
    fn world_rect_is_centred() {
        let bounds = MapBounds::new(200.0, 100.0).unwrap();
        assert_eq!(bounds.world_rect(), Rect::new(-100.0, -50.0, 100.0, 50.0));
        assert_eq!(bounds.diameter(), 200.0);
    }
}
