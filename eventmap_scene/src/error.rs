// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use eventmap_camera::ViewportError;
use eventmap_geometry::BoundsError;

use crate::SeatId;

/// Error returned by [`EventMap`](crate::EventMap) operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// The map extent cannot be used for projection math.
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    /// The viewport cannot be used for projection math.
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    /// A background has to be fitted to texture limits, but no limit is known.
    ///
    /// Set [`SceneConfig::max_texture_size`](crate::SceneConfig::max_texture_size)
    /// or draw one frame so the backend can report its limit.
    #[error("cannot fit a {width}x{height} background: maximum texture size is unknown")]
    TextureLimitUnknown {
        /// Background width in pixels.
        width: u32,
        /// Background height in pixels.
        height: u32,
    },
    /// The handle does not refer to an entry of the current generation.
    #[error("unknown seat {0:?}")]
    UnknownSeat(SeatId),
    /// Seat handles are exhausted.
    #[error("the map cannot hold more seats")]
    Full,
}
