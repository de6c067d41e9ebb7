// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed per-kind quad buffers.

use alloc::vec::Vec;

use kurbo::Rect;
use peniko::Color;

use crate::bounds::MapBounds;
use crate::color::color_components;
use crate::shape::ShapeKind;

/// Vertices emitted per seat quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Position components per vertex (`x, y, z`).
pub const COORDS_PER_VERTEX: usize = 3;
/// Colour components per vertex (`r, g, b, a`).
pub const COLOR_COMPONENTS: usize = 4;
/// Texture coordinate components per vertex (`u, v`).
pub const UV_COMPONENTS: usize = 2;
/// Two triangles per quad over the corner order top-left, bottom-left,
/// bottom-right, top-right.
pub const QUAD_INDEX_TEMPLATE: [u32; 6] = [0, 1, 2, 0, 2, 3];
/// Texture coordinates matching the quad corner order.
pub const UNIT_QUAD_UVS: [f32; VERTICES_PER_QUAD * UV_COMPONENTS] =
    [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0];

const QUAD_FLOATS: usize = VERTICES_PER_QUAD * COORDS_PER_VERTEX;
const QUAD_COLOR_FLOATS: usize = VERTICES_PER_QUAD * COLOR_COMPONENTS;

/// Flat vertex/index/colour/UV buffers for every seat of one [`ShapeKind`].
///
/// Slot `k` of every buffer belongs to the `k`-th item passed to
/// [`ShapeBatch::pack`]. That mapping never changes for the lifetime of the
/// batch, which is what makes [`ShapeBatch::write_color`] safe to use as an
/// in-place patch.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeBatch {
    kind: ShapeKind,
    len: usize,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    colors: Vec<f32>,
    uvs: Option<Vec<f32>>,
}

impl ShapeBatch {
    /// Packs `items` (map-space bounds plus colour) into a new batch.
    ///
    /// Every rectangle is mapped into world space through `bounds` and
    /// emitted as four vertices at `z = 0`. When `textured` is set, the unit
    /// UV quad is repeated for every item.
    ///
    /// Returns `None` for an empty item set, or when the quad count cannot be
    /// addressed with `u32` indices.
    pub fn pack<I>(kind: ShapeKind, bounds: &MapBounds, textured: bool, items: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Rect, Color)>,
    {
        let items = items.into_iter();
        let hint = items.size_hint().0;
        let mut vertices = Vec::with_capacity(hint * QUAD_FLOATS);
        let mut indices = Vec::with_capacity(hint * QUAD_INDEX_TEMPLATE.len());
        let mut colors = Vec::with_capacity(hint * QUAD_COLOR_FLOATS);
        let mut len = 0_usize;

        for (rect, color) in items {
            let base = u32::try_from(len * VERTICES_PER_QUAD).ok()?;
            // The last index of the quad must fit as well.
            base.checked_add(3)?;

            vertices.extend_from_slice(&quad_positions(bounds.to_world_rect(rect)));
            indices.extend(QUAD_INDEX_TEMPLATE.iter().map(|i| base + i));
            let rgba = color_components(color);
            for _ in 0..VERTICES_PER_QUAD {
                colors.extend_from_slice(&rgba);
            }
            len += 1;
        }

        if len == 0 {
            return None;
        }

        let uvs = textured.then(|| {
            let mut uvs = Vec::with_capacity(len * UNIT_QUAD_UVS.len());
            for _ in 0..len {
                uvs.extend_from_slice(&UNIT_QUAD_UVS);
            }
            uvs
        });

        Some(Self {
            kind,
            len,
            vertices,
            indices,
            colors,
            uvs,
        })
    }

    /// The shape kind every quad in this batch shares.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Number of packed quads.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a packed batch; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the batch carries texture coordinates.
    pub fn is_textured(&self) -> bool {
        self.uvs.is_some()
    }

    /// Vertex positions, `12` floats per quad.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Triangle indices, `6` per quad.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Per-vertex colours, `16` floats per quad.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Per-vertex texture coordinates, `8` floats per quad, if textured.
    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    /// The four world-space vertices of quad `slot`.
    pub fn quad_vertices(&self, slot: usize) -> Option<&[f32; QUAD_FLOATS]> {
        let start = slot.checked_mul(QUAD_FLOATS)?;
        self.vertices.get(start..start + QUAD_FLOATS)?.try_into().ok()
    }

    /// The sixteen colour floats of quad `slot`.
    pub fn quad_colors(&self, slot: usize) -> Option<&[f32; QUAD_COLOR_FLOATS]> {
        let start = slot.checked_mul(QUAD_COLOR_FLOATS)?;
        self.colors.get(start..start + QUAD_COLOR_FLOATS)?.try_into().ok()
    }

    /// Overwrites the colour of quad `slot` on all four vertices.
    ///
    /// Touches exactly sixteen floats and nothing else. Returns `false` if
    /// `slot` is out of range.
    pub fn write_color(&mut self, slot: usize, color: Color) -> bool {
        if slot >= self.len {
            return false;
        }
        let rgba = color_components(color);
        let start = slot * QUAD_COLOR_FLOATS;
        for vertex in self.colors[start..start + QUAD_COLOR_FLOATS].chunks_exact_mut(COLOR_COMPONENTS)
        {
            vertex.copy_from_slice(&rgba);
        }
        true
    }
}

/// Corner positions for a world-space rectangle.
///
/// Order is top-left, bottom-left, bottom-right, top-right (Y up), all at
/// `z = 0`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "vertex buffers are single precision"
)]
pub fn quad_positions(world: Rect) -> [f32; QUAD_FLOATS] {
    let (left, right) = (world.x0 as f32, world.x1 as f32);
    let (bottom, top) = (world.y0 as f32, world.y1 as f32);
    [
        left, top, 0.0, //
        left, bottom, 0.0, //
        right, bottom, 0.0, //
        right, top, 0.0,
    ]
}
