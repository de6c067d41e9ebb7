// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind packed batches and their textures.

use eventmap_geometry::{MapBounds, ShapeBatch, ShapeKind};
use eventmap_pick::QuadPicker;
use eventmap_render::{
    Bitmap, BlendMode, MeshDraw, RenderBackend, ResourceBackend, TextureFilter, TextureId,
};
use hashbrown::HashMap;
use peniko::Color;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::SeatId;
use crate::arena::{Arena, EntryFlags};

/// Packed batch for one [`ShapeKind`] plus the bookkeeping to address it by
/// [`SeatId`].
#[derive(Debug)]
pub struct KindBatch {
    batch: ShapeBatch,
    ids: Vec<SeatId>,
    slots: HashMap<SeatId, SmallVec<[usize; 1]>>,
    texture: Option<TextureId>,
}

impl KindBatch {
    /// The packed buffers.
    pub fn batch(&self) -> &ShapeBatch {
        &self.batch
    }

    /// The entry packed into each slot, in slot order.
    pub fn ids(&self) -> &[SeatId] {
        &self.ids
    }

    /// Every slot that holds `id`; more than one after a duplicate add.
    pub fn slots_of(&self, id: SeatId) -> &[usize] {
        self.slots.get(&id).map(|s| s.as_slice()).unwrap_or_default()
    }

    /// The shared mask texture, if this kind is drawn textured.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    fn mesh(&self) -> MeshDraw<'_> {
        MeshDraw {
            positions: self.batch.vertices(),
            colors: Some(self.batch.colors()),
            uvs: self.texture.and(self.batch.uvs()),
            indices: self.batch.indices(),
            texture: self.texture,
            blend: Some(BlendMode::default()),
        }
    }
}

/// Packed seat buffers for every [`ShapeKind`].
///
/// The store is rebuilt from the scene's ordered member lists whenever
/// membership changes; in between, colours are patched in place.
#[derive(Debug)]
pub struct BatchStore {
    batches: [Option<KindBatch>; 2],
    circle_mask: Bitmap,
}

impl BatchStore {
    pub(crate) fn new(circle_mask: Bitmap) -> Self {
        Self {
            batches: [None, None],
            circle_mask,
        }
    }

    /// The batch for `kind`, if it has any visible members.
    pub fn batch(&self, kind: ShapeKind) -> Option<&KindBatch> {
        self.batches[kind.index()].as_ref()
    }

    /// Batches in draw and pick order.
    pub fn iter(&self) -> impl Iterator<Item = &KindBatch> + '_ {
        self.batches.iter().flatten()
    }

    /// Total number of packed quads.
    pub fn quad_count(&self) -> usize {
        self.iter().map(|b| b.batch.len()).sum()
    }

    /// Drops every batch and repacks each non-empty kind.
    ///
    /// Textures from the previous build are destroyed first. Invisible and
    /// stale members are skipped.
    pub(crate) fn rebuild<B: ResourceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        arena: &Arena,
        members: &[Vec<SeatId>; 2],
        bounds: &MapBounds,
    ) {
        self.release(backend);

        for kind in ShapeKind::ALL {
            let visible: Vec<SeatId> = members[kind.index()]
                .iter()
                .copied()
                .filter(|id| {
                    arena
                        .get(*id)
                        .is_some_and(|e| e.flags.contains(EntryFlags::VISIBLE))
                })
                .collect();
            if visible.is_empty() {
                continue;
            }

            let texture = match kind {
                ShapeKind::Circle => self.upload_mask(backend),
                ShapeKind::Rectangle => None,
            };
            let items = visible.iter().filter_map(|id| {
                let seat = &arena.get(*id)?.seat;
                Some((seat.bounds(), seat.color()))
            });
            let Some(batch) = ShapeBatch::pack(kind, bounds, texture.is_some(), items)
            else {
                warn!(?kind, seats = visible.len(), "seat batch could not be packed");
                if let Some(texture) = texture {
                    backend.destroy_texture(texture);
                }
                continue;
            };

            let mut slots: HashMap<SeatId, SmallVec<[usize; 1]>> =
                HashMap::with_capacity(visible.len());
            for (slot, id) in visible.iter().enumerate() {
                slots.entry(*id).or_default().push(slot);
            }
            debug!(?kind, seats = batch.len(), textured = texture.is_some(), "rebuilt seat batch");
            self.batches[kind.index()] = Some(KindBatch {
                batch,
                ids: visible,
                slots,
                texture,
            });
        }
    }

    fn upload_mask<B: ResourceBackend + ?Sized>(&self, backend: &mut B) -> Option<TextureId> {
        let mask = &self.circle_mask;
        match backend.create_texture(mask.texture_desc(TextureFilter::Linear), mask.pixels()) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "circle mask upload failed, drawing circles as squares");
                None
            }
        }
    }

    /// Overwrites the colour of every slot holding `id`.
    ///
    /// Vertex and index buffers are untouched. Ids that are not packed (stale,
    /// invisible, or added after the last rebuild) are ignored and `false` is
    /// returned.
    pub fn patch_color(&mut self, id: SeatId, color: Color) -> bool {
        for kb in self.batches.iter_mut().flatten() {
            let Some(slots) = kb.slots.get(&id) else {
                continue;
            };
            for slot in slots {
                kb.batch.write_color(*slot, color);
            }
            trace!(?id, slots = slots.len(), "patched seat colour");
            return true;
        }
        trace!(?id, "colour patch for unpacked seat ignored");
        false
    }

    /// Frees every texture and drops all batches.
    pub(crate) fn release<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        for kb in self.batches.iter_mut().filter_map(Option::take) {
            if let Some(texture) = kb.texture {
                backend.destroy_texture(texture);
            }
        }
    }

    /// Drops all batches without freeing textures (the surface is gone).
    pub(crate) fn invalidate(&mut self) {
        self.batches = [None, None];
    }

    pub(crate) fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        for kb in self.iter() {
            backend.draw_mesh(&kb.mesh());
        }
    }

    /// First pickable entry whose quad the picker's ray crosses.
    ///
    /// Batches are walked in kind order and slots in insertion order; the
    /// first match wins.
    pub(crate) fn pick(&self, picker: &QuadPicker, arena: &Arena) -> Option<SeatId> {
        for kb in self.iter() {
            for (slot, id) in kb.ids.iter().enumerate() {
                let pickable = arena
                    .get(*id)
                    .is_some_and(|e| e.flags.contains(EntryFlags::PICKABLE));
                if !pickable {
                    continue;
                }
                if kb
                    .batch
                    .quad_vertices(slot)
                    .is_some_and(|quad| picker.hits_quad(quad))
                {
                    return Some(*id);
                }
            }
        }
        None
    }
}
