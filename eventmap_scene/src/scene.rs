// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use eventmap_camera::{Camera, Projection};
use eventmap_geometry::{Figure, MapBounds, Seat, ShapeKind, caption_text_size};
use eventmap_pick::{QuadPicker, Ray};
use eventmap_render::{
    Bitmap, CaptionRequest, FrameDesc, ImageScaler, NearestScaler, RenderBackend,
    ResourceBackend, TextRenderer, circle_mask, render_frame,
};
use glam::Mat4;
use hashbrown::HashSet;
use kurbo::{Point, Rect};
use peniko::Color;
use tracing::{debug, trace};

use crate::arena::{Arena, EntryFlags};
use crate::background::{BackgroundLayer, decode_background, fit_background};
use crate::store::BatchStore;
use crate::{SceneError, SeatId};

/// Which part of the packed state is stale.
///
/// Transitions:
/// - Any membership change (add, duplicate add, replace, flag change) moves to
///   [`DirtyState::Structural`].
/// - A colour change on a [`DirtyState::Clean`] scene moves to
///   [`DirtyState::ColorOnly`]; under `Structural` it is absorbed by the
///   pending rebuild.
/// - [`EventMap::prepare`] (and therefore [`EventMap::draw`]) returns to
///   [`DirtyState::Clean`] by rebuilding or patching.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DirtyState {
    /// Batches match the seat table.
    Clean,
    /// Membership changed; batches must be rebuilt.
    #[default]
    Structural,
    /// Only colours changed; batches can be patched in place.
    ColorOnly,
}

/// Scene configuration.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Texture size limit used to fit backgrounds.
    ///
    /// When `None`, the limit reported by the backend at the first draw is
    /// used.
    pub max_texture_size: Option<u32>,
    /// Side of the generated circle mask texture, in pixels.
    pub circle_mask_size: u32,
    /// Colour the frame is cleared to.
    pub clear_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_texture_size: None,
            circle_mask_size: 64,
            clear_color: Color::TRANSPARENT,
        }
    }
}

impl SceneConfig {
    /// Sets the texture size limit.
    pub fn with_max_texture_size(mut self, max: Option<u32>) -> Self {
        self.max_texture_size = max;
        self
    }

    /// Sets the circle mask side.
    pub fn with_circle_mask_size(mut self, size: u32) -> Self {
        self.circle_mask_size = size;
        self
    }

    /// Sets the clear colour.
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// The transform state of one frame.
///
/// Drawing and picking must use the same view, so the render loop builds one
/// per tick and hands it to both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameView {
    projection: Projection,
    model_view: Mat4,
}

impl FrameView {
    /// Captures `camera`'s current model-view together with `projection`.
    ///
    /// The camera offset should already be clamped.
    pub fn new(camera: &Camera, projection: Projection) -> Self {
        Self::from_matrices(projection, camera.model_view())
    }

    /// A view from explicit matrices.
    pub fn from_matrices(projection: Projection, model_view: Mat4) -> Self {
        Self {
            projection,
            model_view,
        }
    }

    /// The projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The model-view matrix.
    pub fn model_view(&self) -> Mat4 {
        self.model_view
    }

    /// The pick ray through a pixel.
    pub fn pick_ray(&self, screen: Point) -> Option<Ray> {
        Ray::from_screen(screen, &self.projection, &self.model_view)
    }

    /// Projects a world-space point to pixels.
    pub fn world_to_screen(&self, world: Point) -> Option<Point> {
        self.projection.project(&self.model_view, world)
    }

    /// Projects a world-space rectangle to a pixel rectangle.
    pub fn world_rect_to_screen(&self, world: Rect) -> Option<Rect> {
        let a = self.world_to_screen(Point::new(world.x0, world.y0))?;
        let b = self.world_to_screen(Point::new(world.x1, world.y1))?;
        Some(Rect::from_points(a, b))
    }

    /// Backend frame description for this view.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "viewport dimensions are pixel counts"
    )]
    pub fn frame_desc(&self, clear_color: Color) -> FrameDesc {
        let viewport = self.projection.viewport();
        FrameDesc {
            viewport: (viewport.width.round() as u32, viewport.height.round() as u32),
            clear_color,
            projection: self.projection.matrix().to_cols_array(),
            model_view: self.model_view.to_cols_array(),
        }
    }
}

/// An event map: seats, overlay figures and a background, with their packed
/// GPU buffers.
///
/// See the crate documentation for the frame lifecycle.
pub struct EventMap {
    bounds: MapBounds,
    config: SceneConfig,
    arena: Arena,
    members: [Vec<SeatId>; 2],
    store: BatchStore,
    background: BackgroundLayer,
    scaler: Box<dyn ImageScaler + Send>,
    reported_texture_limit: Option<u32>,
    state: DirtyState,
    pending_patches: HashSet<SeatId>,
}

impl core::fmt::Debug for EventMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventMap")
            .field("bounds", &self.bounds)
            .field("config", &self.config)
            .field("entries", &self.arena.len())
            .field("state", &self.state)
            .field("store", &self.store)
            .field("background", &self.background)
            .field("pending_patches", &self.pending_patches.len())
            .finish_non_exhaustive()
    }
}

impl EventMap {
    /// Creates an empty map with a declared extent.
    pub fn new(bounds: MapBounds, config: SceneConfig) -> Self {
        let store = BatchStore::new(circle_mask(config.circle_mask_size));
        Self {
            bounds,
            config,
            arena: Arena::default(),
            members: [Vec::new(), Vec::new()],
            store,
            background: BackgroundLayer::default(),
            scaler: Box::new(NearestScaler),
            reported_texture_limit: None,
            state: DirtyState::Structural,
            pending_patches: HashSet::new(),
        }
    }

    /// Creates a map whose extent is inferred from `seats` and adds them.
    ///
    /// The extent reaches from the map origin to the furthest right and
    /// bottom seat edge.
    pub fn with_inferred_bounds(
        seats: impl IntoIterator<Item = Seat>,
        config: SceneConfig,
    ) -> Result<(Self, Vec<SeatId>), SceneError> {
        let seats: Vec<Seat> = seats.into_iter().collect();
        let bounds = MapBounds::infer(seats.iter().map(Seat::bounds))?;
        let mut map = Self::new(bounds, config);
        let ids = map.add_all(seats)?;
        Ok((map, ids))
    }

    /// The centred map extent.
    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    /// The configuration the map was created with.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Current dirty state.
    pub fn state(&self) -> DirtyState {
        self.state
    }

    /// The packed batches as of the last [`EventMap::prepare`].
    pub fn batches(&self) -> &BatchStore {
        &self.store
    }

    fn insert(&mut self, seat: Seat, flags: EntryFlags, figure: bool) -> Result<SeatId, SceneError> {
        let kind = seat.kind();
        let id = self
            .arena
            .insert(seat, flags, figure)
            .ok_or(SceneError::Full)?;
        self.members[kind.index()].push(id);
        self.state = DirtyState::Structural;
        Ok(id)
    }

    /// Adds a pickable seat.
    pub fn add(&mut self, seat: Seat) -> Result<SeatId, SceneError> {
        self.insert(seat, EntryFlags::default(), false)
    }

    /// Adds seats in order.
    pub fn add_all(
        &mut self,
        seats: impl IntoIterator<Item = Seat>,
    ) -> Result<Vec<SeatId>, SceneError> {
        seats.into_iter().map(|s| self.add(s)).collect()
    }

    /// Adds an overlay figure: drawn, never picked.
    ///
    /// The figure's title is drawn as its caption.
    pub fn add_figure(&mut self, figure: Figure) -> Result<SeatId, SceneError> {
        self.insert(figure.into(), EntryFlags::VISIBLE, true)
    }

    /// Appends an existing entry to its kind's list once more.
    ///
    /// The duplicate gets its own packed slot. Colour changes reach every slot
    /// of the entry.
    pub fn add_again(&mut self, id: SeatId) -> Result<(), SceneError> {
        let kind = self.entry_kind(id)?;
        self.members[kind.index()].push(id);
        self.state = DirtyState::Structural;
        Ok(())
    }

    /// Replaces every seat and figure.
    ///
    /// Handles from before the call become stale.
    pub fn replace_all(
        &mut self,
        seats: impl IntoIterator<Item = Seat>,
    ) -> Result<Vec<SeatId>, SceneError> {
        self.arena.clear();
        for list in &mut self.members {
            list.clear();
        }
        self.pending_patches.clear();
        self.state = DirtyState::Structural;
        self.add_all(seats)
    }

    fn entry_kind(&self, id: SeatId) -> Result<ShapeKind, SceneError> {
        self.arena
            .get(id)
            .map(|e| e.seat.kind())
            .ok_or(SceneError::UnknownSeat(id))
    }

    /// The seat (or figure) behind `id`.
    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.arena.get(id).map(|e| &e.seat)
    }

    /// Whether `id` was added as a figure.
    pub fn is_figure(&self, id: SeatId) -> bool {
        self.arena.get(id).is_some_and(|e| e.figure)
    }

    /// Seat ids in kind order, then insertion order.
    ///
    /// Duplicated entries appear once per add. Figures are not included.
    pub fn seats(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.members_where(false)
    }

    /// Figure ids in kind order, then insertion order.
    pub fn figures(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.members_where(true)
    }

    fn members_where(&self, figure: bool) -> impl Iterator<Item = SeatId> + '_ {
        self.members
            .iter()
            .flatten()
            .copied()
            .filter(move |id| self.arena.get(*id).is_some_and(|e| e.figure == figure))
    }

    /// Number of distinct entries (seats and figures).
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Flags of an entry.
    pub fn flags(&self, id: SeatId) -> Option<EntryFlags> {
        self.arena.get(id).map(|e| e.flags)
    }

    /// Changes whether an entry is drawn and picked.
    pub fn set_flags(&mut self, id: SeatId, flags: EntryFlags) -> Result<(), SceneError> {
        let entry = self.arena.get_mut(id).ok_or(SceneError::UnknownSeat(id))?;
        if entry.flags != flags {
            entry.flags = flags;
            self.state = DirtyState::Structural;
        }
        Ok(())
    }

    /// Changes an entry's colour.
    ///
    /// The packed colour is patched before the next draw without repacking
    /// geometry.
    pub fn set_color(&mut self, id: SeatId, color: Color) -> Result<(), SceneError> {
        let entry = self.arena.get_mut(id).ok_or(SceneError::UnknownSeat(id))?;
        entry.seat.set_color(color);
        match self.state {
            DirtyState::Structural => {}
            DirtyState::Clean | DirtyState::ColorOnly => {
                self.pending_patches.insert(id);
                self.state = DirtyState::ColorOnly;
            }
        }
        Ok(())
    }

    /// Changes an entry's caption. Captions are not packed, so this never
    /// dirties the batches.
    pub fn set_caption(&mut self, id: SeatId, caption: Option<String>) -> Result<(), SceneError> {
        let entry = self.arena.get_mut(id).ok_or(SceneError::UnknownSeat(id))?;
        entry.seat.set_caption(caption);
        Ok(())
    }

    /// Replaces the resampler used to fit backgrounds.
    pub fn set_image_scaler(&mut self, scaler: Box<dyn ImageScaler + Send>) {
        self.scaler = scaler;
    }

    /// The texture size limit in effect: configured, or reported by the
    /// backend.
    pub fn max_texture_size(&self) -> Option<u32> {
        self.config.max_texture_size.or(self.reported_texture_limit)
    }

    /// Sets (or clears) the background image.
    ///
    /// The image is resampled to power-of-two dimensions that fit
    /// [`EventMap::max_texture_size`] and uploaded on the next draw. With no
    /// known limit this fails with [`SceneError::TextureLimitUnknown`] and the
    /// previous background is kept.
    pub fn set_background(&mut self, image: Option<Bitmap>) -> Result<(), SceneError> {
        let image = match image {
            Some(image) => Some(fit_background(
                image,
                self.max_texture_size(),
                self.scaler.as_ref(),
            )?),
            None => None,
        };
        self.background.set(image);
        Ok(())
    }

    /// Sets the background from raw RGBA8 pixels.
    ///
    /// Malformed pixels are logged and treated as no background.
    pub fn set_background_rgba(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<(), SceneError> {
        self.set_background(decode_background(width, height, pixels))
    }

    /// The normalised background image, if any.
    pub fn background(&self) -> Option<&Bitmap> {
        self.background.image()
    }

    /// Colour frames are cleared to.
    pub fn clear_color(&self) -> Color {
        self.config.clear_color
    }

    /// Sets the colour frames are cleared to.
    pub fn set_clear_color(&mut self, color: Color) {
        self.config.clear_color = color;
    }

    /// Forgets every GPU handle after the drawing surface was lost.
    ///
    /// Batches and the background are re-created on the next draw. Handles
    /// are not destroyed; the backend that issued them is gone.
    pub fn invalidate_gpu_resources(&mut self) {
        self.store.invalidate();
        self.background.invalidate();
        self.pending_patches.clear();
        self.state = DirtyState::Structural;
    }

    /// Frees every GPU resource held for this map.
    pub fn release<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        self.store.release(backend);
        self.background.release(backend);
        self.pending_patches.clear();
        self.state = DirtyState::Structural;
    }

    /// Brings batches and the background up to date.
    ///
    /// Called by [`EventMap::draw`]; call it directly before picking in a
    /// frame that has not been drawn yet.
    pub fn prepare<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.reported_texture_limit.is_none() {
            self.reported_texture_limit = backend.max_texture_size();
        }
        match self.state {
            DirtyState::Clean => {}
            DirtyState::Structural => {
                self.store
                    .rebuild(backend, &self.arena, &self.members, &self.bounds);
                self.pending_patches.clear();
            }
            DirtyState::ColorOnly => {
                for id in self.pending_patches.drain() {
                    if let Some(entry) = self.arena.get(id) {
                        self.store.patch_color(id, entry.seat.color());
                    }
                }
            }
        }
        self.state = DirtyState::Clean;
        if !self.background.is_uploaded() {
            self.background.upload(backend);
        }
    }

    /// Draws one frame: background, seat batches, then captions.
    pub fn draw<B, T>(&mut self, backend: &mut B, text: &mut T, view: &FrameView)
    where
        B: RenderBackend + ?Sized,
        T: TextRenderer + ?Sized,
    {
        self.prepare(backend);
        let frame = view.frame_desc(self.config.clear_color);
        render_frame(backend, &frame, |backend| {
            self.background.draw(backend, &self.bounds);
            self.store.draw(backend);
            self.draw_captions(text, view);
        });
    }

    fn draw_captions<T: TextRenderer + ?Sized>(&self, text: &mut T, view: &FrameView) {
        text.begin();
        for kb in self.store.iter() {
            for (slot, id) in kb.ids().iter().enumerate() {
                let Some(entry) = self.arena.get(*id) else {
                    continue;
                };
                let Some(caption) = entry.seat.caption().filter(|c| !c.is_empty()) else {
                    continue;
                };
                let Some(q) = kb.batch().quad_vertices(slot) else {
                    continue;
                };
                // Top-left and bottom-right corners of the packed quad.
                let world = Rect::new(
                    f64::from(q[0]),
                    f64::from(q[7]),
                    f64::from(q[6]),
                    f64::from(q[1]),
                );
                let Some(screen_rect) = view.world_rect_to_screen(world) else {
                    continue;
                };
                text.draw_caption(&CaptionRequest {
                    text: caption,
                    screen_rect,
                    text_size: caption_text_size(entry.seat.bounds()),
                });
            }
        }
        text.end();
    }

    /// The pickable seat under a pixel, if any.
    ///
    /// Uses the batches as of the last [`EventMap::prepare`]. Batches are
    /// searched in kind order (rectangles, then circles) and seats in
    /// insertion order; the first hit wins, with no depth sorting.
    pub fn find_intersection(&self, screen: Point, view: &FrameView) -> Option<SeatId> {
        let ray = view.pick_ray(screen)?;
        let hit = self
            .store
            .pick(&QuadPicker::new(ray, view.model_view()), &self.arena);
        trace!(x = screen.x, y = screen.y, ?hit, "resolved pick");
        hit
    }

    /// Logs a summary of the packed state.
    pub fn log_summary(&self) {
        debug!(
            entries = self.arena.len(),
            quads = self.store.quad_count(),
            state = ?self.state,
            background = self.background.image().is_some(),
            "event map"
        );
    }
}
