// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render-thread driver and the handle input threads use to reach it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use eventmap_camera::{Camera, Projection};
use eventmap_render::{RenderBackend, TextRenderer};
use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::{EventMap, FrameView, SceneError, SeatId};

/// Render-loop configuration.
#[derive(Clone, Copy, Debug)]
pub struct LoopConfig {
    /// How long [`InputClient::tap_at`] waits for the render thread.
    pub pick_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            pick_timeout: Duration::from_millis(500),
        }
    }
}

impl LoopConfig {
    /// Sets the pick timeout.
    pub fn with_pick_timeout(mut self, timeout: Duration) -> Self {
        self.pick_timeout = timeout;
        self
    }
}

/// Why a tap could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PickError {
    /// No frame tick answered within the timeout.
    #[error("no frame resolved the pick in time")]
    Timeout,
    /// The render loop has shut down.
    #[error("render loop is closed")]
    Closed,
    /// A newer tap replaced this one before a frame picked it up.
    #[error("pick superseded by a newer tap")]
    Superseded,
}

/// Camera input waiting for the next frame, coalesced into one slot.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CameraInput {
    offset: Option<Vec2>,
    pan: Vec2,
    scroll: Vec2,
    zoom: f64,
}

impl Default for CameraInput {
    fn default() -> Self {
        Self {
            offset: None,
            pan: Vec2::ZERO,
            scroll: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingPick {
    ticket: u64,
    point: Point,
}

type PickResult = Result<Option<SeatId>, PickError>;

#[derive(Debug, Default)]
struct Mailbox {
    input: CameraInput,
    pick: Option<PendingPick>,
    answers: HashMap<u64, PickResult>,
    /// A ticket whose waiter gave up after a frame had already taken it.
    abandoned: Option<u64>,
    next_ticket: u64,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    mailbox: Mutex<Mailbox>,
    answered: Condvar,
}

/// Cloneable, thread-safe handle for feeding input to a [`RenderLoop`].
///
/// Camera input is coalesced: pan and scroll deltas add up, zoom factors
/// multiply, and an absolute offset discards the pans queued before it.
/// Nothing is applied until the render thread's next frame tick.
#[derive(Clone, Debug)]
pub struct InputClient {
    shared: Arc<Shared>,
    config: LoopConfig,
}

impl InputClient {
    /// Queues a pan by `(dx, dy)` eye-space units.
    pub fn pan_by(&self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        if delta.is_finite() {
            self.shared.mailbox.lock().input.pan += delta;
        }
    }

    /// Queues a drag of `(dx, dy)` pixels, as reported by a scroll gesture.
    ///
    /// Positive distances move the content left and up. The render thread
    /// converts pixels to eye-space units with the current projection; scrolls
    /// queued before the first viewport stay queued until one is known.
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        if delta.is_finite() {
            self.shared.mailbox.lock().input.scroll += delta;
        }
    }

    /// Queues a zoom by `factor`. Non-finite and non-positive factors are
    /// ignored.
    pub fn zoom_by(&self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.shared.mailbox.lock().input.zoom *= factor;
        }
    }

    /// Queues an absolute offset, dropping pans queued before it.
    pub fn set_offset(&self, x: f64, y: f64) {
        let offset = Vec2::new(x, y);
        if offset.is_finite() {
            let mut mailbox = self.shared.mailbox.lock();
            mailbox.input.offset = Some(offset);
            mailbox.input.pan = Vec2::ZERO;
            mailbox.input.scroll = Vec2::ZERO;
        }
    }

    /// Resolves the seat under a pixel, waiting at most the configured
    /// [`LoopConfig::pick_timeout`].
    pub fn tap_at(&self, point: Point) -> PickResult {
        self.tap_at_timeout(point, self.config.pick_timeout)
    }

    /// Resolves the seat under a pixel, waiting at most `timeout`.
    ///
    /// The request is answered during the render thread's next frame tick. A
    /// tap issued before the previous one was picked up supersedes it.
    ///
    /// A timeout too large to express as a deadline waits until the tap is
    /// answered or the loop shuts down.
    pub fn tap_at_timeout(&self, point: Point, timeout: Duration) -> PickResult {
        let deadline = Instant::now().checked_add(timeout);
        let mut mailbox = self.shared.mailbox.lock();
        if mailbox.closed {
            return Err(PickError::Closed);
        }

        let ticket = mailbox.next_ticket;
        mailbox.next_ticket += 1;
        if let Some(old) = mailbox.pick.replace(PendingPick { ticket, point }) {
            warn!(ticket = old.ticket, "pick superseded before a frame picked it up");
            mailbox.answers.insert(old.ticket, Err(PickError::Superseded));
            self.shared.answered.notify_all();
        }

        loop {
            if let Some(answer) = mailbox.answers.remove(&ticket) {
                return answer;
            }
            if mailbox.closed {
                return Err(PickError::Closed);
            }
            let timed_out = match deadline {
                Some(deadline) => self
                    .shared
                    .answered
                    .wait_until(&mut mailbox, deadline)
                    .timed_out(),
                None => {
                    self.shared.answered.wait(&mut mailbox);
                    false
                }
            };
            if timed_out {
                if let Some(answer) = mailbox.answers.remove(&ticket) {
                    return answer;
                }
                if mailbox.pick.is_some_and(|p| p.ticket == ticket) {
                    mailbox.pick = None;
                } else {
                    mailbox.abandoned = Some(ticket);
                }
                warn!(ticket, ?timeout, "pick timed out");
                return Err(PickError::Timeout);
            }
        }
    }

    /// Whether the render loop has shut down.
    pub fn is_closed(&self) -> bool {
        self.shared.mailbox.lock().closed
    }
}

/// Drives an [`EventMap`] from a render thread.
///
/// The loop owns the map and the camera; input threads talk to it through
/// [`InputClient`]s. Each [`RenderLoop::on_frame_tick`]:
///
/// 1. drains the coalesced camera input,
/// 2. clamps the pan offset,
/// 3. builds the frame's projection and model-view,
/// 4. resolves the pending tap against that transform,
/// 5. draws.
#[derive(Debug)]
pub struct RenderLoop {
    map: EventMap,
    camera: Camera,
    projection: Option<Projection>,
    shared: Arc<Shared>,
    config: LoopConfig,
}

impl RenderLoop {
    /// Creates a loop for `map`, with a camera at native scale.
    pub fn new(map: EventMap, config: LoopConfig) -> Self {
        let camera = Camera::new(*map.bounds());
        Self {
            map,
            camera,
            projection: None,
            shared: Arc::default(),
            config,
        }
    }

    /// A new input handle.
    pub fn client(&self) -> InputClient {
        InputClient {
            shared: Arc::clone(&self.shared),
            config: self.config,
        }
    }

    /// The map being drawn.
    pub fn map(&self) -> &EventMap {
        &self.map
    }

    /// Mutable access to the map, for seat and background updates.
    pub fn map_mut(&mut self) -> &mut EventMap {
        &mut self.map
    }

    /// Swaps in a new map, keeping the camera state where the extent allows.
    ///
    /// Returns the previous map so the caller can release its resources.
    pub fn replace_map(&mut self, map: EventMap) -> Result<EventMap, SceneError> {
        if let Some(projection) = &self.projection {
            self.projection = Some(Projection::orthographic(
                projection.viewport(),
                map.bounds(),
            )?);
        }
        self.camera.set_bounds(*map.bounds());
        Ok(core::mem::replace(&mut self.map, map))
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The current projection, once a viewport is known.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Rebuilds the projection for a new viewport size.
    pub fn on_viewport_resize(&mut self, width: f64, height: f64) -> Result<(), SceneError> {
        let projection = Projection::orthographic(Size::new(width, height), self.map.bounds())?;
        debug!(width, height, frustum = ?projection.frustum(), "viewport resized");
        self.projection = Some(projection);
        Ok(())
    }

    /// Pans by `(dx, dy)` eye-space units, on the render thread.
    pub fn on_pan_delta(&mut self, dx: f64, dy: f64) {
        self.camera.pan(Vec2::new(dx, dy));
    }

    /// Zooms by `factor`, on the render thread.
    pub fn on_zoom_delta(&mut self, factor: f64) {
        self.camera.apply_scale(factor);
    }

    fn drain_input(&mut self) {
        let input = {
            let mut mailbox = self.shared.mailbox.lock();
            let mut input = core::mem::take(&mut mailbox.input);
            if self.projection.is_none() {
                // Pixels cannot be converted before a viewport is known.
                mailbox.input.scroll = core::mem::take(&mut input.scroll);
            }
            input
        };
        if input == CameraInput::default() {
            return;
        }
        if let Some(offset) = input.offset {
            self.camera.set_offset(offset);
        }
        self.camera.pan(input.pan);
        if let Some(projection) = &self.projection {
            let upp = projection.units_per_pixel();
            self.camera
                .pan(Vec2::new(-input.scroll.x * upp, input.scroll.y * upp));
        }
        self.camera.apply_scale(input.zoom);
        trace!(
            scale = self.camera.scale(),
            offset = ?self.camera.offset(),
            "applied camera input"
        );
    }

    fn answer_pick(&self, view: Option<&FrameView>) {
        let Some(pick) = self.shared.mailbox.lock().pick.take() else {
            return;
        };
        let hit = view.and_then(|view| self.map.find_intersection(pick.point, view));
        let mut mailbox = self.shared.mailbox.lock();
        if mailbox.abandoned == Some(pick.ticket) {
            mailbox.abandoned = None;
            return;
        }
        mailbox.answers.insert(pick.ticket, Ok(hit));
        self.shared.answered.notify_all();
    }

    /// Runs one frame.
    ///
    /// Returns the view the frame was drawn with, or `None` before the first
    /// [`RenderLoop::on_viewport_resize`]; taps pending in that case resolve to
    /// no seat.
    pub fn on_frame_tick<B, T>(&mut self, backend: &mut B, text: &mut T) -> Option<FrameView>
    where
        B: RenderBackend + ?Sized,
        T: TextRenderer + ?Sized,
    {
        self.drain_input();
        self.camera.clamp_offset();

        let Some(projection) = self.projection else {
            self.answer_pick(None);
            return None;
        };
        let view = FrameView::new(&self.camera, projection);

        self.map.prepare(backend);
        self.answer_pick(Some(&view));
        self.map.draw(backend, text, &view);
        Some(view)
    }

    /// Closes the mailbox and wakes every waiting tap with
    /// [`PickError::Closed`].
    pub fn shutdown(&self) {
        let mut mailbox = self.shared.mailbox.lock();
        if !mailbox.closed {
            debug!("render loop shut down");
        }
        mailbox.closed = true;
        mailbox.pick = None;
        self.shared.answered.notify_all();
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
