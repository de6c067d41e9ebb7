// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture-to-seat dispatch for hosts that recognise touch gestures.

use kurbo::Point;

use crate::{InputClient, PickError, SeatId};

/// Receives seat touch notifications from a [`TouchDispatcher`].
pub trait SeatTouchListener {
    /// A press is being shown on `seat`.
    fn on_seat_pressed(&mut self, seat: SeatId);

    /// `seat` was tapped.
    fn on_seat_clicked(&mut self, seat: SeatId);

    /// The press on `seat` ended without a tap (scroll, fling or release).
    fn on_seat_unpressed(&mut self, seat: SeatId);
}

/// Turns recognised gestures into camera input and seat notifications.
///
/// The dispatcher lives on the input thread. It forwards camera gestures to
/// its [`InputClient`], resolves presses and taps through the render thread,
/// and tracks the seat currently shown as pressed so it can be released when
/// the gesture turns into a scroll or fling.
#[derive(Debug)]
pub struct TouchDispatcher<L> {
    client: InputClient,
    listener: L,
    last_pressed: Option<SeatId>,
}

impl<L: SeatTouchListener> TouchDispatcher<L> {
    /// Creates a dispatcher.
    pub fn new(client: InputClient, listener: L) -> Self {
        Self {
            client,
            listener,
            last_pressed: None,
        }
    }

    /// The input handle.
    pub fn client(&self) -> &InputClient {
        &self.client
    }

    /// The listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The listener, mutably.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// The seat currently shown as pressed.
    pub fn last_pressed(&self) -> Option<SeatId> {
        self.last_pressed
    }

    /// A finger rests on `point`: resolve and report the pressed seat.
    pub fn on_show_press(&mut self, point: Point) -> Result<Option<SeatId>, PickError> {
        let seat = self.client.tap_at(point)?;
        if let Some(seat) = seat {
            self.listener.on_seat_pressed(seat);
            self.last_pressed = Some(seat);
        }
        Ok(seat)
    }

    /// A single tap ended on `point`: resolve and report the clicked seat.
    ///
    /// A click consumes the press; no unpress is reported for it.
    pub fn on_single_tap_up(&mut self, point: Point) -> Result<Option<SeatId>, PickError> {
        let seat = self.client.tap_at(point)?;
        if let Some(seat) = seat {
            self.listener.on_seat_clicked(seat);
        }
        self.last_pressed = None;
        Ok(seat)
    }

    /// The finger moved by `(dx, dy)` pixels since the last scroll event.
    pub fn on_scroll(&mut self, dx: f64, dy: f64) {
        self.client.scroll_by(dx, dy);
        self.release_pressed();
    }

    /// A fling started. Fling physics stay with the host, which feeds the
    /// animated offset back through [`InputClient::set_offset`].
    pub fn on_fling(&mut self) {
        self.release_pressed();
    }

    /// The finger lifted without a recognised gesture.
    pub fn on_up(&mut self) {
        self.release_pressed();
    }

    /// A pinch changed the scale by `factor`.
    pub fn on_scale(&mut self, factor: f64) {
        self.client.zoom_by(factor);
    }

    fn release_pressed(&mut self) {
        if let Some(seat) = self.last_pressed.take() {
            self.listener.on_seat_unpressed(seat);
        }
    }
}
