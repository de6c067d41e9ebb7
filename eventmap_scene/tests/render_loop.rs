// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the render-thread driver, with taps issued from other threads.

use std::thread;
use std::time::Duration;

use eventmap_camera::MapBounds;
use eventmap_geometry::{Seat, argb_to_color};
use eventmap_render_ref::{RecordingBackend, RecordingText};
use eventmap_scene::{
    EventMap, LoopConfig, PickError, RenderLoop, SceneConfig, SeatId, SeatTouchListener,
    TouchDispatcher,
};
use kurbo::{Point, Rect, Vec2};

/// Pixel of map point `(125, 125)` in a 1000×800 viewport at native scale.
const SEAT_PIXEL: Point = Point::new(200.0, 180.0);

fn render_loop() -> (RenderLoop, SeatId) {
    let mut map = EventMap::new(
        MapBounds::new(1000.0, 800.0).unwrap(),
        SceneConfig::default(),
    );
    let seat = map
        .add(Seat::rectangle(
            Rect::new(100.0, 100.0, 150.0, 150.0),
            argb_to_color(0xFF00_00FF),
        ))
        .unwrap();
    let config = LoopConfig::default().with_pick_timeout(Duration::from_secs(10));
    (RenderLoop::new(map, config), seat)
}

/// Ticks `rl` until `handle` finishes, then joins it.
fn tick_until<T>(rl: &mut RenderLoop, handle: thread::JoinHandle<T>) -> T {
    let mut backend = RecordingBackend::with_max_texture_size(2048);
    let mut text = RecordingText::default();
    while !handle.is_finished() {
        rl.on_frame_tick(&mut backend, &mut text);
        thread::sleep(Duration::from_millis(1));
    }
    handle.join().unwrap()
}

#[test]
fn tap_from_another_thread_is_resolved_by_the_next_tick() {
    let (mut rl, seat) = render_loop();
    rl.on_viewport_resize(1000.0, 800.0).unwrap();

    let client = rl.client();
    let hit = tick_until(&mut rl, thread::spawn(move || client.tap_at(SEAT_PIXEL)));
    assert_eq!(hit, Ok(Some(seat)));

    let client = rl.client();
    let miss = tick_until(
        &mut rl,
        thread::spawn(move || client.tap_at(Point::new(0.0, 0.0))),
    );
    assert_eq!(miss, Ok(None));
}

#[test]
fn tap_before_any_viewport_finds_nothing() {
    let (mut rl, _) = render_loop();
    let client = rl.client();
    let hit = tick_until(&mut rl, thread::spawn(move || client.tap_at(SEAT_PIXEL)));
    assert_eq!(hit, Ok(None));
    assert!(rl.projection().is_none());
}

#[test]
fn shutdown_wakes_a_waiting_tap() {
    let (rl, _) = render_loop();
    let client = rl.client();
    let handle = thread::spawn(move || client.tap_at(SEAT_PIXEL));
    thread::sleep(Duration::from_millis(20));
    drop(rl);
    assert_eq!(handle.join().unwrap(), Err(PickError::Closed));
}

#[test]
fn pans_are_clamped_once_per_frame() {
    let (mut rl, _) = render_loop();
    rl.on_viewport_resize(1000.0, 800.0).unwrap();
    let mut backend = RecordingBackend::with_max_texture_size(2048);
    let mut text = RecordingText::default();

    let client = rl.client();
    client.zoom_by(2.0);
    client.pan_by(10_000.0, -10_000.0);
    let view = rl.on_frame_tick(&mut backend, &mut text).unwrap();
    assert_eq!(rl.camera().scale(), 2.0);
    let b = rl.camera().pan_bounds();
    assert_eq!(rl.camera().offset(), Vec2::new(b.x1, b.y0));
    assert_eq!(view.model_view(), rl.camera().model_view());

    // At native scale there is nowhere to pan.
    client.zoom_by(0.25);
    let _ = rl.on_frame_tick(&mut backend, &mut text);
    assert_eq!(rl.camera().scale(), 1.0);
    assert_eq!(rl.camera().offset(), Vec2::ZERO);
}

#[test]
fn replacing_the_map_keeps_the_viewport() {
    let (mut rl, _) = render_loop();
    rl.on_viewport_resize(500.0, 500.0).unwrap();
    let smaller = EventMap::new(MapBounds::new(200.0, 100.0).unwrap(), SceneConfig::default());
    let old = rl.replace_map(smaller).unwrap();
    assert_eq!(old.bounds().width(), 1000.0);
    let projection = rl.projection().unwrap();
    assert_eq!(projection.viewport().width, 500.0);
    assert_eq!(projection.frustum().width(), 200.0);
    assert_eq!(rl.camera().bounds().width(), 200.0);
}

#[derive(Debug, Default)]
struct Log(Vec<(&'static str, SeatId)>);

impl SeatTouchListener for Log {
    fn on_seat_pressed(&mut self, seat: SeatId) {
        self.0.push(("pressed", seat));
    }

    fn on_seat_clicked(&mut self, seat: SeatId) {
        self.0.push(("clicked", seat));
    }

    fn on_seat_unpressed(&mut self, seat: SeatId) {
        self.0.push(("unpressed", seat));
    }
}

#[test]
fn gestures_report_press_release_and_click() {
    let (mut rl, seat) = render_loop();
    rl.on_viewport_resize(1000.0, 800.0).unwrap();
    let mut touch = TouchDispatcher::new(rl.client(), Log::default());

    let log = tick_until(
        &mut rl,
        thread::spawn(move || {
            // Press, then drag away: the press is released.
            assert_eq!(touch.on_show_press(SEAT_PIXEL), Ok(Some(seat)));
            assert_eq!(touch.last_pressed(), Some(seat));
            touch.on_scroll(5.0, 0.0);
            assert_eq!(touch.last_pressed(), None);

            // Press, then tap: the click consumes the press.
            touch.on_show_press(SEAT_PIXEL).unwrap();
            assert_eq!(touch.on_single_tap_up(SEAT_PIXEL), Ok(Some(seat)));
            touch.on_up();

            // Nothing pressed on empty space.
            assert_eq!(touch.on_show_press(Point::new(0.0, 0.0)), Ok(None));
            touch.on_fling();
            touch.listener().0.clone()
        }),
    );

    assert_eq!(
        log,
        [
            ("pressed", seat),
            ("unpressed", seat),
            ("pressed", seat),
            ("clicked", seat),
        ]
    );
}
