//! Waveform navigation engine
//!
//! Glues the pieces together behind one state object the host drives:
//!
//! - Raw input (`on_pointer_*`, `on_wheel`, `on_scrollbar`, `on_resize`)
//!   goes through the [`GestureTracker`] or straight to the [`Viewport`].
//! - `tick(timestamp)` advances inertial coasting; the host calls it once per
//!   display refresh while it returns [`TickOutcome::Continue`].
//! - Every viewport change is reported synchronously to the
//!   [`ViewportObserver`], which typically schedules a redraw that pulls
//!   [`WaveEngine::peaks`] or [`WaveEngine::envelope`].
//!
//! Any user navigation cancels an in-flight coast before it touches the
//! viewport, so physics and input never fight over the window.

use crate::buffer::SampleBuffer;
use crate::config::EngineConfig;
use crate::gesture::{GestureState, GestureTracker, ReleaseKind, ReleaseOutcome};
use crate::inertia::{CoastStep, InertiaController};
use crate::input::{Millis, PointerEvent, ResizeEvent, ScrollbarEvent, WheelEvent};
use crate::observer::{NullObserver, ViewportObserver};
use crate::peaks::{alternating_envelope, PeakReducer};
use crate::viewport::{ScrollbarThumb, Viewport, ViewportChange};

/// Wheel delta that multiplies zoom by `exp(zoom_rate)`
const WHEEL_DELTA_UNIT: f64 = 80.0;

/// What the host should do after a [`WaveEngine::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is animating; stop requesting ticks
    Idle,
    /// Coasting continues; request another tick
    Continue,
    /// Coasting stopped on this tick
    Settled,
}

pub struct WaveEngine<O: ViewportObserver = NullObserver> {
    config: EngineConfig,
    buffer: SampleBuffer,
    viewport: Viewport,
    gestures: GestureTracker,
    inertia: InertiaController,
    reducer: PeakReducer,
    display_height: u32,
    observer: O,
}

impl WaveEngine<NullObserver> {
    /// Engine with default configuration and no observer
    pub fn with_defaults(buffer: impl Into<SampleBuffer>, display_width: u32) -> Self {
        Self::new(buffer, display_width, EngineConfig::default(), NullObserver)
    }
}

impl<O: ViewportObserver> WaveEngine<O> {
    /// Build an engine over `buffer` shown in a strip `display_width` pixels wide
    ///
    /// Invalid configuration fields fall back to their defaults. The window
    /// starts at index 0 with the configured initial zoom.
    ///
    /// # Arguments
    /// * `buffer` - Samples to navigate (anything convertible to [`SampleBuffer`])
    /// * `display_width` - Strip width in pixels; 0 gives a degenerate viewport
    /// * `config` - Engine tunables, sanitised once here
    /// * `observer` - Receives viewport and slide-settled notifications
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut engine = WaveEngine::new(samples, 1280, EngineConfig::default(), RecordingObserver::new());
    /// engine.zoom_centered(8.0);
    /// assert_eq!(engine.observer().changes.len(), 1);
    /// ```
    pub fn new(
        buffer: impl Into<SampleBuffer>,
        display_width: u32,
        config: EngineConfig,
        observer: O,
    ) -> Self {
        let config = config.sanitized();
        let buffer = buffer.into();

        let mut viewport = Viewport::new(buffer.len(), display_width);
        if config.initial_zoom > 1.0 {
            viewport.set_zoom_anchored(config.initial_zoom, 0.0);
        }

        log::debug!(
            "WaveEngine: {} samples in {}px, window {}..{}",
            buffer.len(),
            display_width,
            viewport.start(),
            viewport.end()
        );

        Self {
            gestures: GestureTracker::new(config.min_flick_velocity, config.flick_window_ms),
            inertia: InertiaController::new(config.deceleration_time_ms),
            reducer: PeakReducer::new(config.samples_per_point),
            display_height: 0,
            config,
            buffer,
            viewport,
            observer,
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn on_pointer_down(&mut self, event: &PointerEvent) {
        self.preempt_coast();
        self.gestures.press(event, &self.viewport);
    }

    /// Returns whether the viewport changed
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        let changed = self.gestures.move_to(event, &mut self.viewport);
        self.notify_if(changed)
    }

    /// Release a pointer; a fast drag release starts coasting
    ///
    /// Returns whether coasting started.
    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> bool {
        match self.gestures.release(event, ReleaseKind::Release) {
            ReleaseOutcome::Flick { velocity, timestamp } => self.inertia.start(velocity, timestamp),
            ReleaseOutcome::Released | ReleaseOutcome::Ignored => false,
        }
    }

    pub fn on_pointer_cancel(&mut self, event: &PointerEvent) {
        self.gestures.release(event, ReleaseKind::Cancel);
    }

    pub fn on_pointer_leave(&mut self, event: &PointerEvent) {
        self.gestures.release(event, ReleaseKind::Leave);
    }

    /// Zoom around the cursor
    pub fn on_wheel(&mut self, event: &WheelEvent) -> bool {
        if self.viewport.is_degenerate() || !event.delta_y.is_finite() {
            return false;
        }
        self.preempt_coast();

        let factor = (-event.delta_y / WHEEL_DELTA_UNIT * self.config.zoom_rate).exp();
        let anchor = event.client_x / self.viewport.display_width() as f64;
        let changed = self
            .viewport
            .set_zoom_anchored(self.viewport.zoom() * factor, anchor);
        self.notify_if(changed)
    }

    /// Follow the host's scroll container
    ///
    /// An event that matches the current window (the echo of our own
    /// update) leaves coasting alone.
    pub fn on_scrollbar(&mut self, event: &ScrollbarEvent) -> bool {
        let mut moved = self.viewport.clone();
        if !moved.scroll_to_offset(event.scroll_offset) {
            return false;
        }
        self.preempt_coast();
        self.viewport = moved;
        self.notify_if(true)
    }

    /// Adopt a new strip size; always notifies since the scale changed
    pub fn on_resize(&mut self, event: &ResizeEvent) {
        self.display_height = event.display_height;
        self.viewport.resize(event.display_width);
        log::debug!(
            "WaveEngine: resized to {}x{}, window {}..{}",
            event.display_width,
            event.display_height,
            self.viewport.start(),
            self.viewport.end()
        );
        self.notify();
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance inertial coasting to `timestamp`
    pub fn tick(&mut self, timestamp: Millis) -> TickOutcome {
        match self.inertia.tick(timestamp, &mut self.viewport) {
            CoastStep::Idle => TickOutcome::Idle,
            CoastStep::Coasting { changed } => {
                self.notify_if(changed);
                TickOutcome::Continue
            }
            CoastStep::Settled { changed } => {
                self.notify_if(changed);
                self.observer.slide_settled();
                TickOutcome::Settled
            }
        }
    }

    pub fn is_coasting(&self) -> bool {
        self.inertia.is_active()
    }

    // =========================================================================
    // Programmatic navigation
    // =========================================================================

    /// Zoom keeping the left edge fixed
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.preempt_coast();
        let changed = self.viewport.set_zoom_anchored(zoom, 0.0);
        self.notify_if(changed)
    }

    /// Zoom keeping the centre sample fixed
    pub fn zoom_centered(&mut self, zoom: f64) -> bool {
        self.preempt_coast();
        let changed = self.viewport.set_zoom_anchored(zoom, 0.5);
        self.notify_if(changed)
    }

    pub fn set_range(&mut self, start: i64, end: i64) -> bool {
        self.preempt_coast();
        let changed = self.viewport.set_range(start, end);
        self.notify_if(changed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Peak magnitudes of the visible window in `point_count` columns
    pub fn peaks(&mut self, point_count: usize) -> &[f32] {
        self.reducer.reduce(
            &self.buffer,
            self.viewport.start(),
            self.viewport.end(),
            point_count,
        )
    }

    /// Column count for the current strip width
    pub fn display_point_count(&self) -> usize {
        (self.viewport.display_width() / self.config.pixel_step.max(1)) as usize
    }

    pub fn display_peaks(&mut self) -> &[f32] {
        let count = self.display_point_count();
        self.peaks(count)
    }

    /// Normalised up/down column values ready to stroke
    pub fn envelope(&mut self) -> Vec<f32> {
        let global_peak = self.buffer.peak_magnitude();
        let scale = self.config.scale;
        alternating_envelope(self.display_peaks(), global_peak, scale)
    }

    /// Sample index under strip-relative pixel `client_x`
    pub fn index(&self, client_x: f64) -> usize {
        self.viewport.index_at(client_x)
    }

    /// Time in seconds under strip-relative pixel `client_x`
    pub fn seconds(&self, client_x: f64) -> f64 {
        self.index(client_x) as f64 / self.config.sample_rate.max(1) as f64
    }

    pub fn scrollbar_thumb(&self) -> ScrollbarThumb {
        self.viewport.scrollbar_thumb()
    }

    pub fn snapshot(&self) -> ViewportChange {
        self.viewport.snapshot()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn max_zoom(&self) -> f64 {
        self.viewport.max_zoom()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn display_height(&self) -> u32 {
        self.display_height
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn preempt_coast(&mut self) {
        if self.inertia.cancel() {
            self.observer.slide_settled();
        }
    }

    fn notify_if(&mut self, changed: bool) -> bool {
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&mut self) {
        let change = self.viewport.snapshot();
        log::trace!(
            "WaveEngine: viewport {}..{} ({:.3} spp)",
            change.start_index,
            change.end_index,
            change.samples_per_pixel
        );
        self.observer.viewport_changed(&change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerKind;
    use crate::observer::RecordingObserver;

    fn engine(len: usize, width: u32) -> WaveEngine<RecordingObserver> {
        let samples: Vec<f32> = (0..len).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect();
        WaveEngine::new(samples, width, EngineConfig::default(), RecordingObserver::new())
    }

    /// Drag pointer 1 from `from` to `to` in 10ms steps of `step` px, then release
    fn flick(engine: &mut WaveEngine<RecordingObserver>, from: f64, to: f64, step: f64) -> (bool, Millis) {
        let mut t = 0.0;
        let mut x = from;
        engine.on_pointer_down(&PointerEvent::at(1, x, t));
        while (to - x).abs() > f64::EPSILON {
            t += 10.0;
            x = if to > x { (x + step).min(to) } else { (x - step).max(to) };
            engine.on_pointer_move(&PointerEvent::at(1, x, t));
        }
        t += 5.0;
        (engine.on_pointer_up(&PointerEvent::at(1, x, t)), t)
    }

    #[test]
    fn test_initial_full_view() {
        let engine = engine(1000, 100);
        assert_eq!(engine.zoom(), 1.0);
        assert_eq!(engine.viewport().range(), 1000);
        assert_eq!(engine.snapshot().samples_per_pixel, 10.0);
        assert!(engine.observer().changes.is_empty(), "Construction does not notify");
    }

    #[test]
    fn test_zoom_centered_keeps_midpoint() {
        let mut engine = engine(1000, 100);
        assert!(engine.zoom_centered(10.0));

        let change = engine.observer().last().copied().expect("notified");
        assert_eq!((change.start_index, change.end_index), (450, 550));
        assert_eq!(engine.index(50.0), 500);

        assert!(!engine.zoom_centered(10.0), "Same zoom again changes nothing");
        assert_eq!(engine.observer().changes.len(), 1, "No notification without a change");
    }

    #[test]
    fn test_drag_pans_against_pointer() {
        let mut engine = engine(10_000, 100);
        engine.set_range(0, 1000);

        engine.on_pointer_down(&PointerEvent::at(1, 60.0, 0.0));
        assert!(engine.on_pointer_move(&PointerEvent::at(1, 10.0, 100.0)));
        assert_eq!(engine.viewport().start(), 500, "50px at 10 spp is 500 samples");

        engine.set_range(8800, 9800);
        engine.on_pointer_down(&PointerEvent::at(1, 60.0, 200.0));
        engine.on_pointer_move(&PointerEvent::at(1, 10.0, 300.0));
        assert_eq!((engine.viewport().start(), engine.viewport().end()), (9000, 10_000));

        let count = engine.observer().changes.len();
        assert!(!engine.on_pointer_move(&PointerEvent::at(1, 0.0, 400.0)));
        assert_eq!(engine.observer().changes.len(), count, "Clamped no-op does not notify");
    }

    #[test]
    fn test_two_finger_pinch() {
        let mut engine = engine(1000, 100);

        engine.on_pointer_down(&PointerEvent::at(1, 20.0, 0.0).with_kind(PointerKind::Touch));
        engine.on_pointer_down(&PointerEvent::at(2, 80.0, 0.0).with_kind(PointerKind::Touch));
        assert_eq!(engine.gesture_state(), GestureState::Pinching);

        engine.on_pointer_move(&PointerEvent::at(1, 10.0, 16.0).with_kind(PointerKind::Touch));
        engine.on_pointer_move(&PointerEvent::at(2, 110.0, 32.0).with_kind(PointerKind::Touch));

        let change = engine.observer().last().copied().expect("notified");
        assert!((change.samples_per_pixel - 6.0).abs() < 1e-9, "spp scaled by 0.6");

        assert!(!engine.on_pointer_up(&PointerEvent::at(2, 110.0, 40.0)));
        assert_eq!(engine.gesture_state(), GestureState::Dragging);
        assert!(!engine.on_pointer_up(&PointerEvent::at(1, 10.0, 41.0)), "Pinch end never coasts");
        assert!(!engine.is_coasting());
    }

    #[test]
    fn test_flick_coasts_and_settles() {
        let mut engine = engine(1_000_000, 1000);
        engine.set_range(500_000, 510_000);

        let (started, released_at) = flick(&mut engine, 500.0, 400.0, 20.0);
        assert!(started, "2px/ms release should coast");
        assert!(engine.is_coasting());
        let start_at_release = engine.viewport().start();

        let mut t = released_at;
        let mut outcome = TickOutcome::Continue;
        let mut frames = 0;
        while outcome == TickOutcome::Continue {
            t += 16.0;
            outcome = engine.tick(t);
            frames += 1;
            assert!(frames < 100, "Coast must settle within the deceleration time");
        }

        assert_eq!(outcome, TickOutcome::Settled);
        assert!(engine.viewport().start() > start_at_release, "Kept moving forward");
        assert_eq!(engine.viewport().range(), 10_000, "Coasting never zooms");
        assert_eq!(engine.observer().settled, 1);
        assert_eq!(engine.tick(t + 16.0), TickOutcome::Idle);
    }

    #[test]
    fn test_press_preempts_coast() {
        let mut engine = engine(1_000_000, 1000);
        engine.set_range(500_000, 510_000);

        let (started, t) = flick(&mut engine, 500.0, 400.0, 20.0);
        assert!(started);
        engine.tick(t + 16.0);

        engine.on_pointer_down(&PointerEvent::at(2, 300.0, t + 20.0));
        assert!(!engine.is_coasting());
        assert_eq!(engine.observer().settled, 1, "Preempted coast reports settled");
        assert_eq!(engine.tick(t + 32.0), TickOutcome::Idle);
    }

    #[test]
    fn test_coast_stops_at_boundary() {
        let mut engine = engine(100_000, 1000);
        engine.set_range(2000, 12_000);

        // Pointer flung right: window heads to index 0
        let (started, mut t) = flick(&mut engine, 400.0, 500.0, 20.0);
        assert!(started);

        let mut outcome = TickOutcome::Continue;
        while outcome == TickOutcome::Continue {
            t += 16.0;
            outcome = engine.tick(t);
        }
        assert_eq!(outcome, TickOutcome::Settled);
        assert_eq!(engine.viewport().start(), 0);
        assert!(t < 200.0, "Hard stop well before the deceleration time");
    }

    #[test]
    fn test_disabled_deceleration_never_coasts() {
        let config = EngineConfig {
            deceleration_time_ms: None,
            ..Default::default()
        };
        let mut engine = WaveEngine::new(vec![0.0f32; 100_000], 1000, config, RecordingObserver::new());
        engine.set_range(50_000, 60_000);

        let (started, _) = flick(&mut engine, 500.0, 400.0, 20.0);
        assert!(!started);
        assert_eq!(engine.tick(100.0), TickOutcome::Idle);
    }

    #[test]
    fn test_wheel_zooms_around_cursor() {
        let mut engine = engine(1_000_000, 1000);

        let before = engine.index(250.0);
        // exp(8000 / 80 * 0.01) = e
        assert!(engine.on_wheel(&WheelEvent {
            delta_y: -8000.0,
            client_x: 250.0
        }));
        assert!((engine.zoom() - std::f64::consts::E).abs() < 1e-3, "zoom {}", engine.zoom());
        assert!((engine.index(250.0) as i64 - before as i64).abs() <= 1, "Cursor sample stays put");

        engine.on_wheel(&WheelEvent {
            delta_y: 1_000_000.0,
            client_x: 500.0,
        });
        assert_eq!(engine.zoom(), 1.0, "Zoom out stops at the full view");
    }

    #[test]
    fn test_scrollbar_event_positions_window() {
        let mut engine = engine(1000, 100);
        engine.set_range(0, 200);

        assert!(engine.on_scrollbar(&ScrollbarEvent { scroll_offset: 150.0 }));
        assert_eq!((engine.viewport().start(), engine.viewport().end()), (300, 500));
        assert!(
            !engine.on_scrollbar(&ScrollbarEvent { scroll_offset: 150.0 }),
            "Echo of the current position is a no-op"
        );

        let thumb = engine.scrollbar_thumb();
        assert!((thumb.offset_fraction - 0.3).abs() < 1e-9);
        assert!((thumb.width_fraction - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_resize_always_notifies() {
        let mut engine = engine(1000, 100);
        engine.on_resize(&ResizeEvent {
            display_width: 200,
            display_height: 80,
        });

        let change = engine.observer().last().copied().expect("notified");
        assert_eq!((change.start_index, change.end_index), (0, 1000));
        assert_eq!(change.samples_per_pixel, 5.0);
        assert_eq!(engine.display_height(), 80);
        assert_eq!(engine.display_point_count(), 100);
    }

    #[test]
    fn test_display_envelope_alternates() {
        let mut engine = engine(1000, 100);
        let peaks = engine.display_peaks().to_vec();
        assert_eq!(peaks.len(), 50, "100px at 2px per column");

        let envelope = engine.envelope();
        assert_eq!(envelope.len(), 50);
        for (i, v) in envelope.iter().enumerate() {
            if i % 2 == 0 {
                assert!(*v >= 0.0, "Even column {} points up", i);
            } else {
                assert!(*v <= 0.0, "Odd column {} points down", i);
            }
            assert!(v.abs() <= 1.0);
        }
    }

    #[test]
    fn test_index_and_seconds() {
        let mut engine = engine(441_000, 1000);
        engine.set_range(44_100, 88_200);
        assert_eq!(engine.index(0.0), 44_100);
        assert!((engine.seconds(0.0) - 1.0).abs() < 1e-9);
        assert!((engine.seconds(1000.0) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_initial_zoom_anchored_at_start() {
        let config = EngineConfig {
            initial_zoom: 4.0,
            ..Default::default()
        };
        let engine = WaveEngine::new(vec![0.0f32; 1000], 100, config, NullObserver);
        assert_eq!((engine.viewport().start(), engine.viewport().end()), (0, 250));
    }

    #[test]
    fn test_set_zoom_anchors_left_edge() {
        let mut engine = engine(1000, 100);
        engine.set_range(200, 1000);
        engine.set_zoom(5.0);
        assert_eq!((engine.viewport().start(), engine.viewport().end()), (200, 400));
    }

    #[test]
    fn test_empty_buffer_is_inert() {
        let mut engine = engine(0, 100);
        engine.on_pointer_down(&PointerEvent::at(1, 10.0, 0.0));
        assert!(!engine.on_pointer_move(&PointerEvent::at(1, 50.0, 10.0)));
        assert!(!engine.on_pointer_up(&PointerEvent::at(1, 50.0, 12.0)));
        assert!(!engine.on_wheel(&WheelEvent {
            delta_y: -100.0,
            client_x: 10.0
        }));
        assert_eq!(engine.peaks(8), &[0.0; 8]);
        assert_eq!(engine.index(42.0), 0);
        assert_eq!((engine.viewport().start(), engine.viewport().end()), (0, 0));
        assert!(engine.observer().changes.is_empty());
    }

    #[test]
    fn test_bounds_and_zoom_hold_under_mixed_input() {
        let mut seed: u64 = 0xfeed;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as f64 / (1u64 << 31) as f64
        };

        for &(len, width) in &[(1000usize, 100u32), (50, 100), (200_000, 640)] {
            let mut engine = engine(len, width);
            let mut t = 0.0;
            for _ in 0..2000 {
                t += next() * 12.0;
                let id = 1 + (next() * 3.0) as u32;
                let x = next() * (width as f64 + 100.0) - 50.0;
                match (next() * 8.0) as u32 {
                    0 => engine.on_pointer_down(&PointerEvent::at(id, x, t)),
                    1 | 2 | 3 => {
                        engine.on_pointer_move(&PointerEvent::at(id, x, t));
                    }
                    4 => {
                        engine.on_pointer_up(&PointerEvent::at(id, x, t));
                    }
                    5 => {
                        engine.on_wheel(&WheelEvent {
                            delta_y: (next() - 0.5) * 4000.0,
                            client_x: x,
                        });
                    }
                    6 => {
                        engine.tick(t);
                    }
                    _ => {
                        engine.on_pointer_down(&PointerEvent::at(id, x, t).with_modifier());
                    }
                }

                let vp = engine.viewport();
                assert!(vp.start() <= vp.end() && vp.end() <= vp.len(), "Bounds at t={}", t);
                assert!(vp.range() >= 1, "Non-empty window at t={}", t);
                assert!(
                    engine.zoom() <= engine.max_zoom(),
                    "zoom {} > max {} at t={}",
                    engine.zoom(),
                    engine.max_zoom(),
                    t
                );
            }
        }
    }

    #[test]
    fn test_unknown_pointer_release_is_noop() {
        let mut engine = engine(1000, 100);
        assert!(!engine.on_pointer_up(&PointerEvent::at(7, 0.0, 0.0)));
        engine.on_pointer_cancel(&PointerEvent::at(8, 0.0, 0.0));
        engine.on_pointer_leave(&PointerEvent::at(9, 0.0, 0.0));
        assert_eq!(engine.gesture_state(), GestureState::Idle);
    }
}
