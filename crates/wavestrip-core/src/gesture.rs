//! Pointer tracking and gesture classification
//!
//! ```text
//!            press            press (2nd pointer)
//!   Idle ──────────► Dragging ───────────────────► Pinching
//!    ▲                  │  ▲                           │
//!    └──── release ─────┘  └──── release (1 left) ─────┤
//!    ▲                                                 │
//!    └──────────────── release (none left) ────────────┘
//! ```
//!
//! A drag pans the viewport relative to pointer motion and records release
//! velocity for inertial coasting. A pinch captures the sample positions
//! under both pointers (the pinch lock) and solves for the window that keeps
//! those samples under the pointers as they spread or close.
//!
//! Holding the pinch modifier while pressing with a lone pointer adds a fixed
//! virtual pointer at the press location, so one physical pointer can pinch
//! around it. The virtual pointer is owned by the pointer that created it and
//! goes away when that pointer is released.

use std::collections::HashMap;

use crate::input::{Millis, PointerEvent, PointerKind, PointerTarget};
use crate::viewport::Viewport;

/// Minimum pixel spread between two pointers for pinch math
///
/// Below this the lock range divides by (almost) nothing.
pub const MIN_PINCH_SPREAD: f64 = 2.0;

// =============================================================================
// Types
// =============================================================================

/// Identity of a tracked pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    /// Pointer reported by the host
    Device(u32),
    /// The fixed modifier-pinch pointer
    Virtual,
}

/// Last known state of a pressed pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRecord {
    pub id: PointerId,
    pub client_x: f64,
    pub kind: PointerKind,
    /// Press order, lowest first
    pressed_seq: u64,
    /// Device pointer that created this virtual pointer
    owner: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging,
    Pinching,
}

/// Sample-space positions fixed under the two pinch pointers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchLock {
    pub left_anchor: f64,
    pub right_anchor: f64,
}

impl PinchLock {
    /// Samples between the anchors
    pub fn lock_range(&self) -> f64 {
        self.right_anchor - self.left_anchor
    }
}

/// How a pointer left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Release,
    Cancel,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Pointer was not being tracked
    Ignored,
    Released,
    /// Last drag pointer lifted fast enough to coast
    Flick {
        /// Pointer velocity in px/ms (positive = pointer moving right)
        velocity: f64,
        /// Time of the last drag move
        timestamp: Millis,
    },
}

// =============================================================================
// Tracker
// =============================================================================

#[derive(Debug, Clone)]
pub struct GestureTracker {
    pointers: HashMap<PointerId, PointerRecord>,
    state: GestureState,
    pinch: Option<PinchLock>,
    next_seq: u64,
    /// Instantaneous drag velocity (px/ms)
    velocity: f64,
    last_move_time: Option<Millis>,
    /// Displacement from moves that shared the previous move's timestamp
    pending_dx: f64,
    /// Offset between the pointer and the thumb's left edge during a scrollbar drag
    scrollbar_grab: Option<f64>,
    min_flick_velocity: f64,
    flick_window_ms: Millis,
}

impl GestureTracker {
    pub fn new(min_flick_velocity: f64, flick_window_ms: Millis) -> Self {
        Self {
            pointers: HashMap::new(),
            state: GestureState::Idle,
            pinch: None,
            next_seq: 0,
            velocity: 0.0,
            last_move_time: None,
            pending_dx: 0.0,
            scrollbar_grab: None,
            min_flick_velocity,
            flick_window_ms,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer(&self, id: PointerId) -> Option<&PointerRecord> {
        self.pointers.get(&id)
    }

    pub fn pinch_lock(&self) -> Option<PinchLock> {
        self.pinch
    }

    /// Last recorded drag velocity (px/ms)
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_scrollbar_drag(&self) -> bool {
        self.scrollbar_grab.is_some()
    }

    /// Register a pressed pointer
    pub fn press(&mut self, event: &PointerEvent, viewport: &Viewport) {
        let id = PointerId::Device(event.id);
        if let Some(record) = self.pointers.get_mut(&id) {
            // Duplicate press from unbalanced hardware streams
            record.client_x = event.client_x;
            return;
        }

        self.insert(id, event.client_x, event.kind, None);

        if event.modifier_held
            && self.pointers.len() == 1
            && !self.pointers.contains_key(&PointerId::Virtual)
        {
            log::debug!("GestureTracker: virtual pinch pointer at x={:.1}", event.client_x);
            self.insert(PointerId::Virtual, event.client_x, event.kind, Some(event.id));
        }

        self.velocity = 0.0;
        self.pending_dx = 0.0;
        self.last_move_time = Some(event.timestamp);

        self.scrollbar_grab = if self.pointers.len() == 1 && event.target == PointerTarget::ScrollbarTrack {
            Some(Self::thumb_grab_offset(event.client_x, viewport))
        } else {
            None
        };

        self.update_state();
    }

    /// Apply a move to the pointer's record and to the viewport
    ///
    /// Returns whether the viewport changed.
    pub fn move_to(&mut self, event: &PointerEvent, viewport: &mut Viewport) -> bool {
        if event.buttons == 0 {
            return false;
        }
        let id = PointerId::Device(event.id);
        let Some(previous_x) = self.pointers.get(&id).map(|r| r.client_x) else {
            return false;
        };

        // Lock on pre-move positions so the first pinch frame already scales
        if self.state == GestureState::Pinching && self.pinch.is_none() {
            self.capture_pinch_lock(viewport);
        }

        if let Some(record) = self.pointers.get_mut(&id) {
            record.client_x = event.client_x;
        }
        let dx = event.client_x - previous_x;

        match self.state {
            GestureState::Pinching => self.apply_pinch(viewport),
            GestureState::Dragging => {
                if let Some(grab) = self.scrollbar_grab {
                    let width = viewport.display_width() as f64;
                    if width <= 0.0 {
                        return false;
                    }
                    return viewport.set_start_fraction((event.client_x - grab) / width);
                }

                match self.last_move_time {
                    Some(last) if event.timestamp <= last => {
                        // Coalesced move: fold into the next timed sample
                        self.pending_dx += dx;
                    }
                    Some(last) => {
                        self.velocity = (dx + self.pending_dx) / (event.timestamp - last);
                        self.pending_dx = 0.0;
                        self.last_move_time = Some(event.timestamp);
                    }
                    None => self.last_move_time = Some(event.timestamp),
                }
                log::trace!("GestureTracker: drag dx={:.2} v={:.4}px/ms", dx, self.velocity);

                // Content follows the pointer, so the window moves the other way
                viewport.pan_by_pixels(-dx).changed
            }
            GestureState::Idle => false,
        }
    }

    /// Remove a pointer after release, cancel or leave
    pub fn release(&mut self, event: &PointerEvent, kind: ReleaseKind) -> ReleaseOutcome {
        let id = PointerId::Device(event.id);
        if self.pointers.remove(&id).is_none() {
            return ReleaseOutcome::Ignored;
        }
        let virtual_owned = self
            .pointers
            .get(&PointerId::Virtual)
            .is_some_and(|v| v.owner == Some(event.id));
        if virtual_owned {
            self.pointers.remove(&PointerId::Virtual);
        }

        let previous = self.state;
        self.update_state();

        let mut outcome = ReleaseOutcome::Released;
        match (previous, self.state) {
            (GestureState::Pinching, GestureState::Pinching) => {}
            (GestureState::Pinching, _) => {
                // Remaining pointer continues as a fresh drag
                self.velocity = 0.0;
                self.pending_dx = 0.0;
                self.last_move_time = Some(event.timestamp);
            }
            (GestureState::Dragging, GestureState::Idle) => {
                outcome = self.flick_outcome(event.timestamp, kind);
            }
            _ => {}
        }

        if self.state == GestureState::Idle {
            self.velocity = 0.0;
            self.pending_dx = 0.0;
            self.last_move_time = None;
            self.scrollbar_grab = None;
        }
        outcome
    }

    fn flick_outcome(&self, released_at: Millis, kind: ReleaseKind) -> ReleaseOutcome {
        if kind != ReleaseKind::Release || self.scrollbar_grab.is_some() {
            return ReleaseOutcome::Released;
        }
        let Some(last_move) = self.last_move_time else {
            return ReleaseOutcome::Released;
        };
        if released_at - last_move > self.flick_window_ms {
            log::trace!("GestureTracker: stale release, no flick");
            return ReleaseOutcome::Released;
        }
        if self.velocity.abs() < self.min_flick_velocity {
            return ReleaseOutcome::Released;
        }
        ReleaseOutcome::Flick {
            velocity: self.velocity,
            timestamp: last_move,
        }
    }

    // -------------------------------------------------------------------------
    // Pinch
    // -------------------------------------------------------------------------

    /// Left and right x of the two earliest-pressed pointers
    fn pinch_pair(&self) -> Option<(f64, f64)> {
        let mut records: Vec<&PointerRecord> = self.pointers.values().collect();
        if records.len() < 2 {
            return None;
        }
        records.sort_by_key(|r| r.pressed_seq);
        let (a, b) = (records[0].client_x, records[1].client_x);
        Some((a.min(b), a.max(b)))
    }

    fn capture_pinch_lock(&mut self, viewport: &Viewport) {
        let Some((left, right)) = self.pinch_pair() else {
            return;
        };
        if right - left < MIN_PINCH_SPREAD {
            return;
        }
        let spp = viewport.samples_per_pixel();
        let start = viewport.start() as f64;
        let lock = PinchLock {
            left_anchor: start + spp * left,
            right_anchor: start + spp * right,
        };
        log::debug!(
            "GestureTracker: pinch lock {:.1}..{:.1} ({:.1} samples)",
            lock.left_anchor,
            lock.right_anchor,
            lock.lock_range()
        );
        self.pinch = Some(lock);
    }

    fn apply_pinch(&mut self, viewport: &mut Viewport) -> bool {
        let (Some(lock), Some((left, right))) = (self.pinch, self.pinch_pair()) else {
            return false;
        };
        let spread = right - left;
        if spread < MIN_PINCH_SPREAD || viewport.is_degenerate() {
            return false;
        }

        let width = viewport.display_width() as f64;
        let min_spp = viewport.min_range() as f64 / width;
        let max_spp = viewport.len() as f64 / width;
        let spp = (lock.lock_range() / spread).clamp(min_spp, max_spp);

        // Fixed width first; a window that runs past either end slides back in
        let len = viewport.len() as i64;
        let width_samples = ((spp * width).round() as i64).clamp(viewport.min_range() as i64, len);
        let start = ((lock.left_anchor - left * spp).round() as i64).clamp(0, len - width_samples);
        log::trace!("GestureTracker: pinch spread={:.1} spp={:.3}", spread, spp);
        viewport.set_range(start, start + width_samples)
    }

    // -------------------------------------------------------------------------
    // Bookkeeping
    // -------------------------------------------------------------------------

    fn insert(&mut self, id: PointerId, client_x: f64, kind: PointerKind, owner: Option<u32>) {
        let record = PointerRecord {
            id,
            client_x,
            kind,
            pressed_seq: self.next_seq,
            owner,
        };
        self.next_seq += 1;
        self.pointers.insert(id, record);
    }

    fn update_state(&mut self) {
        let next = match self.pointers.len() {
            0 => GestureState::Idle,
            1 => GestureState::Dragging,
            _ => GestureState::Pinching,
        };
        if next == self.state {
            return;
        }
        match next {
            GestureState::Pinching => {
                log::debug!("GestureTracker: pinch started");
                self.pinch = None;
                self.scrollbar_grab = None;
            }
            _ if self.state == GestureState::Pinching => {
                log::debug!("GestureTracker: pinch ended");
                self.pinch = None;
            }
            _ => {}
        }
        self.state = next;
    }

    /// Grab point inside the thumb, or its centre when pressed outside it
    fn thumb_grab_offset(x: f64, viewport: &Viewport) -> f64 {
        let width = viewport.display_width() as f64;
        let thumb = viewport.scrollbar_thumb();
        let left = thumb.offset_fraction * width;
        let thumb_width = thumb.width_fraction * width;
        if x >= left && x <= left + thumb_width {
            x - left
        } else {
            thumb_width / 2.0
        }
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(0.1, 40.0)
    }
}
