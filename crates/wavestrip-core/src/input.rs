//! Raw input events supplied by the host input layer
//!
//! Positions are strip-relative pixels (0 = left edge of the waveform strip).
//! Timestamps are milliseconds on any monotonic clock, as long as pointer
//! events and scheduler ticks share it.

use serde::{Deserialize, Serialize};

/// Milliseconds on the host's monotonic clock
pub type Millis = f64;

/// Kind of device behind a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// What the pointer was over when it was pressed (host hit testing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    /// The waveform strip itself
    #[default]
    Waveform,
    /// The visible scrollbar track below the strip
    ScrollbarTrack,
}

/// One pointer press/move/release/cancel/leave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerEvent {
    pub id: u32,
    pub client_x: f64,
    /// Pressed-button bitmask; moves with no buttons held are ignored
    pub buttons: u16,
    /// Pinch-simulation modifier (Ctrl on desktop hosts)
    pub modifier_held: bool,
    pub kind: PointerKind,
    pub timestamp: Millis,
    pub target: PointerTarget,
}

impl Default for PointerEvent {
    fn default() -> Self {
        Self {
            id: 0,
            client_x: 0.0,
            buttons: 1,
            modifier_held: false,
            kind: PointerKind::Mouse,
            timestamp: 0.0,
            target: PointerTarget::Waveform,
        }
    }
}

impl PointerEvent {
    /// Primary-button event for pointer `id` at `client_x`
    pub fn at(id: u32, client_x: f64, timestamp: Millis) -> Self {
        Self {
            id,
            client_x,
            timestamp,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_modifier(mut self) -> Self {
        self.modifier_held = true;
        self
    }

    pub fn on_scrollbar(mut self) -> Self {
        self.target = PointerTarget::ScrollbarTrack;
        self
    }

    pub fn without_buttons(mut self) -> Self {
        self.buttons = 0;
        self
    }
}

/// Mouse wheel / trackpad scroll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Positive scrolls down, which zooms out
    pub delta_y: f64,
    pub client_x: f64,
}

/// Native scroll container moved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollbarEvent {
    /// Scroll-content offset in pixels
    pub scroll_offset: f64,
}

/// Strip was laid out again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeEvent {
    pub display_width: u32,
    pub display_height: u32,
}
