//! Visible sample window
//!
//! The index range `[start, end)` is the single source of truth for what is
//! visible. Zoom and samples-per-pixel are always derived from it, never
//! stored.
//!
//! Every mutation clamps instead of failing:
//!
//! ```text
//! 0 <= start <= end <= N        end - start >= 1 when N > 0
//! ```
//!
//! An empty buffer or a zero-width strip collapses the window to `(0, 0)`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Snapshots
// =============================================================================

/// Payload of a viewport-changed notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportChange {
    pub start_index: usize,
    pub end_index: usize,
    pub samples_per_pixel: f64,
}

/// Scrollbar thumb geometry as fractions of the whole buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollbarThumb {
    /// Left edge of the thumb (0.0 to 1.0)
    pub offset_fraction: f64,
    /// Thumb width (0.0 to 1.0)
    pub width_fraction: f64,
}

/// Result of a relative pan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanOutcome {
    /// The window moved
    pub changed: bool,
    /// The requested shift ran into either end of the buffer
    pub clamped: bool,
}

// =============================================================================
// Viewport
// =============================================================================

#[derive(Debug, Clone)]
pub struct Viewport {
    /// Total samples (N)
    len: usize,
    /// Strip width in pixels
    display_width: u32,
    start: usize,
    end: usize,
    /// Sub-sample remainder of relative pans, so slow drags at high zoom
    /// accumulate instead of rounding away
    pan_carry: f64,
}

impl Viewport {
    /// Create a window showing the whole buffer
    pub fn new(len: usize, display_width: u32) -> Self {
        let mut viewport = Self {
            len,
            display_width,
            start: 0,
            end: 0,
            pan_carry: 0.0,
        };
        if !viewport.is_degenerate() {
            viewport.end = len;
        }
        viewport
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Visible sample count (`end - start`)
    pub fn range(&self) -> usize {
        self.end - self.start
    }

    /// No buffer or no strip: all index math short-circuits
    pub fn is_degenerate(&self) -> bool {
        self.len == 0 || self.display_width == 0
    }

    /// Sample-index distance covered by one pixel
    pub fn samples_per_pixel(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.range() as f64 / self.display_width as f64
    }

    /// `N / (end - start)`; 1.0 means the whole buffer is visible
    pub fn zoom(&self) -> f64 {
        if self.range() == 0 {
            return 1.0;
        }
        self.len as f64 / self.range() as f64
    }

    /// Zoom at which one sample maps to one pixel (`N / displayWidth`)
    ///
    /// Never below 1.0: a buffer shorter than the strip cannot zoom at all.
    pub fn max_zoom(&self) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        (self.len as f64 / self.display_width as f64).max(1.0)
    }

    /// Narrowest window allowed by [`Self::max_zoom`]
    pub fn min_range(&self) -> usize {
        (self.display_width as usize).min(self.len).max(1)
    }

    pub fn snapshot(&self) -> ViewportChange {
        ViewportChange {
            start_index: self.start,
            end_index: self.end,
            samples_per_pixel: self.samples_per_pixel(),
        }
    }

    pub fn scrollbar_thumb(&self) -> ScrollbarThumb {
        if self.len == 0 {
            return ScrollbarThumb {
                offset_fraction: 0.0,
                width_fraction: 1.0,
            };
        }
        let n = self.len as f64;
        ScrollbarThumb {
            offset_fraction: self.start as f64 / n,
            width_fraction: self.range() as f64 / n,
        }
    }

    /// Sample index under pixel `x` (strip-relative), clamped into `[0, N]`
    pub fn index_at(&self, x: f64) -> usize {
        if self.is_degenerate() || !x.is_finite() {
            return self.start;
        }
        let index = (self.start as f64 + self.samples_per_pixel() * x).floor();
        index.clamp(0.0, self.len as f64) as usize
    }

    // -------------------------------------------------------------------------
    // Mutations (all return whether the window changed)
    // -------------------------------------------------------------------------

    /// Set the window directly, clamping both ends into `[0, N]`
    ///
    /// A window narrower than [`Self::min_range`] is widened around its
    /// centre, so the result never exceeds [`Self::max_zoom`].
    pub fn set_range(&mut self, start: i64, end: i64) -> bool {
        self.pan_carry = 0.0;
        if self.is_degenerate() {
            return self.apply(0, 0);
        }

        let n = self.len as i64;
        let mut start = start.clamp(0, n);
        let mut end = end.clamp(0, n);
        if end < start {
            std::mem::swap(&mut start, &mut end);
        }
        let min_range = self.min_range() as i64;
        if end - start < min_range {
            start = ((start + end - min_range) / 2).clamp(0, n - min_range);
            end = start + min_range;
        }
        self.apply(start as usize, end as usize)
    }

    /// Zoom to `zoom` keeping the sample under `anchor` of the window fixed
    ///
    /// `zoom` is absolute (`N / range`) and clamped to `[1, max_zoom]`.
    /// `anchor` is a fraction of the strip: 0.0 = left edge, 0.5 = centre.
    pub fn set_zoom_anchored(&mut self, zoom: f64, anchor: f64) -> bool {
        if self.is_degenerate() || !zoom.is_finite() {
            return false;
        }
        self.pan_carry = 0.0;

        let zoom = zoom.clamp(1.0, self.max_zoom());
        let anchor = if anchor.is_finite() { anchor.clamp(0.0, 1.0) } else { 0.0 };

        let lock_index = self.start as f64 + (anchor * self.range() as f64).floor();
        let new_range = ((self.len as f64 / zoom).round() as usize).clamp(self.min_range(), self.len);
        let max_start = (self.len - new_range) as f64;
        let new_start = (lock_index - (anchor * new_range as f64).floor())
            .round()
            .clamp(0.0, max_start) as usize;

        self.apply(new_start, new_start + new_range)
    }

    /// Shift the window by `dx` pixels at the current scale
    ///
    /// Positive `dx` moves toward the end of the buffer. The width is kept
    /// exactly; a shift past either end stops at the boundary and reports
    /// `clamped`.
    pub fn pan_by_pixels(&mut self, dx: f64) -> PanOutcome {
        if self.is_degenerate() || !dx.is_finite() {
            return PanOutcome::default();
        }

        let shift = dx * self.samples_per_pixel() + self.pan_carry;
        let whole = shift.trunc();
        self.pan_carry = shift - whole;

        let max_start = (self.len - self.range()) as f64;
        let requested = self.start as f64 + whole;
        let clamped = requested < 0.0 || requested > max_start;
        if clamped {
            self.pan_carry = 0.0;
        }

        let range = self.range();
        let new_start = requested.clamp(0.0, max_start) as usize;
        PanOutcome {
            changed: self.apply(new_start, new_start + range),
            clamped,
        }
    }

    /// Move the window so it starts at `start` (fractional allowed), width kept
    pub fn set_start(&mut self, start: f64) -> bool {
        if self.is_degenerate() || !start.is_finite() {
            return false;
        }
        self.pan_carry = 0.0;
        let range = self.range();
        let max_start = (self.len - range) as f64;
        let new_start = start.round().clamp(0.0, max_start) as usize;
        self.apply(new_start, new_start + range)
    }

    /// Position from a scroll container whose content is `N / samplesPerPixel` pixels wide
    pub fn scroll_to_offset(&mut self, offset_px: f64) -> bool {
        self.set_start(offset_px * self.samples_per_pixel())
    }

    /// Position so the window starts at `fraction` of the buffer
    pub fn set_start_fraction(&mut self, fraction: f64) -> bool {
        self.set_start(fraction * self.len as f64)
    }

    /// Adopt a new strip width, keeping the index range where possible
    ///
    /// A strip that grew past the window width (more pixels than samples)
    /// widens the window around its centre. Leaving the degenerate state
    /// shows the whole buffer.
    pub fn resize(&mut self, display_width: u32) -> bool {
        let was_degenerate = self.is_degenerate();
        self.display_width = display_width;

        if self.is_degenerate() {
            return self.apply(0, 0);
        }
        if was_degenerate {
            return self.apply(0, self.len);
        }
        if self.range() < self.min_range() {
            return self.set_zoom_anchored(self.zoom(), 0.5);
        }
        false
    }

    fn apply(&mut self, start: usize, end: usize) -> bool {
        debug_assert!(start <= end && end <= self.len);
        let changed = start != self.start || end != self.end;
        self.start = start;
        self.end = end;
        changed
    }
}
