//! Peak reduction for waveform display
//!
//! Decimates an arbitrary sample range into a fixed number of columns by
//! taking the maximum absolute amplitude of each column (envelope, not
//! average), so transients survive extreme zoom-out.
//!
//! The column grid is phase-locked: the range start is aligned down to a
//! multiple of `2 * sample_step`, so two overlapping windows at the same zoom
//! produce identical columns for the samples they share. The factor of two
//! keeps the even/odd parity of each column stable for the alternating
//! up/down rendering convention (see [`alternating_envelope`]).

use crate::buffer::SampleBuffer;

/// Default cap on sub-samples inspected per column
pub const DEFAULT_SAMPLES_PER_POINT: usize = 50;

// =============================================================================
// Grid helpers
// =============================================================================

/// Samples covered by one column for `range` samples over `point_count` columns
///
/// Never less than one sample per column.
pub fn sample_step(range: usize, point_count: usize) -> usize {
    if point_count == 0 {
        return 1;
    }
    (range / point_count).max(1)
}

/// Align `start` down to the nearest multiple of `2 * step`
pub fn aligned_start(start: usize, step: usize) -> usize {
    let period = step.max(1) * 2;
    start / period * period
}

// =============================================================================
// Reducer
// =============================================================================

/// Cache key: the aligned range plus the requested column count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeakKey {
    aligned_start: usize,
    end: usize,
    point_count: usize,
}

/// Envelope decimator with a single-entry result cache
///
/// Resize and redraw paths re-query an unchanged window every frame, so the
/// last result is kept and returned as-is while the key matches.
#[derive(Debug, Clone)]
pub struct PeakReducer {
    /// Upper bound on sub-samples inspected per column
    samples_per_point: usize,
    cache_key: Option<PeakKey>,
    cached: Vec<f32>,
    /// Number of full recomputations (cache misses)
    computations: u64,
}

impl PeakReducer {
    pub fn new(samples_per_point: usize) -> Self {
        Self {
            samples_per_point: samples_per_point.max(1),
            cache_key: None,
            cached: Vec::new(),
            computations: 0,
        }
    }

    pub fn samples_per_point(&self) -> usize {
        self.samples_per_point
    }

    /// Number of cache misses so far
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drop the cached result so the next query recomputes
    pub fn invalidate(&mut self) {
        self.cache_key = None;
        self.cached.clear();
    }

    /// Reduce `[start, end)` of `buffer` to exactly `point_count` magnitudes
    ///
    /// Column `i` starts at `aligned_start + i * step` and inspects up to
    /// `min(step, samples_per_point)` samples spaced `max(1, step / samples_per_point)`
    /// apart. Indices past the end of the buffer contribute nothing, so
    /// trailing columns read as silence.
    pub fn reduce(
        &mut self,
        buffer: &SampleBuffer,
        start: usize,
        end: usize,
        point_count: usize,
    ) -> &[f32] {
        let range = end.saturating_sub(start);
        let step = sample_step(range, point_count);
        let key = PeakKey {
            aligned_start: aligned_start(start, step),
            end,
            point_count,
        };

        if self.cache_key != Some(key) {
            self.cached = self.compute(buffer.as_slice(), key.aligned_start, step, point_count);
            self.cache_key = Some(key);
            self.computations += 1;
            log::trace!(
                "PeakReducer: recomputed {} columns from {} (step {})",
                point_count,
                key.aligned_start,
                step
            );
        }

        &self.cached
    }

    fn compute(&self, samples: &[f32], start: usize, step: usize, point_count: usize) -> Vec<f32> {
        let sub_count = step.min(self.samples_per_point);
        let stride = (step / self.samples_per_point).max(1);
        let len = samples.len();

        (0..point_count)
            .map(|col| {
                let base = start.saturating_add(col.saturating_mul(step));
                let mut peak = 0.0f32;
                for j in 0..sub_count {
                    let index = base.saturating_add(j * stride);
                    if index >= len {
                        break;
                    }
                    let magnitude = samples[index].abs();
                    if magnitude > peak {
                        peak = magnitude;
                    }
                }
                peak
            })
            .collect()
    }
}

impl Default for PeakReducer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_POINT)
    }
}

// =============================================================================
// Display helpers
// =============================================================================

/// Normalise peaks against `global_peak` and alternate their sign
///
/// Even columns point up, odd columns point down, each scaled by `scale`.
/// This is the column convention the drawing layer strokes as a single
/// zig-zag path. A silent buffer (`global_peak <= 0`) yields zeros.
pub fn alternating_envelope(peaks: &[f32], global_peak: f32, scale: f32) -> Vec<f32> {
    if !(global_peak > 0.0) {
        return vec![0.0; peaks.len()];
    }

    peaks
        .iter()
        .enumerate()
        .map(|(i, &peak)| {
            let value = peak / global_peak * scale;
            if i % 2 == 0 {
                value
            } else {
                -value
            }
        })
        .collect()
}
