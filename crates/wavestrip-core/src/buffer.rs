//! Read-only amplitude storage
//!
//! The buffer is shared with the host (`Arc`) so loading code can keep a
//! handle to the same samples without copying millions of values.

use std::sync::Arc;

/// Ordered amplitude values plus their global extrema
///
/// Extrema are computed once at construction. An empty buffer reports
/// `0.0` for both.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    min_value: f32,
    max_value: f32,
}

impl SampleBuffer {
    /// Wrap caller-supplied samples and scan them for min/max
    pub fn new(samples: impl Into<Arc<[f32]>>) -> Self {
        let samples: Arc<[f32]> = samples.into();

        let (min_value, max_value) = samples
            .iter()
            .filter(|s| s.is_finite())
            .fold(None, |acc: Option<(f32, f32)>, &s| match acc {
                None => Some((s, s)),
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
            })
            .unwrap_or((0.0, 0.0));

        log::debug!(
            "SampleBuffer: {} samples, min {:.4}, max {:.4}",
            samples.len(),
            min_value,
            max_value
        );

        Self {
            samples,
            min_value,
            max_value,
        }
    }

    /// Number of samples (N)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Largest absolute amplitude in the buffer, used to normalise envelopes
    pub fn peak_magnitude(&self) -> f32 {
        self.min_value.abs().max(self.max_value.abs())
    }

    /// Sample at `index`, `None` past the end
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl From<Vec<f32>> for SampleBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrema_computed_once() {
        let buffer = SampleBuffer::new(vec![0.25, -0.75, 0.5, 0.0]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.min_value(), -0.75);
        assert_eq!(buffer.max_value(), 0.5);
        assert_eq!(buffer.peak_magnitude(), 0.75);
    }

    #[test]
    fn test_empty_buffer_has_zero_extrema() {
        let buffer = SampleBuffer::new(Vec::<f32>::new());
        assert!(buffer.is_empty());
        assert_eq!(buffer.min_value(), 0.0);
        assert_eq!(buffer.max_value(), 0.0);
        assert_eq!(buffer.get(0), None);
    }

    #[test]
    fn test_non_finite_samples_ignored_for_extrema() {
        let buffer = SampleBuffer::new(vec![0.1, f32::NAN, -0.2, f32::INFINITY]);
        assert_eq!(buffer.min_value(), -0.2);
        assert_eq!(buffer.max_value(), 0.1);
    }
}
