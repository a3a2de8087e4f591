//! Output port towards the host's render layer

use crate::viewport::ViewportChange;

/// Receives viewport notifications from [`crate::engine::WaveEngine`]
///
/// Called synchronously from inside the engine operation that caused the
/// change. Implementations should only record or schedule; a redraw that
/// calls back into the engine must happen after the operation returns.
pub trait ViewportObserver {
    /// The visible range changed
    fn viewport_changed(&mut self, change: &ViewportChange);

    /// Inertial coasting stopped (settled, hit a boundary or was preempted)
    fn slide_settled(&mut self) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ViewportObserver for NullObserver {
    fn viewport_changed(&mut self, _change: &ViewportChange) {}
}

/// Observer that keeps every notification, for headless hosts and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub changes: Vec<ViewportChange>,
    pub settled: usize,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ViewportChange> {
        self.changes.last()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.settled = 0;
    }
}

impl ViewportObserver for RecordingObserver {
    fn viewport_changed(&mut self, change: &ViewportChange) {
        self.changes.push(*change);
    }

    fn slide_settled(&mut self) {
        self.settled += 1;
    }
}

impl<T: ViewportObserver + ?Sized> ViewportObserver for Box<T> {
    fn viewport_changed(&mut self, change: &ViewportChange) {
        (**self).viewport_changed(change);
    }

    fn slide_settled(&mut self) {
        (**self).slide_settled();
    }
}
