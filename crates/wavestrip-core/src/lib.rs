//! wavestrip-core - Viewport and gesture engine for audio waveform strips
//!
//! Keeps a consistent view of which samples are visible while drag, pinch,
//! wheel, scrollbar and inertial coasting all compete to move it, and reduces
//! the visible range to a handful of peak columns per redraw.
//!
//! The engine is headless: the host feeds it input events and frame ticks,
//! and draws whatever [`peaks`](engine::WaveEngine::peaks) returns when the
//! [`ViewportObserver`](observer::ViewportObserver) reports a change.
//!
//! ```ignore
//! use wavestrip_core::{EngineConfig, PointerEvent, RecordingObserver, WaveEngine};
//!
//! let mut engine = WaveEngine::new(samples, 1280, EngineConfig::default(), RecordingObserver::new());
//! engine.on_pointer_down(&PointerEvent::at(1, 600.0, now));
//! engine.on_pointer_move(&PointerEvent::at(1, 540.0, now + 16.0));
//! let columns = engine.display_peaks();
//! ```

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod inertia;
pub mod input;
pub mod observer;
pub mod peaks;
pub mod replay;
pub mod viewport;

pub use buffer::SampleBuffer;
pub use config::EngineConfig;
pub use engine::{TickOutcome, WaveEngine};
pub use error::{ConfigError, ConfigResult};
pub use gesture::{GestureState, GestureTracker, PinchLock, PointerId, PointerRecord};
pub use inertia::InertiaController;
pub use input::{Millis, PointerEvent, PointerKind, PointerTarget, ResizeEvent, ScrollbarEvent, WheelEvent};
pub use observer::{NullObserver, RecordingObserver, ViewportObserver};
pub use peaks::PeakReducer;
pub use viewport::{ScrollbarThumb, Viewport, ViewportChange};
