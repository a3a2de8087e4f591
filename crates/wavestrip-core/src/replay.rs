//! Scripted headless replay of input sequences
//!
//! A replay script describes a strip, a synthetic signal and a list of input
//! steps. Running it drives a [`WaveEngine`] exactly as a host would and
//! reports where the window ended up.
//!
//! ```yaml
//! display: { width: 1000, height: 120 }
//! signal: { kind: sine, len: 480000, period: 441, amplitude: 0.8 }
//! steps:
//!   - { step: press, id: 1, client_x: 500, timestamp: 0 }
//!   - { step: move, id: 1, client_x: 450, timestamp: 16 }
//!   - { step: release, id: 1, client_x: 450, timestamp: 20 }
//!   - { step: coast, from: 20 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{read_config, EngineConfig};
use crate::engine::{TickOutcome, WaveEngine};
use crate::error::ConfigResult;
use crate::input::{Millis, PointerEvent, ResizeEvent, ScrollbarEvent, WheelEvent};
use crate::observer::ViewportObserver;
use crate::viewport::{ScrollbarThumb, ViewportChange};

// =============================================================================
// Script
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub display: DisplaySize,
    /// Overrides the default configuration when present
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub signal: Signal,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Synthetic sample source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// Literal sample values
    Samples { values: Vec<f32> },
    /// `amplitude * sin(2π i / period)`
    Sine { len: usize, period: f64, amplitude: f32 },
    /// Silence with a spike of `amplitude` every `every` samples
    Impulses { len: usize, every: usize, amplitude: f32 },
}

impl Signal {
    pub fn generate(&self) -> Vec<f32> {
        match self {
            Signal::Samples { values } => values.clone(),
            Signal::Sine { len, period, amplitude } => {
                if !(period.is_finite() && *period > 0.0) {
                    return vec![0.0; *len];
                }
                (0..*len)
                    .map(|i| {
                        let phase = std::f64::consts::TAU * i as f64 / period;
                        amplitude * phase.sin() as f32
                    })
                    .collect()
            }
            Signal::Impulses { len, every, amplitude } => (0..*len)
                .map(|i| {
                    if *every > 0 && i % every == 0 {
                        *amplitude
                    } else {
                        0.0
                    }
                })
                .collect(),
        }
    }
}

fn default_interval() -> Millis {
    16.0
}

fn default_max_frames() -> u32 {
    600
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    Press(PointerEvent),
    Move(PointerEvent),
    Release(PointerEvent),
    Cancel(PointerEvent),
    Leave(PointerEvent),
    Wheel(WheelEvent),
    Scroll(ScrollbarEvent),
    Resize(ResizeEvent),
    /// Programmatic zoom, left-anchored unless `centered`
    Zoom {
        zoom: f64,
        #[serde(default)]
        centered: bool,
    },
    /// Programmatic range
    Range { start: i64, end: i64 },
    /// One animation frame
    Tick { timestamp: Millis },
    /// Animation frames every `interval` ms from `from` until settled
    Coast {
        from: Millis,
        #[serde(default = "default_interval")]
        interval: Millis,
        #[serde(default = "default_max_frames")]
        max_frames: u32,
    },
}

/// Read a replay script from YAML
pub fn load_script(path: &Path) -> ConfigResult<ReplayScript> {
    read_config(path)
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub viewport: ViewportChange,
    pub thumb: ScrollbarThumb,
    pub zoom: f64,
    /// Viewport-changed notifications raised
    pub notifications: usize,
    /// Slide-settled notifications raised
    pub settled: usize,
    /// Animation frames driven by tick and coast steps
    pub frames: usize,
}

/// Counts notifications and logs each one
#[derive(Debug, Default)]
struct ReplayObserver {
    notifications: usize,
    settled: usize,
}

impl ViewportObserver for ReplayObserver {
    fn viewport_changed(&mut self, change: &ViewportChange) {
        self.notifications += 1;
        log::debug!(
            "viewport_changed #{}: {}..{} ({:.3} spp)",
            self.notifications,
            change.start_index,
            change.end_index,
            change.samples_per_pixel
        );
    }

    fn slide_settled(&mut self) {
        self.settled += 1;
        log::debug!("slide_settled #{}", self.settled);
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Run every step of `script` against a fresh engine
pub fn run(script: &ReplayScript) -> ReplayReport {
    let config = script.config.clone().unwrap_or_default();
    let samples = script.signal.generate();
    log::info!(
        "replay: {} samples, {}px strip, {} steps",
        samples.len(),
        script.display.width,
        script.steps.len()
    );

    let mut engine = WaveEngine::new(samples, script.display.width, config, ReplayObserver::default());
    let mut frames = 0;

    for step in &script.steps {
        match step {
            ReplayStep::Press(event) => engine.on_pointer_down(event),
            ReplayStep::Move(event) => {
                engine.on_pointer_move(event);
            }
            ReplayStep::Release(event) => {
                if engine.on_pointer_up(event) {
                    log::debug!("replay: coast started at t={}", event.timestamp);
                }
            }
            ReplayStep::Cancel(event) => engine.on_pointer_cancel(event),
            ReplayStep::Leave(event) => engine.on_pointer_leave(event),
            ReplayStep::Wheel(event) => {
                engine.on_wheel(event);
            }
            ReplayStep::Scroll(event) => {
                engine.on_scrollbar(event);
            }
            ReplayStep::Resize(event) => engine.on_resize(event),
            ReplayStep::Zoom { zoom, centered } => {
                if *centered {
                    engine.zoom_centered(*zoom);
                } else {
                    engine.set_zoom(*zoom);
                }
            }
            ReplayStep::Range { start, end } => {
                engine.set_range(*start, *end);
            }
            ReplayStep::Tick { timestamp } => {
                engine.tick(*timestamp);
                frames += 1;
            }
            ReplayStep::Coast {
                from,
                interval,
                max_frames,
            } => {
                let interval = if interval.is_finite() && *interval > 0.0 {
                    *interval
                } else {
                    default_interval()
                };
                let mut t = *from;
                for _ in 0..*max_frames {
                    t += interval;
                    frames += 1;
                    if engine.tick(t) != TickOutcome::Continue {
                        break;
                    }
                }
                if engine.is_coasting() {
                    log::warn!("replay: coast still running after {} frames", max_frames);
                }
            }
        }
    }

    ReplayReport {
        viewport: engine.snapshot(),
        thumb: engine.scrollbar_thumb(),
        zoom: engine.zoom(),
        notifications: engine.observer().notifications,
        settled: engine.observer().settled,
        frames,
    }
}
