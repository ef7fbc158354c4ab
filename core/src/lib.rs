//! Domain model, line parsing, and display state for the echolocation
//! radar visualizer.
//!
//! The GUI crate owns the window, the canvas, and the background reader
//! thread; everything that can be exercised without a window lives here.

pub mod config;
pub mod display;
pub mod model;
pub mod parse;
pub mod telemetry;

pub use config::RadarConfig;
pub use display::{RadarDisplay, SceneSnapshot};
pub use model::Measurement;
pub use parse::{parse_line, LineOutcome, SkipReason};
