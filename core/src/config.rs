use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An RGB color, serializable so a config file can override the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Render configuration, fixed at construction of the display.
///
/// Every field has a default, so an override file only needs to name
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Number of concentric range rings.
    pub circle_count: usize,
    /// Diameter of the dot at each measurement endpoint, in pixels.
    pub dot_width: f32,
    /// Stroke width for crosshair, rings, and traces, in pixels.
    pub line_width: f32,
    /// Seconds until a displayed measurement is fully transparent.
    pub fade_out_secs: f32,
    /// Angular width covered by one sensor reading, in degrees.
    pub sensor_beam_width: f32,
    /// Draw numeric radius labels next to the range rings.
    pub show_range_labels: bool,
    pub background_color: Rgb,
    pub crosshair_color: Rgb,
    pub circle_color: Rgb,
    pub label_color: Rgb,
    pub trace_color: Rgb,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            circle_count: 10,
            dot_width: 10.0,
            line_width: 1.0,
            fade_out_secs: 4.0,
            sensor_beam_width: 10.0,
            show_range_labels: false,
            background_color: Rgb::new(0, 0, 0),
            crosshair_color: Rgb::new(128, 128, 128),
            circle_color: Rgb::new(128, 128, 128),
            label_color: Rgb::new(0, 100, 0),
            trace_color: Rgb::new(0, 255, 0),
        }
    }
}

impl RadarConfig {
    pub fn fade_out(&self) -> Duration {
        Duration::from_secs_f32(self.fade_out_secs.max(0.0))
    }
}
