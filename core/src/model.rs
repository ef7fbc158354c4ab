use serde::Deserialize;

/// One angle/distance sample from the sensor.
///
/// `angle` is in degrees, following the source data convention: 0 along
/// positive x, increasing clockwise on a y-down screen. `distance` is
/// in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Measurement {
    pub angle: f64,
    pub distance: f64,
}

impl Measurement {
    pub fn new(angle: f64, distance: f64) -> Self {
        Self { angle, distance }
    }
}
