use crate::config::RadarConfig;
use crate::model::Measurement;
use std::time::{Duration, Instant};

/// One measurement on screen, paired with its own arrival timestamp.
///
/// The association is positional: two structurally equal measurements
/// get independent entries and therefore independent fade clocks.
#[derive(Debug, Clone, Copy)]
struct DisplayedMeasurement {
    measurement: Measurement,
    added_at: Instant,
}

/// A measurement projected for drawing: polar coordinates plus the
/// age-derived alpha (255 when fresh, 0 at or beyond the fade-out time).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadingTrace {
    pub angle: f64,
    pub distance: f64,
    pub alpha: u8,
}

/// Everything the canvas needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneSnapshot {
    pub traces: Vec<FadingTrace>,
    /// Angles (degrees) of the most recent one or two measurements,
    /// highlighted with a sweep wedge.
    pub sweep_angles: Vec<f64>,
}

/// Owns the set of currently displayed measurements.
///
/// Only the UI thread touches this; the reader thread hands
/// measurements over a channel. Callers pass `now` explicitly so the
/// aging logic stays deterministic under test.
pub struct RadarDisplay {
    entries: Vec<DisplayedMeasurement>,
    fade_out: Duration,
}

impl RadarDisplay {
    pub fn new(config: &RadarConfig) -> Self {
        Self {
            entries: Vec::new(),
            fade_out: config.fade_out(),
        }
    }

    /// Purges expired entries, then appends `measurement` stamped with
    /// `now`. Purging happens only here, on arrival; a quiet stream
    /// keeps its expired entries, which render at alpha 0.
    pub fn record(&mut self, measurement: Measurement, now: Instant) {
        self.purge_expired(now);
        self.entries.push(DisplayedMeasurement {
            measurement,
            added_at: now,
        });
    }

    /// Drops every entry whose age has reached the fade-out time.
    pub fn purge_expired(&mut self, now: Instant) {
        let fade_out = self.fade_out;
        self.entries
            .retain(|entry| now.duration_since(entry.added_at) < fade_out);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Projects the current state for rendering at time `now`. Does not
    /// mutate anything; expired entries simply project at alpha 0.
    pub fn scene(&self, now: Instant) -> SceneSnapshot {
        let traces = self
            .entries
            .iter()
            .map(|entry| FadingTrace {
                angle: entry.measurement.angle,
                distance: entry.measurement.distance,
                alpha: fade_alpha(now.duration_since(entry.added_at), self.fade_out),
            })
            .collect();

        let sweep_start = self.entries.len().saturating_sub(2);
        let sweep_angles = self.entries[sweep_start..]
            .iter()
            .map(|entry| entry.measurement.angle)
            .collect();

        SceneSnapshot {
            traces,
            sweep_angles,
        }
    }
}

/// Linear fade from 255 at age zero to 0 at the fade-out time, clamped.
fn fade_alpha(age: Duration, fade_out: Duration) -> u8 {
    if fade_out.is_zero() {
        return 0;
    }
    let remaining = 1.0 - age.as_secs_f64() / fade_out.as_secs_f64();
    (remaining.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> RadarDisplay {
        RadarDisplay::new(&RadarConfig::default())
    }

    #[test]
    fn alpha_is_opaque_when_fresh_and_zero_past_fade_out() {
        let fade = Duration::from_secs(4);
        assert_eq!(fade_alpha(Duration::ZERO, fade), 255);
        assert_eq!(fade_alpha(fade, fade), 0);
        assert_eq!(fade_alpha(fade * 2, fade), 0);
    }

    #[test]
    fn alpha_is_non_increasing_with_age() {
        let fade = Duration::from_secs(4);
        let mut last = u8::MAX;
        for ms in (0..6000).step_by(250) {
            let alpha = fade_alpha(Duration::from_millis(ms), fade);
            assert!(alpha <= last, "alpha rose at age {ms} ms");
            last = alpha;
        }
    }

    #[test]
    fn record_purges_entries_past_fade_out() {
        let mut display = display();
        let t0 = Instant::now();
        display.record(Measurement::new(10.0, 80.0), t0);

        let after_fade = t0 + Duration::from_secs(5);
        display.record(Measurement::new(20.0, 90.0), after_fade);

        let scene = display.scene(after_fade);
        assert_eq!(scene.traces.len(), 1);
        assert_eq!(scene.traces[0].angle, 20.0);
    }

    #[test]
    fn scene_projection_does_not_purge() {
        let mut display = display();
        let t0 = Instant::now();
        display.record(Measurement::new(10.0, 80.0), t0);

        let long_after = t0 + Duration::from_secs(10);
        let scene = display.scene(long_after);
        // still held (purge only happens on arrival), but invisible
        assert_eq!(scene.traces.len(), 1);
        assert_eq!(scene.traces[0].alpha, 0);
        assert_eq!(display.len(), 1);
    }

    #[test]
    fn equal_measurements_keep_independent_timestamps() {
        let mut display = display();
        let t0 = Instant::now();
        let measurement = Measurement::new(45.0, 100.0);
        display.record(measurement, t0);
        display.record(measurement, t0 + Duration::from_secs(3));

        let now = t0 + Duration::from_millis(4500);
        let scene = display.scene(now);
        assert_eq!(scene.traces.len(), 2);
        assert_eq!(scene.traces[0].alpha, 0);
        assert!(scene.traces[1].alpha > 0);
    }

    #[test]
    fn scene_is_stable_for_a_fixed_state_and_time() {
        let mut display = display();
        let t0 = Instant::now();
        display.record(Measurement::new(0.0, 100.0), t0);
        display.record(Measurement::new(180.0, 50.0), t0);

        let now = t0 + Duration::from_secs(1);
        assert_eq!(display.scene(now), display.scene(now));
    }

    #[test]
    fn sweep_covers_the_latest_two_measurements() {
        let mut display = display();
        let t0 = Instant::now();
        for (i, angle) in [0.0, 30.0, 60.0].into_iter().enumerate() {
            display.record(
                Measurement::new(angle, 50.0),
                t0 + Duration::from_millis(i as u64),
            );
        }
        let scene = display.scene(t0 + Duration::from_millis(10));
        assert_eq!(scene.sweep_angles, vec![30.0, 60.0]);
    }

    #[test]
    fn sweep_with_a_single_measurement() {
        let mut display = display();
        let t0 = Instant::now();
        display.record(Measurement::new(90.0, 75.0), t0);
        assert_eq!(display.scene(t0).sweep_angles, vec![90.0]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut display = display();
        display.record(Measurement::new(1.0, 2.0), Instant::now());
        display.clear();
        assert!(display.is_empty());
        assert!(display.scene(Instant::now()).sweep_angles.is_empty());
    }
}
