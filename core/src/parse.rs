use crate::model::Measurement;
use log::warn;
use serde::Deserialize;

/// Wire shape of one measurement line:
/// `{"measurements": [{"angle": <number>, "distance": <number>}, ...]}`.
#[derive(Debug, Deserialize)]
struct MeasurementFrame {
    measurements: Vec<Measurement>,
}

/// Why a line produced no measurements.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("line is not valid UTF-8")]
    NotUtf8,
    #[error("line does not look like a measurement object")]
    HeuristicMiss,
    #[error("measurement JSON failed to parse")]
    BadJson,
}

/// Result of feeding one raw line to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Measurements(Vec<Measurement>),
    Skipped(SkipReason),
}

impl LineOutcome {
    pub fn into_measurements(self) -> Vec<Measurement> {
        match self {
            LineOutcome::Measurements(measurements) => measurements,
            LineOutcome::Skipped(_) => Vec::new(),
        }
    }
}

/// Extracts measurements from one raw line of the input stream.
///
/// Measurement lines are interleaved with unrelated log output, so a
/// cheap pre-filter runs before any JSON parsing: the line must start
/// with `{`, end (trimmed) with `}`, and contain the substring
/// `measurements` exactly once. Lines failing any step are skipped;
/// a skip is never fatal to the caller.
pub fn parse_line(raw: &[u8]) -> LineOutcome {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(err) => {
            warn!("could not decode line as UTF-8: {err}");
            return LineOutcome::Skipped(SkipReason::NotUtf8);
        }
    };

    if !looks_like_measurement_line(line) {
        return LineOutcome::Skipped(SkipReason::HeuristicMiss);
    }

    match serde_json::from_str::<MeasurementFrame>(line) {
        Ok(frame) => LineOutcome::Measurements(frame.measurements),
        Err(err) => {
            warn!("failed to parse measurement JSON ({err}): {}", line.trim_end());
            LineOutcome::Skipped(SkipReason::BadJson)
        }
    }
}

/// The heuristic pre-filter. Lines where `measurements` appears zero or
/// more than once are rejected even when they are valid JSON.
fn looks_like_measurement_line(line: &str) -> bool {
    line.starts_with('{')
        && line.trim_end().ends_with('}')
        && line.matches("measurements").count() == 1
}
