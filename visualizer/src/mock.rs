use anyhow::Context;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

/// Decoy line interleaved with the measurement lines so the stream
/// resembles a real sensor log with unrelated output mixed in.
const DECOY_LINE: &str = "SomeLog ... aaa {   }";

/// Writes a synthetic measurement sweep to `path`.
///
/// Angles run 0..180 in `step_deg` increments; every line pairs the
/// angle with its opposite side `(angle + 180) % 360`, each at a random
/// distance drawn from `distance_range`. A fixed `seed` reproduces the
/// same sweep.
pub fn write_test_data(
    path: &Path,
    step_deg: usize,
    distance_range: Range<u32>,
    seed: u64,
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating mock data file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut rng = StdRng::seed_from_u64(seed);

    for angle in (0..180).step_by(step_deg.max(1)) {
        let opposite = (angle + 180) % 360;
        let near = rng.gen_range(distance_range.clone());
        let far = rng.gen_range(distance_range.clone());
        writeln!(
            out,
            r#"{{"measurements": [{{"angle": {:.1},"distance": {}}},{{"angle": {:.1},"distance": {}}}]}}"#,
            angle as f64, near, opposite as f64, far
        )?;
        writeln!(out, "{DECOY_LINE}")?;
    }
    out.flush()?;
    info!("wrote mock sweep data to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use echocore::parse::{parse_line, LineOutcome};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sweep_alternates_measurement_and_decoy_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("testdata.txt");
        write_test_data(&path, 5, 30..150, 7).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2 * (180 / 5));

        for pair in lines.chunks(2) {
            match parse_line(pair[0].as_bytes()) {
                LineOutcome::Measurements(measurements) => {
                    assert_eq!(measurements.len(), 2);
                    for measurement in measurements {
                        assert!((30.0..150.0).contains(&measurement.distance));
                    }
                }
                other => panic!("expected a measurement line, got {other:?}"),
            }
            assert!(matches!(
                parse_line(pair[1].as_bytes()),
                LineOutcome::Skipped(_)
            ));
        }
    }

    #[test]
    fn sweep_pairs_each_angle_with_its_opposite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("testdata.txt");
        write_test_data(&path, 30, 30..150, 1).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let first = contents.lines().next().unwrap();
        let measurements = parse_line(first.as_bytes()).into_measurements();
        assert_eq!(measurements[0].angle, 0.0);
        assert_eq!(measurements[1].angle, 180.0);
    }

    #[test]
    fn same_seed_reproduces_the_same_sweep() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        write_test_data(&a, 5, 30..150, 42).unwrap();
        write_test_data(&b, 5, 30..150, 42).unwrap();
        assert_eq!(fs::read_to_string(a).unwrap(), fs::read_to_string(b).unwrap());
    }
}
