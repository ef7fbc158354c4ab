//! Radar-style visualizer for live echolocation measurements.
//!
//! Reads `{"measurements": [...]}` lines from a file or a serial
//! device on a background thread and renders them as fading radial
//! traces on an iced canvas.

use anyhow::{bail, Context};
use clap::Parser;
use echocore::telemetry::IngestMetrics;
use echocore::{Measurement, RadarConfig, RadarDisplay};
use iced::widget::{button, column, row, text, Canvas};
use iced::{time, Alignment, Element, Length, Subscription, Task, Theme};
use ingest::{InterruptHandle, StreamConsumer, StreamSource};
use log::{error, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

mod ingest;
mod mock;
mod scene;

const DEFAULT_BAUD_RATE: u32 = 9600;
const TICK_INTERVAL: Duration = Duration::from_millis(80);
/// Pacing between emitted measurements when replaying mocked data.
const MOCK_DELAY: Duration = Duration::from_millis(50);
const MOCK_STEP_DEG: usize = 5;
const MOCK_DISTANCE_RANGE: std::ops::Range<u32> = 30..150;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Shows a radar visualization for echolocation hardware"
)]
struct Args {
    /// Write synthetic test data to the input file first, then replay
    /// it with a small delay
    #[arg(long, default_value_t = false)]
    mocked: bool,
    /// The file to read from; with --mocked, test data is written to
    /// it before reading starts
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,
    /// Read input data from this serial device instead of a file
    #[arg(short = 's', long)]
    serial_device: Option<String>,
    /// Baud rate for the serial device
    #[arg(short = 'b', long)]
    baud: Option<u32>,
    /// Optional YAML file overriding the render configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = resolve_source(&args)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RadarConfig::default(),
    };

    if args.mocked {
        if let Some(path) = &args.input_file {
            mock::write_test_data(path, MOCK_STEP_DEG, MOCK_DISTANCE_RANGE, rand::random())?;
        }
    }

    let boot = BootContext {
        source,
        delay: if args.mocked { MOCK_DELAY } else { Duration::ZERO },
        config,
    };

    iced::application(
        move || boot.clone().start(),
        RadarApp::update,
        RadarApp::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .context("running the radar UI")?;

    Ok(())
}

/// Validates the flag combination and picks the input source.
fn resolve_source(args: &Args) -> anyhow::Result<StreamSource> {
    if args.mocked && args.input_file.is_none() {
        bail!("--mocked requires an input file (-f)");
    }
    match (&args.input_file, &args.serial_device) {
        (None, None) => bail!("choose an input file or a serial device (-f or -s)"),
        (Some(_), Some(_)) => bail!("-f and -s are mutually exclusive"),
        (Some(path), None) => Ok(StreamSource::File(path.clone())),
        (None, Some(device)) => {
            let baud_rate = match args.baud {
                Some(baud) => baud,
                None => {
                    warn!("no baud rate set (-b), falling back to {DEFAULT_BAUD_RATE}");
                    DEFAULT_BAUD_RATE
                }
            };
            Ok(StreamSource::Serial {
                device: device.clone(),
                baud_rate,
            })
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<RadarConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading render config {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing render config {}", path.display()))
}

fn application_title(state: &RadarApp) -> String {
    format!("Echolocation Radar ({})", state.source_label)
}

fn application_subscription(_: &RadarApp) -> Subscription<Message> {
    time::every(TICK_INTERVAL).map(|_| Message::Tick)
}

fn application_theme(_: &RadarApp) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    Clear,
}

/// Everything the boot closure needs to wire the app together.
#[derive(Clone)]
struct BootContext {
    source: StreamSource,
    delay: Duration,
    config: RadarConfig,
}

impl BootContext {
    fn start(self) -> (RadarApp, Task<Message>) {
        let metrics = Arc::new(IngestMetrics::new());
        let (sender, receiver) = mpsc::channel();
        let source_label = self.source.to_string();
        let consumer = StreamConsumer::new(self.source, self.delay, metrics.clone());

        let (interrupt, status) = match consumer.spawn(sender) {
            Ok((_join, handle)) => (Some(handle), format!("reading from {source_label}")),
            Err(err) => {
                error!("{err:#}");
                (None, format!("{err:#}"))
            }
        };

        (
            RadarApp {
                display: RadarDisplay::new(&self.config),
                config: self.config,
                receiver,
                metrics,
                interrupt,
                source_label,
                status,
            },
            Task::none(),
        )
    }
}

struct RadarApp {
    display: RadarDisplay,
    config: RadarConfig,
    receiver: mpsc::Receiver<Measurement>,
    metrics: Arc<IngestMetrics>,
    interrupt: Option<InterruptHandle>,
    source_label: String,
    status: String,
}

impl RadarApp {
    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let now = Instant::now();
                while let Ok(measurement) = state.receiver.try_recv() {
                    state.display.record(measurement, now);
                }
                Task::none()
            }
            Message::Clear => {
                state.display.clear();
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let canvas = Canvas::new(scene::RadarScene::new(
            state.display.scene(Instant::now()),
            state.config.clone(),
        ))
        .width(Length::Fill)
        .height(Length::Fill);

        let snapshot = state.metrics.snapshot();
        let status_row = row![
            text(&state.status).size(14),
            text(format!(
                "showing {} | lines {} | skipped {} | measurements {}",
                state.display.len(),
                snapshot.lines_read,
                snapshot.lines_skipped,
                snapshot.measurements_parsed
            ))
            .size(14),
            button("Clear").on_press(Message::Clear).padding(6),
        ]
        .spacing(20)
        .align_y(Alignment::Center)
        .padding(10);

        column![canvas, status_row].into()
    }
}

impl Drop for RadarApp {
    fn drop(&mut self) {
        // best-effort shutdown of the reader thread on window close
        if let Some(handle) = &self.interrupt {
            handle.interrupt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(
        mocked: bool,
        file: Option<&str>,
        serial: Option<&str>,
        baud: Option<u32>,
    ) -> Args {
        Args {
            mocked,
            input_file: file.map(PathBuf::from),
            serial_device: serial.map(String::from),
            baud,
            config: None,
        }
    }

    #[test]
    fn a_source_is_required() {
        assert!(resolve_source(&args(false, None, None, None)).is_err());
    }

    #[test]
    fn file_and_serial_are_mutually_exclusive() {
        assert!(resolve_source(&args(false, Some("data.txt"), Some("/dev/ttyUSB0"), None)).is_err());
    }

    #[test]
    fn mocked_requires_a_file() {
        assert!(resolve_source(&args(true, None, Some("/dev/ttyUSB0"), Some(115_200))).is_err());
    }

    #[test]
    fn missing_baud_rate_defaults_to_9600() {
        match resolve_source(&args(false, None, Some("/dev/ttyUSB0"), None)).unwrap() {
            StreamSource::Serial { baud_rate, .. } => assert_eq!(baud_rate, DEFAULT_BAUD_RATE),
            other => panic!("expected a serial source, got {other:?}"),
        }
    }

    #[test]
    fn explicit_baud_rate_is_kept() {
        match resolve_source(&args(false, None, Some("/dev/ttyUSB0"), Some(115_200))).unwrap() {
            StreamSource::Serial { baud_rate, .. } => assert_eq!(baud_rate, 115_200),
            other => panic!("expected a serial source, got {other:?}"),
        }
    }

    #[test]
    fn load_config_applies_yaml_overrides() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"circle_count: 5\nfade_out_secs: 2.5\n").unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.circle_count, 5);
        assert_eq!(config.fade_out_secs, 2.5);
        assert_eq!(config.dot_width, RadarConfig::default().dot_width);
    }

    #[test]
    fn load_config_rejects_malformed_yaml() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"circle_count: [not a number\n").unwrap();
        assert!(load_config(temp.path()).is_err());
    }
}
