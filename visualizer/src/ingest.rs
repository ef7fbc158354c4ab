use anyhow::Context;
use echocore::parse::{parse_line, LineOutcome};
use echocore::telemetry::IngestMetrics;
use echocore::Measurement;
use log::{error, info};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Sleep between attempts when the source has no complete line ready.
/// The sources have no notification mechanism for appended data, so
/// the consumer polls.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Where the measurement stream comes from.
#[derive(Debug, Clone)]
pub enum StreamSource {
    /// A growing or replayable text file.
    File(PathBuf),
    /// A serial device; lines arrive as the sensor writes them.
    Serial { device: String, baud_rate: u32 },
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::File(path) => write!(f, "file {}", path.display()),
            StreamSource::Serial { device, baud_rate } => {
                write!(f, "serial {device} at {baud_rate} baud")
            }
        }
    }
}

/// Requests cooperative shutdown of a running consumer.
///
/// The flag is checked once per read iteration; an in-progress blocking
/// read is not aborted, so termination has no guaranteed deadline.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Reads lines from a source on a dedicated thread and emits every
/// parsed measurement into the channel to the UI.
pub struct StreamConsumer {
    source: StreamSource,
    /// Pause after each emitted measurement; paces mocked replays.
    delay: Duration,
    metrics: Arc<IngestMetrics>,
}

impl StreamConsumer {
    pub fn new(source: StreamSource, delay: Duration, metrics: Arc<IngestMetrics>) -> Self {
        Self {
            source,
            delay,
            metrics,
        }
    }

    /// Opens the source and spawns the reader thread. The thread ends
    /// on interrupt, on a non-timeout read error, or when every
    /// receiver of `sender`'s channel is gone.
    pub fn spawn(
        self,
        sender: mpsc::Sender<Measurement>,
    ) -> anyhow::Result<(thread::JoinHandle<()>, InterruptHandle)> {
        let reader = self.open()?;
        let flag = Arc::new(AtomicBool::new(false));
        let handle = InterruptHandle { flag: flag.clone() };
        let source = self.source.clone();
        let join = thread::Builder::new()
            .name("stream-consumer".into())
            .spawn(move || {
                info!("consuming measurements from {source}");
                self.run(reader, sender, &flag);
                info!("stream consumer for {source} stopped");
            })
            .context("spawning stream consumer thread")?;
        Ok((join, handle))
    }

    fn open(&self) -> anyhow::Result<BufReader<Box<dyn Read + Send>>> {
        let inner: Box<dyn Read + Send> = match &self.source {
            StreamSource::File(path) => Box::new(
                File::open(path)
                    .with_context(|| format!("opening input file {}", path.display()))?,
            ),
            StreamSource::Serial { device, baud_rate } => Box::new(
                serialport::new(device.as_str(), *baud_rate)
                    .timeout(POLL_INTERVAL)
                    .open()
                    .with_context(|| format!("opening serial device {device}"))?,
            ),
        };
        Ok(BufReader::new(inner))
    }

    fn run(
        &self,
        mut reader: BufReader<Box<dyn Read + Send>>,
        sender: mpsc::Sender<Measurement>,
        interrupted: &AtomicBool,
    ) {
        let mut line = Vec::new();
        while !interrupted.load(Ordering::Relaxed) {
            match reader.read_until(b'\n', &mut line) {
                // Nothing buffered yet; the file may still grow.
                Ok(0) => thread::sleep(POLL_INTERVAL),
                // Partial line at the end of the source; keep the bytes
                // and wait for the rest.
                Ok(_) if line.last() != Some(&b'\n') => thread::sleep(POLL_INTERVAL),
                Ok(_) => {
                    self.metrics.record_line();
                    match parse_line(&line) {
                        LineOutcome::Measurements(measurements) => {
                            self.metrics.record_measurements(measurements.len());
                            for measurement in measurements {
                                if sender.send(measurement).is_err() {
                                    // UI is gone; no one left to notify.
                                    return;
                                }
                                if !self.delay.is_zero() {
                                    thread::sleep(self.delay);
                                }
                            }
                        }
                        LineOutcome::Skipped(_) => self.metrics.record_skip(),
                    }
                    line.clear();
                }
                // Serial reads time out so the interrupt flag stays
                // observable; partial bytes already read stay in `line`.
                Err(err) if err.kind() == ErrorKind::TimedOut => {}
                Err(err) => {
                    error!("read error on {}: {err}", self.source);
                    return;
                }
            }
        }
    }
}
