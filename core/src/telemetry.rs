use std::sync::Mutex;

/// Ingest counters shared between the reader thread and the UI status
/// line.
pub struct IngestMetrics {
    inner: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
    lines_read: usize,
    lines_skipped: usize,
    measurements_parsed: usize,
}

/// Point-in-time copy of the ingest counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub measurements_parsed: usize,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn record_line(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.lines_read += 1;
        }
    }

    pub fn record_skip(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.lines_skipped += 1;
        }
    }

    pub fn record_measurements(&self, count: usize) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.measurements_parsed += count;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(counters) = self.inner.lock() {
            MetricsSnapshot {
                lines_read: counters.lines_read,
                lines_skipped: counters.lines_skipped,
                measurements_parsed: counters.measurements_parsed,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
