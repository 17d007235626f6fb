//! Progress Reporting
//!
//! Scans publish [`ProgressEvent`]s through a [`ProgressReporter`] that owns the
//! throttling state for exactly one scan and forwards to a caller-supplied
//! [`ProgressSink`].
//!
//! An event is forwarded only when `(percent, phase, message)` changed since the last
//! forwarded event and the minimum interval has elapsed. Terminal phases bypass the
//! interval so the caller always sees how the scan ended.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Scan phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    ListFiles,
    SelectFiles,
    ReadFiles,
    Summarize,
    Digest,
    Generate,
    Diff,
    Done,
    Failed,
}

impl ScanPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Done | ScanPhase::Failed)
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScanPhase::ListFiles => "list_files",
            ScanPhase::SelectFiles => "select_files",
            ScanPhase::ReadFiles => "read_files",
            ScanPhase::Summarize => "summarize",
            ScanPhase::Digest => "digest",
            ScanPhase::Generate => "generate",
            ScanPhase::Diff => "diff",
            ScanPhase::Done => "done",
            ScanPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Progress update delivered to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: ScanPhase,
    /// 0-100
    pub percent: u8,
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

#[derive(Debug)]
struct LastForward {
    phase: ScanPhase,
    percent: u8,
    message: Option<String>,
    at: Instant,
}

/// Throttling front for a [`ProgressSink`]; one instance per scan
pub struct ProgressReporter<'a> {
    sink: Option<&'a dyn ProgressSink>,
    min_interval: Duration,
    last: Mutex<Option<LastForward>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>, min_interval: Duration) -> Self {
        Self {
            sink,
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Reporter that drops everything
    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn report(&self, phase: ScanPhase, percent: f64, message: Option<String>) {
        self.report_with_meta(phase, percent, message, None);
    }

    pub fn report_with_meta(
        &self,
        phase: ScanPhase,
        percent: f64,
        message: Option<String>,
        meta: Option<Value>,
    ) {
        let Some(sink) = self.sink else {
            return;
        };

        let percent = clamp_percent(percent);
        let now = Instant::now();

        {
            let mut last = self
                .last
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if let Some(prev) = last.as_ref() {
                let unchanged =
                    prev.phase == phase && prev.percent == percent && prev.message == message;
                let too_soon = now.duration_since(prev.at) < self.min_interval;
                if unchanged || (too_soon && !phase.is_terminal()) {
                    return;
                }
            }

            *last = Some(LastForward {
                phase,
                percent,
                message: message.clone(),
                at: now,
            });
        }

        sink.report(ProgressEvent {
            phase,
            percent,
            message,
            meta,
        });
    }
}

/// Clamp to [0, 100] and round; NaN counts as 0
pub fn clamp_percent(percent: f64) -> u8 {
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0).round() as u8
}

/// Linear position of item `index` out of `total` within `(start, end)`
pub fn interpolate(range: (u8, u8), index: usize, total: usize) -> f64 {
    let (start, end) = (f64::from(range.0), f64::from(range.1));
    if total == 0 {
        return start;
    }
    start + (end - start) * (index as f64 / total as f64)
}
