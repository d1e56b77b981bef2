//! Progress tracking and sinks for UI integration

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::model::ProgressEvent;
use crate::ports::{DiagnosticParser, ProgressSink};

/// Percentage complete for a progress marker, floored and capped at 100
pub fn percent_complete(elapsed: f64, duration: f64) -> u8 {
    if duration <= 0.0 || !elapsed.is_finite() || elapsed <= 0.0 {
        return 0;
    }
    (100.0 * elapsed / duration).floor().min(100.0) as u8
}

/// Turns encoder output lines into progress events for one job
pub struct ProgressTracker {
    parser: Arc<dyn DiagnosticParser>,
    duration: f64,
    format_name: String,
}

impl ProgressTracker {
    pub fn new(parser: Arc<dyn DiagnosticParser>, duration: f64, format_name: &str) -> Self {
        Self {
            parser,
            duration,
            format_name: format_name.to_string(),
        }
    }

    /// Event for a line carrying a `time=` marker, `None` for anything else
    pub fn observe(&self, line: &str) -> Option<ProgressEvent> {
        let elapsed = self.parser.elapsed(line)?;

        if self.duration > 0.0 {
            Some(ProgressEvent::Percent {
                percent: percent_complete(elapsed, self.duration),
                format: self.format_name.clone(),
            })
        } else {
            Some(ProgressEvent::Running {
                format: self.format_name.clone(),
            })
        }
    }
}

/// Console sink that rewrites a single status line in place
#[derive(Debug, Default)]
pub struct ConsoleProgressSink;

impl ConsoleProgressSink {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for ConsoleProgressSink {
    fn notify(&self, event: &ProgressEvent) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{:<80}", event.to_string());
        let _ = stdout.flush();
    }
}

/// JSON lines sink for machine consumers
#[derive(Debug, Default)]
pub struct JsonProgressSink;

impl JsonProgressSink {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for JsonProgressSink {
    fn notify(&self, event: &ProgressEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", json);
        }
    }
}

/// Forwards events into a bounded channel; drops events when the receiver
/// falls behind instead of stalling the encoder
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(sender: mpsc::Sender<ProgressEvent>) -> Self {
        Self { sender }
    }

    /// Sink plus its receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn notify(&self, event: &ProgressEvent) {
        if let Err(e) = self.sender.try_send(event.clone()) {
            debug!("Dropped progress event: {}", e);
        }
    }
}

/// No-op sink for headless runs
#[derive(Debug, Default)]
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn notify(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diagnostics::FfmpegTextParser;
    use std::sync::Mutex;

    fn tracker(duration: f64) -> ProgressTracker {
        ProgressTracker::new(
            Arc::new(FfmpegTextParser::new().unwrap()),
            duration,
            "WebM (VP9)",
        )
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(60.0, 120.0), 50);
        assert_eq!(percent_complete(59.99, 120.0), 49);
        assert_eq!(percent_complete(130.0, 120.0), 100);
        assert_eq!(percent_complete(10.0, 0.0), 0);
        assert_eq!(percent_complete(-1.0, 10.0), 0);
    }

    #[test]
    fn test_percentages_are_monotonic_and_capped() {
        let tracker = tracker(95.0);
        let mut last = 0u8;
        for second in (0..200).step_by(7) {
            let line = format!("frame=1 time=00:{:02}:{:02}.00 speed=1x", second / 60, second % 60);
            match tracker.observe(&line) {
                Some(ProgressEvent::Percent { percent, .. }) => {
                    assert!(percent >= last);
                    assert!(percent <= 100);
                    last = percent;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_unknown_duration_reports_running() {
        let event = tracker(0.0).observe("time=00:00:01.00").unwrap();
        assert_eq!(
            event,
            ProgressEvent::Running {
                format: "WebM (VP9)".to_string()
            }
        );
    }

    #[test]
    fn test_lines_without_marker_are_ignored() {
        assert_eq!(tracker(10.0).observe("Stream mapping:"), None);
    }

    #[tokio::test]
    async fn test_channel_sink_never_blocks_when_full() {
        let (sink, mut receiver) = ChannelProgressSink::channel(1);
        sink.notify(&ProgressEvent::Started);
        sink.notify(&ProgressEvent::Completed);

        assert_eq!(receiver.recv().await, Some(ProgressEvent::Started));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let sink = move |event: &ProgressEvent| recorder.lock().unwrap().push(event.to_string());

        sink.notify(&ProgressEvent::Started);
        NoOpProgressSink.notify(&ProgressEvent::Completed);

        assert_eq!(*seen.lock().unwrap(), vec!["Encoding started...".to_string()]);
    }
}
