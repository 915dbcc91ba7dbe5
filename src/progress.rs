//! Progress reporting.
//!
//! `ProgressSink` decouples the pipeline from whatever presentation layer is
//! listening (terminal line, channel to a UI thread, test recorder). All
//! methods are called synchronously on the worker and must not block.

use std::fmt;

use crossbeam_channel::Sender;

/// Pipeline phase carried by a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Backup,
    Staging,
    /// Point of no return; `processed`/`total` carry no meaning.
    ApplyStart,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Backup => "Backup",
            Phase::Staging => "Staging",
            Phase::ApplyStart => "ApplyStart",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub processed: u64,
    pub total: u64,
    pub phase: Phase,
}

impl ProgressEvent {
    pub fn new(processed: u64, total: u64, phase: Phase) -> Self {
        Self {
            processed,
            total,
            phase,
        }
    }

    /// Whole-number percentage, clamped to 0..=100. Zero when total is unknown.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.processed.saturating_mul(100) / self.total;
        pct.min(100) as u8
    }
}

/// Receiver of progress updates and non-fatal warnings.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);

    /// Non-fatal condition the user should hear about (e.g. quarantined staging).
    fn on_warning(&self, _message: &str) {}
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Everything a background run reports to its requester.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Progress(ProgressEvent),
    Warning(String),
    Finished(crate::run::RunResult),
}

/// Sink forwarding events into an unbounded channel. Sends never block; a
/// disconnected receiver is ignored so the worker keeps going.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: Sender<RunEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<RunEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.sender.send(RunEvent::Progress(event));
    }

    fn on_warning(&self, message: &str) {
        let _ = self.sender.send(RunEvent::Warning(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;

    #[test]
    fn phase_display_matches_labels() {
        assert_eq!(Phase::Backup.to_string(), "Backup");
        assert_eq!(Phase::Staging.to_string(), "Staging");
        assert_eq!(Phase::ApplyStart.to_string(), "ApplyStart");
    }

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(ProgressEvent::new(3, 0, Phase::Backup).percent(), 0);
        assert_eq!(ProgressEvent::new(1, 4, Phase::Backup).percent(), 25);
        assert_eq!(ProgressEvent::new(9, 4, Phase::Backup).percent(), 100);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |e: ProgressEvent| seen.lock().unwrap().push(e.processed);
        sink.on_progress(ProgressEvent::new(1, 2, Phase::Staging));
        sink.on_warning("ignored");
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = unbounded();
        let sink = ChannelProgress::new(tx);
        sink.on_warning("first");
        drop(rx);
        sink.on_progress(ProgressEvent::new(1, 1, Phase::Backup));
    }
}
