//! Background execution of a run.
//!
//! The worker thread owns the `Orchestrator`; the requester keeps a
//! `RunHandle` to cancel and to drain `RunEvent`s on its own schedule.

use crossbeam_channel::{Receiver, unbounded};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::cancel::CancellationToken;
use crate::progress::{ChannelProgress, RunEvent};
use crate::run::{Orchestrator, RunResult, RunStatus};

pub struct RunHandle {
    events: Receiver<RunEvent>,
    cancel: CancellationToken,
    join: JoinHandle<RunResult>,
}

impl RunHandle {
    /// Progress, warnings and the final result, in emission order.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Request cooperative cancellation of the in-flight run.
    pub fn cancel(&self) {
        self.cancel.request();
    }

    /// Wait for the run to finish. A panicking worker is reported as `Failed`.
    pub fn join(self) -> RunResult {
        match self.join.join() {
            Ok(r) => r,
            Err(_) => {
                tracing::error!("run worker panicked");
                let mut r = RunResult::new(RunStatus::Failed);
                r.error = Some("worker thread panicked".into());
                r
            }
        }
    }
}

/// Run `orchestrator` against `source` on a new thread.
///
/// The orchestrator's progress sink is replaced by a channel sink; the
/// returned handle shares `cancel`.
pub fn spawn_run(
    orchestrator: Orchestrator,
    source: impl Into<PathBuf>,
    cancel: CancellationToken,
) -> RunHandle {
    let (tx, rx) = unbounded::<RunEvent>();
    let source = source.into();
    let worker_token = cancel.clone();
    let mut orch = orchestrator.progress(ChannelProgress::new(tx.clone()));

    let join = thread::spawn(move || {
        let result = orch.run(&source, &worker_token);
        let _ = tx.send(RunEvent::Finished(result.clone()));
        result
    });

    RunHandle {
        events: rx,
        cancel,
        join,
    }
}
