use camino::Utf8PathBuf;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, info};

use crate::{jobs::ConversionPipeline, CancelHandle, Event, RunContext, Summary};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed(Summary),
    Failed(String),
}

/// A pipeline running in the background
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<Event>,
    cancel: CancelHandle,
    task: JoinHandle<RunStatus>,
}

/// Runs `pipeline` on `target_dir` on tokio's blocking pool, with a context of its own.
/// Must be called from within a tokio runtime.
pub fn spawn(
    pipeline: &'static dyn ConversionPipeline,
    target_dir: impl Into<Utf8PathBuf>,
) -> RunHandle {
    let target_dir = target_dir.into();
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelHandle::default();
    let ctx = RunContext::new(tx, cancel.clone());

    let task = tokio::task::spawn_blocking(move || {
        info!("running {} on {target_dir}", pipeline.id());
        match pipeline.run(&target_dir, &ctx) {
            Ok(summary) => RunStatus::Completed(summary),
            Err(err) => {
                let reason = err.to_string();
                ctx.emit(Event::RunFailed(reason.clone()));
                RunStatus::Failed(reason)
            }
        }
    });

    RunHandle {
        events: rx,
        cancel,
        task,
    }
}

impl RunHandle {
    /// The next progress event, `None` once the run is over and every event was received
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Asks the run to stop, it does so before the next file or page
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn wait(self) -> RunStatus {
        match self.task.await {
            Ok(status) => status,
            Err(err) => {
                error!("run task failed: {err}");
                RunStatus::Failed(format!("run task failed: {err}"))
            }
        }
    }
}
