use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::Event;

/// Shared flag used to stop a run between two pages
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State owned by a single run: where its progress goes and whether it should stop.
/// Two runs never share a context.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    events: Option<mpsc::UnboundedSender<Event>>,
    cancel: CancelHandle,
}

impl RunContext {
    pub fn new(events: mpsc::UnboundedSender<Event>, cancel: CancelHandle) -> Self {
        Self {
            events: Some(events),
            cancel,
        }
    }

    /// A context nobody listens to, its events only go to the logs
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn emit(&self, event: Event) {
        let Some(events) = &self.events else {
            if event.is_failure() {
                error!("{event}");
            } else {
                info!("{event}");
            }
            return;
        };

        debug!("{event}");
        if let Err(err) = events.send(event) {
            debug!("event receiver dropped: {err}");
        }
    }
}
