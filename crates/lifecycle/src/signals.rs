//! The readiness/error channel pair.

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Fatal errors are rare; a small buffer keeps reporting non-blocking in
/// practice without letting errors pile up unbounded.
const FATAL_CHANNEL_CAPACITY: usize = 8;

/// Receiver halves of the pair, moved to the host exactly once.
///
/// `ready` delivers at most one value ever; `fatal` may deliver several over
/// the run's lifetime, each an unrecoverable condition requiring shutdown.
#[derive(Debug)]
pub struct Channels {
    /// One-shot startup-completed notification.
    pub ready: oneshot::Receiver<()>,
    /// Multi-use fatal-error notifications.
    pub fatal: mpsc::Receiver<anyhow::Error>,
}

/// Sender halves of the pair, handed to the application when it starts.
#[derive(Debug)]
pub struct StartupSignals {
    ready: Option<oneshot::Sender<()>>,
    fatal: mpsc::Sender<anyhow::Error>,
}

impl StartupSignals {
    /// Signals that startup completed successfully.
    ///
    /// The readiness signal is one-shot; repeated calls do nothing.
    pub fn ready(&mut self) {
        if let Some(tx) = self.ready.take() {
            let _ = tx.send(());
        }
    }

    /// Reports a fatal condition requiring shutdown.
    pub async fn fatal(&self, err: anyhow::Error) {
        if let Err(e) = self.fatal.send(err).await {
            warn!(err = %e.0, "fatal error reported after the host stopped listening");
        }
    }
}

pub(crate) fn channel_pair() -> (StartupSignals, Channels) {
    let (ready_tx, ready_rx) = oneshot::channel();
    let (fatal_tx, fatal_rx) = mpsc::channel(FATAL_CHANNEL_CAPACITY);
    (
        StartupSignals {
            ready: Some(ready_tx),
            fatal: fatal_tx,
        },
        Channels {
            ready: ready_rx,
            fatal: fatal_rx,
        },
    )
}
