//! Global tracing setup, writing through the redirectable output slot.

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;

use svclift_logsink::OutputTarget;

static TELEMETRY: OnceCell<()> = OnceCell::new();

/// Failed to stand up the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed outside this module.
    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the process-wide tracing subscriber.
///
/// All log output flows through `target`, so a later redirection swaps the
/// destination for every subsystem at once.  Idempotent: repeated calls
/// return `Ok` without reinstalling.
pub fn init_telemetry(target: &OutputTarget) -> Result<(), TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(target.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(())
        })
        .copied()
}
