//! The startup race: readiness vs. fatal error, with an optional deadline.

use std::time::Duration;

use anyhow::anyhow;

use svclift_lifecycle::Channels;

/// How startup resolved.
#[derive(Debug)]
pub(crate) enum StartOutcome {
    /// The application signaled readiness.
    Ready,
    /// The application reported a fatal error, exited silently, or missed
    /// the deadline.
    Failed(anyhow::Error),
}

/// Waits for the first startup signal.
///
/// When both signals are already pending, readiness wins: a fault that
/// arrives together with readiness is handled by the running-phase loop
/// instead.
pub(crate) async fn wait_ready(
    channels: &mut Channels,
    ready_timeout: Option<Duration>,
) -> StartOutcome {
    let race = async {
        tokio::select! {
            biased;
            res = &mut channels.ready => match res {
                Ok(()) => StartOutcome::Ready,
                Err(_) => StartOutcome::Failed(anyhow!(
                    "application exited before signaling readiness"
                )),
            },
            err = channels.fatal.recv() => match err {
                Some(err) => StartOutcome::Failed(err),
                None => StartOutcome::Failed(anyhow!(
                    "application exited before signaling readiness"
                )),
            },
        }
    };
    match ready_timeout {
        Some(limit) => match tokio::time::timeout(limit, race).await {
            Ok(outcome) => outcome,
            Err(_) => StartOutcome::Failed(anyhow!(
                "timed out after {limit:?} waiting for readiness"
            )),
        },
        None => race.await,
    }
}
