//! Control-manager protocol host for supervised service runs.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use svclift_lifecycle::{Backend, LifecycleAdapter};

use crate::startup::{wait_ready, StartOutcome};
use crate::state::{ControlCommand, HostExit, HostState, StatusReport};

/// Where status updates go.
///
/// The Windows binding forwards these to the service control manager; tests
/// record them.  Reports must be published in lifecycle order, so the
/// reporter is driven synchronously from the host loop.
pub trait StatusReporter: Send {
    /// Publishes one status update.
    fn report(&mut self, status: StatusReport);
}

/// Reports into a watch channel; stale intermediate states may be skipped by
/// slow observers, which is acceptable for control-manager consumption.
impl StatusReporter for watch::Sender<StatusReport> {
    fn report(&mut self, status: StatusReport) {
        // Nobody listening is fine; the run carries on.
        let _ = self.send(status);
    }
}

/// Tunables for a hosted service run.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostOptions {
    /// Deadline for the readiness signal.  `None` waits indefinitely, which
    /// matches supervisors that apply their own start timeout.
    pub ready_timeout: Option<Duration>,
}

/// Drives one supervised service run through the control-manager protocol.
///
/// The protocol: report `StartPending`, start the application, race
/// readiness against a fatal error; once running, accept `Stop`/`Shutdown`
/// commands and watch for runtime faults; always finish with `StopPending`
/// and `Stopped` reports around the stop/close sequence.
#[derive(Debug)]
pub struct ServiceHost<R> {
    commands: mpsc::Receiver<ControlCommand>,
    reporter: R,
}

impl<R: StatusReporter> ServiceHost<R> {
    /// Builds a host reading commands from `commands` and publishing status
    /// through `reporter`.
    pub fn new(commands: mpsc::Receiver<ControlCommand>, reporter: R) -> Self {
        Self { commands, reporter }
    }

    /// Runs the service to completion and maps the outcome to an exit code.
    ///
    /// Every failure is reported and absorbed here; the caller only sees the
    /// terminal [`HostExit`].
    pub async fn run<C: Backend, S: Backend>(
        mut self,
        mut adapter: LifecycleAdapter<C, S>,
        options: HostOptions,
    ) -> HostExit {
        self.reporter
            .report(StatusReport::new(HostState::StartPending));

        if let Err(err) = adapter.init() {
            error!(%err, "service init failed");
            self.reporter.report(StatusReport::new(HostState::Stopped));
            return HostExit::StartFailure;
        }
        let mut channels = match adapter.take_channels() {
            Ok(channels) => channels,
            Err(err) => {
                error!(%err, "startup channels unavailable");
                self.reporter.report(StatusReport::new(HostState::Stopped));
                return HostExit::StartFailure;
            }
        };
        if let Err(err) = adapter.start() {
            error!(%err, "failed to launch application task");
            self.reporter.report(StatusReport::new(HostState::Stopped));
            return HostExit::StartFailure;
        }

        match wait_ready(&mut channels, options.ready_timeout).await {
            StartOutcome::Ready => {}
            StartOutcome::Failed(err) => {
                error!(%err, "service failed to start");
                self.reporter.report(StatusReport::new(HostState::Stopped));
                if let Err(err) = adapter.close() {
                    warn!(%err, "failed to release log sink");
                }
                return HostExit::StartFailure;
            }
        }

        // Readiness may have landed before the final log destination was
        // known; re-run redirection now that the config is settled.
        adapter.attach_log_sink();
        self.reporter.report(
            StatusReport::new(HostState::Running)
                .accepting(&[ControlCommand::Stop, ControlCommand::Shutdown]),
        );
        info!("service running");

        let mut commands_open = true;
        let mut errors_open = true;
        let clean = loop {
            tokio::select! {
                cmd = self.commands.recv(), if commands_open => match cmd {
                    Some(cmd) => {
                        info!(?cmd, "shutdown command received");
                        break true;
                    }
                    None => commands_open = false,
                },
                err = channels.fatal.recv(), if errors_open => match err {
                    Some(err) => {
                        error!(%err, "service failed while running");
                        break false;
                    }
                    None => errors_open = false,
                },
                else => {
                    warn!("command and error channels both closed; stopping");
                    break false;
                }
            }
        };

        self.reporter
            .report(StatusReport::new(HostState::StopPending));
        if let Err(err) = adapter.stop() {
            // Best-effort: termination proceeds regardless.
            error!(%err, "graceful stop failed");
        }
        if let Err(err) = adapter.close() {
            warn!(%err, "failed to release log sink");
        }
        self.reporter.report(StatusReport::new(HostState::Stopped));

        if clean {
            HostExit::Clean
        } else {
            HostExit::RuntimeFault
        }
    }
}
