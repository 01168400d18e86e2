//! Foreground host for interactive command runs.

use tracing::error;

use svclift_lifecycle::{Backend, LifecycleAdapter};

use crate::state::HostExit;

/// Runs a command in the foreground and waits for it to finish.
///
/// No status protocol and no log redirection: output stays on the default
/// target and the shell observes the exit code directly.  `stop` and `close`
/// are intentionally not invoked; a foreground command owns its own
/// termination.
#[derive(Copy, Clone, Debug, Default)]
pub struct CommandHost;

impl CommandHost {
    /// Runs the command to completion and maps the outcome to an exit code.
    pub async fn run<C: Backend, S: Backend>(
        self,
        mut adapter: LifecycleAdapter<C, S>,
    ) -> HostExit {
        if let Err(err) = adapter.init() {
            error!(%err, "command init failed");
            return HostExit::StartFailure;
        }
        let mut channels = match adapter.take_channels() {
            Ok(channels) => channels,
            Err(err) => {
                error!(%err, "startup channels unavailable");
                return HostExit::StartFailure;
            }
        };
        if let Err(err) = adapter.start() {
            error!(%err, "failed to launch command task");
            return HostExit::StartFailure;
        }

        if let Some(task) = adapter.take_task() {
            if let Err(err) = task.await {
                error!(%err, "command task aborted");
                return HostExit::RuntimeFault;
            }
        }

        // The task has finished; any queued fatal error is the outcome.
        match channels.fatal.try_recv() {
            Ok(err) => {
                error!(%err, "command failed");
                HostExit::StartFailure
            }
            Err(_) => HostExit::Clean,
        }
    }
}
