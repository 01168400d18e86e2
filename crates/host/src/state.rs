//! Lifecycle states, control commands and exit codes shared by the hosts.

use serde::Serialize;

/// Externally visible lifecycle state of a hosted process.
///
/// States advance strictly forward: `StartPending → Running → StopPending →
/// Stopped`, with the failure path skipping straight from `StartPending` to
/// `Stopped`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum HostState {
    /// Startup is underway; no commands are accepted yet.
    StartPending,
    /// The application signaled readiness and serves requests.
    Running,
    /// A shutdown was requested; termination is underway.
    StopPending,
    /// The process no longer serves.  Terminal.
    Stopped,
}

/// External shutdown request delivered by the platform control manager.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ControlCommand {
    /// Operator-initiated stop.
    Stop,
    /// Host system shutdown.
    Shutdown,
}

/// One status update published to the control manager.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StatusReport {
    /// Current lifecycle state.
    pub state: HostState,
    /// Commands the host accepts in this state.  Empty outside `Running`.
    pub accepts: Vec<ControlCommand>,
}

impl StatusReport {
    /// A report for `state` accepting no commands.
    pub fn new(state: HostState) -> Self {
        Self {
            state,
            accepts: Vec::new(),
        }
    }

    /// Adds the commands accepted while in this state.
    pub fn accepting(mut self, commands: &[ControlCommand]) -> Self {
        self.accepts = commands.to_vec();
        self
    }
}

impl Default for StatusReport {
    fn default() -> Self {
        Self::new(HostState::StartPending)
    }
}

/// Terminal outcome of a hosted run, mapped to a process exit code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum HostExit {
    /// Clean stop after a commanded shutdown.
    Clean,
    /// The application never became ready.
    StartFailure,
    /// The application failed after it had been running.
    RuntimeFault,
}

impl HostExit {
    /// Process exit code for this outcome.
    pub fn code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::StartFailure => 1,
            Self::RuntimeFault => 2,
        }
    }

    /// Whether the run ended in failure.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(HostExit::Clean.code(), 0);
        assert_eq!(HostExit::StartFailure.code(), 1);
        assert_eq!(HostExit::RuntimeFault.code(), 2);
        assert!(!HostExit::Clean.is_failure());
        assert!(HostExit::StartFailure.is_failure());
        assert!(HostExit::RuntimeFault.is_failure());
    }

    #[test]
    fn test_running_report_carries_accepted_commands() {
        let report = StatusReport::new(HostState::Running)
            .accepting(&[ControlCommand::Stop, ControlCommand::Shutdown]);
        assert_eq!(report.state, HostState::Running);
        assert_eq!(
            report.accepts,
            vec![ControlCommand::Stop, ControlCommand::Shutdown]
        );
    }
}
