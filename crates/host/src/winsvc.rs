//! Bridge between the generic host channels and the Windows service control
//! manager.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::warn;
use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState, ServiceStatus,
    ServiceType,
};
use windows_service::service_control_handler::{self, ServiceControlHandlerResult,
    ServiceStatusHandle};

use crate::state::{ControlCommand, HostExit, HostState, StatusReport};

/// Wait hint handed to the control manager for the pending states.
const PENDING_WAIT_HINT: Duration = Duration::from_secs(10);

/// Registers the control handler, feeding stop/shutdown controls into the
/// host's command channel.
pub fn register_control_handler(
    service_name: &str,
    commands: mpsc::Sender<ControlCommand>,
) -> windows_service::Result<ServiceStatusHandle> {
    let handler = move |control: ServiceControl| -> ServiceControlHandlerResult {
        let command = match control {
            ServiceControl::Stop => ControlCommand::Stop,
            ServiceControl::Shutdown => ControlCommand::Shutdown,
            ServiceControl::Interrogate => return ServiceControlHandlerResult::NoError,
            _ => return ServiceControlHandlerResult::NotImplemented,
        };
        // A full queue means a shutdown is already in flight.
        let _ = commands.try_send(command);
        ServiceControlHandlerResult::NoError
    };
    service_control_handler::register(service_name, handler)
}

/// Forwards host status reports to the control manager until the report
/// channel closes.  The final `Stopped` report carries `exit`.
pub async fn forward_status(
    handle: ServiceStatusHandle,
    mut reports: watch::Receiver<StatusReport>,
    exit: impl Fn() -> HostExit,
) {
    while reports.changed().await.is_ok() {
        let report = reports.borrow_and_update().clone();
        let status = scm_status(&report, exit());
        if let Err(err) = handle.set_service_status(status) {
            warn!(%err, "failed to report service status");
        }
    }
}

fn scm_status(report: &StatusReport, exit: HostExit) -> ServiceStatus {
    let current_state = match report.state {
        HostState::StartPending => ServiceState::StartPending,
        HostState::Running => ServiceState::Running,
        HostState::StopPending => ServiceState::StopPending,
        HostState::Stopped => ServiceState::Stopped,
    };
    let controls_accepted = report
        .accepts
        .iter()
        .fold(ServiceControlAccept::empty(), |acc, cmd| {
            acc | match cmd {
                ControlCommand::Stop => ServiceControlAccept::STOP,
                ControlCommand::Shutdown => ServiceControlAccept::SHUTDOWN,
            }
        });
    let exit_code = match (report.state, exit) {
        (HostState::Stopped, e) if e.is_failure() => {
            ServiceExitCode::ServiceSpecific(e.code() as u32)
        }
        _ => ServiceExitCode::Win32(0),
    };
    let wait_hint = match report.state {
        HostState::StartPending | HostState::StopPending => PENDING_WAIT_HINT,
        _ => Duration::ZERO,
    };
    ServiceStatus {
        service_type: ServiceType::OWN_PROCESS,
        current_state,
        controls_accepted,
        exit_code,
        checkpoint: 0,
        wait_hint,
        process_id: None,
    }
}
