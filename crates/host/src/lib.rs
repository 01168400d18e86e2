//! Platform hosts that drive a lifecycle adapter to completion.
//!
//! Three hosting styles cover the ways a process gets supervised:
//!
//! - [`CommandHost`] runs a foreground command and reports through the exit
//!   code alone.
//! - [`ServiceHost`] speaks a control-manager protocol: ordered status
//!   reports out, stop/shutdown commands in.  The `cfg(windows)` bridge in
//!   this crate wires it to the real service control manager.
//! - [`NotifyHost`] pings a supervisor once on readiness (systemd's
//!   `Type=notify` contract) and then waits for a fatal error.
//!
//! All three end in a [`HostExit`] that maps to a distinct process exit
//! code, so a supervisor can tell a start failure from a runtime fault.

mod command_host;
mod invoke;
mod notify_host;
mod service_host;
mod startup;
mod state;
mod telemetry;
#[cfg(windows)]
mod winsvc;

pub use command_host::CommandHost;
pub use invoke::{choose, choose_with_override, Invocation, COVERAGE_ARGS_ENV};
#[cfg(unix)]
pub use notify_host::SystemdNotifier;
pub use notify_host::{NotifyHost, ReadinessNotifier};
pub use service_host::{HostOptions, ServiceHost, StatusReporter};
pub use state::{ControlCommand, HostExit, HostState, StatusReport};
pub use telemetry::{init_telemetry, TelemetryError};
#[cfg(windows)]
pub use winsvc::{forward_status, register_control_handler};
