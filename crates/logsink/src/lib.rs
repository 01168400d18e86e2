//! Log destination management for lifecycle hosts.
//!
//! A process has exactly one mutable log output slot, the [`OutputTarget`].
//! The redirection manager ([`redirect`]) decides what goes into the slot: a
//! size/age-rotated file sink when a usable path is configured, a platform
//! system-log sink as fallback, or nothing (writes stay on the default
//! target).  At most one sink is ever open; swapping kinds closes the old
//! sink before the new one is installed.
//!
//! Redirection is best-effort logging infrastructure.  Nothing in here may
//! prevent the host application from starting.

mod output;
mod redirect;
mod rotating;
mod system;

#[cfg(unix)]
mod facility_unix;
#[cfg(windows)]
mod facility_windows;

#[cfg(test)]
mod test_support;

pub use output::{OutputTarget, OutputWriter, SinkKind};
pub use redirect::redirect;
pub use rotating::{resolve_log_path, RotatingFileSink};
pub use system::{Severity, SystemLog, SystemLogFacility, SystemLogSink};

#[cfg(unix)]
pub use facility_unix::SyslogFacility;
#[cfg(windows)]
pub use facility_windows::EventLogFacility;
