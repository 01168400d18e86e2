//! Platform system-log sink.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

/// Record severities accepted by a registered system-log source.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    /// Informational record.
    Info,
    /// Warning record.
    Warning,
    /// Error record.
    Error,
}

/// An open handle to the platform system log, bound to one source name.
pub trait SystemLog: Send {
    /// Appends one record.  Containing failures is the caller's concern.
    fn append(&mut self, severity: Severity, message: &str) -> io::Result<()>;
}

/// Access to the host's system-log facility.
///
/// Injected into the redirection manager so the platform binding is chosen
/// once at startup rather than through conditional compilation at every call
/// site.  Test doubles implement this to observe registration and records.
pub trait SystemLogFacility: Send + Sync {
    /// Registers `source` with the host facility.  Must be idempotent for an
    /// already-registered source.
    fn register(&self, source: &str) -> io::Result<()>;

    /// Opens a log handle bound to `source`.
    fn open(&self, source: &str) -> io::Result<Box<dyn SystemLog>>;
}

/// Write adapter over an open system-log handle.
///
/// Each write becomes one informational record.  Record writes are
/// best-effort: per-call failures are swallowed, never surfaced to the log
/// producer.
pub struct SystemLogSink {
    log: Box<dyn SystemLog>,
}

impl SystemLogSink {
    /// Registers `source`, opens a handle and emits one informational record
    /// confirming the opened name.
    pub fn open(facility: &dyn SystemLogFacility, source: &str) -> io::Result<Self> {
        // Registration failures don't block the fallback; the source may
        // already be registered or registration may need privileges the
        // process lacks.
        if let Err(e) = facility.register(source) {
            debug!(%e, source, "system log source registration failed");
        }
        let mut log = facility.open(source)?;
        let _ = log.append(Severity::Info, &format!("opened log with name {source}"));
        Ok(Self { log })
    }
}

impl Write for SystemLogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        let _ = self.log.append(Severity::Info, message.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for SystemLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemLogSink")
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::FakeFacility;

    use super::*;

    #[test]
    fn test_open_registers_and_confirms() {
        let facility = FakeFacility::default();
        let _sink = SystemLogSink::open(&facility, "MySvc").expect("test: open sink");

        let registered = facility.registered.lock().expect("test: lock registered");
        assert_eq!(&*registered, &["MySvc".to_owned()]);

        let records = facility.records.lock().expect("test: lock records");
        assert_eq!(records.len(), 1, "test: one confirmation record");
        assert_eq!(records[0].0, Severity::Info);
        assert_eq!(records[0].1, "opened log with name MySvc");
    }

    #[test]
    fn test_registration_failure_is_contained() {
        let facility = FakeFacility {
            fail_register: true,
            ..FakeFacility::default()
        };
        let _sink = SystemLogSink::open(&facility, "MySvc").expect("test: open sink");
        let records = facility.records.lock().expect("test: lock records");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_writes_become_info_records() {
        let facility = FakeFacility::default();
        let mut sink = SystemLogSink::open(&facility, "MySvc").expect("test: open sink");

        sink.write_all(b"something happened\n")
            .expect("test: write record");

        let records = facility.records.lock().expect("test: lock records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], (Severity::Info, "something happened".to_owned()));
    }
}
