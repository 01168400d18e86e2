//! System-log binding for POSIX hosts: the local syslog datagram socket.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::Path;

use crate::system::{Severity, SystemLog, SystemLogFacility};

/// Well-known syslog socket locations, in probe order.
const SYSLOG_SOCKETS: &[&str] = &["/dev/log", "/var/run/syslog"];

/// RFC 3164 facility code for system daemons.
const FACILITY_DAEMON: u32 = 3;

/// Facility speaking the local syslog datagram protocol.
///
/// Records carry the source name and pid inline, so `register` has nothing
/// to do; the identity travels with every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyslogFacility;

impl SystemLogFacility for SyslogFacility {
    fn register(&self, _source: &str) -> io::Result<()> {
        Ok(())
    }

    fn open(&self, source: &str) -> io::Result<Box<dyn SystemLog>> {
        let path = SYSLOG_SOCKETS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no syslog socket found"))?;
        let socket = UnixDatagram::unbound()?;
        socket.connect(path)?;
        Ok(Box::new(SyslogHandle {
            socket,
            source: source.to_owned(),
            pid: std::process::id(),
        }))
    }
}

struct SyslogHandle {
    socket: UnixDatagram,
    source: String,
    pid: u32,
}

impl SystemLog for SyslogHandle {
    fn append(&mut self, severity: Severity, message: &str) -> io::Result<()> {
        let priority = (FACILITY_DAEMON << 3) | severity_code(severity);
        let frame = format!("<{priority}>{}[{}]: {}", self.source, self.pid, message);
        self.socket.send(frame.as_bytes()).map(|_| ())
    }
}

fn severity_code(severity: Severity) -> u32 {
    match severity {
        Severity::Info => 6,
        Severity::Warning => 4,
        Severity::Error => 3,
    }
}
