//! System-log binding for Windows hosts: the event log.

use std::io;
use std::os::windows::ffi::OsStrExt;

use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::EventLog::{
    DeregisterEventSource, RegisterEventSourceW, ReportEventW, EVENTLOG_ERROR_TYPE,
    EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE,
};

use crate::system::{Severity, SystemLog, SystemLogFacility};

/// Facility writing to the Windows event log.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventLogFacility;

impl SystemLogFacility for EventLogFacility {
    fn register(&self, _source: &str) -> io::Result<()> {
        // Message-file registration lives in the registry and belongs to the
        // installer; records from an unregistered source still land, with
        // the generic rendering template.
        Ok(())
    }

    fn open(&self, source: &str) -> io::Result<Box<dyn SystemLog>> {
        let name = wide(source);
        let handle = unsafe { RegisterEventSourceW(std::ptr::null(), name.as_ptr()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Box::new(EventLogHandle { handle }))
    }
}

struct EventLogHandle {
    handle: HANDLE,
}

// The handle is only ever used from behind the output slot's lock.
unsafe impl Send for EventLogHandle {}

impl SystemLog for EventLogHandle {
    fn append(&mut self, severity: Severity, message: &str) -> io::Result<()> {
        let text = wide(message);
        let strings = [text.as_ptr()];
        let ok = unsafe {
            ReportEventW(
                self.handle,
                event_type(severity),
                0,
                0,
                std::ptr::null_mut(),
                1,
                0,
                strings.as_ptr(),
                std::ptr::null(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for EventLogHandle {
    fn drop(&mut self) {
        unsafe {
            DeregisterEventSource(self.handle);
        }
    }
}

fn event_type(severity: Severity) -> u16 {
    match severity {
        Severity::Info => EVENTLOG_INFORMATION_TYPE,
        Severity::Warning => EVENTLOG_WARNING_TYPE,
        Severity::Error => EVENTLOG_ERROR_TYPE,
    }
}

fn wide(s: &str) -> Vec<u16> {
    std::ffi::OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}
