//! Shared test doubles for the system-log facility.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::system::{Severity, SystemLog, SystemLogFacility};

/// In-memory facility recording registrations, records and handle closes.
#[derive(Clone, Default)]
pub(crate) struct FakeFacility {
    pub(crate) registered: Arc<Mutex<Vec<String>>>,
    pub(crate) records: Arc<Mutex<Vec<(Severity, String)>>>,
    pub(crate) closed: Arc<AtomicBool>,
    pub(crate) fail_register: bool,
    pub(crate) fail_open: bool,
}

impl FakeFacility {
    pub(crate) fn records(&self) -> Vec<(Severity, String)> {
        self.records.lock().expect("test: lock records").clone()
    }

    pub(crate) fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakeLog {
    records: Arc<Mutex<Vec<(Severity, String)>>>,
    closed: Arc<AtomicBool>,
}

impl SystemLog for FakeLog {
    fn append(&mut self, severity: Severity, message: &str) -> io::Result<()> {
        self.records
            .lock()
            .expect("test: lock records")
            .push((severity, message.to_owned()));
        Ok(())
    }
}

impl Drop for FakeLog {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl SystemLogFacility for FakeFacility {
    fn register(&self, source: &str) -> io::Result<()> {
        if self.fail_register {
            return Err(io::Error::other("registration denied"));
        }
        self.registered
            .lock()
            .expect("test: lock registered")
            .push(source.to_owned());
        Ok(())
    }

    fn open(&self, _source: &str) -> io::Result<Box<dyn SystemLog>> {
        if self.fail_open {
            return Err(io::Error::other("facility unavailable"));
        }
        Ok(Box::new(FakeLog {
            records: self.records.clone(),
            closed: self.closed.clone(),
        }))
    }
}
