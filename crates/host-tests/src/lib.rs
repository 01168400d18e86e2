//! Shared doubles for end-to-end host tests.

#[cfg(test)]
use svclift_lifecycle as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio as _;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use svclift_host::{HostState, StatusReport, StatusReporter};
use svclift_logsink::{Severity, SystemLog, SystemLogFacility};

/// In-memory system-log facility observing records and handle lifetimes.
#[derive(Debug, Default)]
pub struct FakeFacility {
    records: Arc<Mutex<Vec<(Severity, String)>>>,
    closed: Arc<AtomicUsize>,
}

impl FakeFacility {
    /// All records appended so far, in order.
    pub fn records(&self) -> Vec<(Severity, String)> {
        self.records.lock().expect("test: lock records").clone()
    }

    /// Counter of handle closes, shared with every handle this facility
    /// opens.
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        self.closed.clone()
    }
}

struct FakeLog {
    records: Arc<Mutex<Vec<(Severity, String)>>>,
    closed: Arc<AtomicUsize>,
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
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl SystemLogFacility for FakeFacility {
    fn register(&self, _source: &str) -> io::Result<()> {
        Ok(())
    }

    fn open(&self, _source: &str) -> io::Result<Box<dyn SystemLog>> {
        Ok(Box::new(FakeLog {
            records: self.records.clone(),
            closed: self.closed.clone(),
        }))
    }
}

/// Status reporter recording every report in order.
#[derive(Clone, Debug, Default)]
pub struct Recorder(Arc<Mutex<Vec<StatusReport>>>);

impl Recorder {
    /// The reported states, in order.
    pub fn states(&self) -> Vec<HostState> {
        self.0
            .lock()
            .expect("test: lock reports")
            .iter()
            .map(|r| r.state)
            .collect()
    }

    /// The full reports, in order.
    pub fn reports(&self) -> Vec<StatusReport> {
        self.0.lock().expect("test: lock reports").clone()
    }
}

impl StatusReporter for Recorder {
    fn report(&mut self, status: StatusReport) {
        self.0.lock().expect("test: lock reports").push(status);
    }
}
