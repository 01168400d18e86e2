//! The process-wide log output slot.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

/// Kind of sink currently installed in the output slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SinkKind {
    /// Size/age-rotated log file.
    RotatingFile,
    /// Platform system log (event log, syslog).
    SystemLog,
}

struct ActiveSink {
    kind: SinkKind,
    writer: Box<dyn Write + Send>,
}

/// Cloneable handle to the single process-wide log output slot.
///
/// The slot is single-writer: only the redirection manager installs or
/// closes sinks.  Everything that produces log output holds a clone of this
/// handle (typically indirectly, through the global tracing subscriber) and
/// observes swaps immediately.  While the slot is empty, writes fall back to
/// stderr, the process's prior default target.
#[derive(Clone, Default)]
pub struct OutputTarget {
    slot: Arc<Mutex<Option<ActiveSink>>>,
}

impl OutputTarget {
    /// Creates an empty output slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of the currently installed sink, if any.
    pub fn kind(&self) -> Option<SinkKind> {
        self.lock().as_ref().map(|s| s.kind)
    }

    /// Installs `writer` as the active sink.
    ///
    /// The caller (the redirection manager) is responsible for closing a
    /// previous sink of a different kind first; a leftover writer is still
    /// flushed here so a swap never drops buffered output.
    pub(crate) fn install(&self, kind: SinkKind, writer: Box<dyn Write + Send>) {
        let mut slot = self.lock();
        if let Some(mut old) = slot.replace(ActiveSink { kind, writer }) {
            let _ = old.writer.flush();
        }
    }

    /// Releases the active sink, flushing it first.
    ///
    /// Safe to call when no sink was ever installed; that is a no-op.
    pub fn close(&self) -> io::Result<()> {
        match self.lock().take() {
            Some(mut active) => active.writer.flush(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveSink>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputTarget")
            .field("kind", &self.kind())
            .finish()
    }
}

/// Write handle produced per log event; holds the slot lock only for the
/// duration of each write so sink swaps never tear a message.
pub struct OutputWriter<'a> {
    target: &'a OutputTarget,
}

impl Write for OutputWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut slot = self.target.lock();
        match slot.as_mut() {
            Some(active) => active.writer.write(buf),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut slot = self.target.lock();
        match slot.as_mut() {
            Some(active) => active.writer.flush(),
            None => io::stderr().flush(),
        }
    }
}

impl fmt::Debug for OutputWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputWriter({:?})", self.target.kind())
    }
}

impl<'a> MakeWriter<'a> for OutputTarget {
    type Writer = OutputWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        OutputWriter { target: self }
    }
}
