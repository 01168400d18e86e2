//! Scripted backends and facility doubles for exercising hosts in tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use svclift_logsink::{SystemLog, SystemLogFacility};

use crate::adapter::{Backend, ServiceConfig};
use crate::signals::StartupSignals;

/// Facility with no system log behind it; opening always fails.  For tests
/// that must not reach the system-log fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFacility;

impl SystemLogFacility for NullFacility {
    fn register(&self, _source: &str) -> io::Result<()> {
        Ok(())
    }

    fn open(&self, _source: &str) -> io::Result<Box<dyn SystemLog>> {
        Err(io::Error::other("no system log in tests"))
    }
}

#[derive(Clone, Debug)]
enum Script {
    /// Signal readiness, then run until the process ends.
    Ready,
    /// Signal readiness, then report a fatal error, then keep running.
    ReadyThenFail(String),
    /// Report a fatal error without ever becoming ready.
    Fail(String),
    /// Never signal anything.
    Hold,
    /// Run to completion like a foreground command, optionally failing.
    Complete(Option<String>),
}

/// Backend whose run behavior is scripted up front.
#[derive(Debug)]
pub struct TestBackend {
    config: ServiceConfig,
    script: Script,
    init_error: Option<String>,
    stop_error: Option<String>,
    stopped: Arc<AtomicBool>,
}

impl TestBackend {
    fn with_script(script: Script) -> Self {
        Self {
            config: ServiceConfig::default(),
            script,
            init_error: None,
            stop_error: None,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals readiness and then runs indefinitely.
    pub fn ready() -> Self {
        Self::with_script(Script::Ready)
    }

    /// Signals readiness, then a fatal error.
    pub fn ready_then_fail(msg: &str) -> Self {
        Self::with_script(Script::ReadyThenFail(msg.to_owned()))
    }

    /// Reports a fatal error before ever becoming ready.
    pub fn failing(msg: &str) -> Self {
        Self::with_script(Script::Fail(msg.to_owned()))
    }

    /// Never signals readiness nor an error.
    pub fn never_signals() -> Self {
        Self::with_script(Script::Hold)
    }

    /// Runs to completion cleanly, foreground-command style.
    pub fn completes() -> Self {
        Self::with_script(Script::Complete(None))
    }

    /// Runs to completion after reporting a fatal error.
    pub fn completes_with_error(msg: &str) -> Self {
        Self::with_script(Script::Complete(Some(msg.to_owned())))
    }

    /// Fails `init` with the given message.
    pub fn init_failing(msg: &str) -> Self {
        let mut backend = Self::with_script(Script::Hold);
        backend.init_error = Some(msg.to_owned());
        backend
    }

    /// Replaces the config snapshot `init` will hand out.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Makes `stop` return an error while still flagging the attempt.
    pub fn with_stop_error(mut self, msg: &str) -> Self {
        self.stop_error = Some(msg.to_owned());
        self
    }

    /// Flag flipped when `stop` is called.
    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        self.stopped.clone()
    }
}

impl Backend for TestBackend {
    fn init(&mut self) -> anyhow::Result<ServiceConfig> {
        if let Some(msg) = &self.init_error {
            anyhow::bail!("{msg}");
        }
        Ok(self.config.clone())
    }

    fn start(&mut self, mut signals: StartupSignals) -> BoxFuture<'static, ()> {
        let script = self.script.clone();
        async move {
            match script {
                Script::Ready => {
                    signals.ready();
                    std::future::pending::<()>().await
                }
                Script::ReadyThenFail(msg) => {
                    signals.ready();
                    signals.fatal(anyhow::anyhow!("{msg}")).await;
                    std::future::pending::<()>().await
                }
                Script::Fail(msg) => {
                    signals.fatal(anyhow::anyhow!("{msg}")).await;
                    std::future::pending::<()>().await
                }
                Script::Hold => std::future::pending::<()>().await,
                Script::Complete(err) => {
                    if let Some(msg) = err {
                        signals.fatal(anyhow::anyhow!("{msg}")).await;
                    } else {
                        signals.ready();
                    }
                }
            }
        }
        .boxed()
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(msg) = &self.stop_error {
            anyhow::bail!("{msg}");
        }
        Ok(())
    }
}
