//! The lifecycle adapter and its two variants.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::debug;

use svclift_logsink::{redirect, OutputTarget, SystemLogFacility};

use crate::errors::LifecycleError;
use crate::signals::{channel_pair, Channels, StartupSignals};

/// Immutable configuration snapshot produced by [`Backend::init`].
///
/// Owned by the adapter after `init`; read-only thereafter.
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    /// System-log source name for the event-log fallback sink.
    pub event_source: Option<String>,
    /// Log file path; may designate a directory.
    pub log_file: Option<PathBuf>,
}

/// The wrapped application, as the adapter sees it.
///
/// `start` builds the application's run future; it runs on its own task and
/// must eventually deliver exactly one of ready/fatal through `signals`.
/// `stop` is the synchronous graceful-termination request usable while the
/// run future is still executing.
pub trait Backend: Send + 'static {
    /// One-time setup; produces the config snapshot.
    fn init(&mut self) -> anyhow::Result<ServiceConfig>;

    /// Builds the application's run future.
    fn start(&mut self, signals: StartupSignals) -> BoxFuture<'static, ()>;

    /// Requests graceful termination of the running application.
    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Which lifecycle style backs this process run.
///
/// Selection happens once, before `init`, based on invocation arguments;
/// exactly one variant is active and the type makes a second one
/// unrepresentable.
pub enum Variant<C, S> {
    /// Interactive command execution in the foreground.
    Command(C),
    /// Supervised background service.
    Service(S),
}

impl<C: Backend, S: Backend> Variant<C, S> {
    fn backend_mut(&mut self) -> &mut dyn Backend {
        match self {
            Self::Command(c) => c,
            Self::Service(s) => s,
        }
    }

    /// Whether the command variant is active.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }
}

impl<C, S> fmt::Debug for Variant<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(_) => write!(f, "Variant::Command"),
            Self::Service(_) => write!(f, "Variant::Service"),
        }
    }
}

/// Uniform five-operation surface over both variants.
///
/// Besides plain dispatch, the adapter adds exactly one cross-cutting
/// behavior: after a successful `init` in a non-interactive run it triggers
/// log redirection with the config's destination fields.
pub struct LifecycleAdapter<C, S> {
    variant: Variant<C, S>,
    output: OutputTarget,
    facility: Arc<dyn SystemLogFacility>,
    interactive: bool,
    config: Option<ServiceConfig>,
    channels: Option<Channels>,
    signals: Option<StartupSignals>,
    task: Option<JoinHandle<()>>,
}

impl<C: Backend, S: Backend> LifecycleAdapter<C, S> {
    /// Constructs the adapter around the selected variant.
    ///
    /// `interactive` reflects how the process was invoked: interactive runs
    /// keep log output on the default target, non-interactive runs redirect
    /// after `init`.
    pub fn new(
        variant: Variant<C, S>,
        output: OutputTarget,
        facility: Arc<dyn SystemLogFacility>,
        interactive: bool,
    ) -> Self {
        let (signals, channels) = channel_pair();
        Self {
            variant,
            output,
            facility,
            interactive,
            config: None,
            channels: Some(channels),
            signals: Some(signals),
            task: None,
        }
    }

    /// One-time setup.  On failure the host must treat the process as
    /// unable to serve and never call `start`.
    pub fn init(&mut self) -> Result<ServiceConfig, LifecycleError> {
        if self.config.is_some() {
            return Err(LifecycleError::AlreadyInitialized);
        }
        let config = self
            .variant
            .backend_mut()
            .init()
            .map_err(LifecycleError::Init)?;
        self.config = Some(config.clone());
        if !self.interactive {
            self.attach_log_sink();
        }
        Ok(config)
    }

    /// Begins the wrapped application on its own task; never blocks.
    ///
    /// A successful return says nothing about startup: completion or failure
    /// arrives on the channel pair, and asynchronous errors can surface
    /// after this call returns.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if self.config.is_none() {
            return Err(LifecycleError::NotInitialized);
        }
        let signals = self.signals.take().ok_or(LifecycleError::AlreadyStarted)?;
        let fut = self.variant.backend_mut().start(signals);
        debug!(variant = ?self.variant, "spawning application task");
        self.task = Some(tokio::spawn(fut));
        Ok(())
    }

    /// Moves the readiness/error receiver pair out, exactly once.
    pub fn take_channels(&mut self) -> Result<Channels, LifecycleError> {
        self.channels.take().ok_or(LifecycleError::ChannelsTaken)
    }

    /// Requests graceful termination.  Hosts log a failure here and carry on
    /// with the shutdown sequence regardless.
    pub fn stop(&mut self) -> anyhow::Result<()> {
        self.variant.backend_mut().stop()
    }

    /// Releases the active log sink, if any.  A no-op when no sink was ever
    /// opened.
    pub fn close(&mut self) -> io::Result<()> {
        self.output.close()
    }

    /// (Re-)runs log redirection with the resolved config.  Idempotent for
    /// an already-open file sink; does nothing before `init`.
    pub fn attach_log_sink(&mut self) {
        let Some(config) = &self.config else {
            return;
        };
        let kind = redirect(
            config.event_source.as_deref(),
            config.log_file.as_deref(),
            &self.output,
            self.facility.as_ref(),
        );
        match kind {
            Some(kind) => debug!(?kind, "log output redirected"),
            None => debug!("log output left on default target"),
        }
    }

    /// The config snapshot, once `init` succeeded.
    pub fn config(&self) -> Option<&ServiceConfig> {
        self.config.as_ref()
    }

    /// The process-wide output slot this adapter redirects.
    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    /// Hands the spawned application task to the caller (foreground hosts
    /// await it directly).
    pub fn take_task(&mut self) -> Option<JoinHandle<()>> {
        self.task.take()
    }
}

impl<C, S> fmt::Debug for LifecycleAdapter<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleAdapter")
            .field("variant", &self.variant)
            .field("interactive", &self.interactive)
            .field("initialized", &self.config.is_some())
            .field("started", &self.task.is_some())
            .finish()
    }
}
