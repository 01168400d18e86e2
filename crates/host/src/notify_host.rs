//! Supervisor-notification host for systemd-style service runs.

use std::io;

use tracing::{debug, error, info, warn};

use svclift_lifecycle::{Backend, LifecycleAdapter};

use crate::service_host::HostOptions;
use crate::startup::{wait_ready, StartOutcome};
use crate::state::HostExit;

/// One-way readiness signal to the process supervisor.
///
/// Notification is best-effort throughout: an absent or misconfigured
/// supervisor is logged, never treated as a startup failure.
pub trait ReadinessNotifier: Send {
    /// Whether a supervisor appears to be managing this process.
    fn available(&self) -> bool;

    /// Sends the readiness notification.  `Ok(false)` means no supervisor
    /// picked it up.
    fn notify_ready(&self) -> io::Result<bool>;
}

/// Readiness notification over the systemd notify socket.
#[cfg(unix)]
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemdNotifier;

#[cfg(unix)]
impl ReadinessNotifier for SystemdNotifier {
    fn available(&self) -> bool {
        sd_notify::booted().unwrap_or(false)
    }

    fn notify_ready(&self) -> io::Result<bool> {
        if std::env::var_os("NOTIFY_SOCKET").is_none() {
            return Ok(false);
        }
        sd_notify::notify(false, &[sd_notify::NotifyState::Ready])?;
        Ok(true)
    }
}

/// Drives a service run whose supervisor only wants a readiness ping.
///
/// Unlike [`crate::ServiceHost`] there is no command channel: the supervisor
/// terminates the process with signals, so after notifying the host simply
/// waits for a fatal application error.
#[derive(Debug)]
pub struct NotifyHost<N> {
    notifier: N,
}

impl<N: ReadinessNotifier> NotifyHost<N> {
    /// Builds a host around the given notifier.
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    /// Runs the service to completion and maps the outcome to an exit code.
    pub async fn run<C: Backend, S: Backend>(
        self,
        mut adapter: LifecycleAdapter<C, S>,
        options: HostOptions,
    ) -> HostExit {
        if let Err(err) = adapter.init() {
            error!(%err, "service init failed");
            return HostExit::StartFailure;
        }
        let mut channels = match adapter.take_channels() {
            Ok(channels) => channels,
            Err(err) => {
                error!(%err, "startup channels unavailable");
                return HostExit::StartFailure;
            }
        };
        if let Err(err) = adapter.start() {
            error!(%err, "failed to launch application task");
            return HostExit::StartFailure;
        }

        match wait_ready(&mut channels, options.ready_timeout).await {
            StartOutcome::Ready => {}
            StartOutcome::Failed(err) => {
                error!(%err, "service failed to start");
                if let Err(err) = adapter.close() {
                    warn!(%err, "failed to release log sink");
                }
                return HostExit::StartFailure;
            }
        }

        self.notify();

        let exit = match channels.fatal.recv().await {
            Some(err) => {
                error!(%err, "service failed while running");
                HostExit::RuntimeFault
            }
            None => HostExit::Clean,
        };
        if let Err(err) = adapter.close() {
            warn!(%err, "failed to release log sink");
        }
        exit
    }

    fn notify(&self) {
        if !self.notifier.available() {
            debug!("no supervisor detected; skipping readiness notification");
            return;
        }
        match self.notifier.notify_ready() {
            Ok(true) => info!("notified supervisor of readiness"),
            Ok(false) => {
                warn!("supervisor ignored the readiness notification; Type=notify missing?")
            }
            Err(err) => error!(%err, "failed to notify supervisor of readiness"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use svclift_lifecycle::test_support::{NullFacility, TestBackend};
    use svclift_lifecycle::{LifecycleAdapter, Variant};
    use svclift_logsink::OutputTarget;

    use super::*;

    /// Counts notification attempts.
    #[derive(Clone, Default)]
    struct CountingNotifier {
        present: bool,
        sent: Arc<AtomicUsize>,
    }

    impl ReadinessNotifier for CountingNotifier {
        fn available(&self) -> bool {
            self.present
        }

        fn notify_ready(&self) -> io::Result<bool> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn adapter(backend: TestBackend) -> LifecycleAdapter<TestBackend, TestBackend> {
        LifecycleAdapter::new(
            Variant::Service(backend),
            OutputTarget::new(),
            Arc::new(NullFacility),
            false,
        )
    }

    #[tokio::test]
    async fn test_notifies_exactly_once_on_readiness() {
        let notifier = CountingNotifier {
            present: true,
            ..CountingNotifier::default()
        };
        let sent = notifier.sent.clone();
        let host = NotifyHost::new(notifier);

        // The run blocks until a fatal error ends it.
        let exit = host
            .run(
                adapter(TestBackend::ready_then_fail("disk gone")),
                HostOptions::default(),
            )
            .await;

        assert_eq!(exit, HostExit::RuntimeFault);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_notification_on_start_failure() {
        let notifier = CountingNotifier {
            present: true,
            ..CountingNotifier::default()
        };
        let sent = notifier.sent.clone();
        let host = NotifyHost::new(notifier);

        let exit = host
            .run(
                adapter(TestBackend::failing("bind: address in use")),
                HostOptions::default(),
            )
            .await;

        assert_eq!(exit, HostExit::StartFailure);
        assert_eq!(sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_absent_supervisor_is_not_an_error() {
        let notifier = CountingNotifier::default();
        let sent = notifier.sent.clone();
        let host = NotifyHost::new(notifier);

        let exit = host
            .run(
                adapter(TestBackend::ready_then_fail("disk gone")),
                HostOptions::default(),
            )
            .await;

        assert_eq!(exit, HostExit::RuntimeFault);
        assert_eq!(sent.load(Ordering::SeqCst), 0, "test: nothing to notify");
    }

    #[tokio::test]
    async fn test_clean_exit_when_application_finishes() {
        let notifier = CountingNotifier {
            present: true,
            ..CountingNotifier::default()
        };
        let host = NotifyHost::new(notifier);

        let exit = host
            .run(adapter(TestBackend::completes()), HostOptions::default())
            .await;

        assert_eq!(exit, HostExit::Clean);
    }
}
