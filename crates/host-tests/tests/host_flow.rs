//! End-to-end host runs over scripted backends and a fake system log.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;

use svclift_host::{ControlCommand, HostExit, HostOptions, HostState, ServiceHost};
use svclift_host_tests::{FakeFacility, Recorder};
use svclift_lifecycle::test_support::TestBackend;
use svclift_lifecycle::{LifecycleAdapter, ServiceConfig, Variant};
use svclift_logsink::{OutputTarget, Severity, SinkKind, SystemLogFacility};

type TestAdapter = LifecycleAdapter<TestBackend, TestBackend>;

fn service_adapter(backend: TestBackend, facility: Arc<dyn SystemLogFacility>) -> TestAdapter {
    LifecycleAdapter::new(
        Variant::Service(backend),
        OutputTarget::new(),
        facility,
        false,
    )
}

/// A directory as the configured log file gets a `log.txt` inside it, and a
/// clean commanded stop releases the sink and exits zero.
#[tokio::test]
async fn test_directory_log_path_through_full_service_run() {
    let dir = tempfile::tempdir().expect("test: tempdir");
    let backend = TestBackend::ready().with_config(ServiceConfig {
        event_source: None,
        log_file: Some(dir.path().to_path_buf()),
    });
    let adapter = service_adapter(backend, Arc::new(FakeFacility::default()));
    let output = adapter.output().clone();

    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    cmd_tx
        .send(ControlCommand::Stop)
        .await
        .expect("test: queue stop command");
    let recorder = Recorder::default();
    let exit = ServiceHost::new(cmd_rx, recorder.clone())
        .run(adapter, HostOptions::default())
        .await;

    assert_eq!(exit, HostExit::Clean);
    assert_eq!(exit.code(), 0);
    assert!(
        dir.path().join("log.txt").exists(),
        "test: directory paths get the default file name"
    );
    assert_eq!(output.kind(), None, "test: sink released at shutdown");
    assert_eq!(
        recorder.states(),
        vec![
            HostState::StartPending,
            HostState::Running,
            HostState::StopPending,
            HostState::Stopped,
        ]
    );
}

/// With no usable file path and a source name configured, startup falls back
/// to the system log and announces the opened source exactly once.
#[tokio::test]
async fn test_system_log_fallback_announces_source() {
    let facility = Arc::new(FakeFacility::default());
    let backend = TestBackend::ready().with_config(ServiceConfig {
        event_source: Some("MySvc".to_owned()),
        log_file: None,
    });
    let mut adapter = service_adapter(backend, facility.clone());

    adapter.init().expect("test: init");

    assert_eq!(adapter.output().kind(), Some(SinkKind::SystemLog));
    let records = facility.records();
    assert_eq!(records.len(), 1, "test: one startup confirmation record");
    assert_eq!(
        records[0],
        (Severity::Info, "opened log with name MySvc".to_owned())
    );
}

/// An application that faults before readiness produces a failing exit code
/// distinct from a clean stop, never reports `Running`, and releases the log
/// sink exactly once.
#[tokio::test]
async fn test_fatal_before_ready_fails_distinctly() {
    let facility = Arc::new(FakeFacility::default());
    let closed = facility.close_count();
    let backend = TestBackend::failing("bind: address in use").with_config(ServiceConfig {
        event_source: Some("MySvc".to_owned()),
        log_file: None,
    });
    let adapter = service_adapter(backend, facility);

    let (_cmd_tx, cmd_rx) = mpsc::channel(4);
    let recorder = Recorder::default();
    let exit = ServiceHost::new(cmd_rx, recorder.clone())
        .run(adapter, HostOptions::default())
        .await;

    assert_eq!(exit, HostExit::StartFailure);
    assert_ne!(exit.code(), HostExit::Clean.code());
    assert_ne!(exit.code(), HostExit::RuntimeFault.code());
    assert!(
        !recorder.states().contains(&HostState::Running),
        "test: running never reported"
    );
    assert_eq!(
        closed.load(Ordering::SeqCst),
        1,
        "test: sink released exactly once"
    );
}
