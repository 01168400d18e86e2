//! The redirection decision: file sink, system-log fallback, or nothing.

use std::path::Path;

use tracing::{debug, warn};

use crate::output::{OutputTarget, SinkKind};
use crate::rotating::RotatingFileSink;
use crate::system::{SystemLogFacility, SystemLogSink};

/// Points the process-wide output slot at the right destination for the
/// given config, returning the kind of sink now installed.
///
/// Policy, in order:
///
/// 1. an already-open file sink is kept as-is (no reopen, no rotation);
/// 2. a sink of another kind is closed before anything new is opened;
/// 3. a rotating file sink is tried at `log_file`;
/// 4. if that fails and `event_source` is empty, nothing is installed and
///    output stays on the prior default target;
/// 5. otherwise the platform system log is opened under `event_source`.
///
/// Redirection never fails: every error path degrades to a lesser
/// destination and the host application starts regardless.
pub fn redirect(
    event_source: Option<&str>,
    log_file: Option<&Path>,
    target: &OutputTarget,
    facility: &dyn SystemLogFacility,
) -> Option<SinkKind> {
    if target.kind() == Some(SinkKind::RotatingFile) {
        return Some(SinkKind::RotatingFile);
    }

    // The previous sink (if any) is of a different kind; close it before a
    // replacement opens so two destinations are never open at once.
    if target.kind().is_some() {
        if let Err(e) = target.close() {
            warn!(%e, "failed to close previous log sink");
        }
    }

    if let Some(path) = log_file.filter(|p| !p.as_os_str().is_empty()) {
        match RotatingFileSink::open(path) {
            Ok(sink) => {
                target.install(SinkKind::RotatingFile, Box::new(sink));
                return Some(SinkKind::RotatingFile);
            }
            Err(e) => debug!(%e, path = %path.display(), "could not open rotating file sink"),
        }
    }

    let source = event_source.unwrap_or("");
    if source.is_empty() {
        return None;
    }

    match SystemLogSink::open(facility, source) {
        Ok(sink) => {
            target.install(SinkKind::SystemLog, Box::new(sink));
            Some(SinkKind::SystemLog)
        }
        Err(e) => {
            warn!(%e, source, "failed to open system log sink");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use crate::system::Severity;
    use crate::test_support::FakeFacility;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn test_file_sink_installed_for_directory_path() {
        let dir = tempfile::tempdir().expect("test: tempdir");
        let target = OutputTarget::new();
        let facility = FakeFacility::default();

        let kind = redirect(None, Some(dir.path()), &target, &facility);

        assert_eq!(kind, Some(SinkKind::RotatingFile));
        let mut w = target.make_writer();
        w.write_all(b"line\n").expect("test: write through target");
        w.flush().expect("test: flush target");
        let contents =
            fs::read_to_string(dir.path().join("log.txt")).expect("test: read log file");
        assert_eq!(contents, "line\n");
    }

    #[test]
    fn test_second_redirect_keeps_existing_file_sink() {
        let dir = tempfile::tempdir().expect("test: tempdir");
        let target = OutputTarget::new();
        let facility = FakeFacility::default();

        redirect(None, Some(dir.path()), &target, &facility);
        let mut w = target.make_writer();
        w.write_all(b"before\n").expect("test: write");
        w.flush().expect("test: flush");

        let kind = redirect(Some("MySvc"), Some(dir.path()), &target, &facility);
        assert_eq!(kind, Some(SinkKind::RotatingFile));

        let mut w = target.make_writer();
        w.write_all(b"after\n").expect("test: write again");
        w.flush().expect("test: flush again");

        let contents =
            fs::read_to_string(dir.path().join("log.txt")).expect("test: read log file");
        assert_eq!(contents, "before\nafter\n", "test: file not reopened");
        assert!(
            facility.records().is_empty(),
            "test: system log untouched while file sink holds"
        );
    }

    #[test]
    fn test_no_sink_when_file_fails_and_source_empty() {
        let target = OutputTarget::new();
        let facility = FakeFacility::default();

        let kind = redirect(None, Some(Path::new("")), &target, &facility);

        assert_eq!(kind, None);
        assert_eq!(target.kind(), None, "test: prior default target untouched");
    }

    #[test]
    fn test_falls_back_to_system_log() {
        let target = OutputTarget::new();
        let facility = FakeFacility::default();

        let kind = redirect(Some("MySvc"), None, &target, &facility);

        assert_eq!(kind, Some(SinkKind::SystemLog));
        let records = facility.records();
        assert_eq!(records.len(), 1, "test: one startup confirmation record");
        assert_eq!(
            records[0],
            (Severity::Info, "opened log with name MySvc".to_owned())
        );
    }

    #[test]
    fn test_system_sink_closed_when_replaced_by_file() {
        let dir = tempfile::tempdir().expect("test: tempdir");
        let target = OutputTarget::new();
        let facility = FakeFacility::default();

        redirect(Some("MySvc"), None, &target, &facility);
        assert_eq!(target.kind(), Some(SinkKind::SystemLog));

        let kind = redirect(Some("MySvc"), Some(dir.path()), &target, &facility);

        assert_eq!(kind, Some(SinkKind::RotatingFile));
        assert!(facility.was_closed(), "test: system handle released");
    }

    #[test]
    fn test_system_open_failure_degrades_to_nothing() {
        let target = OutputTarget::new();
        let facility = FakeFacility {
            fail_open: true,
            ..FakeFacility::default()
        };

        let kind = redirect(Some("MySvc"), None, &target, &facility);

        assert_eq!(kind, None);
        assert_eq!(target.kind(), None);
    }
}
