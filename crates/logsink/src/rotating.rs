//! Size/age-rotated log file sink.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

/// Rotation thresholds.  Fixed by the redirection contract, not
/// user-configurable.
const MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;
const MAX_BACKUPS: usize = 3;
const MAX_AGE: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Filename used when the configured log path designates a directory.
const DIR_DEFAULT_NAME: &str = "log.txt";

/// Resolves a configured log path per the redirection rules: an existing
/// directory gets [`DIR_DEFAULT_NAME`] appended, and the result is made
/// absolute against the current working directory.
pub fn resolve_log_path(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty log path"));
    }
    let mut path = path.to_path_buf();
    if path.is_dir() {
        path.push(DIR_DEFAULT_NAME);
    }
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Append-mode log file that rotates itself when the live file would exceed
/// the size threshold.  Rotation renames the live file to a timestamped
/// sibling and prunes old backups by count and age; pruning is best-effort.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    file: File,
    written: u64,
    max_size: u64,
    max_backups: usize,
    max_age: Duration,
}

impl RotatingFileSink {
    /// Opens the sink at `path`, resolved per [`resolve_log_path`].  Missing
    /// parent directories are created.
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::with_policy(path, MAX_SIZE_BYTES, MAX_BACKUPS, MAX_AGE)
    }

    pub(crate) fn with_policy(
        path: &Path,
        max_size: u64,
        max_backups: usize,
        max_age: Duration,
    ) -> io::Result<Self> {
        let path = resolve_log_path(path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_size,
            max_backups,
            max_age,
        })
    }

    /// The resolved path of the live log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backup = backup_path(&self.path);
        fs::rename(&self.path, &backup)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        self.prune_backups();
        Ok(())
    }

    /// Removes backups beyond the count limit and backups older than the
    /// retention window.  Errors are logged and otherwise ignored; pruning
    /// must never fail a log write.
    fn prune_backups(&self) {
        let Some(parent) = self.path.parent() else {
            return;
        };
        let entries = match fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(%e, "failed to scan log directory for backups");
                return;
            }
        };

        let mut backups: Vec<(PathBuf, SystemTime)> = entries
            .flatten()
            .filter(|entry| is_backup_of(&self.path, &entry.path()))
            .filter_map(|entry| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
                Some((entry.path(), modified))
            })
            .collect();

        // Newest first; everything past the count limit goes.
        backups.sort_by(|a, b| b.1.cmp(&a.1));
        let now = SystemTime::now();
        for (i, (path, modified)) in backups.iter().enumerate() {
            let expired = now
                .duration_since(*modified)
                .map(|age| age > self.max_age)
                .unwrap_or(false);
            if i >= self.max_backups || expired {
                if let Err(e) = fs::remove_file(path) {
                    debug!(%e, path = %path.display(), "failed to remove old log backup");
                }
            }
        }
    }
}

impl Write for RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Backup name for the live file: `log.txt` becomes `log-<millis>.txt`.
fn backup_path(live: &Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let stem = live
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_owned());
    let name = match live.extension() {
        Some(ext) => format!("{stem}-{millis}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{millis}"),
    };
    live.with_file_name(name)
}

/// Whether `candidate` looks like a rotated backup of `live`.
fn is_backup_of(live: &Path, candidate: &Path) -> bool {
    if candidate == live {
        return false;
    }
    let Some(name) = candidate.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    let stem = live
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = format!("{stem}-");
    if !name.starts_with(&prefix) {
        return false;
    }
    match live.extension() {
        Some(ext) => name.ends_with(&format!(".{}", ext.to_string_lossy())),
        None => true,
    }
}
