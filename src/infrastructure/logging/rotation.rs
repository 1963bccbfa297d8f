//! Log file rotation
//!
//! Two policies:
//! - size based: `<path>` rolls over to `<path>.1`, `<path>.2`, ... once it
//!   reaches `max_bytes`, keeping at most `max_files` files in total
//! - daily: `<path>.YYYY-MM-DD` via `tracing-appender`, keeping `days` files

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::domain::errors::LoggerError;

/// Writer that rotates its file by size.
#[derive(Debug)]
pub struct SizeRotatingWriter {
    path: PathBuf,
    /// Maximum file size in bytes before rotation
    max_bytes: u64,
    /// Files kept, the active one included
    max_files: usize,
    file: File,
    written: u64,
}

impl SizeRotatingWriter {
    /// Open `path` for appending, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    /// Whether writing `incoming` more bytes would exceed the size limit.
    ///
    /// An empty file never rotates, so a single oversized line still lands.
    pub const fn should_rotate(&self, incoming: usize) -> bool {
        self.written > 0 && self.written + incoming as u64 > self.max_bytes
    }

    /// Path of the `n`-th backup (`<path>.n`).
    pub fn rotated_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Shift backups up by one, dropping the oldest, and start a fresh file.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backups = self.max_files - 1;

        if backups == 0 {
            self.file = OpenOptions::new().write(true).truncate(true).open(&self.path)?;
        } else {
            let oldest = self.rotated_path(backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..backups).rev() {
                let from = self.rotated_path(n);
                if from.exists() {
                    fs::rename(&from, self.rotated_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.rotated_path(1))?;
            self.file = open_append(&self.path)?;
        }

        debug!(
            path = %self.path.display(),
            size = self.written,
            max_size = self.max_bytes,
            "rotated log file"
        );
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len()) {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Daily rotating appender writing `<path>.YYYY-MM-DD`.
pub fn daily_appender(path: &Path, days: Option<usize>) -> Result<RollingFileAppender, LoggerError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoggerError::SinkSetup(format!("log path has no file name: {}", path.display())))?;

    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix);
    if let Some(days) = days {
        builder = builder.max_log_files(days);
    }
    builder
        .build(dir)
        .map_err(|e| LoggerError::SinkSetup(e.to_string()))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
