//! Built-in log sinks: coloured console lines and JSON-lines files.

use chrono::{Local, SecondsFormat};
use console::Style;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use super::config::{ConsoleFormat, FileConfig, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_NB_FILES};
use super::rotation::{daily_appender, SizeRotatingWriter};
use crate::domain::errors::LoggerError;
use crate::domain::models::{Level, LogRecord};
use crate::domain::ports::LogSink;

/// Owned writer behind a sink or the raw output.
pub type BoxedWriter = Box<dyn Write + Send>;

/// In-memory writer whose clones share one buffer.
///
/// Handy as a raw or sink writer when output has to be inspected.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Human-readable sink: `[level]: [namespace] message meta`.
pub struct ConsoleSink {
    level: Level,
    format: ConsoleFormat,
    writer: Mutex<BoxedWriter>,
}

impl ConsoleSink {
    /// Console sink writing to `writer`.
    pub fn new(level: Level, format: ConsoleFormat, writer: BoxedWriter) -> Self {
        Self {
            level,
            format,
            writer: Mutex::new(writer),
        }
    }

    /// Console sink on stdout.
    pub fn stdout(level: Level, format: ConsoleFormat) -> Self {
        Self::new(level, format, Box::new(io::stdout()))
    }

    fn level_style(level: Level) -> Style {
        match level {
            Level::Error => Style::new().red().bold(),
            Level::Warn => Style::new().yellow(),
            Level::Info => Style::new().green(),
            Level::Debug => Style::new().blue(),
            Level::Trace => Style::new().magenta(),
        }
    }

    /// One rendered line, without the newline.
    pub fn format_line(&self, record: &LogRecord) -> String {
        let tag = format!("[{}]:", record.level);
        let tag = if self.format.color {
            Self::level_style(record.level).apply_to(tag).to_string()
        } else {
            tag
        };
        let separator = if self.format.align { '\t' } else { ' ' };

        let mut line = String::new();
        if self.format.time {
            line.push_str(&record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S ").to_string());
        }
        line.push_str(&tag);
        line.push(separator);
        line.push_str(&record.text());
        let meta = record.meta_text();
        if !meta.is_empty() {
            line.push(' ');
            line.push_str(&meta);
        }
        line
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let mut line = self.format_line(record);
        line.push('\n');
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}

/// JSON-lines sink: `{timestamp, level, message, context}` per line.
pub struct FileSink {
    level: Level,
    writer: Mutex<BoxedWriter>,
}

impl FileSink {
    /// File sink writing to `writer`.
    pub fn new(level: Level, writer: BoxedWriter) -> Self {
        Self {
            level,
            writer: Mutex::new(writer),
        }
    }

    /// Open the file described by `logs.file`, dated or size rotated.
    pub fn from_config(config: &FileConfig) -> Result<Self, LoggerError> {
        let level = config.level.parse()?;
        let path = Path::new(&config.path);

        let writer: BoxedWriter = if config.rotation.is_active {
            Box::new(daily_appender(path, config.rotation.days)?)
        } else {
            Box::new(SizeRotatingWriter::open(
                path,
                config.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
                config.max_nb_files.unwrap_or(DEFAULT_MAX_NB_FILES),
            )?)
        };
        Ok(Self::new(level, writer))
    }

    /// JSON object written for `record`.
    pub fn to_json(record: &LogRecord) -> Value {
        let mut entry = Map::new();
        entry.insert(
            "timestamp".to_string(),
            json!(record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        entry.insert("level".to_string(), json!(record.level));
        entry.insert("message".to_string(), json!(record.text()));
        if let Some(meta) = &record.meta {
            entry.insert("context".to_string(), meta.to_json());
        }
        Value::Object(entry)
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn level(&self) -> Level {
        self.level
    }

    // One write per line so a size rotation never splits a record
    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let mut line = Self::to_json(record).to_string();
        line.push('\n');
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ContextValue, LogMeta};
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(level: Level, meta: Option<LogMeta>) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            level,
            namespace: "app:db".to_string(),
            message: "connected".to_string(),
            meta,
        }
    }

    const PLAIN: ConsoleFormat = ConsoleFormat {
        color: false,
        time: false,
        align: false,
    };

    #[test]
    fn test_console_plain_line() {
        let buffer = SharedBuffer::new();
        let sink = ConsoleSink::new(Level::Info, PLAIN, Box::new(buffer.clone()));
        sink.write(&record(Level::Warn, None)).unwrap();
        assert_eq!(buffer.contents(), "[warn]: [app:db] connected\n");
    }

    #[test]
    fn test_console_meta_and_alignment() {
        let sink = ConsoleSink::new(
            Level::Info,
            ConsoleFormat {
                align: true,
                ..PLAIN
            },
            Box::new(io::sink()),
        );
        let meta = LogMeta::from_context(vec![ContextValue::from(serde_json::json!({"pool": 4}))]);
        assert_eq!(
            sink.format_line(&record(Level::Info, meta)),
            "[info]:\t[app:db] connected {\"pool\":4}"
        );
    }

    #[test]
    fn test_console_time_prefix() {
        let sink = ConsoleSink::new(
            Level::Info,
            ConsoleFormat {
                time: true,
                ..PLAIN
            },
            Box::new(io::sink()),
        );
        let line = sink.format_line(&record(Level::Info, None));
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(line.find(" [info]:"), Some(19));
    }

    #[test]
    fn test_sink_level_filter() {
        let sink = ConsoleSink::new(Level::Warn, PLAIN, Box::new(io::sink()));
        assert!(sink.accepts(Level::Error));
        assert!(sink.accepts(Level::Warn));
        assert!(!sink.accepts(Level::Info));
    }

    #[test]
    fn test_file_sink_writes_json_lines() {
        let buffer = SharedBuffer::new();
        let sink = FileSink::new(Level::Debug, Box::new(buffer.clone()));
        let meta = LogMeta::from_context(vec!["a".into(), "b".into()]);
        sink.write(&record(Level::Error, meta)).unwrap();
        sink.write(&record(Level::Info, None)).unwrap();

        let lines: Vec<Value> = buffer
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "error");
        assert_eq!(lines[0]["message"], "[app:db] connected");
        assert_eq!(lines[0]["context"], serde_json::json!(["a", "b"]));
        assert!(lines[1].get("context").is_none());
    }

    #[test]
    fn test_file_sink_from_config_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("app.log");
        let config = FileConfig {
            active: true,
            path: path.to_string_lossy().to_string(),
            ..FileConfig::default()
        };

        let sink = FileSink::from_config(&config).unwrap();
        sink.write(&record(Level::Info, None)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"message\":\"[app:db] connected\""));
    }

    #[test]
    fn test_file_sink_rejects_bad_level() {
        let config = FileConfig {
            level: "loud".to_string(),
            ..FileConfig::default()
        };
        assert!(matches!(
            FileSink::from_config(&config),
            Err(LoggerError::InvalidLevel(_))
        ));
    }
}
