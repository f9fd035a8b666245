//! Best-effort sink for non-fatal errors
//!
//! Helm swallows a postrenderer's stderr when it succeeds, so recoverable
//! failures are appended to a log file next to the chart. When the file
//! can't be written the message goes to stderr instead.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Log file written in the working directory
pub const DEFAULT_LOG_FILE: &str = "jx-secret-postrenderer.log";

/// Receives non-fatal error messages
pub trait DiagnosticSink {
    fn record(&self, message: &str);
}

/// Appends messages to a log file, falling back to stderr
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

impl DiagnosticSink for FileSink {
    fn record(&self, message: &str) {
        tracing::debug!(path = %self.path.display(), "{}", message.trim_end());

        let mut line = message.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        if let Err(e) = self.append(&line) {
            tracing::debug!(
                path = %self.path.display(),
                error = %e,
                "cannot write log file, using stderr"
            );
            eprint!("{}", line);
        }
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, message: &str) {
        tracing::debug!("{}", message.trim_end());
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("postrender.log");
        let sink = FileSink::new(&path);

        sink.record("first");
        sink.record("second\n");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_file_sink_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("postrender.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        FileSink::new(&path).record("this run");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "earlier run\nthis run\n");
    }

    #[test]
    fn test_file_sink_unwritable_path_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("postrender.log");
        let sink = FileSink::new(&path);

        sink.record("goes to stderr");
        assert!(!path.exists());
    }

    #[test]
    fn test_default_path() {
        assert_eq!(FileSink::default().path(), Path::new("jx-secret-postrenderer.log"));
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.record("a");
        sink.record("b");
        assert_eq!(sink.messages(), vec!["a".to_string(), "b".to_string()]);
    }
}
