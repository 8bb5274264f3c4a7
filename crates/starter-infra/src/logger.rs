//! Structured logger adapter over `tracing`.
//!
//! A [`LoggerService`] either emits through the process-wide subscriber or,
//! when built with [`LoggerService::with_writer`], through its own JSON
//! subscriber bound to the given writer.

use std::io;
use std::sync::{Arc, Mutex, RwLock};

use starter_types::domain::log::{ErrorRecord, HttpLogRecord, LogEntry};
use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
}

macro_rules! leveled {
    ($level:expr, $($args:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($args)+),
            LogLevel::Info => tracing::info!($($args)+),
            LogLevel::Warn => tracing::warn!($($args)+),
            LogLevel::Error => tracing::error!($($args)+),
        }
    };
}

#[derive(Clone)]
pub struct LoggerService {
    inner: Arc<Inner>,
}

struct Inner {
    app: RwLock<String>,
    dispatch: Option<Dispatch>,
}

impl LoggerService {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                app: RwLock::new(app.into()),
                dispatch: None,
            }),
        }
    }

    pub fn with_writer<W>(app: impl Into<String>, writer: W, level: LevelFilter) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(writer)
            .with_max_level(level)
            .with_target(false)
            .finish();
        Self {
            inner: Arc::new(Inner {
                app: RwLock::new(app.into()),
                dispatch: Some(Dispatch::new(subscriber)),
            }),
        }
    }

    pub fn application(&self) -> String {
        self.inner
            .app
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_application(&self, app: impl Into<String>) {
        *self
            .inner
            .app
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = app.into();
    }

    pub fn trace(&self, entry: impl Into<LogEntry>) {
        self.entry(LogLevel::Trace, entry.into());
    }

    pub fn info(&self, entry: impl Into<LogEntry>) {
        self.entry(LogLevel::Info, entry.into());
    }

    pub fn warn(&self, entry: impl Into<LogEntry>) {
        self.entry(LogLevel::Warn, entry.into());
    }

    pub fn error(&self, record: ErrorRecord) {
        self.failure(record, false);
    }

    /// Logs and terminates the process with exit status 1.
    pub fn fatal(&self, record: ErrorRecord) -> ! {
        self.failure(record, true);
        std::process::exit(1)
    }

    /// Per-request hook: one line per response. 3xx responses are not logged.
    pub fn http(&self, record: &HttpLogRecord) {
        let level = match record.status {
            s if s >= 400 => LogLevel::Error,
            300..=399 => return,
            _ => LogLevel::Info,
        };
        let outcome = if level == LogLevel::Error {
            "error"
        } else {
            "success"
        };
        let app = self.application();
        let timestamp = timestamp();
        let time_taken = record.time_taken_ms as u64;
        self.emit(|| {
            leveled!(
                level,
                application = %app,
                traceid = %record.trace_id,
                method = %record.method,
                path = %record.path,
                status = record.status,
                timeTaken = time_taken,
                timestamp = %timestamp,
                "request {} with status code: {}",
                outcome,
                record.status
            )
        });
    }

    fn entry(&self, level: LogLevel, entry: LogEntry) {
        let app = self.application();
        let context = entry.context.unwrap_or_else(|| app.clone());
        let payload = entry
            .payload
            .map(|p| p.to_string())
            .unwrap_or_else(|| "{}".to_string());
        let timestamp = timestamp();
        let message = entry.message;
        self.emit(|| {
            leveled!(
                level,
                application = %app,
                context = %context,
                payload = %payload,
                timestamp = %timestamp,
                "{}",
                message
            )
        });
    }

    fn failure(&self, record: ErrorRecord, fatal: bool) {
        let app = self.application();
        let context = record.context.unwrap_or_else(|| app.clone());
        let trace_id = record
            .trace_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let stack = record.stack.join("\n    caused by: ");
        let timestamp = timestamp();
        let message = record.message;
        let name = record.name;
        let status = record.status;
        self.emit(|| {
            tracing::error!(
                application = %app,
                context = %context,
                error_type = %name,
                statusCode = status,
                traceid = %trace_id,
                timestamp = %timestamp,
                stack = %stack,
                fatal,
                "{}",
                message
            )
        });
    }

    fn emit(&self, f: impl FnOnce()) {
        match &self.inner.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl std::fmt::Debug for LoggerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerService")
            .field("application", &self.application())
            .field("own_writer", &self.inner.dispatch.is_some())
            .finish()
    }
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// In-memory log sink; every formatted line is kept until dropped.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self
            .bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains(needle))
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
