//! Bounded, leveled event log shared by the background tasks and the UI.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const EVENT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Offset from log creation.
    pub at: Duration,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[+{:>8.3}s] [{}] {}",
            self.at.as_secs_f64(),
            self.level.tag(),
            self.message
        )
    }
}

/// Fire-and-forget sink for user-visible messages.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }
}

/// Ring of the last `capacity` lines, oldest evicted first.
/// Each line is mirrored to `tracing`.
#[derive(Debug)]
pub struct EventLog {
    epoch: Instant,
    capacity: usize,
    lines: Mutex<VecDeque<LogLine>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            epoch: Instant::now(),
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    // A panic while holding the lock leaves the ring intact; keep using it.
    fn guard(&self) -> MutexGuard<'_, VecDeque<LogLine>> {
        self.lines.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.guard().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    /// True when any retained line at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.guard()
            .iter()
            .any(|l| l.level == level && l.message.contains(needle))
    }
}

impl LogSink for EventLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(level = level.tag(), "{message}")
            }
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        let line = LogLine {
            at: self.epoch.elapsed(),
            level,
            message: message.to_string(),
        };
        let mut lines = self.guard();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }
}
