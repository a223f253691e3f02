//! Pipeline log entries.
//!
//! Every entry is printed to stdout with a level prefix. A [`LogChannel`] is
//! owned by each pipeline and also broadcasts what it prints; a batch run
//! listens on it and keeps the warnings and errors as the run's issues.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }

    /// Levels kept in a run summary.
    pub fn is_issue(self) -> bool {
        matches!(self, LogLevel::Warning | LogLevel::Error)
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth on stdout
    #[serde(skip)]
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn print(&self) {
        let indent = "   ".repeat(self.indent as usize);
        println!("{}{} {}", indent, self.level.prefix(), self.message);
    }
}

/// Prints entries and broadcasts them to subscribers.
#[derive(Debug, Clone)]
pub struct LogChannel {
    sender: broadcast::Sender<LogEntry>,
}

impl LogChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, entry: LogEntry) {
        entry.print();
        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Info, msg));
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Success, msg));
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Warning, msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Error, msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Warnings and errors currently buffered in `receiver`.
pub fn drain_issues(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut issues = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) if entry.level.is_issue() => issues.push(entry),
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    issues
}

/// Print only; for steps that run outside a pipeline.
pub fn log_info(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Info, msg).print();
}

/// Print only; for steps that run outside a pipeline.
pub fn log_success(msg: impl Into<String>) {
    LogEntry::new(LogLevel::Success, msg).print();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_issues_only() {
        let channel = LogChannel::new();
        let mut rx = channel.subscribe();

        channel.info("fetching");
        channel.error("Couldn't find country name for XKX, skipping");
        channel.success("done");
        channel.warning("No records for AFG, skipping");

        let issues = drain_issues(&mut rx);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].level, LogLevel::Error);
        assert!(issues[0].message.contains("XKX"));
        assert_eq!(issues[1].level, LogLevel::Warning);
        assert!(drain_issues(&mut rx).is_empty());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let channel = LogChannel::new();
        channel.emit(LogEntry::new(LogLevel::Info, "AFG (3 records)").with_indent(1));
        let mut rx = channel.subscribe();
        assert!(drain_issues(&mut rx).is_empty());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::new(LogLevel::Warning, "skipped").with_indent(1);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "skipped");
        assert!(json.get("indent").is_none());
    }
}
