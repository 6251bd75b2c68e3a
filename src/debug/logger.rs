// Logger - Trace logging for CPU execution and emulator events
//
// Provides:
// - CPU trace logging (one line per instruction, from `Cpu::trace`)
// - Emulator event messages (frame boundaries, loads, halts)
// - Configurable log levels
// - Log output to a bounded memory buffer and/or a file

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    Info,
    /// Debug information (includes traces)
    Debug,
    /// Verbose trace logging
    Trace,
}

/// Trace entry
///
/// Represents a single trace log entry
#[derive(Debug, Clone)]
pub enum TraceEntry {
    /// CPU instruction trace line
    Cpu(String),
    /// Emulator event message
    Message(String),
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEntry::Cpu(line) => write!(f, "CPU: {}", line),
            TraceEntry::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Logger
///
/// Buffers trace entries in memory (bounded) and optionally mirrors
/// them to a file.
pub struct Logger {
    /// Current log level
    log_level: LogLevel,

    /// Enable CPU trace logging
    cpu_trace: bool,

    /// In-memory trace buffer
    trace_buffer: Vec<TraceEntry>,

    /// Maximum number of entries in trace buffer (0 = unlimited)
    max_buffer_size: usize,

    /// Output file
    output_file: Option<File>,
}

impl Logger {
    /// Create a new logger with default settings (logging off)
    pub fn new() -> Self {
        Logger {
            log_level: LogLevel::None,
            cpu_trace: false,
            trace_buffer: Vec::new(),
            max_buffer_size: 10000,
            output_file: None,
        }
    }

    /// Set the log level
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Get the current log level
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Enable CPU trace logging
    pub fn enable_cpu_trace(&mut self) {
        self.cpu_trace = true;
        if self.log_level < LogLevel::Trace {
            self.log_level = LogLevel::Trace;
        }
    }

    /// Disable CPU trace logging
    pub fn disable_cpu_trace(&mut self) {
        self.cpu_trace = false;
    }

    /// Is CPU tracing active?
    pub fn cpu_trace_enabled(&self) -> bool {
        self.cpu_trace && self.log_level >= LogLevel::Trace
    }

    /// Mirror the log to a file
    pub fn set_output_file<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        self.output_file = Some(File::create(path)?);
        Ok(())
    }

    /// Record a CPU trace line
    pub fn log_cpu(&mut self, line: String) {
        if !self.cpu_trace_enabled() {
            return;
        }
        self.push(TraceEntry::Cpu(line));
    }

    /// Record an emulator event at a level
    pub fn log_message(&mut self, level: LogLevel, message: String) {
        if level > self.log_level || self.log_level == LogLevel::None {
            return;
        }
        self.push(TraceEntry::Message(message));
    }

    fn push(&mut self, entry: TraceEntry) {
        if let Some(file) = &mut self.output_file {
            let _ = writeln!(file, "{}", entry);
        }

        self.trace_buffer.push(entry);
        if self.max_buffer_size > 0 && self.trace_buffer.len() > self.max_buffer_size {
            let overflow = self.trace_buffer.len() - self.max_buffer_size;
            self.trace_buffer.drain(..overflow);
        }
    }

    /// The buffered entries (oldest first)
    pub fn entries(&self) -> &[TraceEntry] {
        &self.trace_buffer
    }

    /// Drop all buffered entries
    pub fn clear(&mut self) {
        self.trace_buffer.clear();
    }

    /// Cap the in-memory buffer (0 = unlimited)
    pub fn set_max_buffer_size(&mut self, size: usize) {
        self.max_buffer_size = size;
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_filter_messages() {
        let mut logger = Logger::new();
        logger.log_message(LogLevel::Error, "dropped".to_string());
        assert!(logger.entries().is_empty(), "level None drops everything");

        logger.set_log_level(LogLevel::Info);
        logger.log_message(LogLevel::Error, "kept".to_string());
        logger.log_message(LogLevel::Debug, "dropped".to_string());
        assert_eq!(logger.entries().len(), 1);
    }

    #[test]
    fn test_cpu_trace_gating() {
        let mut logger = Logger::new();
        logger.log_cpu("00:8000 ...".to_string());
        assert!(logger.entries().is_empty());

        logger.enable_cpu_trace();
        logger.log_cpu("00:8000 ...".to_string());
        assert_eq!(logger.entries().len(), 1);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut logger = Logger::new();
        logger.set_log_level(LogLevel::Info);
        logger.set_max_buffer_size(3);

        for i in 0..5 {
            logger.log_message(LogLevel::Info, format!("msg {}", i));
        }

        assert_eq!(logger.entries().len(), 3);
        assert!(matches!(
            &logger.entries()[0],
            TraceEntry::Message(m) if m == "msg 2"
        ));
    }

    #[test]
    fn test_display_format() {
        let entry = TraceEntry::Cpu("line".to_string());
        assert_eq!(format!("{}", entry), "CPU: line");
    }
}
