// Debug module - execution tracing
//
// Lightweight trace logging for the two CPUs and emulator events.
// The heavyweight inspection (disassembly-formatted lines) comes from
// `Cpu::trace`; this module buffers and sinks those lines.

mod logger;

pub use logger::{LogLevel, Logger, TraceEntry};
