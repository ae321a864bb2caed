//! Structured logging infrastructure for bankload
//!
//! Builds a `tracing` subscriber from the logging configuration domain:
//! one formatting layer per configured target, each with its own level
//! filter. File targets write through a non-blocking appender whose
//! flush guard is handed back to the caller.

pub mod init;

pub use init::{build_subscriber, init_logging_from_config, init_simple_tracing, LoggingGuard};
