//! Runner error types

use thiserror::Error;

/// Runner result type
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that prevent a run from starting. Nothing that happens
/// during load is reported through this type.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid task weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid think time: {0}")]
    InvalidThinkTime(String),

    #[error("Invalid load shape: {0}")]
    InvalidLoad(String),

    #[error("Latency histogram could not be created: {0}")]
    Histogram(String),
}
