// Central Error Type for the task queue library

use thiserror::Error;

/// Library error type
///
/// Precondition violations (deleting a queue from its own worker, blocking
/// on a target from its own thread) are not represented here: they abort.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Task queue not found: {0}")]
    NotFound(String),

    #[error("Invalid queue name: {0}")]
    InvalidName(String),

    #[error("Failed to spawn worker thread for '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build executor runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Invalid queue state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;
