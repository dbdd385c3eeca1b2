// Queue Domain Model - naming and lifecycle

use crate::error::{QueueError, Result};
use std::fmt;

/// Maximum queue name length (names double as OS thread names)
pub const MAX_QUEUE_NAME_LEN: usize = 64;

/// Lifecycle of a queue's worker.
///
/// `Running -> Draining -> Stopped`. While `Draining` the queue still
/// accepts posts so a racing task never touches a freed queue, but every
/// post is dropped without running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Running,
    Draining,
    Stopped,
}

impl QueueState {
    /// Whether posted tasks are stored for execution
    pub fn accepts_tasks(&self) -> bool {
        matches!(self, QueueState::Running)
    }

    /// Checked transition
    pub fn transition_to(&mut self, next: QueueState) -> Result<()> {
        let allowed = matches!(
            (*self, next),
            (QueueState::Running, QueueState::Draining) | (QueueState::Draining, QueueState::Stopped)
        );
        if !allowed {
            return Err(QueueError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueState::Running => write!(f, "RUNNING"),
            QueueState::Draining => write!(f, "DRAINING"),
            QueueState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Validate a queue name before it is used as a registry key and thread name
pub fn validate_queue_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(QueueError::InvalidName("queue name is empty".to_string()));
    }

    if name.len() > MAX_QUEUE_NAME_LEN {
        return Err(QueueError::InvalidName(format!(
            "queue name too long ({} > {})",
            name.len(),
            MAX_QUEUE_NAME_LEN
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(QueueError::InvalidName(format!(
            "queue name must be alphanumeric (with '-', '_' or '.'): {}",
            name
        )));
    }

    Ok(())
}
