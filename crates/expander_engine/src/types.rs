use std::fmt;

use expander_core::SessionState;
use thiserror::Error;

use crate::persist::PersistError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedResponse,
    Network,
}

impl FailureKind {
    /// Failures worth another attempt after a backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            FailureKind::Timeout | FailureKind::Network => true,
            FailureKind::HttpStatus(code) => *code >= 500 || *code == 408 || *code == 429,
            FailureKind::InvalidUrl
            | FailureKind::TooLarge { .. }
            | FailureKind::MalformedResponse => false,
        }
    }

    /// Failures the fetcher tries again. Malformed bodies are retried too and
    /// only become fatal once the attempts run out.
    pub fn is_retryable(&self) -> bool {
        self.is_transient() || matches!(self, FailureKind::MalformedResponse)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Result of driving one derived query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed {
        total_unique: usize,
        reason: expander_core::StopReason,
    },
    Aborted {
        reason: String,
    },
    /// The session was interrupted; `checkpoint` has been persisted.
    Interrupted {
        checkpoint: SessionState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(expander_core::SessionSummary),
    Interrupted { checkpoint: SessionState },
}

/// Failures that must halt the process.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("durable write to result store failed: {0}")]
    Store(#[from] StoreError),
    #[error("could not save session state on interruption, resume is not possible: {0}")]
    Checkpoint(#[source] PersistError),
}
