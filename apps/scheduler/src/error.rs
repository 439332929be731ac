//! Scheduler error types.

use compact_str::CompactString;
use consensus::ConsensusError;
use pcore::{EnvelopeError, TransportError};
use std::fmt;

/// One failed forward attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    /// Worker that was tried.
    pub worker: CompactString,
    /// Why the call failed.
    pub error: TransportError,
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.worker, self.error)
    }
}

/// Errors from the single-target forward mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The registry has no workers to rotate over.
    #[error("no workers available")]
    NoWorkers,
    /// Every rotated attempt failed.
    #[error("all {} forward attempts failed: {}", .attempts.len(), summarize(.attempts))]
    Exhausted { attempts: Vec<FailedAttempt> },
}

fn summarize(attempts: &[FailedAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced to the caller of the request router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The envelope failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] EnvelopeError),
    /// No committee could be formed.
    #[error("no workers available")]
    NoWorkers,
    /// Aggregation could not produce a result.
    #[error("consensus failed: {0}")]
    Consensus(#[from] ConsensusError),
    /// A forward request exhausted its attempts.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
