//! Consensus over independent worker answers.
//!
//! Answers are screened with z-score outlier rejection, the survivors are
//! combined with a trimmed mean, and confidence falls both when inliers
//! disagree and when few answers were trusted. Everything here is a pure
//! function of its inputs: the same answers always yield bit-identical
//! output.

pub use aggregate::{Assessment, aggregate, assess};
pub use config::ConsensusConfig;
pub use stats::{mean, round4, std_dev, trimmed_mean};

mod aggregate;
mod config;
mod stats;

/// Errors raised when no consensus can be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsensusError {
    /// Aggregation was invoked with no answers.
    #[error("cannot aggregate an empty committee")]
    EmptyCommittee,
    /// An answer carried a probability outside `[0, 1]`.
    #[error("probability {0} outside [0, 1]")]
    InvalidProbability(f64),
    /// Answers and committee members do not line up.
    #[error("{answers} answers for {members} committee members")]
    CommitteeMismatch {
        /// Number of answers.
        answers: usize,
        /// Number of committee members.
        members: usize,
    },
    /// Thresholds are unusable.
    #[error("invalid consensus config: {0}")]
    InvalidConfig(&'static str),
}
