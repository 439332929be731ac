//! Caller-facing results.
//!
//! Field names are identical for image and video requests so consumers
//! never branch on the request kind.

use crate::InferReply;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output of consensus aggregation. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Trimmed mean of the inlier probabilities, rounded to 4 decimals.
    pub consensus_probability: f64,
    /// Agreement and trust score in `[0, 1]`, rounded to 4 decimals.
    pub confidence: f64,
    /// Answers kept by outlier rejection.
    pub inlier_count: usize,
    /// Answers rejected by outlier rejection.
    pub outlier_count: usize,
    /// Committee member addresses, in dispatch order.
    pub committee: Vec<CompactString>,
    /// Whether the request was served with a priority committee.
    pub is_priority: bool,
}

impl ConsensusResult {
    /// Caller-facing label for the consensus probability.
    pub fn label(&self) -> Label {
        Label::classify(self.consensus_probability)
    }
}

/// Caller-facing classification of a consensus probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Probability at or above [`Label::POSITIVE_THRESHOLD`].
    #[serde(rename = "likely positive")]
    LikelyPositive,
    /// Probability at or below [`Label::NEGATIVE_THRESHOLD`].
    #[serde(rename = "likely negative")]
    LikelyNegative,
    /// Anything in between.
    #[serde(rename = "uncertain")]
    Uncertain,
}

impl Label {
    /// Lower bound of the positive band.
    pub const POSITIVE_THRESHOLD: f64 = 0.8;
    /// Upper bound of the negative band.
    pub const NEGATIVE_THRESHOLD: f64 = 0.2;

    /// Classify a probability.
    pub fn classify(probability: f64) -> Self {
        if probability >= Self::POSITIVE_THRESHOLD {
            Self::LikelyPositive
        } else if probability <= Self::NEGATIVE_THRESHOLD {
            Self::LikelyNegative
        } else {
            Self::Uncertain
        }
    }

    /// Label text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LikelyPositive => "likely positive",
            Self::LikelyNegative => "likely negative",
            Self::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a committee request as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Consensus over the committee.
    #[serde(flatten)]
    pub result: ConsensusResult,
    /// Label derived from the consensus probability.
    pub label: Label,
    /// End-to-end latency observed by the router.
    pub latency_ms: u64,
}

/// Result of a single-target forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forwarded {
    /// Worker that served the request.
    pub worker: CompactString,
    /// Number of targets tried, including the successful one.
    pub attempts: usize,
    /// The worker's reply.
    #[serde(flatten)]
    pub reply: InferReply,
}
