//! Worker replies and the per-member answers fed to consensus.

use crate::TransportError;
use serde::{Deserialize, Serialize};

/// Probability contributed by a member that failed to answer.
pub const SENTINEL_PROBABILITY: f64 = 0.5;

/// Latency recorded for a member that failed to answer.
pub const SENTINEL_LATENCY_MS: u64 = 9999;

/// Body returned by a worker's inference endpoint.
///
/// Only `probability` is required. Workers predating the current field
/// names report `prob` and `inference_ms`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferReply {
    /// Probability that the content is positive.
    #[serde(alias = "prob")]
    pub probability: f64,
    /// Worker-reported latency.
    #[serde(
        default,
        rename = "latencyMs",
        alias = "latency_ms",
        alias = "inference_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub latency_ms: Option<u64>,
    /// Worker-reported uncertainty, carried but not used by consensus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    /// Model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Worker node identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl InferReply {
    /// Reply with only a probability.
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            latency_ms: None,
            uncertainty: None,
            model_id: None,
            node_id: None,
        }
    }

    /// Reject probabilities that are not finite or fall outside `[0, 1]`.
    pub fn validate(self) -> Result<Self, TransportError> {
        if self.probability.is_finite() && (0.0..=1.0).contains(&self.probability) {
            Ok(self)
        } else {
            Err(TransportError::Malformed(format!(
                "probability {} outside [0, 1]",
                self.probability
            )))
        }
    }
}

/// Outcome of dispatching one request to one committee member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerAnswer {
    /// Probability in `[0, 1]`.
    pub probability: f64,
    /// Observed or reported latency.
    pub latency_ms: u64,
    /// Whether the member actually answered.
    pub succeeded: bool,
}

impl WorkerAnswer {
    /// A real answer from a worker.
    pub fn success(probability: f64, latency_ms: u64) -> Self {
        Self {
            probability,
            latency_ms,
            succeeded: true,
        }
    }

    /// Maximal-uncertainty placeholder for a member that failed.
    pub fn sentinel(latency_ms: u64) -> Self {
        Self {
            probability: SENTINEL_PROBABILITY,
            latency_ms,
            succeeded: false,
        }
    }
}

impl Default for WorkerAnswer {
    fn default() -> Self {
        Self::sentinel(SENTINEL_LATENCY_MS)
    }
}
