//! Consensus thresholds.

use crate::ConsensusError;
use serde::{Deserialize, Serialize};

/// Outlier rejection and trimming parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Answers whose z-score exceeds this are outliers.
    pub z_threshold: f64,
    /// Fraction dropped from each end before averaging inliers.
    pub trim_ratio: f64,
    /// Added to the standard deviation to avoid division by zero.
    pub epsilon: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            trim_ratio: 0.2,
            epsilon: 1e-9,
        }
    }
}

impl ConsensusConfig {
    /// Reject thresholds that make aggregation meaningless.
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if !(self.z_threshold.is_finite() && self.z_threshold > 0.0) {
            return Err(ConsensusError::InvalidConfig("z_threshold must be positive"));
        }
        if !(0.0..0.5).contains(&self.trim_ratio) {
            return Err(ConsensusError::InvalidConfig("trim_ratio must be in [0, 0.5)"));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConsensusError::InvalidConfig("epsilon must be positive"));
        }
        Ok(())
    }
}
