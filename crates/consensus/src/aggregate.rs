//! Z-score screening and trimmed-mean aggregation.

use crate::{ConsensusConfig, ConsensusError, mean, round4, std_dev, trimmed_mean};
use compact_str::CompactString;
use pcore::{ConsensusResult, WorkerAnswer};

/// Aggregation numbers without committee metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Trimmed mean of the inliers, rounded to 4 decimals.
    pub consensus_probability: f64,
    /// Confidence in `[0, 1]`, rounded to 4 decimals.
    pub confidence: f64,
    /// Values within the z threshold.
    pub inlier_count: usize,
    /// Values beyond the z threshold.
    pub outlier_count: usize,
}

/// Assess a bare list of probabilities, every value trusted.
pub fn assess(probs: &[f64], config: &ConsensusConfig) -> Result<Assessment, ConsensusError> {
    let trusted = vec![true; probs.len()];
    evaluate(probs, &trusted, config)
}

/// Combine committee answers into a [`ConsensusResult`].
///
/// `answers[i]` must be the answer of `committee[i]`. Sentinel answers from
/// failed members take part in screening and averaging like any other
/// value, but are not counted as trusted when computing confidence.
/// For the plain `|inliers| / k` confidence over raw probabilities, use
/// [`assess`].
pub fn aggregate(
    answers: &[WorkerAnswer],
    committee: &[CompactString],
    is_priority: bool,
    config: &ConsensusConfig,
) -> Result<ConsensusResult, ConsensusError> {
    if answers.len() != committee.len() {
        return Err(ConsensusError::CommitteeMismatch {
            answers: answers.len(),
            members: committee.len(),
        });
    }

    let probs: Vec<f64> = answers.iter().map(|a| a.probability).collect();
    let trusted: Vec<bool> = answers.iter().map(|a| a.succeeded).collect();
    let assessment = evaluate(&probs, &trusted, config)?;

    Ok(ConsensusResult {
        consensus_probability: assessment.consensus_probability,
        confidence: assessment.confidence,
        inlier_count: assessment.inlier_count,
        outlier_count: assessment.outlier_count,
        committee: committee.to_vec(),
        is_priority,
    })
}

fn evaluate(
    probs: &[f64],
    trusted: &[bool],
    config: &ConsensusConfig,
) -> Result<Assessment, ConsensusError> {
    let Some(mu) = mean(probs) else {
        return Err(ConsensusError::EmptyCommittee);
    };
    if let Some(&bad) = probs
        .iter()
        .find(|p| !(p.is_finite() && (0.0..=1.0).contains(*p)))
    {
        return Err(ConsensusError::InvalidProbability(bad));
    }

    let sigma = std_dev(probs) + config.epsilon;
    let mut inliers = Vec::with_capacity(probs.len());
    let mut trusted_inliers = 0usize;
    for (&p, &ok) in probs.iter().zip(trusted) {
        if (p - mu).abs() / sigma <= config.z_threshold {
            inliers.push(p);
            trusted_inliers += usize::from(ok);
        }
    }
    let outlier_count = probs.len() - inliers.len();

    let basis = if inliers.is_empty() { probs } else { &inliers[..] };
    let consensus = trimmed_mean(basis, config.trim_ratio).clamp(0.0, 1.0);
    let spread = std_dev(basis);
    let share = trusted_inliers as f64 / probs.len().max(1) as f64;
    let confidence = (1.0 - spread).clamp(0.0, 1.0) * share;

    Ok(Assessment {
        consensus_probability: round4(consensus),
        confidence: round4(confidence),
        inlier_count: inliers.len(),
        outlier_count,
    })
}
