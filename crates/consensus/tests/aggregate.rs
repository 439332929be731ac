//! Consensus aggregation tests.

use compact_str::CompactString;
use pcore::WorkerAnswer;
use privx_consensus::{ConsensusConfig, ConsensusError, aggregate, assess};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn committee(n: usize) -> Vec<CompactString> {
    (0..n).map(|i| CompactString::from(format!("http://w{i}"))).collect()
}

fn answers(probs: &[f64]) -> Vec<WorkerAnswer> {
    probs.iter().map(|&p| WorkerAnswer::success(p, 50)).collect()
}

#[test]
fn five_value_scenario_at_default_threshold() {
    // 0.9 sits at z = 1.997: just inside a 2.0 threshold, so it is kept
    // and the trimmed mean drops it along with the lowest value.
    let probs = [0.1, 0.15, 0.12, 0.9, 0.13];
    let a = assess(&probs, &ConsensusConfig::default()).unwrap();
    assert_eq!(a.inlier_count, 5);
    assert_eq!(a.outlier_count, 0);
    assert_eq!(a.consensus_probability, 0.1333);
    assert_eq!(a.confidence, 0.6896);
}

#[test]
fn five_value_scenario_flags_the_outlier_at_tighter_threshold() {
    let probs = [0.1, 0.15, 0.12, 0.9, 0.13];
    let config = ConsensusConfig {
        z_threshold: 1.5,
        ..ConsensusConfig::default()
    };
    let a = assess(&probs, &config).unwrap();
    assert_eq!(a.inlier_count, 4);
    assert_eq!(a.outlier_count, 1);
    // Four inliers, floor(4 * 0.2) = 0 trimmed: mean of the remaining four.
    assert_eq!(a.consensus_probability, 0.125);
    assert_eq!(a.confidence, 0.7856);
}

#[test]
fn single_extreme_outlier_is_excluded() {
    let mut probs = vec![0.1; 9];
    probs.push(0.9);
    let a = assess(&probs, &ConsensusConfig::default()).unwrap();
    assert_eq!(a.outlier_count, 1);
    assert_eq!(a.inlier_count, 9);
    assert_eq!(a.consensus_probability, 0.1);
    assert_eq!(a.confidence, 0.9);
}

#[test]
fn failed_member_rejected_as_outlier() {
    let mut ans = answers(&[0.9, 0.92, 0.88, 0.91, 0.89, 0.9]);
    ans.push(WorkerAnswer::default());
    let result = aggregate(&ans, &committee(7), false, &ConsensusConfig::default()).unwrap();
    assert_eq!(result.inlier_count, 6);
    assert_eq!(result.outlier_count, 1);
    assert_eq!(result.consensus_probability, 0.9);
    assert_eq!(result.confidence, 0.8461);
    assert_eq!(result.committee, committee(7));
    assert!(!result.is_priority);
}

#[test]
fn all_failures_yield_sentinel_with_zero_confidence() {
    let ans = vec![WorkerAnswer::default(); 5];
    let result = aggregate(&ans, &committee(5), true, &ConsensusConfig::default()).unwrap();
    assert_eq!(result.consensus_probability, 0.5);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.inlier_count, 5);
    assert!(result.is_priority);
}

#[test]
fn failed_inliers_lower_confidence() {
    let probs = [0.5, 0.45, 0.55, 0.5, 0.52];
    let mut ans = answers(&probs);
    ans[0] = WorkerAnswer::default();
    let config = ConsensusConfig::default();

    let raw = assess(&probs, &config).unwrap();
    let result = aggregate(&ans, &committee(5), false, &config).unwrap();
    assert_eq!(result.consensus_probability, raw.consensus_probability);
    assert!(result.confidence < raw.confidence);
}

#[test]
fn single_answer_is_always_an_inlier() {
    let result = aggregate(
        &answers(&[0.73]),
        &committee(1),
        false,
        &ConsensusConfig::default(),
    )
    .unwrap();
    assert_eq!(result.inlier_count, 1);
    assert_eq!(result.outlier_count, 0);
    assert_eq!(result.consensus_probability, 0.73);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn empty_committee_is_a_configuration_error() {
    let err = aggregate(&[], &[], false, &ConsensusConfig::default()).unwrap_err();
    assert_eq!(err, ConsensusError::EmptyCommittee);
    assert_eq!(
        assess(&[], &ConsensusConfig::default()).unwrap_err(),
        ConsensusError::EmptyCommittee
    );
}

#[test]
fn mismatched_committee_is_rejected() {
    let err = aggregate(
        &answers(&[0.2, 0.3]),
        &committee(3),
        false,
        &ConsensusConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConsensusError::CommitteeMismatch {
            answers: 2,
            members: 3
        }
    );
}

#[test]
fn out_of_range_probability_is_rejected() {
    let err = assess(&[0.2, 1.2], &ConsensusConfig::default()).unwrap_err();
    assert_eq!(err, ConsensusError::InvalidProbability(1.2));
    assert!(matches!(
        assess(&[f64::NAN], &ConsensusConfig::default()),
        Err(ConsensusError::InvalidProbability(_))
    ));
}

#[test]
fn outputs_stay_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let config = ConsensusConfig::default();
    for _ in 0..2000 {
        let k = rng.random_range(1..=15);
        let probs: Vec<f64> = (0..k)
            .map(|_| match rng.random_range(0..4) {
                0 => 0.0,
                1 => 1.0,
                _ => rng.random::<f64>(),
            })
            .collect();
        let a = assess(&probs, &config).unwrap();
        assert!((0.0..=1.0).contains(&a.consensus_probability), "{probs:?}");
        assert!((0.0..=1.0).contains(&a.confidence), "{probs:?}");
        assert_eq!(a.inlier_count + a.outlier_count, k);
    }
}

#[test]
fn aggregation_is_deterministic() {
    let ans = answers(&[0.31, 0.77, 0.29, 0.05, 0.33, 0.3, 0.98]);
    let members = committee(7);
    let config = ConsensusConfig::default();
    let first = aggregate(&ans, &members, false, &config).unwrap();
    let second = aggregate(&ans, &members, false, &config).unwrap();
    assert_eq!(
        first.consensus_probability.to_bits(),
        second.consensus_probability.to_bits()
    );
    assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    assert_eq!(first, second);
}

#[test]
fn config_defaults_and_validation() {
    let config: ConsensusConfig = toml::from_str("z_threshold = 3.0").unwrap();
    assert_eq!(config.z_threshold, 3.0);
    assert_eq!(config.trim_ratio, 0.2);
    assert!(config.validate().is_ok());

    let bad = ConsensusConfig {
        trim_ratio: 0.5,
        ..ConsensusConfig::default()
    };
    assert!(matches!(bad.validate(), Err(ConsensusError::InvalidConfig(_))));
    let bad = ConsensusConfig {
        z_threshold: 0.0,
        ..ConsensusConfig::default()
    };
    assert!(bad.validate().is_err());
}
