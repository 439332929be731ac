//! Committee selection tests.

use compact_str::CompactString;
use pcore::RequestKind;
use pool::WorkerRegistry;
use privx_scheduler::{CommitteeSelector, committee_size, config::CommitteeConfig};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashSet;

fn registry(n: usize) -> WorkerRegistry {
    WorkerRegistry::new((0..n).map(|i| format!("http://w{i}:6061"))).unwrap()
}

fn selector(reg: &WorkerRegistry) -> CommitteeSelector {
    CommitteeSelector::new(reg.clone(), CommitteeConfig::default())
}

fn distinct(committee: &[CompactString]) -> usize {
    committee.iter().collect::<HashSet<_>>().len()
}

#[test]
fn size_rule() {
    assert_eq!(committee_size(5, 20, false), 5);
    assert_eq!(committee_size(5, 3, false), 3);
    assert_eq!(committee_size(5, 10, true), 10);
    assert_eq!(committee_size(7, 2, true), 2);
}

#[test]
fn priority_uses_every_worker() {
    let reg = registry(10);
    let committee = selector(&reg).select(RequestKind::Image, true);
    assert_eq!(committee.len(), 10);
    assert_eq!(distinct(&committee), 10);
}

#[test]
fn image_committee_is_five_distinct_workers() {
    let reg = registry(20);
    let committee = selector(&reg).select(RequestKind::Image, false);
    assert_eq!(committee.len(), 5);
    assert_eq!(distinct(&committee), 5);
    let known: HashSet<_> = reg.addrs().into_iter().collect();
    assert!(committee.iter().all(|a| known.contains(a)));
}

#[test]
fn video_committee_uses_its_own_size() {
    let reg = registry(20);
    assert_eq!(selector(&reg).select(RequestKind::Video, false).len(), 7);
}

#[test]
fn small_pool_caps_committee() {
    let reg = registry(3);
    assert_eq!(selector(&reg).select(RequestKind::Video, false).len(), 3);
}

#[test]
fn unhealthy_workers_are_not_selected() {
    let reg = registry(6);
    for addr in &reg.addrs()[..4] {
        reg.report_failure(addr);
    }
    let committee = selector(&reg).select(RequestKind::Image, false);
    // Five wanted, only two healthy: both serve.
    assert_eq!(committee.len(), 2);
    assert!(committee.iter().all(|a| reg.get(a).unwrap().healthy));
}

#[test]
fn all_unhealthy_falls_back_to_full_set() {
    let reg = registry(3);
    for addr in reg.addrs() {
        reg.report_failure(&addr);
    }
    assert_eq!(selector(&reg).select(RequestKind::Image, false).len(), 3);
}

#[test]
fn seeded_selection_is_reproducible() {
    let reg = registry(20);
    let sel = selector(&reg);
    let a = sel.select_with(RequestKind::Image, false, &mut StdRng::seed_from_u64(7));
    let b = sel.select_with(RequestKind::Image, false, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
}

#[test]
fn selection_covers_the_pool() {
    let reg = registry(20);
    let sel = selector(&reg);
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = HashSet::new();
    for _ in 0..200 {
        seen.extend(sel.select_with(RequestKind::Image, false, &mut rng));
    }
    assert_eq!(seen.len(), 20);
}

#[test]
fn custom_sizes() {
    let reg = registry(20);
    let sel = CommitteeSelector::new(reg, CommitteeConfig { image: 2, video: 11 });
    assert_eq!(sel.size_for(RequestKind::Image, false), 2);
    assert_eq!(sel.size_for(RequestKind::Video, false), 11);
    assert_eq!(sel.size_for(RequestKind::Image, true), 20);
}
