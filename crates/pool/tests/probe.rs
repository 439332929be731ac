//! HealthProbe tests.

use pcore::{Behavior, MockTransport};
use privx_pool::{HealthProbe, ProbeReport, WorkerRegistry};
use std::time::{Duration, Instant};

const INTERVAL: Duration = Duration::from_secs(10);
const TIMEOUT: Duration = Duration::from_millis(100);

fn probe(reg: &WorkerRegistry, transport: &MockTransport) -> HealthProbe<MockTransport> {
    HealthProbe::new(reg.clone(), transport.clone(), INTERVAL, TIMEOUT)
}

#[tokio::test]
async fn failed_probe_demotes_and_success_restores() {
    let reg = WorkerRegistry::new(["http://a", "http://b"]).unwrap();
    let transport = MockTransport::new()
        .with("http://a", Behavior::Answer(1.0))
        .with("http://b", Behavior::Fail);
    let probe = probe(&reg, &transport);

    let report = probe.run_cycle().await;
    assert_eq!(report, ProbeReport { healthy: 1, unhealthy: 1 });
    let b = reg.get("http://b").unwrap();
    assert!(!b.healthy);
    assert_eq!(b.consecutive_failures, 1);

    transport.set("http://b", Behavior::Answer(1.0));
    probe.run_cycle().await;
    let b = reg.get("http://b").unwrap();
    assert!(b.healthy);
    assert_eq!(b.consecutive_failures, 0);
    assert!(b.last_success.is_some());
}

#[tokio::test]
async fn non_success_status_counts_as_failure() {
    let reg = WorkerRegistry::new(["http://a"]).unwrap();
    let transport = MockTransport::new().with("http://a", Behavior::Status(503));
    probe(&reg, &transport).run_cycle().await;
    assert!(!reg.get("http://a").unwrap().healthy);
}

#[tokio::test]
async fn wedged_worker_is_cut_by_timeout() {
    let reg = WorkerRegistry::new(["http://a", "http://b", "http://c"]).unwrap();
    let transport = MockTransport::new()
        .with("http://a", Behavior::Hang)
        .with("http://b", Behavior::Answer(1.0))
        .with("http://c", Behavior::Hang);

    let started = Instant::now();
    let report = probe(&reg, &transport).run_cycle().await;
    let elapsed = started.elapsed();

    assert_eq!(report, ProbeReport { healthy: 1, unhealthy: 2 });
    assert!(!reg.get("http://a").unwrap().healthy);
    assert!(reg.get("http://b").unwrap().healthy);
    assert!(!reg.get("http://c").unwrap().healthy);
    // Checks run side by side: two hung workers cost one timeout, not two.
    assert!(elapsed < TIMEOUT * 2, "cycle took {elapsed:?}");
}

#[tokio::test]
async fn every_worker_is_checked_once_per_cycle() {
    let reg = WorkerRegistry::new(["http://a", "http://b", "http://c"]).unwrap();
    let transport = MockTransport::new();
    probe(&reg, &transport).run_cycle().await;

    let mut calls = transport.health_calls();
    calls.sort();
    assert_eq!(calls, vec!["http://a", "http://b", "http://c"]);
}

#[tokio::test(start_paused = true)]
async fn loop_probes_at_fixed_interval() {
    let reg = WorkerRegistry::new(["http://a", "http://b"]).unwrap();
    let transport = MockTransport::new()
        .with("http://a", Behavior::Answer(1.0))
        .with("http://b", Behavior::Answer(1.0));
    let handle = probe(&reg, &transport).spawn();

    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.abort();

    let calls = transport.health_calls().len();
    assert!(calls >= 6, "expected three cycles, saw {calls} checks");
    assert_eq!(calls % 2, 0);
}

#[tokio::test(start_paused = true)]
async fn loop_recovers_a_worker_without_request_traffic() {
    let reg = WorkerRegistry::new(["http://a"]).unwrap();
    reg.report_failure("http://a");
    let transport = MockTransport::new().with("http://a", Behavior::Answer(1.0));
    let handle = probe(&reg, &transport).spawn();

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.abort();
    assert!(reg.get("http://a").unwrap().healthy);
}
