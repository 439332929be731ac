//! Background liveness probing.
//!
//! Each cycle fans out one liveness check per worker, concurrently, each
//! bounded by its own timeout. A wedged worker costs at most one timeout and
//! never delays its siblings or the next cycle.

use crate::WorkerRegistry;
use futures_util::future::join_all;
use pcore::{Transport, TransportError};
use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Outcome counts of one probe cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Workers that answered.
    pub healthy: usize,
    /// Workers that failed or timed out.
    pub unhealthy: usize,
}

/// Periodic health checker feeding a [`WorkerRegistry`].
pub struct HealthProbe<T: Transport> {
    registry: WorkerRegistry,
    transport: T,
    interval: Duration,
    timeout: Duration,
}

impl<T: Transport> HealthProbe<T> {
    /// Create a probe over `registry`.
    pub fn new(registry: WorkerRegistry, transport: T, interval: Duration, timeout: Duration) -> Self {
        Self {
            registry,
            transport,
            interval,
            timeout,
        }
    }

    /// Probe interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check every worker once and update the registry.
    pub async fn run_cycle(&self) -> ProbeReport {
        let addrs = self.registry.addrs();
        let checks = addrs.iter().map(|addr| async move {
            let outcome =
                match tokio::time::timeout(self.timeout, self.transport.health(addr, self.timeout))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(TransportError::Timeout(self.timeout)),
                };
            match outcome {
                Ok(()) => {
                    self.registry.report_success(addr);
                    true
                }
                Err(e) => {
                    tracing::debug!(worker = %addr, error = %e, "health check failed");
                    self.registry.report_failure(addr);
                    false
                }
            }
        });

        let mut report = ProbeReport::default();
        for ok in join_all(checks).await {
            if ok {
                report.healthy += 1;
            } else {
                report.unhealthy += 1;
            }
        }
        report
    }

    /// Probe forever at the configured interval. The first cycle runs
    /// immediately.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = self.run_cycle().await;
            tracing::debug!(
                healthy = report.healthy,
                unhealthy = report.unhealthy,
                "health probe cycle complete"
            );
        }
    }

    /// Run the probe loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tracing::info!(
            workers = self.registry.len(),
            interval_ms = self.interval.as_millis() as u64,
            "starting health probe"
        );
        tokio::spawn(self.run())
    }
}
