//! `WorkerRegistry`: concurrent-safe worker health table.

use compact_str::CompactString;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Instant};

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No worker addresses were configured.
    #[error("no workers configured")]
    Empty,
    /// The same address was configured twice.
    #[error("worker '{0}' configured more than once")]
    Duplicate(CompactString),
}

/// A worker and its live health state.
///
/// `consecutive_failures` is zero whenever `healthy` has just become true.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    /// Opaque network address, e.g. `http://10.0.0.4:6061`.
    pub addr: CompactString,
    /// Whether the worker is currently eligible for selection.
    pub healthy: bool,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// When the worker last answered a probe or dispatch.
    pub last_success: Option<Instant>,
}

impl Worker {
    fn new(addr: CompactString) -> Self {
        Self {
            addr,
            healthy: true,
            consecutive_failures: 0,
            last_success: None,
        }
    }
}

/// Selection policy: prefer healthy workers, degrade to the full set.
///
/// Returns the healthy subset in registry order, or every worker when none
/// is healthy. Attempting unhealthy workers beats refusing service.
pub fn prefer_healthy(workers: &[Worker]) -> Vec<Worker> {
    let healthy: Vec<Worker> = workers.iter().filter(|w| w.healthy).cloned().collect();
    if healthy.is_empty() {
        workers.to_vec()
    } else {
        healthy
    }
}

/// Fixed set of workers with per-worker health records.
///
/// All mutation happens under one short mutex; no lock is ever held across
/// a network call. The worker set never changes after construction, so the
/// address index lives outside the lock.
#[derive(Clone)]
pub struct WorkerRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    index: HashMap<CompactString, usize>,
    workers: Mutex<Vec<Worker>>,
}

impl WorkerRegistry {
    /// Build a registry from configured addresses.
    ///
    /// Addresses are trimmed of whitespace and trailing slashes; blank
    /// entries are skipped. Fails if nothing remains or an address repeats.
    pub fn new<I, S>(addrs: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = HashMap::new();
        let mut workers = Vec::new();
        for addr in addrs {
            let addr = addr.as_ref().trim().trim_end_matches('/');
            if addr.is_empty() {
                continue;
            }
            let addr = CompactString::from(addr);
            if index.insert(addr.clone(), workers.len()).is_some() {
                return Err(PoolError::Duplicate(addr));
            }
            workers.push(Worker::new(addr));
        }

        if workers.is_empty() {
            return Err(PoolError::Empty);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                index,
                workers: Mutex::new(workers),
            }),
        })
    }

    /// Total number of workers, healthy or not.
    pub fn len(&self) -> usize {
        self.inner.index.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.inner.index.is_empty()
    }

    /// Worker addresses in configuration order.
    pub fn addrs(&self) -> Vec<CompactString> {
        self.inner
            .workers
            .lock()
            .iter()
            .map(|w| w.addr.clone())
            .collect()
    }

    /// Copy of every worker record.
    pub fn snapshot(&self) -> Vec<Worker> {
        self.inner.workers.lock().clone()
    }

    /// Healthy workers, or all workers if none is healthy.
    pub fn snapshot_healthy(&self) -> Vec<Worker> {
        prefer_healthy(&self.inner.workers.lock())
    }

    /// Number of workers currently marked healthy.
    pub fn healthy_count(&self) -> usize {
        self.inner.workers.lock().iter().filter(|w| w.healthy).count()
    }

    /// Copy of one worker record.
    pub fn get(&self, addr: &str) -> Option<Worker> {
        let idx = *self.inner.index.get(addr)?;
        Some(self.inner.workers.lock()[idx].clone())
    }

    /// Record a successful probe or dispatch.
    ///
    /// Returns false if `addr` is not part of this registry.
    pub fn report_success(&self, addr: &str) -> bool {
        let Some(&idx) = self.inner.index.get(addr) else {
            return false;
        };
        let recovered = {
            let mut workers = self.inner.workers.lock();
            let worker = &mut workers[idx];
            let recovered = !worker.healthy;
            worker.healthy = true;
            worker.consecutive_failures = 0;
            worker.last_success = Some(Instant::now());
            recovered
        };
        if recovered {
            tracing::info!(worker = %addr, "worker recovered");
        }
        true
    }

    /// Record a failed probe or dispatch. A single failure demotes.
    ///
    /// Returns false if `addr` is not part of this registry.
    pub fn report_failure(&self, addr: &str) -> bool {
        let Some(&idx) = self.inner.index.get(addr) else {
            return false;
        };
        let (demoted, failures) = {
            let mut workers = self.inner.workers.lock();
            let worker = &mut workers[idx];
            let demoted = worker.healthy;
            worker.healthy = false;
            worker.consecutive_failures = worker.consecutive_failures.saturating_add(1);
            (demoted, worker.consecutive_failures)
        };
        if demoted {
            tracing::warn!(worker = %addr, "worker marked unhealthy");
        } else {
            tracing::debug!(worker = %addr, failures, "worker still unhealthy");
        }
        true
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("workers", &self.len())
            .field("healthy", &self.healthy_count())
            .finish()
    }
}
