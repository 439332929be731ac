//! Committee sizing and random member selection.

use crate::config::CommitteeConfig;
use compact_str::CompactString;
use pcore::RequestKind;
use pool::WorkerRegistry;
use rand::{Rng, seq::IndexedRandom};

/// Number of members for one request.
///
/// Priority requests get every worker. Others get the base size for their
/// kind, capped by the worker count.
pub fn committee_size(base: usize, total: usize, priority: bool) -> usize {
    if priority { total } else { base.min(total) }
}

/// Picks the committee for each request from the healthy snapshot.
#[derive(Debug, Clone)]
pub struct CommitteeSelector {
    registry: WorkerRegistry,
    sizes: CommitteeConfig,
}

impl CommitteeSelector {
    pub fn new(registry: WorkerRegistry, sizes: CommitteeConfig) -> Self {
        Self { registry, sizes }
    }

    /// Target committee size for `kind`, before health filtering.
    pub fn size_for(&self, kind: RequestKind, priority: bool) -> usize {
        committee_size(self.sizes.base_size(kind), self.registry.len(), priority)
    }

    /// Draw a committee using the thread-local RNG.
    pub fn select(&self, kind: RequestKind, priority: bool) -> Vec<CompactString> {
        self.select_with(kind, priority, &mut rand::rng())
    }

    /// Draw up to `size_for(kind, priority)` distinct workers uniformly at
    /// random from the healthy snapshot. Fewer healthy workers than that
    /// means all of them serve.
    pub fn select_with<R: Rng + ?Sized>(
        &self,
        kind: RequestKind,
        priority: bool,
        rng: &mut R,
    ) -> Vec<CompactString> {
        let k = self.size_for(kind, priority);
        let candidates = self.registry.snapshot_healthy();
        candidates
            .choose_multiple(rng, k)
            .map(|w| w.addr.clone())
            .collect()
    }
}
