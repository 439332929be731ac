//! End-to-end request orchestration.

use crate::{
    committee::CommitteeSelector, config::SchedulerConfig, dispatch::Dispatcher,
    error::RouterError,
};
use consensus::{ConsensusConfig, aggregate};
use pcore::{Detection, Forwarded, RequestEnvelope, Transport};
use pool::WorkerRegistry;
use std::time::Instant;

/// Validates, selects, dispatches and aggregates one request at a time.
///
/// Cheap to share behind an `Arc`; every collaborator holds a clone of the
/// same [`WorkerRegistry`].
#[derive(Debug)]
pub struct RequestRouter<T: Transport> {
    selector: CommitteeSelector,
    dispatcher: Dispatcher<T>,
    consensus: ConsensusConfig,
}

impl<T: Transport> RequestRouter<T> {
    /// Wire a router over `registry` with the configured sizes and policies.
    pub fn new(registry: WorkerRegistry, transport: T, config: &SchedulerConfig) -> Self {
        Self {
            selector: CommitteeSelector::new(registry.clone(), config.committee),
            dispatcher: Dispatcher::new(registry, transport, config.dispatch.clone()),
            consensus: config.consensus,
        }
    }

    /// The shared worker registry.
    pub fn registry(&self) -> &WorkerRegistry {
        self.dispatcher.registry()
    }

    /// Serve `envelope` by committee vote.
    ///
    /// Member failures are absorbed as sentinel answers. Only an invalid
    /// envelope or a failed aggregation reaches the caller as an error.
    pub async fn route(&self, envelope: &RequestEnvelope) -> Result<Detection, RouterError> {
        let started = Instant::now();
        envelope.validate()?;

        let committee = self.selector.select(envelope.kind, envelope.priority);
        if committee.is_empty() {
            return Err(RouterError::NoWorkers);
        }

        let request = envelope.to_infer_request();
        tracing::debug!(
            job = %request.job_id,
            kind = %envelope.kind,
            members = committee.len(),
            priority = envelope.priority,
            "dispatching to committee"
        );
        let answers = self
            .dispatcher
            .dispatch_committee(&committee, &request)
            .await;
        let result = aggregate(&answers, &committee, envelope.priority, &self.consensus)?;

        let label = result.label();
        let latency_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            job = %request.job_id,
            probability = result.consensus_probability,
            confidence = result.confidence,
            outliers = result.outlier_count,
            %label,
            latency_ms,
            "request served"
        );
        Ok(Detection {
            result,
            label,
            latency_ms,
        })
    }

    /// Serve `envelope` through a single rotated worker with retries.
    pub async fn forward(&self, envelope: &RequestEnvelope) -> Result<Forwarded, RouterError> {
        envelope.validate()?;
        let request = envelope.to_infer_request();
        let forwarded = self.dispatcher.forward(&request).await?;
        tracing::debug!(
            job = %request.job_id,
            worker = %forwarded.worker,
            attempts = forwarded.attempts,
            "request forwarded"
        );
        Ok(forwarded)
    }
}
