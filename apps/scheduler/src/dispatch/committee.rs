use super::Dispatcher;
use compact_str::CompactString;
use futures_util::future::join_all;
use pcore::{InferRequest, Transport, WorkerAnswer};

impl<T: Transport> Dispatcher<T> {
    /// Call one committee member once.
    ///
    /// A failure of any kind yields the sentinel answer. The worker's own
    /// reported latency wins over the measured round trip.
    pub async fn dispatch_member(&self, addr: &str, request: &InferRequest) -> WorkerAnswer {
        match self.call(addr, request).await {
            Ok((reply, elapsed_ms)) => {
                self.registry.report_success(addr);
                WorkerAnswer::success(reply.probability, reply.latency_ms.unwrap_or(elapsed_ms))
            }
            Err(e) => {
                tracing::warn!(
                    worker = %addr,
                    job = %request.job_id,
                    error = %e,
                    "committee member failed, using sentinel"
                );
                self.registry.report_failure(addr);
                WorkerAnswer::sentinel(self.config.sentinel_latency_ms)
            }
        }
    }

    /// Call every member concurrently. `answers[i]` belongs to
    /// `committee[i]`; total latency is bounded by the slowest member's
    /// timeout.
    pub async fn dispatch_committee(
        &self,
        committee: &[CompactString],
        request: &InferRequest,
    ) -> Vec<WorkerAnswer> {
        join_all(
            committee
                .iter()
                .map(|addr| self.dispatch_member(addr, request)),
        )
        .await
    }
}
