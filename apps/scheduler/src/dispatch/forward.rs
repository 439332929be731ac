use super::Dispatcher;
use crate::error::{DispatchError, FailedAttempt};
use compact_str::CompactString;
use pcore::{Forwarded, InferRequest, Transport};
use pool::Worker;
use rand::Rng;
use std::{sync::atomic::Ordering, time::Duration};

/// Delay after the `attempt`-th failure (1-based): `attempt * base_ms` plus
/// uniform jitter in `0..=jitter_ms`.
pub fn backoff<R: Rng + ?Sized>(
    attempt: usize,
    base_ms: u64,
    jitter_ms: u64,
    rng: &mut R,
) -> Duration {
    let jitter = if jitter_ms == 0 {
        0
    } else {
        rng.random_range(0..=jitter_ms)
    };
    Duration::from_millis(base_ms.saturating_mul(attempt as u64) + jitter)
}

impl<T: Transport> Dispatcher<T> {
    /// Send `request` to a single worker chosen by rotation.
    ///
    /// Each attempt goes to a worker not yet tried by this request, healthy
    /// ones first, read from the registry as it stands after the previous
    /// attempt. A worker is retried only once every worker in the registry
    /// has been tried. Fails after `forward_attempts` failed calls; the
    /// error lists every target tried.
    pub async fn forward(&self, request: &InferRequest) -> Result<Forwarded, DispatchError> {
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let budget = self.config.forward_attempts;
        let mut tried: Vec<CompactString> = Vec::with_capacity(budget);
        let mut failures = Vec::new();
        for attempt in 0..budget {
            let Some(worker) = self.next_target(start, &tried) else {
                return Err(DispatchError::NoWorkers);
            };
            match self.call(&worker, request).await {
                Ok((reply, _)) => {
                    self.registry.report_success(&worker);
                    return Ok(Forwarded {
                        worker,
                        attempts: attempt + 1,
                        reply,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        worker = %worker,
                        job = %request.job_id,
                        attempt = attempt + 1,
                        error = %error,
                        "forward attempt failed"
                    );
                    self.registry.report_failure(&worker);
                    failures.push(FailedAttempt {
                        worker: worker.clone(),
                        error,
                    });
                    tried.push(worker);
                }
            }

            if attempt + 1 < budget {
                let delay = backoff(
                    attempt + 1,
                    self.config.backoff_base_ms,
                    self.config.backoff_jitter_ms,
                    &mut rand::rng(),
                );
                tracing::debug!(
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(DispatchError::Exhausted { attempts: failures })
    }

    /// Next forward target, walking the registry from the rotation offset
    /// `start`: the first untried healthy worker, else the first untried
    /// worker, else wrap around the full set.
    fn next_target(&self, start: usize, tried: &[CompactString]) -> Option<CompactString> {
        let workers = self.registry.snapshot();
        let n = workers.len();
        if n == 0 {
            return None;
        }
        let rotated = || (0..n).map(|i| &workers[(start + i) % n]);
        let untried = |w: &&Worker| !tried.contains(&w.addr);
        let target = rotated()
            .filter(untried)
            .find(|w| w.healthy)
            .or_else(|| rotated().find(untried))
            .unwrap_or(&workers[(start + tried.len()) % n]);
        Some(target.addr.clone())
    }
}
