//! Worker dispatch in two modes.
//!
//! Committee mode sends one request to every committee member at once. A
//! member gets exactly one call; if it fails, it contributes a sentinel
//! answer so the vote keeps its size. Forward mode targets one worker at a
//! time, chosen by rotation, and retries on different workers with linear
//! backoff until the attempt budget runs out.
//!
//! Both modes report every outcome to the shared [`WorkerRegistry`].

use crate::config::DispatchConfig;
use pcore::{InferReply, InferRequest, Transport, TransportError};
use pool::WorkerRegistry;
use std::{
    sync::{Arc, atomic::AtomicUsize},
    time::Instant,
};

pub use forward::backoff;

mod committee;
mod forward;

/// Sends inference requests to workers and records their health.
#[derive(Debug, Clone)]
pub struct Dispatcher<T: Transport> {
    registry: WorkerRegistry,
    transport: T,
    config: DispatchConfig,
    cursor: Arc<AtomicUsize>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(registry: WorkerRegistry, transport: T, config: DispatchConfig) -> Self {
        Self {
            registry,
            transport,
            config,
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The registry this dispatcher reports to.
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Dispatch settings.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// One bounded inference call. Returns the reply and the measured round
    /// trip in milliseconds. Does not touch the registry.
    async fn call(
        &self,
        addr: &str,
        request: &InferRequest,
    ) -> Result<(InferReply, u64), TransportError> {
        let timeout = self.config.timeout();
        let started = Instant::now();
        let reply = match tokio::time::timeout(
            timeout,
            self.transport.infer(addr, request, timeout),
        )
        .await
        {
            Ok(outcome) => outcome?,
            Err(_) => return Err(TransportError::Timeout(timeout)),
        };
        Ok((reply, started.elapsed().as_millis() as u64))
    }
}
