//! Scriptable in-process transport for testing.
//!
//! Each worker address is mapped to a [`Behavior`] for inference and one
//! for liveness. Addresses with no script fail with a connection error.
//! Calls are recorded in order so tests can assert which workers were hit.

use crate::{InferReply, InferRequest, Transport, TransportError};
use compact_str::CompactString;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};

/// How a scripted worker responds to a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    /// Answer with this probability (liveness: succeed).
    Answer(f64),
    /// Answer with this probability and reported latency.
    AnswerWithLatency(f64, u64),
    /// Answer after sleeping for the given number of milliseconds.
    Delayed(u64, f64),
    /// Fail with a connection error.
    Fail,
    /// Fail with a non-success status.
    Status(u16),
    /// Return a reply whose probability is out of range.
    Malformed,
    /// Never complete. The caller's timer must cut the call.
    Hang,
}

#[derive(Default)]
struct MockState {
    infer: HashMap<CompactString, Behavior>,
    health: HashMap<CompactString, Behavior>,
    infer_calls: Vec<CompactString>,
    health_calls: Vec<CompactString>,
}

/// In-process transport driven by per-address scripts.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a transport with no scripted workers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script both inference and liveness for `addr`.
    pub fn with(self, addr: &str, behavior: Behavior) -> Self {
        self.set(addr, behavior);
        self
    }

    /// Script inference and liveness for `addr`.
    pub fn set(&self, addr: &str, behavior: Behavior) {
        let mut state = self.state.lock();
        state.infer.insert(addr.into(), behavior);
        state.health.insert(addr.into(), behavior);
    }

    /// Script inference only.
    pub fn set_infer(&self, addr: &str, behavior: Behavior) {
        self.state.lock().infer.insert(addr.into(), behavior);
    }

    /// Script liveness only.
    pub fn set_health(&self, addr: &str, behavior: Behavior) {
        self.state.lock().health.insert(addr.into(), behavior);
    }

    /// Addresses that received an inference call, in call order.
    pub fn infer_calls(&self) -> Vec<CompactString> {
        self.state.lock().infer_calls.clone()
    }

    /// Addresses that received a liveness call, in call order.
    pub fn health_calls(&self) -> Vec<CompactString> {
        self.state.lock().health_calls.clone()
    }

    fn record_infer(&self, addr: &str) -> Option<Behavior> {
        let mut state = self.state.lock();
        state.infer_calls.push(addr.into());
        state.infer.get(addr).copied()
    }

    fn record_health(&self, addr: &str) -> Option<Behavior> {
        let mut state = self.state.lock();
        state.health_calls.push(addr.into());
        state.health.get(addr).copied()
    }
}

async fn play(addr: &str, behavior: Option<Behavior>) -> Result<InferReply, TransportError> {
    match behavior {
        Some(Behavior::Answer(p)) => InferReply::new(p).validate(),
        Some(Behavior::AnswerWithLatency(p, latency)) => InferReply {
            latency_ms: Some(latency),
            ..InferReply::new(p)
        }
        .validate(),
        Some(Behavior::Delayed(ms, p)) => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            InferReply::new(p).validate()
        }
        Some(Behavior::Status(status)) => Err(TransportError::Status {
            status,
            body: format!("scripted failure from {addr}"),
        }),
        Some(Behavior::Malformed) => InferReply::new(f64::NAN).validate(),
        Some(Behavior::Hang) => std::future::pending().await,
        Some(Behavior::Fail) | None => Err(TransportError::Connect(format!(
            "connection refused: {addr}"
        ))),
    }
}

impl Transport for MockTransport {
    async fn infer(
        &self,
        addr: &str,
        _request: &InferRequest,
        _timeout: Duration,
    ) -> Result<InferReply, TransportError> {
        let behavior = self.record_infer(addr);
        play(addr, behavior).await
    }

    async fn health(&self, addr: &str, _timeout: Duration) -> Result<(), TransportError> {
        let behavior = self.record_health(addr);
        play(addr, behavior).await.map(|_| ())
    }
}
