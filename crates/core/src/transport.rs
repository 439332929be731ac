//! Transport abstraction for talking to workers.

use crate::{InferReply, InferRequest};
use std::{future::Future, time::Duration};

/// Failure of a single call to a single worker.
///
/// Every variant counts as a worker failure; malformed replies are handled
/// exactly like transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The call did not complete within its timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Connection could not be established or broke mid-call.
    #[error("connection error: {0}")]
    Connect(String),
    /// The worker answered with a non-success status.
    #[error("worker returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The worker answered with a body that is not a valid reply.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A trait for reaching workers.
///
/// Implementations must honor `timeout`; callers additionally bound every
/// call with their own timer.
pub trait Transport: Clone + Send + Sync + 'static {
    /// Ask the worker at `addr` to assess `request`.
    fn infer(
        &self,
        addr: &str,
        request: &InferRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<InferReply, TransportError>> + Send;

    /// Liveness check. The body is ignored beyond status.
    fn health(
        &self,
        addr: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
