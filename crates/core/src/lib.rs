//! Core types for the privx scheduler.
//!
//! This crate provides the types shared by the worker pool, the consensus
//! aggregator and the scheduler: `RequestEnvelope`, `InferRequest`,
//! `InferReply`, `WorkerAnswer`, `ConsensusResult`, `Label`, and the
//! `Transport` trait that every worker call goes through. Also provides
//! `HttpTransport` for the JSON-over-HTTP worker contract and, behind the
//! `test-utils` feature, a scriptable `MockTransport`.

pub use answer::{InferReply, SENTINEL_LATENCY_MS, SENTINEL_PROBABILITY, WorkerAnswer};
#[cfg(feature = "http")]
pub use http::HttpTransport;
#[cfg(feature = "test-utils")]
pub use mock::{Behavior, MockTransport};
pub use request::{EnvelopeError, InferRequest, RequestEnvelope, RequestKind};
#[cfg(feature = "http")]
pub use reqwest::{self, Client};
pub use result::{ConsensusResult, Detection, Forwarded, Label};
pub use transport::{Transport, TransportError};

mod answer;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "test-utils")]
mod mock;
mod request;
mod result;
mod transport;
