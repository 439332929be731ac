//! privx scheduler: committee dispatch with robust consensus.
//!
//! Wires the worker pool, the consensus aggregator and a transport into a
//! [`RequestRouter`], and exposes it over a small axum surface.

pub use committee::{CommitteeSelector, committee_size};
pub use config::SchedulerConfig;
pub use dispatch::{Dispatcher, backoff};
pub use error::{DispatchError, FailedAttempt, RouterError};
pub use router::RequestRouter;
pub use serve::{HealthReport, ServeHandle, WorkerStatus, app, serve, serve_with};

pub mod committee;
pub mod config;
pub mod dispatch;
mod error;
mod router;
pub mod serve;
pub mod utils;
