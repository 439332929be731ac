//! Worker pool state for the privx scheduler.
//!
//! [`WorkerRegistry`] is the single source of truth for worker health. It is
//! an explicitly owned, cloneable handle: the health probe, the committee
//! selector and the dispatcher each hold a clone of the same registry, and
//! independent pools never share state. [`HealthProbe`] keeps the registry
//! eventually consistent with real availability in the background.

pub use probe::{HealthProbe, ProbeReport};
pub use registry::{PoolError, Worker, WorkerRegistry, prefer_healthy};

mod probe;
mod registry;
