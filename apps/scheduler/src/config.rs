//! Scheduler configuration loaded from TOML.

use anyhow::{Context, Result, bail};
use consensus::ConsensusConfig;
use pcore::{HttpTransport, RequestKind};
use pool::{PoolError, WorkerRegistry};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Environment variable overriding `[workers] urls`, comma-separated.
pub const MINER_URLS_ENV: &str = "MINER_URLS";

/// Top-level scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Server bind configuration.
    pub server: ServerConfig,
    /// Static worker set.
    pub workers: WorkersConfig,
    /// Background liveness probing.
    pub probe: ProbeConfig,
    /// Base committee sizes per request kind.
    pub committee: CommitteeConfig,
    /// Per-call timeouts and forward retry policy.
    pub dispatch: DispatchConfig,
    /// Outlier rejection and trimming.
    pub consensus: ConsensusConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP surface binds to.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9090".to_owned(),
        }
    }
}

/// Worker set. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Worker base URLs, e.g. `http://10.0.0.4:6061`.
    pub urls: Vec<String>,
}

/// Health probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Time between probe cycles.
    pub interval_ms: u64,
    /// Per-check timeout.
    pub timeout_ms: u64,
    /// Liveness path on every worker.
    pub path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            timeout_ms: 5_000,
            path: "/healthz".to_owned(),
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Base committee size per request kind. Priority requests ignore these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteeConfig {
    pub image: usize,
    pub video: usize,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self { image: 5, video: 7 }
    }
}

impl CommitteeConfig {
    /// Base committee size for `kind`.
    pub fn base_size(&self, kind: RequestKind) -> usize {
        match kind {
            RequestKind::Image => self.image,
            RequestKind::Video => self.video,
        }
    }
}

/// Dispatch configuration shared by committee and forward modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Timeout for a single inference call.
    pub timeout_ms: u64,
    /// Inference path on every worker.
    pub infer_path: String,
    /// Distinct targets tried by a forward request before giving up.
    pub forward_attempts: usize,
    /// Backoff after the n-th failed forward attempt is `n * backoff_base_ms`
    /// plus up to `backoff_jitter_ms` of random jitter.
    pub backoff_base_ms: u64,
    pub backoff_jitter_ms: u64,
    /// Latency recorded for a failed committee member.
    pub sentinel_latency_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 20_000,
            infer_path: "/infer".to_owned(),
            forward_attempts: 3,
            backoff_base_ms: 200,
            backoff_jitter_ms: 100,
            sentinel_latency_ms: pcore::SENTINEL_LATENCY_MS,
        }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SchedulerConfig {
    /// Parse a TOML string, expanding `${VAR}` references first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded).context("invalid scheduler config")?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Apply `MINER_URLS` from the process environment, if set.
    pub fn apply_env(&mut self) {
        if let Ok(list) = std::env::var(MINER_URLS_ENV) {
            self.set_worker_list(&list);
        }
    }

    /// Replace the worker set with a comma-separated list. A list with no
    /// entries leaves the configured set untouched.
    pub fn set_worker_list(&mut self, list: &str) {
        let urls = crate::utils::split_list(list);
        if !urls.is_empty() {
            self.workers.urls = urls;
        }
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers.urls.iter().all(|u| u.trim().is_empty()) {
            bail!("no workers configured: set [workers] urls or {MINER_URLS_ENV}");
        }
        if self.committee.image == 0 || self.committee.video == 0 {
            bail!("committee sizes must be at least 1");
        }
        if self.dispatch.forward_attempts == 0 {
            bail!("dispatch.forward_attempts must be at least 1");
        }
        if self.dispatch.timeout_ms == 0 || self.probe.timeout_ms == 0 {
            bail!("timeouts must be non-zero");
        }
        if self.probe.interval_ms == 0 {
            bail!("probe.interval_ms must be non-zero");
        }
        self.consensus
            .validate()
            .context("invalid [consensus] section")?;
        Ok(())
    }

    /// Build the worker registry for the configured set.
    pub fn registry(&self) -> Result<WorkerRegistry, PoolError> {
        WorkerRegistry::new(&self.workers.urls)
    }

    /// Build the HTTP transport using the configured endpoint paths.
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::new(pcore::Client::new())
            .with_paths(&self.dispatch.infer_path, &self.probe.path)
    }
}
