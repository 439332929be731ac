//! HTTP surface and serve entrypoint, used by the binary and the tests.
//!
//! Routes:
//! - `GET /health`: scheduler status plus the per-worker health snapshot.
//! - `POST /dispatch/{kind}`: committee dispatch and consensus.
//! - `POST /forward/{kind}`: single-target forward with rotation.

use crate::{SchedulerConfig, error::RouterError, router::RequestRouter};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use compact_str::CompactString;
use consensus::ConsensusError;
use pcore::{Detection, Forwarded, RequestEnvelope, RequestKind, Transport};
use pool::{HealthProbe, WorkerRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{sync::oneshot, task::JoinHandle};

/// Body accepted by the dispatch and forward routes. The kind comes from
/// the path.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub payload_b64: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl RequestBody {
    fn into_envelope(self, kind: RequestKind) -> RequestEnvelope {
        RequestEnvelope {
            kind,
            payload_b64: self.payload_b64,
            source_url: self.source_url,
            priority: self.priority,
            deadline_ms: self.deadline_ms,
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: CompactString,
    pub healthy: usize,
    pub total: usize,
    pub workers: Vec<WorkerStatus>,
}

/// One worker's entry in [`HealthReport`].
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub addr: CompactString,
    pub healthy: bool,
    pub consecutive_failures: u32,
    /// Milliseconds since the last success, if any.
    pub last_success_ms_ago: Option<u64>,
}

fn health_report(registry: &WorkerRegistry) -> HealthReport {
    let workers: Vec<WorkerStatus> = registry
        .snapshot()
        .into_iter()
        .map(|w| WorkerStatus {
            addr: w.addr,
            healthy: w.healthy,
            consecutive_failures: w.consecutive_failures,
            last_success_ms_ago: w.last_success.map(|t| t.elapsed().as_millis() as u64),
        })
        .collect();
    let healthy = workers.iter().filter(|w| w.healthy).count();
    HealthReport {
        status: if healthy > 0 { "ok" } else { "degraded" }.into(),
        healthy,
        total: workers.len(),
        workers,
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouterError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RouterError::NoWorkers | RouterError::Consensus(ConsensusError::EmptyCommittee) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RouterError::Consensus(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RouterError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Build the axum router over a shared request router.
pub fn app<T: Transport>(router: Arc<RequestRouter<T>>) -> Router {
    Router::new()
        .route("/health", get(health::<T>))
        .route("/dispatch/{kind}", post(dispatch::<T>))
        .route("/forward/{kind}", post(forward::<T>))
        .with_state(router)
}

async fn health<T: Transport>(State(router): State<Arc<RequestRouter<T>>>) -> Json<HealthReport> {
    Json(health_report(router.registry()))
}

async fn dispatch<T: Transport>(
    State(router): State<Arc<RequestRouter<T>>>,
    Path(kind): Path<String>,
    Json(body): Json<RequestBody>,
) -> Result<Json<Detection>, RouterError> {
    let kind: RequestKind = kind.parse()?;
    let detection = router.route(&body.into_envelope(kind)).await?;
    Ok(Json(detection))
}

async fn forward<T: Transport>(
    State(router): State<Arc<RequestRouter<T>>>,
    Path(kind): Path<String>,
    Json(body): Json<RequestBody>,
) -> Result<Json<Forwarded>, RouterError> {
    let kind: RequestKind = kind.parse()?;
    let forwarded = router.forward(&body.into_envelope(kind)).await?;
    Ok(Json(forwarded))
}

/// Handle returned by [`serve`]: the bound port and the shutdown trigger.
pub struct ServeHandle {
    /// The port the scheduler is listening on.
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<Result<(), std::io::Error>>>,
    probe: Option<JoinHandle<()>>,
}

impl ServeHandle {
    /// Stop the health probe, then shut the server down gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(probe) = self.probe.take() {
            probe.abort();
        }
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Build the registry and HTTP transport from `config` and start serving.
pub async fn serve(config: &SchedulerConfig) -> Result<ServeHandle> {
    let registry = config.registry()?;
    let transport = config.transport();
    serve_with(config, registry, transport).await
}

/// Serve over an existing registry and transport.
///
/// Starts the health probe, binds `config.server.bind` and runs the axum
/// server in a spawned task. Call `handle.shutdown()` to stop both.
pub async fn serve_with<T: Transport>(
    config: &SchedulerConfig,
    registry: WorkerRegistry,
    transport: T,
) -> Result<ServeHandle> {
    let probe = HealthProbe::new(
        registry.clone(),
        transport.clone(),
        config.probe.interval(),
        config.probe.timeout(),
    )
    .spawn();

    let router = Arc::new(RequestRouter::new(registry, transport, config));
    let app = app(router);

    let listener = match tokio::net::TcpListener::bind(&config.server.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            probe.abort();
            return Err(e.into());
        }
    };
    let port = listener.local_addr()?.port();
    tracing::info!("scheduler listening on {} (port {port})", config.server.bind);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
        probe: Some(probe),
    })
}
