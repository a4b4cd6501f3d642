pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod tracing;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ::tracing::{info, warn};
use anyhow::{anyhow, Result};
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use pod_mutator::{
    cluster::KubeClusterReader,
    handler::{AdmissionHandler, PodMutator},
};
use tower_http::trace::TraceLayer;

use api::{
    gateway::Gateway,
    handlers::{liveness_handler, pod_mutating_handler, readiness_handler},
    LIVENESS_PATH, POD_MUTATING_PATH, READINESS_PATH,
};
use config::Config;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

pub struct WebhookServer {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<RustlsConfig>,
}

impl WebhookServer {
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let cluster = match kube::Client::try_default().await {
            Ok(client) => KubeClusterReader::new(client),
            Err(e) if config.ignore_kubernetes_connection_failure => {
                warn!(
                    error = e.to_string().as_str(),
                    "cannot connect to Kubernetes, cluster lookups are disabled"
                );
                KubeClusterReader::offline()
            }
            Err(e) => return Err(anyhow!("cannot connect to Kubernetes: {e}")),
        };

        let mutator = PodMutator::new(config.mutation, cluster);
        let gateway = Arc::new(Gateway::new(mutator));

        let tls_config = match &config.tls_config {
            Some(tls_config) => Some(certs::load_tls_config(tls_config).await?),
            None => None,
        };

        Ok(Self {
            router: build_router(gateway),
            addr: config.addr,
            tls_config,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self) -> Result<()> {
        let handle = Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        match self.tls_config {
            None => {
                info!(
                    service = config::SERVICE_NAME,
                    address = self.addr.to_string().as_str(),
                    "started HTTP server"
                );
                axum_server::bind(self.addr)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            Some(tls_config) => {
                info!(
                    service = config::SERVICE_NAME,
                    address = self.addr.to_string().as_str(),
                    "started HTTPS server"
                );
                axum_server::bind_rustls(self.addr, tls_config)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        };

        Ok(())
    }
}

fn build_router<H: AdmissionHandler + 'static>(gateway: Arc<Gateway<H>>) -> Router {
    Router::new()
        .route(POD_MUTATING_PATH, post(pod_mutating_handler::<H>))
        .with_state(gateway)
        .route(LIVENESS_PATH, get(liveness_handler))
        .route(READINESS_PATH, get(readiness_handler))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = e.to_string().as_str(), "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = e.to_string().as_str(), "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}
