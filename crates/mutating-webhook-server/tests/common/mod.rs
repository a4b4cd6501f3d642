use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use mutating_webhook_server::{config::Config, WebhookServer};
use pod_mutator::{admission_response::AdmissionResponse, mutation::MutationConfig};
use std::net::SocketAddr;

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 9443)),
        tls_config: None,
        mutation: MutationConfig::default(),
        ignore_kubernetes_connection_failure: true,
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) async fn app(config: Config) -> Router {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let server = WebhookServer::new_from_config(config).await.unwrap();

    server.router()
}

pub(crate) fn decode_patch(response: &AdmissionResponse) -> Option<json_patch::Patch> {
    let encoded = response.patch.as_ref()?;
    let raw = general_purpose::STANDARD.decode(encoded).unwrap();

    Some(serde_json::from_slice(&raw).unwrap())
}
