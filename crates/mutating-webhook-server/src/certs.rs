use ::tracing::info;
use anyhow::{anyhow, Result};
use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the PEM encoded certificate chain and private key used by the HTTPS listener.
pub(crate) async fn load_tls_config(tls_config: &TlsConfig) -> Result<RustlsConfig> {
    let config = RustlsConfig::from_pem_file(&tls_config.cert_file, &tls_config.key_file)
        .await
        .map_err(|e| {
            anyhow!(
                "cannot load certificate {} and key {}: {e}",
                tls_config.cert_file,
                tls_config.key_file
            )
        })?;
    info!(
        cert_file = tls_config.cert_file.as_str(),
        "TLS certificate loaded"
    );

    Ok(config)
}
