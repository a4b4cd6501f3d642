use anyhow::{anyhow, Result};
use mutating_webhook_server::{cli, config::Config, tracing::setup_tracing, WebhookServer};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    // kube and axum-server both pull rustls, pick the provider explicitly
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("cannot install the rustls crypto provider"))?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;

    let server = WebhookServer::new_from_config(config).await?;
    server.run().await
}
