use anyhow::{anyhow, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// Setup the tracing system. This MUST be done inside of a tokio Runtime
// because some collectors rely on it and would panic otherwise.
pub fn setup_tracing(log_level: &str, log_fmt: &str, log_no_color: bool) -> Result<()> {
    let filter_layer = build_filter(log_level)?;

    match log_fmt {
        "json" => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json())
            .try_init()?,
        "text" => {
            let fmt_layer = fmt::layer().with_ansi(!log_no_color);

            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .try_init()?
        }
        _ => return Err(anyhow!("Unknown log message format: {log_fmt}")),
    };

    Ok(())
}

fn build_filter(log_level: &str) -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_new(log_level).map_err(|e| anyhow!("invalid log level {log_level}: {e}"))?;

    // some of our dependencies generate trace events too, but we don't care about them ->
    // let's filter them
    for directive in ["h2=off", "hyper=off", "rustls=off", "tower=off"] {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}
