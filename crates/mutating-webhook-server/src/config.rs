use anyhow::{anyhow, Result};
use clap::ArgMatches;
use lazy_static::lazy_static;
use pod_mutator::mutation::MutationConfig;
use std::net::SocketAddr;

pub static SERVICE_NAME: &str = "pod-mutating-webhook";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: Option<TlsConfig>,
    pub mutation: MutationConfig,
    pub ignore_kubernetes_connection_failure: bool,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

#[derive(Clone, Debug)]
pub struct TlsConfig {
    pub cert_file: String,
    pub key_file: String,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;
        let tls_config = tls_config(matches)?;

        let mutation = MutationConfig {
            label_key: string_arg(matches, "label-key")?,
            label_value: string_arg(matches, "label-value")?,
            target_container_name: string_arg(matches, "container-name")?,
            target_image: string_arg(matches, "target-image")?,
        };
        if mutation.target_image.is_empty() {
            return Err(anyhow!(
                "error parsing arguments: --target-image cannot be empty"
            ));
        }

        Ok(Self {
            addr,
            tls_config,
            mutation,
            ignore_kubernetes_connection_failure: matches
                .get_flag("ignore-kubernetes-connection-failure"),
            log_level: string_arg(matches, "log-level")?,
            log_fmt: string_arg(matches, "log-fmt")?,
            log_no_color: matches.get_flag("log-no-color"),
        })
    }
}

fn string_arg(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("error parsing arguments: {id} is not set"))
}

fn api_bind_address(matches: &ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        string_arg(matches, "address")?,
        string_arg(matches, "port")?
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_config(matches: &ArgMatches) -> Result<Option<TlsConfig>> {
    let cert_file = string_arg(matches, "cert-file")?;
    let key_file = string_arg(matches, "key-file")?;
    if cert_file.is_empty() != key_file.is_empty() {
        Err(anyhow!(
            "error parsing arguments: either both --cert-file and --key-file must be provided, or neither"
        ))
    } else if cert_file.is_empty() {
        Ok(None)
    } else {
        Ok(Some(TlsConfig {
            cert_file,
            key_file,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;
    use rstest::*;

    fn config_from(args: &[&str]) -> Result<Config> {
        let matches = build_cli()
            .try_get_matches_from(
                std::iter::once("mutating-webhook-server").chain(args.iter().copied()),
            )
            .expect("arguments should be accepted by clap");
        Config::from_args(&matches)
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:9443".parse::<SocketAddr>().unwrap());
        assert!(config.tls_config.is_none());
        assert_eq!(config.mutation, MutationConfig::default());
        assert!(!config.ignore_kubernetes_connection_failure);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_fmt, "text");
    }

    #[test]
    fn selector_overrides() {
        let config = config_from(&[
            "--label-key",
            "app",
            "--label-value",
            "broker",
            "--container-name",
            "broker",
            "--target-image",
            "registry.local/broker:v2",
        ])
        .unwrap();

        assert_eq!(
            config.mutation,
            MutationConfig {
                label_key: "app".to_string(),
                label_value: "broker".to_string(),
                target_container_name: "broker".to_string(),
                target_image: "registry.local/broker:v2".to_string(),
            }
        );
    }

    #[test]
    fn tls_files() {
        let config = config_from(&["--cert-file", "tls.crt", "--key-file", "tls.key"]).unwrap();

        let tls_config = config.tls_config.expect("TLS should be enabled");
        assert_eq!(tls_config.cert_file, "tls.crt");
        assert_eq!(tls_config.key_file, "tls.key");
    }

    #[rstest]
    #[case::cert_without_key(&["--cert-file", "tls.crt"])]
    #[case::key_without_cert(&["--key-file", "tls.key"])]
    #[case::bad_address(&["--addr", "not-an-address"])]
    #[case::bad_port(&["--port", "99999"])]
    #[case::empty_image(&["--target-image", ""])]
    fn invalid_arguments(#[case] args: &[&str]) {
        assert!(config_from(args).is_err());
    }
}
