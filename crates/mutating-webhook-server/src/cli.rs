use clap::builder::PossibleValue;
use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, Command};
use pod_mutator::mutation::{
    DEFAULT_LABEL_KEY, DEFAULT_LABEL_VALUE, DEFAULT_TARGET_CONTAINER_NAME, DEFAULT_TARGET_IMAGE,
};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("WEBHOOK_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("WEBHOOK_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("WEBHOOK_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("9443")
            .env("WEBHOOK_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("")
            .env("WEBHOOK_CERT_FILE")
            .help("Path to an X.509 certificate file for HTTPS"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("")
            .env("WEBHOOK_KEY_FILE")
            .help("Path to an X.509 private key file for HTTPS"),
        Arg::new("label-key")
            .long("label-key")
            .value_name("LABEL_KEY")
            .default_value(DEFAULT_LABEL_KEY)
            .env("WEBHOOK_LABEL_KEY")
            .help("Label a Pod must carry to be mutated"),
        Arg::new("label-value")
            .long("label-value")
            .value_name("LABEL_VALUE")
            .default_value(DEFAULT_LABEL_VALUE)
            .env("WEBHOOK_LABEL_VALUE")
            .help("Value the selection label must have"),
        Arg::new("container-name")
            .long("container-name")
            .value_name("CONTAINER_NAME")
            .default_value(DEFAULT_TARGET_CONTAINER_NAME)
            .env("WEBHOOK_CONTAINER_NAME")
            .help("Name of the containers whose image is rewritten"),
        Arg::new("target-image")
            .long("target-image")
            .value_name("IMAGE")
            .default_value(DEFAULT_TARGET_IMAGE)
            .env("WEBHOOK_TARGET_IMAGE")
            .help("Image reference forced on the matching containers"),
        Arg::new("ignore-kubernetes-connection-failure")
            .long("ignore-kubernetes-connection-failure")
            .env("WEBHOOK_IGNORE_KUBERNETES_CONNECTION_FAILURE")
            .action(ArgAction::SetTrue)
            .help("Do not exit with an error if the Kubernetes connection fails"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
