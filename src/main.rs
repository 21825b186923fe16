#![allow(clippy::multiple_crate_versions)]

use clap::{Arg, ArgAction, Command};

mod commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("TOML configuration file (environment variables override it)")
}

#[tokio::main]
async fn main() {
    let matches = Command::new("docqc")
        .version(VERSION)
        .about("docqc - confidence-based quality control and review routing")
        .subcommand(
            Command::new("up")
                .about("Start the quality engine and its HTTP query API")
                .arg(config_arg())
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .value_parser(clap::value_parser!(u16))
                        .help("Port to bind the API server to (overrides config)"),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Host address to bind to (overrides config)"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify a single confidence score without starting the engine")
                .arg(config_arg())
                .arg(
                    Arg::new("score")
                        .value_name("SCORE")
                        .required(true)
                        .value_parser(clap::value_parser!(f64))
                        .allow_negative_numbers(true)
                        .help("Confidence score in [0, 1]"),
                )
                .arg(
                    Arg::new("safety-critical")
                        .short('s')
                        .long("safety-critical")
                        .action(ArgAction::SetTrue)
                        .help("Treat the document as safety-critical"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the classification as JSON"),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Validate configuration and check the local environment")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Query a running engine for metrics and alerts")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .value_name("URL")
                        .default_value("http://127.0.0.1:8080")
                        .help("Base URL of the running API server"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("up", sub_matches)) => commands::up::run(sub_matches).await,
        Some(("classify", sub_matches)) => commands::classify::run(sub_matches).await,
        Some(("doctor", sub_matches)) => commands::doctor::run(sub_matches).await,
        Some(("status", sub_matches)) => commands::status::run(sub_matches).await,
        _ => {
            println!("docqc v{}", VERSION);
            println!("Use --help for available commands");
        }
    }
}
