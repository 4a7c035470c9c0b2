// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! mqttbench CLI
//!
//! Publishes and receives synthetic sensor readings over MQTT to compare
//! payload encodings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// mqttbench - MQTT payload encoding benchmark
#[derive(Parser)]
#[command(name = "mqttbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./mqttbench.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish generated sensor readings
    Publisher(commands::publisher::PublisherArgs),

    /// Subscribe to a topic and measure latency
    Subscriber(commands::subscriber::SubscriberArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Publisher(args) => commands::publisher::execute(cli.config.as_deref(), args).await,
        Commands::Subscriber(args) => {
            commands::subscriber::execute(cli.config.as_deref(), args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_defaults() {
        let cli = Cli::try_parse_from(["mqttbench", "publisher"]).unwrap();
        let Commands::Publisher(args) = cli.command else {
            panic!("expected publisher");
        };
        assert_eq!(args.broker, None);
        assert_eq!(args.port, None);
        assert_eq!(args.topic, "mqtt-demo/all");
        assert_eq!(args.sensor_id, "sensor_001");
        assert_eq!(args.count, 10);
        assert_eq!(args.interval, 1.0);
        assert_eq!(args.payload, "small");
        assert_eq!(args.qos, 1);
        assert_eq!(args.encoding, "json");
    }

    #[test]
    fn test_subscriber_flags() {
        let cli = Cli::try_parse_from([
            "mqttbench",
            "subscriber",
            "--broker",
            "10.0.0.2",
            "--encoding",
            "cbor",
            "--max-messages",
            "50",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Subscriber(args) = cli.command else {
            panic!("expected subscriber");
        };
        assert_eq!(args.broker.as_deref(), Some("10.0.0.2"));
        assert_eq!(args.encoding, "cbor");
        assert_eq!(args.max_messages, Some(50));
        assert_eq!(args.qos, 1);
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["mqttbench", "publisher", "--config", "bench.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bench.yaml")));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["mqttbench"]).is_err());
    }
}
