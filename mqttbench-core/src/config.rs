// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! The config file is optional: everything has a default, and command-line
//! flags override broker host and port. Any invalid field results in a
//! HardValidationError that prevents startup.

use std::path::Path;

use serde::Deserialize;

use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::stats::{OverflowPolicy, DEFAULT_SAMPLE_CAPACITY};
use crate::types::Port;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "mqttbench.yaml";

/// MQTT's remaining-length field caps a packet at 256 MiB - 1.
const MAX_MQTT_PACKET_BYTES: usize = 268_435_455;
/// Must hold a large JSON payload (~62 KB) plus headers.
const MIN_PACKET_BYTES: usize = 64 * 1024;

/// Raw broker section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBrokerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_keep_alive_secs")]
    keep_alive_secs: u64,
    #[serde(default = "default_clean_session")]
    clean_session: bool,
    #[serde(default = "default_request_capacity")]
    request_capacity: usize,
    #[serde(default = "default_max_packet_bytes")]
    max_packet_bytes: usize,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_clean_session() -> bool {
    true
}

fn default_request_capacity() -> usize {
    10
}

fn default_max_packet_bytes() -> usize {
    256 * 1024
}

impl Default for RawBrokerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            keep_alive_secs: default_keep_alive_secs(),
            clean_session: default_clean_session(),
            request_capacity: default_request_capacity(),
            max_packet_bytes: default_max_packet_bytes(),
        }
    }
}

/// Raw subscriber section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubscriberConfig {
    #[serde(default = "default_sample_capacity")]
    sample_capacity: usize,
    #[serde(default)]
    overflow_policy: OverflowPolicy,
}

fn default_sample_capacity() -> usize {
    DEFAULT_SAMPLE_CAPACITY
}

impl Default for RawSubscriberConfig {
    fn default() -> Self {
        Self {
            sample_capacity: default_sample_capacity(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

/// Raw publisher section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPublisherConfig {
    #[serde(default)]
    connect_settle_ms: u64,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    broker: RawBrokerConfig,
    #[serde(default)]
    subscriber: RawSubscriberConfig,
    #[serde(default)]
    publisher: RawPublisherConfig,
}

/// Validated broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: Port,
    pub keep_alive_secs: u64,
    pub clean_session: bool,
    pub request_capacity: usize,
    pub max_packet_bytes: usize,
}

/// Validated subscriber settings.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub sample_capacity: usize,
    pub overflow_policy: OverflowPolicy,
}

/// Validated publisher settings.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub connect_settle_ms: u64,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub broker: BrokerConfig,
    pub subscriber: SubscriberConfig,
    pub publisher: PublisherConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let raw = RawConfig::default();
        Self {
            broker: BrokerConfig {
                host: raw.broker.host,
                port: Port::DEFAULT_MQTT,
                keep_alive_secs: raw.broker.keep_alive_secs,
                clean_session: raw.broker.clean_session,
                request_capacity: raw.broker.request_capacity,
                max_packet_bytes: raw.broker.max_packet_bytes,
            },
            subscriber: SubscriberConfig {
                sample_capacity: raw.subscriber.sample_capacity,
                overflow_policy: raw.subscriber.overflow_policy,
            },
            publisher: PublisherConfig {
                connect_settle_ms: raw.publisher.connect_settle_ms,
            },
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<BenchConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load an explicit path, or the default path if present, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> BenchResult<BenchConfig> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    tracing::debug!(path = %default_path.display(), "Loading default config file");
                    Self::load_file(default_path)
                } else {
                    Ok(BenchConfig::default())
                }
            }
        }
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<BenchConfig> {
        if content.trim().is_empty() {
            return Ok(BenchConfig::default());
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> BenchResult<BenchConfig> {
        Ok(BenchConfig {
            broker: Self::validate_broker(raw.broker)?,
            subscriber: Self::validate_subscriber(raw.subscriber)?,
            publisher: PublisherConfig {
                connect_settle_ms: raw.publisher.connect_settle_ms,
            },
        })
    }

    fn validate_broker(raw: RawBrokerConfig) -> BenchResult<BrokerConfig> {
        if raw.host.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "broker.host",
                value: raw.host,
                reason: "Broker host cannot be empty".to_string(),
            }
            .into());
        }

        let port = Port::new(raw.port)?;

        // rumqttc rejects keep-alive below 5 seconds
        if !(5..=3600).contains(&raw.keep_alive_secs) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "broker.keep_alive_secs",
                value: raw.keep_alive_secs.to_string(),
                reason: "Must be between 5 and 3600 seconds".to_string(),
            }
            .into());
        }

        if raw.request_capacity == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "broker.request_capacity",
                value: "0".to_string(),
                reason: "Request channel capacity must be greater than 0".to_string(),
            }
            .into());
        }

        if !(MIN_PACKET_BYTES..=MAX_MQTT_PACKET_BYTES).contains(&raw.max_packet_bytes) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "broker.max_packet_bytes",
                value: raw.max_packet_bytes.to_string(),
                reason: format!(
                    "Must be between {} and {} bytes",
                    MIN_PACKET_BYTES, MAX_MQTT_PACKET_BYTES
                ),
            }
            .into());
        }

        Ok(BrokerConfig {
            host: raw.host,
            port,
            keep_alive_secs: raw.keep_alive_secs,
            clean_session: raw.clean_session,
            request_capacity: raw.request_capacity,
            max_packet_bytes: raw.max_packet_bytes,
        })
    }

    fn validate_subscriber(raw: RawSubscriberConfig) -> BenchResult<SubscriberConfig> {
        if raw.sample_capacity == 0 || raw.sample_capacity > 10_000_000 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "subscriber.sample_capacity",
                value: raw.sample_capacity.to_string(),
                reason: "Must be between 1 and 10000000".to_string(),
            }
            .into());
        }

        Ok(SubscriberConfig {
            sample_capacity: raw.sample_capacity,
            overflow_policy: raw.overflow_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_CONFIG: &str = r#"
broker:
  host: broker.local
  port: 8883
  keep_alive_secs: 30
  clean_session: false
  request_capacity: 64
  max_packet_bytes: 1048576

subscriber:
  sample_capacity: 5000
  overflow_policy: stop_recording

publisher:
  connect_settle_ms: 250
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.broker.host, "broker.local");
        assert_eq!(config.broker.port.value(), 8883);
        assert!(!config.broker.clean_session);
        assert_eq!(config.broker.max_packet_bytes, 1_048_576);
        assert_eq!(config.subscriber.sample_capacity, 5000);
        assert_eq!(
            config.subscriber.overflow_policy,
            OverflowPolicy::StopRecording
        );
        assert_eq!(config.publisher.connect_settle_ms, 250);
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("broker:\n  port: 1884\n").unwrap();
        assert_eq!(config.broker.host, "localhost");
        assert_eq!(config.broker.port.value(), 1884);
        assert_eq!(config.broker.keep_alive_secs, 60);
        assert!(config.broker.clean_session);
        assert_eq!(config.subscriber.sample_capacity, 1000);
        assert_eq!(config.subscriber.overflow_policy, OverflowPolicy::DropOldest);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config.broker.port.value(), 1883);
        let default = BenchConfig::default();
        assert_eq!(default.broker.host, "localhost");
    }

    #[test]
    fn test_invalid_port_zero() {
        let result = ConfigLoader::load_string("broker:\n  port: 0\n");
        assert!(matches!(result, Err(BenchError::HardValidation(_))));
    }

    #[test]
    fn test_keep_alive_out_of_range() {
        assert!(ConfigLoader::load_string("broker:\n  keep_alive_secs: 1\n").is_err());
    }

    #[test]
    fn test_packet_limit_too_small() {
        assert!(ConfigLoader::load_string("broker:\n  max_packet_bytes: 1024\n").is_err());
    }

    #[test]
    fn test_zero_sample_capacity() {
        assert!(ConfigLoader::load_string("subscriber:\n  sample_capacity: 0\n").is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = ConfigLoader::load_string("subscriber:\n  overflow_policy: keep_all\n");
        assert!(matches!(result, Err(BenchError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::load_string("broker:\n  hots: typo\n");
        assert!(matches!(result, Err(BenchError::ConfigParse { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/mqttbench.yaml")));
        assert!(matches!(result, Err(BenchError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID_CONFIG.as_bytes()).unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.broker.request_capacity, 64);
    }
}
