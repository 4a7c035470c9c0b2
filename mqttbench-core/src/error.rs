// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for mqttbench.
//!
//! Explicit enum error types throughout the library. Startup errors
//! (validation, config, connection) are fatal; decode errors are recovered
//! per message by the subscriber.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Encoding;

/// Top-level error type for mqttbench.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast Before Any Network Work
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Unsupported encoding: '{name}' (expected one of json, cbor, msgpack, protobuf)")]
    UnsupportedEncoding { name: String },

    #[error("Unsupported payload size: '{name}' (expected one of small, medium, large)")]
    UnsupportedPayloadSize { name: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Codec Errors
    // =========================================================================
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    // =========================================================================
    // Broker Errors - No Retry
    // =========================================================================
    #[error("Connection failure: {0}")]
    Connection(#[from] ConnectionError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for user-supplied values. These stop the run before it starts.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Invalid QoS level: {level} (must be 0, 1 or 2)")]
    InvalidQos { level: u8 },
}

/// Encode/decode failures for a single payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{encoding} encode failed: {reason}")]
    Encode { encoding: Encoding, reason: String },

    #[error("{encoding} decode failed: {reason}")]
    Decode { encoding: Encoding, reason: String },
}

impl CodecError {
    pub(crate) fn encode(encoding: Encoding, reason: impl ToString) -> Self {
        Self::Encode {
            encoding,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(encoding: Encoding, reason: impl ToString) -> Self {
        Self::Decode {
            encoding,
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from the decode path.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Broker connection errors. Every variant terminates the run.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {broker}: {reason}")]
    ConnectFailed { broker: String, reason: String },

    #[error("Broker {broker} refused connection: {code}")]
    Refused { broker: String, code: String },

    #[error("Publish to '{topic}' failed: {reason}")]
    PublishFailed { topic: String, reason: String },

    #[error("Subscribe to '{topic}' failed: {reason}")]
    SubscribeFailed { topic: String, reason: String },

    #[error("Connection lost: {reason}")]
    Lost { reason: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
