// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sensor reading payload model and generator.
//!
//! A [`SensorReading`] always carries the five core fields. Medium and large
//! variants add a fixed set of optional fields so message size can be varied
//! without changing the schema. Optional fields are populated per tier as a
//! whole, never individually.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::types::SensorId;

/// Filler length for the medium variant.
pub const MEDIUM_FILLER_LEN: usize = 1_500;
/// Filler length for the large variant.
pub const LARGE_FILLER_LEN: usize = 60_000;
/// Number of raw readings carried by the large variant.
pub const LARGE_READINGS_LEN: usize = 100;

const FIXED_LOCATION: Location = Location {
    lat: 40.7128,
    lon: -74.0060,
    altitude: 10.5,
};
const FIXED_STATUS: &str = "active";
const FIXED_BATTERY_LEVEL: f64 = 85.5;
const FIXED_SIGNAL_STRENGTH: i32 = -65;

/// Payload size variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSize {
    /// Core fields only
    #[default]
    Small,
    /// Core fields plus location, status, battery, signal and 1500-char filler
    Medium,
    /// Medium fields plus 100 readings, device metadata and 60000-char filler
    Large,
}

impl PayloadSize {
    /// All variants, smallest first.
    pub const ALL: [PayloadSize; 3] = [PayloadSize::Small, PayloadSize::Medium, PayloadSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadSize::Small => "small",
            PayloadSize::Medium => "medium",
            PayloadSize::Large => "large",
        }
    }
}

impl fmt::Display for PayloadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadSize {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(PayloadSize::Small),
            "medium" => Ok(PayloadSize::Medium),
            "large" => Ok(PayloadSize::Large),
            _ => Err(BenchError::UnsupportedPayloadSize {
                name: s.to_string(),
            }),
        }
    }
}

/// Fixed sensor position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

/// Device metadata carried by the large variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub firmware_version: String,
    pub hardware_id: String,
    pub calibration_date: String,
    pub last_maintenance: String,
}

impl DeviceMetadata {
    fn fixed() -> Self {
        Self {
            firmware_version: "1.2.3".to_string(),
            hardware_id: "HW-001".to_string(),
            calibration_date: "2024-01-01".to_string(),
            last_maintenance: "2024-06-01".to_string(),
        }
    }
}

/// A single sensor reading as it travels over the wire.
///
/// Field order and names define the JSON/CBOR layout. Unset optional fields
/// are omitted on encode and default to `None` on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Wall-clock creation time, seconds since the Unix epoch
    pub timestamp: f64,
    pub sensor_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_readings: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeviceMetadata>,
    /// Padding of repeated 'x' used to inflate medium and large payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<String>,
}

impl SensorReading {
    /// Build a reading with only the core fields set.
    pub fn core(
        timestamp: f64,
        sensor_id: impl Into<String>,
        temperature: f64,
        humidity: f64,
        pressure: f64,
    ) -> Self {
        Self {
            timestamp,
            sensor_id: sensor_id.into(),
            temperature,
            humidity,
            pressure,
            location: None,
            status: None,
            battery_level: None,
            signal_strength: None,
            sensor_readings: None,
            metadata: None,
            additional_data: None,
        }
    }

    /// Copy of this reading with every optional field cleared.
    pub fn core_only(&self) -> Self {
        Self::core(
            self.timestamp,
            self.sensor_id.clone(),
            self.temperature,
            self.humidity,
            self.pressure,
        )
    }

    /// The size tier matching this reading's optional-field population.
    ///
    /// Returns `None` for a partially populated reading.
    pub fn tier(&self) -> Option<PayloadSize> {
        let medium = [
            self.location.is_some(),
            self.status.is_some(),
            self.battery_level.is_some(),
            self.signal_strength.is_some(),
            self.additional_data.is_some(),
        ];
        let large = [self.sensor_readings.is_some(), self.metadata.is_some()];

        let all_medium = medium.iter().all(|&p| p);
        let no_medium = medium.iter().all(|&p| !p);
        let all_large = large.iter().all(|&p| p);
        let no_large = large.iter().all(|&p| !p);

        match (no_medium, all_medium, no_large, all_large) {
            (true, _, true, _) => Some(PayloadSize::Small),
            (_, true, true, _) => Some(PayloadSize::Medium),
            (_, true, _, true) => Some(PayloadSize::Large),
            _ => None,
        }
    }

    /// Timestamp in milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp * 1000.0
    }
}

/// Current wall-clock time in fractional seconds since the Unix epoch.
pub fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Current wall-clock time in fractional milliseconds since the Unix epoch.
pub fn epoch_millis() -> f64 {
    epoch_seconds() * 1000.0
}

/// Generates readings from an injected random source.
pub struct ReadingGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> ReadingGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Build a fresh reading for `sensor_id` at the given size tier.
    pub fn generate(&mut self, sensor_id: &SensorId, size: PayloadSize) -> SensorReading {
        let mut reading = SensorReading::core(
            epoch_seconds(),
            sensor_id.as_str(),
            self.rng.gen_range(15.0..35.0),
            self.rng.gen_range(30.0..70.0),
            self.rng.gen_range(950.0..1050.0),
        );

        match size {
            PayloadSize::Small => {}
            PayloadSize::Medium => {
                Self::fill_medium(&mut reading);
                reading.additional_data = Some("x".repeat(MEDIUM_FILLER_LEN));
            }
            PayloadSize::Large => {
                Self::fill_medium(&mut reading);
                reading.sensor_readings = Some(
                    (0..LARGE_READINGS_LEN)
                        .map(|_| self.rng.gen_range(0.0..100.0))
                        .collect(),
                );
                reading.metadata = Some(DeviceMetadata::fixed());
                reading.additional_data = Some("x".repeat(LARGE_FILLER_LEN));
            }
        }

        reading
    }

    fn fill_medium(reading: &mut SensorReading) {
        reading.location = Some(FIXED_LOCATION);
        reading.status = Some(FIXED_STATUS.to_string());
        reading.battery_level = Some(FIXED_BATTERY_LEVEL);
        reading.signal_strength = Some(FIXED_SIGNAL_STRENGTH);
    }
}

/// Generate a reading using the thread-local RNG.
pub fn generate(sensor_id: &SensorId, size: PayloadSize) -> SensorReading {
    ReadingGenerator::new(rand::thread_rng()).generate(sensor_id, size)
}
