use log::debug;
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ServiceId;
use crate::pipeline::PayloadLayout;

/// Service UUID the beacons advertise their accelerometer block under
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0xa5c3f000_8f4e_4b2a_9c61_3d7e0b1a2c40);
const DEFAULT_SCALE_FACTOR: f32 = 1.0;
const DEFAULT_MOVEMENT_THRESHOLD: f32 = 1.0; // m/s²
const DEFAULT_SCAN_DURATION_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: '{value}' is not a valid UUID")]
    InvalidUuid { key: &'static str, value: String },

    #[error("{key}: '{value}' is not a valid number")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    OutOfRange { key: &'static str, reason: &'static str },

    #[error("PAYLOAD_LAYOUT: unknown layout '{0}' (expected 'bare' or 'prefixed')")]
    UnknownLayout(String),

    #[error("BEACON_TAGS: malformed entry '{0}' (expected MAC=name)")]
    InvalidTag(String),
}

/// Read-only settings for the pipeline and the scan around it
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub service_uuid: ServiceId,
    pub scale_factor: f32,
    pub movement_threshold: f32,
    pub payload_layout: PayloadLayout,
    pub scan_duration_secs: u64,
    /// Optional allow-list of beacon MAC -> friendly name. Empty means every
    /// device is processed.
    pub tags: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            service_uuid: DEFAULT_SERVICE_UUID,
            scale_factor: DEFAULT_SCALE_FACTOR,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            payload_layout: PayloadLayout::default(),
            scan_duration_secs: DEFAULT_SCAN_DURATION_SECS,
            tags: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the process environment and `.env`
    pub fn new() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PipelineConfig::default();

        if let Some(value) = lookup("ACCEL_SERVICE_UUID") {
            config.service_uuid =
                Uuid::parse_str(value.trim()).map_err(|_| ConfigError::InvalidUuid {
                    key: "ACCEL_SERVICE_UUID",
                    value,
                })?;
        }

        if let Some(value) = lookup("ACCEL_SCALE_FACTOR") {
            let scale = parse_number::<f32>("ACCEL_SCALE_FACTOR", value)?;
            if !scale.is_finite() || scale == 0.0 {
                return Err(ConfigError::OutOfRange {
                    key: "ACCEL_SCALE_FACTOR",
                    reason: "must be finite and non-zero",
                });
            }
            config.scale_factor = scale;
        }

        if let Some(value) = lookup("MOVEMENT_THRESHOLD") {
            let threshold = parse_number::<f32>("MOVEMENT_THRESHOLD", value)?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::OutOfRange {
                    key: "MOVEMENT_THRESHOLD",
                    reason: "must be finite and not negative",
                });
            }
            config.movement_threshold = threshold;
        }

        if let Some(value) = lookup("PAYLOAD_LAYOUT") {
            config.payload_layout = match value.trim().to_ascii_lowercase().as_str() {
                "bare" => PayloadLayout::Bare,
                "prefixed" => PayloadLayout::Prefixed,
                _ => return Err(ConfigError::UnknownLayout(value)),
            };
        }

        if let Some(value) = lookup("SCAN_DURATION_SECS") {
            let secs = parse_number::<u64>("SCAN_DURATION_SECS", value)?;
            if secs == 0 {
                return Err(ConfigError::OutOfRange {
                    key: "SCAN_DURATION_SECS",
                    reason: "must be greater than zero",
                });
            }
            config.scan_duration_secs = secs;
        }

        if let Some(value) = lookup("BEACON_TAGS") {
            config.tags = parse_tags(&value)?;
        }

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Friendly name for a device, if one is configured
    pub fn device_name(&self, device_id: &str) -> Option<&str> {
        self.tags.get(device_id).map(String::as_str)
    }

    /// Whether scanning should handle this device at all
    pub fn is_tracked(&self, device_id: &str) -> bool {
        self.tags.is_empty() || self.tags.contains_key(device_id)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { key, value })
}

/// Parse `MAC=name,MAC=name` pairs; MACs are upper-cased to match scanner output
fn parse_tags(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tags = HashMap::new();

    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        match pair.split_once('=') {
            Some((mac, name)) if !mac.trim().is_empty() && !name.trim().is_empty() => {
                debug!("Found MAC: '{}', Name: '{}'", mac.trim(), name.trim());
                tags.insert(mac.trim().to_uppercase(), name.trim().to_string());
            }
            _ => return Err(ConfigError::InvalidTag(pair.to_string())),
        }
    }

    Ok(tags)
}
