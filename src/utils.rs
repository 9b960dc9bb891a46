/// Utility functions for result aggregation and formatting
use std::collections::HashMap;
use time::{format_description, OffsetDateTime};

use crate::config::PipelineConfig;
use crate::models::{AccelerationSample, ClassificationResult, DeviceSummary, MotionState};

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Lower-case hex dump of a raw payload
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// One-line description of a classification result for the log
pub fn format_result(result: &ClassificationResult, name: Option<&str>) -> String {
    let device = match name {
        Some(name) => format!("{} ({})", result.device_id, name),
        None => result.device_id.clone(),
    };

    match &result.sample {
        Some(sample) => format!(
            "{} | RSSI {} dBm | service {} | X: {:.2}, Y: {:.2}, Z: {:.2}, Magnitude: {:.2} m/s² -> {}",
            device,
            result.signal_strength,
            result.service_id,
            sample.x(),
            sample.y(),
            sample.z(),
            sample.magnitude(),
            result.motion_state
        ),
        None => format!(
            "{} | RSSI {} dBm | service {} | undecodable payload -> {}",
            device, result.signal_strength, result.service_id, result.motion_state
        ),
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Aggregate the results of one scan per device
///
/// Means are taken over decoded samples only; `Invalid` results count
/// towards `samples` and `invalid` but not the averages.
///
/// # Arguments
/// * `results` - HashMap mapping device addresses to their results, in arrival order
/// * `config` - Configuration containing device name mappings
pub fn summarize_results(
    results: &HashMap<String, Vec<ClassificationResult>>,
    config: &PipelineConfig,
) -> HashMap<String, DeviceSummary> {
    let mut summaries = HashMap::new();

    for (device_id, device_results) in results {
        // Skip devices with no data
        let Some(last) = device_results.last() else {
            continue;
        };

        let count_state = |state: MotionState| {
            device_results
                .iter()
                .filter(|r| r.motion_state == state)
                .count() as u32
        };

        let samples: Vec<_> = device_results.iter().filter_map(|r| r.sample).collect();
        let decoded = samples.len() as f32;
        let mean = |axis: fn(&AccelerationSample) -> f32| {
            if samples.is_empty() {
                0.0
            } else {
                round3(samples.iter().map(axis).sum::<f32>() / decoded)
            }
        };

        let summary = DeviceSummary {
            name: config
                .device_name(device_id)
                .map(str::to_string)
                .unwrap_or_else(|| "Unknown".to_string()),
            samples: device_results.len() as u32,
            moving: count_state(MotionState::Moving),
            stationary: count_state(MotionState::Stationary),
            invalid: count_state(MotionState::Invalid),
            acceleration_x: mean(|s| s.x()),
            acceleration_y: mean(|s| s.y()),
            acceleration_z: mean(|s| s.z()),
            mean_magnitude: mean(|s| s.magnitude()),
            peak_magnitude: round3(samples.iter().map(|s| s.magnitude()).fold(0.0, f32::max)),
            last_rssi: last.signal_strength,
            time: OffsetDateTime::now_utc(),
        };

        summaries.insert(device_id.clone(), summary);
    }

    summaries
}
