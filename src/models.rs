use std::collections::HashMap;
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of a BLE service carried in an advertisement's service data
pub type ServiceId = Uuid;

/// One observed advertisement, as handed over by the scanner
#[derive(Debug, Clone)]
pub struct AdvertisementEvent {
    pub device_id: String,
    pub signal_strength: i16,
    pub service_data: HashMap<ServiceId, Vec<u8>>,
}

impl AdvertisementEvent {
    pub fn new(
        device_id: impl Into<String>,
        signal_strength: i16,
        service_data: HashMap<ServiceId, Vec<u8>>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            signal_strength,
            service_data,
        }
    }
}

/// Acceleration along three axes in m/s²
///
/// Only the payload decoder builds these, from raw 16-bit readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationSample {
    x: f32,
    y: f32,
    z: f32,
}

impl AccelerationSample {
    pub(crate) fn from_raw(raw: [i16; 3], scale_factor: f32) -> Self {
        Self {
            x: raw[0] as f32 * scale_factor,
            y: raw[1] as f32 * scale_factor,
            z: raw[2] as f32 * scale_factor,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean norm of the vector
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionState {
    Moving,
    Stationary,
    Invalid,
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MotionState::Moving => "Moving",
            MotionState::Stationary => "Stationary",
            MotionState::Invalid => "Invalid",
        };
        f.write_str(label)
    }
}

/// Outcome of processing one matched service-data entry
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub device_id: String,
    pub signal_strength: i16,
    pub service_id: ServiceId,
    /// `None` when the payload could not be decoded
    pub sample: Option<AccelerationSample>,
    pub motion_state: MotionState,
}

#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub name: String,
    pub samples: u32,
    pub moving: u32,
    pub stationary: u32,
    pub invalid: u32,
    pub acceleration_x: f32,
    pub acceleration_y: f32,
    pub acceleration_z: f32,
    pub mean_magnitude: f32,
    pub peak_magnitude: f32,
    pub last_rssi: i16,
    pub time: OffsetDateTime,
}
