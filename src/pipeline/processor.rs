/// Per-advertisement orchestration: match, decode, classify
use crate::config::PipelineConfig;
use crate::models::{AdvertisementEvent, ClassificationResult, MotionState, ServiceId};
use crate::pipeline::classifier::classify;
use crate::pipeline::decoder::PayloadDecoder;
use crate::pipeline::matcher::ServiceMatcher;

/// Turns advertisements into classification results
///
/// Holds only read-only settings, so one instance can be shared across tasks
/// and called for independent events at the same time.
#[derive(Debug, Clone, Copy)]
pub struct AdvertisementProcessor {
    matcher: ServiceMatcher,
    decoder: PayloadDecoder,
    movement_threshold: f32,
}

impl AdvertisementProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            matcher: ServiceMatcher::new(config.service_uuid),
            decoder: PayloadDecoder::new(config.payload_layout, config.scale_factor),
            movement_threshold: config.movement_threshold,
        }
    }

    /// Classify every accelerometer entry of an advertisement
    ///
    /// Entries for other services produce no result; see
    /// [`skipped_services`](Self::skipped_services). A payload that fails to
    /// decode yields an `Invalid` result without a sample. Result order
    /// follows the service-data map and carries no meaning.
    pub fn process(&self, event: &AdvertisementEvent) -> Vec<ClassificationResult> {
        event
            .service_data
            .iter()
            .filter(|(service_id, _)| self.matcher.matches(service_id))
            .map(|(service_id, payload)| {
                let (sample, motion_state) = match self.decoder.decode(payload) {
                    Ok(sample) => (Some(sample), classify(&sample, self.movement_threshold)),
                    Err(_) => (None, MotionState::Invalid),
                };

                ClassificationResult {
                    device_id: event.device_id.clone(),
                    signal_strength: event.signal_strength,
                    service_id: *service_id,
                    sample,
                    motion_state,
                }
            })
            .collect()
    }

    /// Service ids in the advertisement that are not the accelerometer service
    pub fn skipped_services<'a>(
        &'a self,
        event: &'a AdvertisementEvent,
    ) -> impl Iterator<Item = &'a ServiceId> + 'a {
        event
            .service_data
            .keys()
            .filter(move |service_id| !self.matcher.matches(service_id))
    }
}
