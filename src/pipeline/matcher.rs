use crate::models::ServiceId;

/// Selects the service-data entries that carry accelerometer readings
#[derive(Debug, Clone, Copy)]
pub struct ServiceMatcher {
    service_id: ServiceId,
}

impl ServiceMatcher {
    pub fn new(service_id: ServiceId) -> Self {
        Self { service_id }
    }

    pub fn matches(&self, service_id: &ServiceId) -> bool {
        *service_id == self.service_id
    }
}
