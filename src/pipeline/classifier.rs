use crate::models::{AccelerationSample, MotionState};

/// Classify a single sample against a movement threshold in m/s²
///
/// A magnitude strictly above the threshold counts as movement. Samples are
/// judged on their own; there is no smoothing across readings. A non-finite
/// magnitude or threshold yields `Invalid`.
pub fn classify(sample: &AccelerationSample, threshold: f32) -> MotionState {
    let magnitude = sample.magnitude();

    if !magnitude.is_finite() || !threshold.is_finite() {
        return MotionState::Invalid;
    }

    if magnitude > threshold {
        MotionState::Moving
    } else {
        MotionState::Stationary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sample_is_stationary() {
        let sample = AccelerationSample::from_raw([0, 0, 0], 1.0);
        assert_eq!(sample.magnitude(), 0.0);
        assert_eq!(classify(&sample, 1.0), MotionState::Stationary);
    }

    #[test]
    fn test_large_sample_is_moving() {
        let sample = AccelerationSample::from_raw([2000, 0, 0], 1.0);
        assert_eq!(sample.magnitude(), 2000.0);
        assert_eq!(classify(&sample, 1.0), MotionState::Moving);
    }

    #[test]
    fn test_threshold_is_strict() {
        // 3-4-5 triangle keeps the magnitude exact
        let sample = AccelerationSample::from_raw([3, 4, 0], 1.0);
        assert_eq!(sample.magnitude(), 5.0);

        assert_eq!(classify(&sample, 5.0), MotionState::Stationary);
        assert_eq!(classify(&sample, 4.99), MotionState::Moving);
        assert_eq!(classify(&sample, 5.01), MotionState::Stationary);
    }

    #[test]
    fn test_negative_axes_use_magnitude() {
        let sample = AccelerationSample::from_raw([-3, 0, -4], 1.0);
        assert_eq!(sample.magnitude(), 5.0);
        assert_eq!(classify(&sample, 1.0), MotionState::Moving);
    }

    #[test]
    fn test_non_finite_inputs_are_invalid() {
        let sample = AccelerationSample::from_raw([1, 0, 0], 1.0);
        assert_eq!(classify(&sample, f32::NAN), MotionState::Invalid);
        assert_eq!(classify(&sample, f32::INFINITY), MotionState::Invalid);

        let overflowed = AccelerationSample::from_raw([i16::MAX, 0, 0], f32::MAX);
        assert_eq!(classify(&overflowed, 1.0), MotionState::Invalid);

        let nan = AccelerationSample::from_raw([1, 1, 1], f32::NAN);
        assert_eq!(classify(&nan, 1.0), MotionState::Invalid);
    }

    #[test]
    fn test_deterministic() {
        let sample = AccelerationSample::from_raw([17, -3, 250], 0.05);
        let first = classify(&sample, 1.0);
        for _ in 0..10 {
            assert_eq!(classify(&sample, 1.0), first);
        }
    }
}
