/// Accelerometer payload decoding
///
/// The accelerometer service carries three little-endian signed 16-bit
/// readings, one per axis:
/// - Bytes 0-1: Acceleration X
/// - Bytes 2-3: Acceleration Y
/// - Bytes 4-5: Acceleration Z
///
/// Some beacon firmwares put a 6-byte header in front of the readings, so the
/// sample block starts at byte 6 instead. Which layout a deployment uses is
/// configured up front and never guessed from the payload.
use thiserror::Error;

use crate::models::AccelerationSample;

const SAMPLE_LEN: usize = 6; // 3 axes x 2 bytes
const HEADER_LEN: usize = 6;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadLayout {
    /// Readings start at byte 0
    Bare,
    /// Readings follow a 6-byte header
    #[default]
    Prefixed,
}

impl PayloadLayout {
    pub fn offset(self) -> usize {
        match self {
            PayloadLayout::Bare => 0,
            PayloadLayout::Prefixed => HEADER_LEN,
        }
    }

    pub fn minimum_length(self) -> usize {
        self.offset() + SAMPLE_LEN
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PayloadDecoder {
    layout: PayloadLayout,
    scale_factor: f32,
}

impl PayloadDecoder {
    pub fn new(layout: PayloadLayout, scale_factor: f32) -> Self {
        Self {
            layout,
            scale_factor,
        }
    }

    /// Decode a raw service-data payload into a sample in m/s²
    ///
    /// Bytes past the sample block are ignored. Any 6 bytes form valid
    /// readings, so the length check is the only way this fails.
    pub fn decode(&self, payload: &[u8]) -> Result<AccelerationSample, DecodeError> {
        let start = self.layout.offset();
        let expected = self.layout.minimum_length();

        match payload.get(start..expected) {
            Some(&[x0, x1, y0, y1, z0, z1]) => {
                let raw = [
                    i16::from_le_bytes([x0, x1]),
                    i16::from_le_bytes([y0, y1]),
                    i16::from_le_bytes([z0, z1]),
                ];
                Ok(AccelerationSample::from_raw(raw, self.scale_factor))
            }
            _ => Err(DecodeError::TooShort {
                expected,
                actual: payload.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(x: i16, y: i16, z: i16) -> Vec<u8> {
        [x, y, z].iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_all_zero_payload() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        let sample = decoder.decode(&[0u8; 6]).unwrap();

        assert_eq!(sample.x(), 0.0);
        assert_eq!(sample.y(), 0.0);
        assert_eq!(sample.z(), 0.0);
    }

    #[test]
    fn test_little_endian_signed_values() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        let sample = decoder.decode(&encode(2000, -1, i16::MIN)).unwrap();

        assert_eq!(sample.x(), 2000.0);
        assert_eq!(sample.y(), -1.0);
        assert_eq!(sample.z(), -32768.0);

        // 0xD0 0x07 is 2000 little-endian
        let sample = decoder.decode(&[0xD0, 0x07, 0, 0, 0xFF, 0x7F]).unwrap();
        assert_eq!(sample.x(), 2000.0);
        assert_eq!(sample.z(), 32767.0);
    }

    #[test]
    fn test_extremes_round_trip() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        for (x, y, z) in [(i16::MAX, i16::MIN, 0), (-12345, 321, 7), (1, -1, 1)] {
            let sample = decoder.decode(&encode(x, y, z)).unwrap();
            assert_eq!(
                (sample.x(), sample.y(), sample.z()),
                (x as f32, y as f32, z as f32)
            );
        }
    }

    #[test]
    fn test_scale_factor_applied() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 0.01);
        let sample = decoder.decode(&encode(981, -200, 0)).unwrap();

        assert!((sample.x() - 9.81).abs() < 1e-4);
        assert!((sample.y() + 2.0).abs() < 1e-4);
        assert_eq!(sample.z(), 0.0);
    }

    #[test]
    fn test_short_payloads_rejected() {
        let bare = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        for len in 0..6 {
            assert_eq!(
                bare.decode(&vec![0u8; len]),
                Err(DecodeError::TooShort {
                    expected: 6,
                    actual: len
                })
            );
        }

        let prefixed = PayloadDecoder::new(PayloadLayout::Prefixed, 1.0);
        for len in 0..12 {
            assert_eq!(
                prefixed.decode(&vec![0u8; len]),
                Err(DecodeError::TooShort {
                    expected: 12,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn test_four_byte_payload_is_too_short() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        let err = decoder.decode(&[1, 2, 3, 4]).unwrap_err();

        assert_eq!(
            err.to_string(),
            "payload too short: need at least 6 bytes, got 4"
        );
    }

    #[test]
    fn test_prefixed_layout_skips_header() {
        let decoder = PayloadDecoder::new(PayloadLayout::Prefixed, 1.0);
        let mut payload = vec![0xAA; 6];
        payload.extend(encode(10, -20, 30));

        let sample = decoder.decode(&payload).unwrap();
        assert_eq!((sample.x(), sample.y(), sample.z()), (10.0, -20.0, 30.0));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        let mut payload = encode(5, 6, 7);
        payload.extend([0xFF; 10]);

        let sample = decoder.decode(&payload).unwrap();
        assert_eq!((sample.x(), sample.y(), sample.z()), (5.0, 6.0, 7.0));
    }

    #[test]
    fn test_every_byte_value_decodes() {
        let decoder = PayloadDecoder::new(PayloadLayout::Bare, 1.0);
        for b in 0..=u8::MAX {
            let payload = [b, b.wrapping_add(1), b, 0x80, 0x7F, b];
            let first = decoder.decode(&payload).unwrap();
            let second = decoder.decode(&payload).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_layout_lengths() {
        assert_eq!(PayloadLayout::Bare.offset(), 0);
        assert_eq!(PayloadLayout::Bare.minimum_length(), 6);
        assert_eq!(PayloadLayout::Prefixed.offset(), 6);
        assert_eq!(PayloadLayout::Prefixed.minimum_length(), 12);
    }
}
