//! Channel schemas: how raw notification bytes map to typed readings.

use uuid::Uuid;

use telemetry_common::{ChannelKind, Measurement, Scalar, XYZ};

use crate::constants::MOVEMENT_PAYLOAD_LEN;
use crate::models::errors::LoggerError;

/// Wire format of one notification channel.
///
/// `MovementInt16x9` is the SensorTag combined payload: 9 little-endian
/// int16 values in Gx,Gy,Gz,Ax,Ay,Az,Mx,My,Mz order. The ASCII codecs cover
/// the Nano 33 BLE firmware, which sends text frames such as `"A 1.0,2.0,3.0"`
/// and `"H 72"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadCodec {
    MovementInt16x9,
    AsciiTriplet,
    AsciiScalar,
}

/// Static description of one notification channel of a device type.
#[derive(Clone, Debug)]
pub struct ChannelSpec {
    kind: ChannelKind,
    uuid: Uuid,
    codec: PayloadCodec,
}

impl ChannelSpec {
    pub fn new(kind: ChannelKind, uuid: Uuid, codec: PayloadCodec) -> Self {
        Self { kind, uuid, codec }
    }

    pub fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Decodes a raw notification payload into a typed reading.
    ///
    /// Returns a `Decode` error on malformed length or non-numeric content;
    /// a single corrupt notification must never take down the stream.
    pub fn decode(&self, payload: &[u8]) -> Result<Measurement, LoggerError> {
        match self.codec {
            PayloadCodec::MovementInt16x9 => decode_movement(payload),
            PayloadCodec::AsciiTriplet => {
                let values = decode_ascii_values(payload)?;
                let xyz = XYZ::try_from(values).map_err(|e| LoggerError::Decode(e.to_string()))?;
                Ok(Measurement::Triaxial(xyz))
            }
            PayloadCodec::AsciiScalar => {
                let values = decode_ascii_values(payload)?;
                match values.as_slice() {
                    [value] => Ok(Measurement::Scalar(Scalar::new(*value))),
                    _ => Err(LoggerError::Decode(format!(
                        "Expected a single value, got {}",
                        values.len()
                    ))),
                }
            }
        }
    }
}

// 9 x int16, little-endian: Gx,Gy,Gz, Ax,Ay,Az, Mx,My,Mz
fn decode_movement(payload: &[u8]) -> Result<Measurement, LoggerError> {
    if payload.len() < MOVEMENT_PAYLOAD_LEN {
        return Err(LoggerError::Decode(format!(
            "Movement payload too short: {} bytes",
            payload.len()
        )));
    }
    let values = payload[..MOVEMENT_PAYLOAD_LEN]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64)
        .collect();
    Ok(Measurement::Packed(values))
}

// Text frames look like "A 0.98,0.01,9.81" or "H 72": a label, a space, then
// comma-separated numbers.
fn decode_ascii_values(payload: &[u8]) -> Result<Vec<f64>, LoggerError> {
    let text =
        std::str::from_utf8(payload).map_err(|e| LoggerError::Decode(e.to_string()))?;
    let fields = text
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| LoggerError::Decode(format!("Missing value field in '{}'", text)))?;
    fields
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| LoggerError::Decode(format!("'{}': {}", field, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MOVEMENT_DATA_UUID, NANO_ACCEL_UUID, NANO_HEART_UUID};

    fn movement_payload(values: [i16; 9]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_movement_payload() {
        let spec = ChannelSpec::new(
            ChannelKind::Movement,
            MOVEMENT_DATA_UUID,
            PayloadCodec::MovementInt16x9,
        );
        let payload = movement_payload([1, -2, 3, 4, 5, 6, 7, 8, -9]);
        let measurement = spec.decode(&payload).unwrap();
        assert_eq!(
            measurement.values(),
            vec![1.0, -2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, -9.0]
        );
    }

    #[test]
    fn test_decode_movement_ignores_trailing_bytes() {
        let spec = ChannelSpec::new(
            ChannelKind::Movement,
            MOVEMENT_DATA_UUID,
            PayloadCodec::MovementInt16x9,
        );
        let mut payload = movement_payload([0; 9]);
        payload.extend_from_slice(&[0xFF, 0xFF]);
        assert!(spec.decode(&payload).is_ok());
    }

    #[test]
    fn test_decode_movement_short_payload() {
        let spec = ChannelSpec::new(
            ChannelKind::Movement,
            MOVEMENT_DATA_UUID,
            PayloadCodec::MovementInt16x9,
        );
        let result = spec.decode(&[0u8; 17]);
        assert!(matches!(result, Err(LoggerError::Decode(_))));
    }

    #[test]
    fn test_decode_ascii_triplet() {
        let spec = ChannelSpec::new(
            ChannelKind::Accelerometer,
            NANO_ACCEL_UUID,
            PayloadCodec::AsciiTriplet,
        );
        let measurement = spec.decode(b"A 0.98,0.01,9.81").unwrap();
        assert_eq!(measurement.values(), vec![0.98, 0.01, 9.81]);
    }

    #[test]
    fn test_decode_ascii_scalar() {
        let spec = ChannelSpec::new(
            ChannelKind::HeartRate,
            NANO_HEART_UUID,
            PayloadCodec::AsciiScalar,
        );
        let measurement = spec.decode(b"H 72").unwrap();
        assert_eq!(measurement.values(), vec![72.0]);
    }

    #[test]
    fn test_decode_ascii_malformed() {
        let spec = ChannelSpec::new(
            ChannelKind::Accelerometer,
            NANO_ACCEL_UUID,
            PayloadCodec::AsciiTriplet,
        );
        assert!(spec.decode(b"A").is_err());
        assert!(spec.decode(b"A x,y,z").is_err());
        assert!(spec.decode(b"A 1.0,2.0").is_err());
        assert!(spec.decode(&[0xFF, 0xFE, 0x00]).is_err());
    }
}
