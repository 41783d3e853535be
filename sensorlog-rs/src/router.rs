//! Demultiplexes a device's notification stream into typed channel readings.

use std::collections::HashMap;

use log::warn;
use uuid::Uuid;

use telemetry_common::{ChannelKind, Sample};

use crate::assembler::SampleAssembler;
use crate::channels::ChannelSpec;

/// Routes raw notifications by channel identity, decodes them, and feeds the
/// device's sample assembler.
///
/// Unknown channels and malformed payloads are discarded with a diagnostic;
/// neither can crash the stream or propagate past this boundary.
pub struct NotificationRouter {
    specs: HashMap<Uuid, ChannelSpec>,
    assembler: SampleAssembler,
}

impl NotificationRouter {
    pub fn new(channels: &[ChannelSpec]) -> Self {
        let expected: Vec<ChannelKind> = channels.iter().map(|spec| spec.kind().clone()).collect();
        let specs = channels
            .iter()
            .map(|spec| (spec.uuid(), spec.clone()))
            .collect();
        Self {
            specs,
            assembler: SampleAssembler::new(&expected),
        }
    }

    /// Handles one inbound notification; returns a sample when this reading
    /// completed the device's expected set.
    pub fn on_notification(
        &mut self,
        channel: Uuid,
        payload: &[u8],
        arrival_secs: f64,
    ) -> Option<Sample> {
        let spec = match self.specs.get(&channel) {
            Some(spec) => spec,
            None => {
                warn!("Dropping notification on unexpected channel {}", channel);
                return None;
            }
        };
        let kind = spec.kind().clone();
        match spec.decode(payload) {
            Ok(measurement) => self.assembler.update(&kind, measurement, arrival_secs),
            Err(e) => {
                warn!("Dropping undecodable {} notification: {:?}", kind, e);
                None
            }
        }
    }

    pub fn last_seen(&self) -> &HashMap<ChannelKind, f64> {
        self.assembler.last_seen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::PayloadCodec;
    use crate::constants::{NANO_ACCEL_UUID, NANO_GYRO_UUID, NANO_HEART_UUID, NANO_MAG_UUID};

    fn nano_channels() -> Vec<ChannelSpec> {
        vec![
            ChannelSpec::new(ChannelKind::Gyroscope, NANO_GYRO_UUID, PayloadCodec::AsciiTriplet),
            ChannelSpec::new(
                ChannelKind::Accelerometer,
                NANO_ACCEL_UUID,
                PayloadCodec::AsciiTriplet,
            ),
            ChannelSpec::new(
                ChannelKind::Magnetometer,
                NANO_MAG_UUID,
                PayloadCodec::AsciiTriplet,
            ),
            ChannelSpec::new(ChannelKind::HeartRate, NANO_HEART_UUID, PayloadCodec::AsciiScalar),
        ]
    }

    #[test]
    fn test_routes_to_completion() {
        let mut router = NotificationRouter::new(&nano_channels());
        assert!(router
            .on_notification(NANO_GYRO_UUID, b"G 1.0,2.0,3.0", 1.0)
            .is_none());
        assert!(router
            .on_notification(NANO_ACCEL_UUID, b"A 4.0,5.0,6.0", 2.0)
            .is_none());
        assert!(router
            .on_notification(NANO_MAG_UUID, b"M 7.0,8.0,9.0", 3.0)
            .is_none());
        let sample = router
            .on_notification(NANO_HEART_UUID, b"H 72", 4.0)
            .expect("all four channels present");

        assert_eq!(sample.timestamp_secs(), 4.0);
        assert_eq!(
            sample.values(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 72.0]
        );
    }

    #[test]
    fn test_unknown_channel_discarded() {
        let mut router = NotificationRouter::new(&nano_channels());
        let unknown = uuid::Uuid::new_v4();
        assert!(router.on_notification(unknown, b"A 1.0,2.0,3.0", 1.0).is_none());
        assert!(router.last_seen().is_empty());
    }

    #[test]
    fn test_decode_failure_discarded_without_state_change() {
        let mut router = NotificationRouter::new(&nano_channels());
        router.on_notification(NANO_GYRO_UUID, b"G 1.0,2.0,3.0", 1.0);
        // malformed payload on a fresh channel: dropped, join still incomplete
        assert!(router
            .on_notification(NANO_ACCEL_UUID, b"garbage", 2.0)
            .is_none());
        assert!(!router.last_seen().contains_key(&ChannelKind::Accelerometer));
    }
}
