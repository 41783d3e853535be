//! Joins independent channel readings into complete per-device samples.

use std::collections::HashMap;

use telemetry_common::{ChannelKind, Measurement, Sample};

/// Per-device buffer holding the most recent reading for each expected
/// channel.
///
/// A new reading on a channel overwrites, never queues, the previous value
/// for that channel: when producers race, freshness wins over completeness.
/// The buffer is reset to all-empty immediately after a sample is emitted,
/// and a reconnecting device gets a fresh assembler so pre-disconnect
/// readings are never joined with post-reconnect ones.
#[derive(Debug, Clone)]
pub struct SampleAssembler {
    expected: Vec<ChannelKind>,
    slots: HashMap<ChannelKind, Measurement>,
    last_seen: HashMap<ChannelKind, f64>,
}

impl SampleAssembler {
    pub fn new(expected: &[ChannelKind]) -> Self {
        Self {
            expected: expected.to_vec(),
            slots: HashMap::new(),
            last_seen: HashMap::new(),
        }
    }

    /// Stores one reading and returns a complete sample when every expected
    /// channel holds a value.
    ///
    /// The emitted sample carries the timestamp of the reading that completed
    /// the set. Readings for channels outside the expected set are ignored.
    pub fn update(
        &mut self,
        kind: &ChannelKind,
        measurement: Measurement,
        timestamp_secs: f64,
    ) -> Option<Sample> {
        if !self.expected.contains(kind) {
            return None;
        }
        self.slots.insert(kind.clone(), measurement);
        self.last_seen.insert(kind.clone(), timestamp_secs);

        if self.slots.len() < self.expected.len() {
            return None;
        }

        let mut fields = Vec::with_capacity(self.expected.len());
        for expected_kind in &self.expected {
            let measurement = self.slots.get(expected_kind)?;
            fields.push((expected_kind.clone(), measurement.clone()));
        }
        self.slots.clear();
        Some(Sample::new(timestamp_secs, fields))
    }

    /// Host timestamp of the most recent reading per channel, across resets.
    pub fn last_seen(&self) -> &HashMap<ChannelKind, f64> {
        &self.last_seen
    }

    pub fn expected(&self) -> &[ChannelKind] {
        &self.expected
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_common::{Scalar, XYZ};

    fn triaxial(x: f64) -> Measurement {
        Measurement::Triaxial(XYZ::new([x, x, x]))
    }

    fn triple() -> Vec<ChannelKind> {
        vec![
            ChannelKind::Accelerometer,
            ChannelKind::Gyroscope,
            ChannelKind::Magnetometer,
        ]
    }

    #[test]
    fn test_emits_only_when_complete() {
        let mut assembler = SampleAssembler::new(&triple());

        assert!(assembler
            .update(&ChannelKind::Accelerometer, triaxial(1.0), 1.0)
            .is_none());
        assert!(assembler
            .update(&ChannelKind::Gyroscope, triaxial(2.0), 2.0)
            .is_none());
        let sample = assembler
            .update(&ChannelKind::Magnetometer, triaxial(3.0), 3.0)
            .expect("third channel completes the set");

        assert_eq!(sample.timestamp_secs(), 3.0);
        assert_eq!(sample.fields().len(), 3);
    }

    #[test]
    fn test_sample_timestamp_is_last_arrival() {
        let mut assembler = SampleAssembler::new(&triple());
        assembler.update(&ChannelKind::Magnetometer, triaxial(3.0), 10.0);
        assembler.update(&ChannelKind::Gyroscope, triaxial(2.0), 11.5);
        let sample = assembler
            .update(&ChannelKind::Accelerometer, triaxial(1.0), 12.0)
            .unwrap();
        assert_eq!(sample.timestamp_secs(), 12.0);
    }

    #[test]
    fn test_reset_after_emission() {
        let mut assembler = SampleAssembler::new(&triple());
        assembler.update(&ChannelKind::Accelerometer, triaxial(1.0), 1.0);
        assembler.update(&ChannelKind::Gyroscope, triaxial(2.0), 2.0);
        assert!(assembler
            .update(&ChannelKind::Magnetometer, triaxial(3.0), 3.0)
            .is_some());

        assert!(assembler.is_empty());
        // replaying one channel must not immediately re-trigger emission
        assert!(assembler
            .update(&ChannelKind::Accelerometer, triaxial(4.0), 4.0)
            .is_none());
    }

    #[test]
    fn test_overwrite_keeps_freshest_value() {
        let mut assembler = SampleAssembler::new(&triple());
        assembler.update(&ChannelKind::Accelerometer, triaxial(1.0), 1.0);
        assembler.update(&ChannelKind::Accelerometer, triaxial(9.0), 2.0);
        assembler.update(&ChannelKind::Gyroscope, triaxial(2.0), 3.0);
        let sample = assembler
            .update(&ChannelKind::Magnetometer, triaxial(3.0), 4.0)
            .unwrap();

        let accel = sample.measurement(&ChannelKind::Accelerometer).unwrap();
        assert_eq!(accel.values(), vec![9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_unexpected_channel_ignored() {
        let mut assembler = SampleAssembler::new(&triple());
        assembler.update(&ChannelKind::Accelerometer, triaxial(1.0), 1.0);
        assembler.update(&ChannelKind::Gyroscope, triaxial(2.0), 2.0);
        assert!(assembler
            .update(
                &ChannelKind::HeartRate,
                Measurement::Scalar(Scalar::new(72.0)),
                3.0
            )
            .is_none());
        // set still incomplete
        assert!(!assembler.is_empty());
    }

    #[test]
    fn test_single_channel_device_emits_every_update() {
        let mut assembler = SampleAssembler::new(&[ChannelKind::Movement]);
        let packed = Measurement::Packed(vec![0.0; 9]);
        assert!(assembler
            .update(&ChannelKind::Movement, packed.clone(), 1.0)
            .is_some());
        assert!(assembler
            .update(&ChannelKind::Movement, packed, 2.0)
            .is_some());
    }

    #[test]
    fn test_last_seen_survives_reset() {
        let mut assembler = SampleAssembler::new(&triple());
        assembler.update(&ChannelKind::Accelerometer, triaxial(1.0), 1.0);
        assembler.update(&ChannelKind::Gyroscope, triaxial(2.0), 2.0);
        assembler.update(&ChannelKind::Magnetometer, triaxial(3.0), 3.0);

        assert_eq!(assembler.last_seen().len(), 3);
        assert_eq!(
            assembler.last_seen().get(&ChannelKind::Accelerometer),
            Some(&1.0)
        );
    }

    // Property from the join contract: over any interleaving of channel
    // updates, a sample is emitted iff every expected channel received at
    // least one update since the last emission.
    #[test]
    fn test_random_interleavings_emit_iff_complete() {
        use rand::seq::SliceRandom;
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let kinds = triple();

        for _ in 0..200 {
            let mut updates: Vec<ChannelKind> = Vec::new();
            for kind in &kinds {
                let repeats = rng.gen_range(1..4);
                for _ in 0..repeats {
                    updates.push(kind.clone());
                }
            }
            updates.shuffle(&mut rng);

            let mut assembler = SampleAssembler::new(&kinds);
            let mut pending: Vec<ChannelKind> = Vec::new();
            for (index, kind) in updates.iter().enumerate() {
                if !pending.contains(kind) {
                    pending.push(kind.clone());
                }
                let emitted = assembler
                    .update(kind, triaxial(index as f64), index as f64)
                    .is_some();
                let complete = kinds.iter().all(|k| pending.contains(k));
                assert_eq!(emitted, complete, "interleaving: {:?}", updates);
                if emitted {
                    pending.clear();
                }
            }
        }
    }
}
