use crate::types::channels::ChannelKind;
use crate::types::measurement::Measurement;

/// A joined record: one reading per expected channel for one device at one
/// instant.
///
/// Constructed only once every expected channel holds a fresh value; the
/// timestamp is the host-arrival time of the reading that completed the set.
/// Immutable once built.
///
/// # Examples
///
/// ```
/// use telemetry_common::{ChannelKind, Measurement, Sample, Scalar};
///
/// let sample = Sample::new(
///     1627846267.0,
///     vec![(ChannelKind::HeartRate, Measurement::Scalar(Scalar::new(72.0)))],
/// );
/// assert_eq!(sample.timestamp_secs(), 1627846267.0);
/// assert_eq!(sample.values(), vec![72.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    timestamp_secs: f64,
    fields: Vec<(ChannelKind, Measurement)>,
}

impl Sample {
    pub fn new(timestamp_secs: f64, fields: Vec<(ChannelKind, Measurement)>) -> Self {
        Self {
            timestamp_secs,
            fields,
        }
    }

    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_secs
    }

    pub fn fields(&self) -> &[(ChannelKind, Measurement)] {
        &self.fields
    }

    /// All numeric values in channel declaration order, ready for one row.
    pub fn values(&self) -> Vec<f64> {
        self.fields
            .iter()
            .flat_map(|(_, measurement)| measurement.values())
            .collect()
    }

    /// The reading recorded for one channel, if it is part of this sample.
    pub fn measurement(&self, kind: &ChannelKind) -> Option<&Measurement> {
        self.fields
            .iter()
            .find(|(field_kind, _)| field_kind == kind)
            .map(|(_, measurement)| measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::untimed::XYZ;

    #[test]
    fn test_values_follow_field_order() {
        let sample = Sample::new(
            10.0,
            vec![
                (
                    ChannelKind::Gyroscope,
                    Measurement::Triaxial(XYZ::new([1.0, 2.0, 3.0])),
                ),
                (
                    ChannelKind::Accelerometer,
                    Measurement::Triaxial(XYZ::new([4.0, 5.0, 6.0])),
                ),
            ],
        );
        assert_eq!(sample.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_measurement_lookup() {
        let sample = Sample::new(
            10.0,
            vec![(
                ChannelKind::Accelerometer,
                Measurement::Triaxial(XYZ::new([4.0, 5.0, 6.0])),
            )],
        );
        assert!(sample.measurement(&ChannelKind::Accelerometer).is_some());
        assert!(sample.measurement(&ChannelKind::Gyroscope).is_none());
    }
}
