use std::fmt;

/// Classifies the notification channels a peripheral can expose.
///
/// `Movement` is the combined 9-axis payload of the TI SensorTag movement
/// service, which carries gyroscope, accelerometer and magnetometer readings
/// in a single notification. The other variants map one channel to one
/// physical sensor.
///
/// # Examples
///
/// ```
/// use telemetry_common::ChannelKind;
///
/// let kind = ChannelKind::try_from("accelerometer").unwrap();
/// assert_eq!(kind, ChannelKind::Accelerometer);
/// assert_eq!(kind.arity(), 3);
///
/// assert_eq!(ChannelKind::Movement.arity(), 9);
/// assert_eq!(ChannelKind::HeartRate.field_names(), vec!["BPM"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    HeartRate,
    Movement,
    Other(String),
}

impl ChannelKind {
    /// Number of numeric values one reading on this channel carries.
    pub fn arity(&self) -> usize {
        match self {
            ChannelKind::Accelerometer | ChannelKind::Gyroscope | ChannelKind::Magnetometer => 3,
            ChannelKind::HeartRate => 1,
            ChannelKind::Movement => 9,
            ChannelKind::Other(_) => 1,
        }
    }

    /// Column headers for this channel, in the order `values()` flattens them.
    pub fn field_names(&self) -> Vec<String> {
        match self {
            ChannelKind::Accelerometer => vec!["Ax".into(), "Ay".into(), "Az".into()],
            ChannelKind::Gyroscope => vec!["Gx".into(), "Gy".into(), "Gz".into()],
            ChannelKind::Magnetometer => vec!["Mx".into(), "My".into(), "Mz".into()],
            ChannelKind::HeartRate => vec!["BPM".into()],
            ChannelKind::Movement => vec![
                "Gx".into(),
                "Gy".into(),
                "Gz".into(),
                "Ax".into(),
                "Ay".into(),
                "Az".into(),
                "Mx".into(),
                "My".into(),
                "Mz".into(),
            ],
            ChannelKind::Other(name) => vec![name.clone()],
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Accelerometer => write!(f, "accelerometer"),
            ChannelKind::Gyroscope => write!(f, "gyroscope"),
            ChannelKind::Magnetometer => write!(f, "magnetometer"),
            ChannelKind::HeartRate => write!(f, "heart-rate"),
            ChannelKind::Movement => write!(f, "movement"),
            ChannelKind::Other(name) => write!(f, "{}", name),
        }
    }
}

impl TryFrom<&str> for ChannelKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower_case_value = value.to_lowercase();
        if lower_case_value.is_empty() {
            return Err("Empty channel name".to_string());
        }
        if lower_case_value.contains("mov") {
            Ok(Self::Movement)
        } else if lower_case_value.contains("acc") {
            Ok(Self::Accelerometer)
        } else if lower_case_value.contains("gyr") {
            Ok(Self::Gyroscope)
        } else if lower_case_value.contains("mag") {
            Ok(Self::Magnetometer)
        } else if lower_case_value.contains("heart") || lower_case_value.contains("bpm") {
            Ok(Self::HeartRate)
        } else {
            Ok(Self::Other(lower_case_value))
        }
    }
}

impl TryFrom<String> for ChannelKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChannelKind::try_from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            ChannelKind::try_from("accelerometer").unwrap(),
            ChannelKind::Accelerometer
        );
        assert_eq!(
            ChannelKind::try_from("gyroscope").unwrap(),
            ChannelKind::Gyroscope
        );
        assert_eq!(
            ChannelKind::try_from("magnetometer").unwrap(),
            ChannelKind::Magnetometer
        );
        assert_eq!(
            ChannelKind::try_from("heart_rate").unwrap(),
            ChannelKind::HeartRate
        );
        assert_eq!(
            ChannelKind::try_from("movement").unwrap(),
            ChannelKind::Movement
        );
        assert_eq!(
            ChannelKind::try_from("pressure").unwrap(),
            ChannelKind::Other("pressure".to_string())
        );
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            ChannelKind::try_from("ACCEleroMeter").unwrap(),
            ChannelKind::Accelerometer
        );
        assert_eq!(
            ChannelKind::try_from("gyrosCOPE").unwrap(),
            ChannelKind::Gyroscope
        );
        assert_eq!(
            ChannelKind::try_from("HeartRate").unwrap(),
            ChannelKind::HeartRate
        );
    }

    #[test]
    fn test_from_str_partial_match() {
        assert_eq!(
            ChannelKind::try_from("acC").unwrap(),
            ChannelKind::Accelerometer
        );
        assert_eq!(ChannelKind::try_from("GyR").unwrap(), ChannelKind::Gyroscope);
        assert_eq!(
            ChannelKind::try_from("Mag").unwrap(),
            ChannelKind::Magnetometer
        );
        assert_eq!(ChannelKind::try_from("bpm").unwrap(), ChannelKind::HeartRate);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(ChannelKind::try_from("").is_err());
    }

    #[test]
    fn test_arity_matches_field_names() {
        let kinds = [
            ChannelKind::Accelerometer,
            ChannelKind::Gyroscope,
            ChannelKind::Magnetometer,
            ChannelKind::HeartRate,
            ChannelKind::Movement,
            ChannelKind::Other("pressure".to_string()),
        ];
        for kind in kinds {
            assert_eq!(kind.arity(), kind.field_names().len());
        }
    }
}
