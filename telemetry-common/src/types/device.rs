use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a discovered peripheral.
///
/// Captured once during scanning and immutable for the rest of the run. The
/// transport address tells devices apart when several advertise the same name
/// pattern (e.g. two `CC2650 SensorTag` units).
///
/// # Examples
///
/// ```
/// use telemetry_common::DeviceIdentity;
///
/// let identity = DeviceIdentity::new("CC2650 SensorTag", "54:6C:0E:B7:86:01");
/// assert_eq!(identity.name(), "CC2650 SensorTag");
/// assert_eq!(format!("{}", identity), "CC2650 SensorTag @ 54:6C:0E:B7:86:01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    name: String,
    address: String,
}

impl DeviceIdentity {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.address)
    }
}
