use std::time::Duration;

use telemetry_common::ChannelKind;
use uuid::Uuid;

use crate::channels::{ChannelSpec, PayloadCodec};
use crate::constants::{
    DEFAULT_BACKOFF_MILLIS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_SCAN_TIMEOUT_SECS, DEFAULT_SHUTDOWN_GRACE_MILLIS, MOVEMENT_CONFIG_BYTES,
    MOVEMENT_CONFIG_UUID, MOVEMENT_DATA_UUID, MOVEMENT_PERIOD_BYTES, MOVEMENT_PERIOD_UUID,
    NANO_ACCEL_UUID, NANO_GYRO_UUID, NANO_HEART_UUID, NANO_MAG_UUID,
};

/// Static description of one device type: how to recognize it during
/// discovery, which channels to subscribe, and which setup writes to issue
/// before streaming.
///
/// The channel list order fixes the column order of emitted rows.
#[derive(Clone, Debug)]
pub struct DeviceProfile {
    label: String,
    name_filters: Vec<String>,
    channels: Vec<ChannelSpec>,
    setup_writes: Vec<(Uuid, Vec<u8>)>,
}

impl DeviceProfile {
    pub fn new(
        label: &str,
        name_filters: Vec<String>,
        channels: Vec<ChannelSpec>,
        setup_writes: Vec<(Uuid, Vec<u8>)>,
    ) -> Self {
        Self {
            label: label.to_string(),
            name_filters,
            channels,
            setup_writes,
        }
    }

    /// TI CC2650 SensorTag: one combined movement channel (9 x int16), with
    /// setup writes enabling all axes and selecting a 100 ms period.
    pub fn ti_sensortag() -> Self {
        Self::new(
            "CC2650 SensorTag",
            vec!["CC2650".to_string(), "SensorTag".to_string()],
            vec![ChannelSpec::new(
                ChannelKind::Movement,
                MOVEMENT_DATA_UUID,
                PayloadCodec::MovementInt16x9,
            )],
            vec![
                (MOVEMENT_CONFIG_UUID, MOVEMENT_CONFIG_BYTES.to_vec()),
                (MOVEMENT_PERIOD_UUID, MOVEMENT_PERIOD_BYTES.to_vec()),
            ],
        )
    }

    /// Arduino Nano 33 BLE firmware: four independent text channels. Column
    /// order is gyro, accel, mag, heart-rate.
    pub fn nano33_imu() -> Self {
        Self::new(
            "nRF_IMU",
            vec!["nRF_IMU".to_string()],
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
            ],
            vec![],
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    pub fn setup_writes(&self) -> &[(Uuid, Vec<u8>)] {
        &self.setup_writes
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name_filters
            .iter()
            .any(|filter| name.contains(filter.as_str()))
    }

    /// The first channel kind declared more than once, if any. Sample
    /// assembly keys pending readings by kind, so a profile repeating a kind
    /// could never complete a row.
    pub fn duplicate_kind(&self) -> Option<&ChannelKind> {
        self.channels.iter().enumerate().find_map(|(index, spec)| {
            self.channels[..index]
                .iter()
                .any(|earlier| earlier.kind() == spec.kind())
                .then(|| spec.kind())
        })
    }
}

/// Run-wide configuration of the logger service.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub profile: DeviceProfile,
    pub max_retries: u32,
    pub backoff_interval: Duration,
    pub connect_timeout: Duration,
    pub scan_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl LoggerConfig {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_interval: Duration::from_millis(DEFAULT_BACKOFF_MILLIS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
            shutdown_grace: Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_MILLIS),
        }
    }
}
