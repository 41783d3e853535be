//! GATT identifiers and device defaults for the supported peripherals.

use uuid::{uuid, Uuid};

// CC2650 SensorTag movement service
pub const MOVEMENT_DATA_UUID: Uuid = uuid!("f000aa81-0451-4000-b000-000000000000");
pub const MOVEMENT_CONFIG_UUID: Uuid = uuid!("f000aa82-0451-4000-b000-000000000000");
pub const MOVEMENT_PERIOD_UUID: Uuid = uuid!("f000aa83-0451-4000-b000-000000000000");

/// 0x7F enables gyro+accel+mag on all axes, 0x02 sets accel range (±8 g)
pub const MOVEMENT_CONFIG_BYTES: [u8; 2] = [0x7F, 0x02];
/// 0x0A => 100 ms notification period. Smaller is faster but may be unstable
pub const MOVEMENT_PERIOD_BYTES: [u8; 1] = [0x0A];

// Arduino Nano 33 BLE custom IMU service
pub const NANO_ACCEL_UUID: Uuid = uuid!("0000a001-0000-1000-8000-00805f9b34fb");
pub const NANO_GYRO_UUID: Uuid = uuid!("0000b001-0000-1000-8000-00805f9b34fb");
pub const NANO_MAG_UUID: Uuid = uuid!("0000c001-0000-1000-8000-00805f9b34fb");
pub const NANO_HEART_UUID: Uuid = uuid!("0000d001-0000-1000-8000-00805f9b34fb");

pub const MOVEMENT_PAYLOAD_LEN: usize = 18;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_MILLIS: u64 = 3000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SHUTDOWN_GRACE_MILLIS: u64 = 2000;
