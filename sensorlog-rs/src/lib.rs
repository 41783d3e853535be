//! # Crate sensorlog-rs
//!
//! ## sensorlog-rs
//!
//! The `sensorlog-rs` crate records live telemetry from short-range wireless
//! IMU peripherals (TI CC2650 SensorTag, Arduino Nano 33 BLE) and writes a
//! time-ordered, column-aligned log of synchronized samples. Each peripheral
//! exposes independent notification channels (accelerometer, gyroscope,
//! magnetometer, heart-rate); a row is emitted exactly when every channel of
//! a device has delivered a fresh reading.
//!
//! Features include:
//! - Discovery and name-based filtering of matching peripherals.
//! - One independent supervisor per device: connect, configure, subscribe,
//!   stream, and bounded reconnect without disturbing other devices.
//! - Per-device sample assembly that joins channel notifications into
//!   complete rows, discarding stale readings across reconnects.
//! - CSV output, one timestamped file per device, flushed row by row.
//! - Coordinated shutdown on Ctrl+C with a bounded grace period.
//!
//! **NOTE** The wireless transport sits behind the [`ports::BleTransport`]
//! boundary; a scripted mock transport is available for tests.

pub mod adapters;
pub mod assembler;
pub mod channels;
pub mod constants;
pub mod models;
pub mod ports;
pub mod router;
pub mod services;
pub mod sinks;
pub mod supervisor;
