//! Shared types for the `sensorlog-rs` workspace

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::sink::SampleSink;

// Re-export types
#[doc(inline)]
pub use types::{ChannelKind, Clock, DeviceIdentity, Measurement, Sample, Scalar, XYZ};
