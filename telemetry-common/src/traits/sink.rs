use async_trait::async_trait;

use crate::types::device::DeviceIdentity;
use crate::types::sample::Sample;

/// Durable, append-only destination for completed samples.
///
/// The core calls `emit` exactly once per joined sample and never reads
/// back. Implementations own their serialization: if one destination is
/// shared across devices, interleaved rows must not corrupt a row's field
/// layout.
#[async_trait]
pub trait SampleSink: Send {
    /// Appends one row. An error is fatal for the emitting device's stream.
    async fn emit(&mut self, identity: &DeviceIdentity, sample: &Sample) -> Result<(), String>;

    /// Forces buffered rows to durable storage. Called before a device's
    /// resources are released so no assembled sample is lost on shutdown.
    async fn flush(&mut self) -> Result<(), String>;
}
