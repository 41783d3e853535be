use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use telemetry_common::DeviceIdentity;

use crate::models::errors::LoggerError;

/// One raw push-notification from a peripheral.
#[derive(Clone, Debug)]
pub struct Notification {
    pub channel: Uuid,
    pub payload: Vec<u8>,
}

/// An open connection to one peripheral. Exclusive to that device's
/// supervisor; no other task issues I/O against it.
///
/// All of a device's channels arrive through `next_notification`, so
/// processing for one device is naturally serialized.
#[async_trait]
pub trait BleConnection: Send {
    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), LoggerError>;

    async fn subscribe(&mut self, channel: Uuid) -> Result<(), LoggerError>;

    async fn unsubscribe(&mut self, channel: Uuid) -> Result<(), LoggerError>;

    /// Waits for the next notification. `None` means the connection dropped.
    async fn next_notification(&mut self) -> Option<Notification>;

    async fn disconnect(&mut self) -> Result<(), LoggerError>;
}

/// The wireless transport boundary. The core never touches radio I/O
/// directly; it drives this contract.
#[async_trait]
pub trait BleTransport: Send + Sync + 'static {
    type Conn: BleConnection;

    /// Scans for `timeout` and returns every named peripheral seen.
    async fn discover(&self, timeout: Duration) -> Result<Vec<DeviceIdentity>, LoggerError>;

    async fn connect(&self, identity: &DeviceIdentity) -> Result<Self::Conn, LoggerError>;
}
