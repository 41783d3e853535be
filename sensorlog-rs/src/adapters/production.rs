// BLE central backed by btleplug: scanning, connection, GATT writes and
// notification streaming against real hardware.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, ValueNotification,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use telemetry_common::DeviceIdentity;

use crate::models::errors::LoggerError;
use crate::ports::{BleConnection, BleTransport, Notification};

/// Production transport: the first BLE adapter of the host.
pub struct BleCentral {
    adapter: Adapter,
}

impl BleCentral {
    /// Returns a `ClientBuild` error when the host exposes no BLE adapter.
    pub async fn new() -> Result<Self, LoggerError> {
        let manager = Manager::new()
            .await
            .map_err(|e| LoggerError::ClientBuild(e.to_string()))?;
        let adapter = manager
            .adapters()
            .await
            .map_err(|e| LoggerError::ClientBuild(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| LoggerError::ClientBuild("No BLE adapter found".to_string()))?;
        Ok(Self { adapter })
    }

    async fn peripheral_by_address(&self, address: &str) -> Result<Peripheral, LoggerError> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| LoggerError::Connect(e.to_string()))?;
        for peripheral in peripherals {
            if let Ok(Some(properties)) = peripheral.properties().await {
                if properties.address.to_string() == address {
                    return Ok(peripheral);
                }
            }
        }
        Err(LoggerError::Connect(format!(
            "Peripheral {} no longer visible",
            address
        )))
    }
}

#[async_trait]
impl BleTransport for BleCentral {
    type Conn = BleDeviceConnection;

    async fn discover(&self, timeout: Duration) -> Result<Vec<DeviceIdentity>, LoggerError> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| LoggerError::Discover(e.to_string()))?;
        tokio::time::sleep(timeout).await;
        self.adapter
            .stop_scan()
            .await
            .map_err(|e| LoggerError::Discover(e.to_string()))?;

        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| LoggerError::Discover(e.to_string()))?;
        let mut identities = Vec::new();
        for peripheral in peripherals {
            if let Ok(Some(properties)) = peripheral.properties().await {
                // unnamed advertisements can't be matched against a profile
                if let Some(name) = properties.local_name {
                    identities.push(DeviceIdentity::new(&name, &properties.address.to_string()));
                }
            }
        }
        Ok(identities)
    }

    async fn connect(&self, identity: &DeviceIdentity) -> Result<Self::Conn, LoggerError> {
        let peripheral = self.peripheral_by_address(identity.address()).await?;
        peripheral
            .connect()
            .await
            .map_err(|e| LoggerError::Connect(e.to_string()))?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| LoggerError::Connect(e.to_string()))?;
        let notifications = peripheral
            .notifications()
            .await
            .map_err(|e| LoggerError::Subscribe(e.to_string()))?;
        Ok(BleDeviceConnection {
            peripheral,
            notifications,
        })
    }
}

pub struct BleDeviceConnection {
    peripheral: Peripheral,
    notifications: Pin<Box<dyn Stream<Item = ValueNotification> + Send>>,
}

impl BleDeviceConnection {
    fn characteristic(&self, uuid: Uuid) -> Option<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|characteristic| characteristic.uuid == uuid)
    }
}

#[async_trait]
impl BleConnection for BleDeviceConnection {
    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), LoggerError> {
        let target = self.characteristic(characteristic).ok_or_else(|| {
            LoggerError::Write(format!("Characteristic {} not found", characteristic))
        })?;
        self.peripheral
            .write(&target, payload, WriteType::WithResponse)
            .await
            .map_err(|e| LoggerError::Write(e.to_string()))
    }

    async fn subscribe(&mut self, channel: Uuid) -> Result<(), LoggerError> {
        let target = self
            .characteristic(channel)
            .ok_or_else(|| LoggerError::Subscribe(format!("Characteristic {} not found", channel)))?;
        self.peripheral
            .subscribe(&target)
            .await
            .map_err(|e| LoggerError::Subscribe(e.to_string()))
    }

    async fn unsubscribe(&mut self, channel: Uuid) -> Result<(), LoggerError> {
        let target = self
            .characteristic(channel)
            .ok_or_else(|| LoggerError::Subscribe(format!("Characteristic {} not found", channel)))?;
        self.peripheral
            .unsubscribe(&target)
            .await
            .map_err(|e| LoggerError::Subscribe(e.to_string()))
    }

    async fn next_notification(&mut self) -> Option<Notification> {
        self.notifications.next().await.map(|value| Notification {
            channel: value.uuid,
            payload: value.value,
        })
    }

    async fn disconnect(&mut self) -> Result<(), LoggerError> {
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| LoggerError::Connect(e.to_string()))
    }
}
