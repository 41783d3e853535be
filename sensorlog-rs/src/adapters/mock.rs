// Emulates a BLE central for tests: scripted devices, scripted notification
// sessions, injectable connect/write failures.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use telemetry_common::DeviceIdentity;

use crate::models::errors::LoggerError;
use crate::ports::{BleConnection, BleTransport, Notification};

/// One scripted event inside a mock connection session.
#[derive(Clone, Debug)]
pub enum MockEvent {
    /// Deliver a notification after `delay_millis`.
    Notify {
        channel: Uuid,
        payload: Vec<u8>,
        delay_millis: u64,
    },
    /// Tear the connection down after `delay_millis`.
    Drop { delay_millis: u64 },
}

/// The notifications one successful connection will observe, in order. A
/// session without a `Drop` event stays open (and silent) once exhausted.
#[derive(Clone, Debug, Default)]
pub struct MockSession {
    events: Vec<MockEvent>,
}

impl MockSession {
    pub fn new(events: Vec<MockEvent>) -> Self {
        Self { events }
    }
}

struct MockDeviceState {
    identity: DeviceIdentity,
    fail_connects: u32,
    fail_writes: Arc<AtomicU32>,
    fail_subscribes: Arc<AtomicU32>,
    sessions: VecDeque<MockSession>,
    writes: Arc<Mutex<Vec<(Uuid, Vec<u8>)>>>,
    connect_attempts: u32,
}

/// Scripted transport implementing the [`BleTransport`] contract.
#[derive(Default)]
pub struct MockTransport {
    devices: Mutex<HashMap<String, MockDeviceState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_device(&self, identity: DeviceIdentity, sessions: Vec<MockSession>) {
        let mut devices = self.devices.lock().await;
        devices.insert(
            identity.address().to_string(),
            MockDeviceState {
                identity,
                fail_connects: 0,
                fail_writes: Arc::new(AtomicU32::new(0)),
                fail_subscribes: Arc::new(AtomicU32::new(0)),
                sessions: sessions.into(),
                writes: Arc::new(Mutex::new(Vec::new())),
                connect_attempts: 0,
            },
        );
    }

    /// The next `count` connect attempts against this device will fail.
    pub async fn fail_next_connects(&self, identity: &DeviceIdentity, count: u32) {
        if let Some(device) = self.devices.lock().await.get_mut(identity.address()) {
            device.fail_connects = count;
        }
    }

    /// The next `count` characteristic writes on this device will fail.
    pub async fn fail_next_writes(&self, identity: &DeviceIdentity, count: u32) {
        if let Some(device) = self.devices.lock().await.get(identity.address()) {
            device.fail_writes.store(count, Ordering::SeqCst);
        }
    }

    /// The next `count` channel subscriptions on this device will fail.
    pub async fn fail_next_subscribes(&self, identity: &DeviceIdentity, count: u32) {
        if let Some(device) = self.devices.lock().await.get(identity.address()) {
            device.fail_subscribes.store(count, Ordering::SeqCst);
        }
    }

    pub async fn recorded_writes(&self, identity: &DeviceIdentity) -> Vec<(Uuid, Vec<u8>)> {
        match self.devices.lock().await.get(identity.address()) {
            Some(device) => device.writes.lock().await.clone(),
            None => Vec::new(),
        }
    }

    pub async fn connect_attempts(&self, identity: &DeviceIdentity) -> u32 {
        self.devices
            .lock()
            .await
            .get(identity.address())
            .map(|device| device.connect_attempts)
            .unwrap_or(0)
    }
}

enum FeedItem {
    Note(Notification),
    Drop,
}

#[async_trait]
impl BleTransport for MockTransport {
    type Conn = MockConnection;

    async fn discover(&self, _timeout: Duration) -> Result<Vec<DeviceIdentity>, LoggerError> {
        let devices = self.devices.lock().await;
        Ok(devices.values().map(|device| device.identity.clone()).collect())
    }

    async fn connect(&self, identity: &DeviceIdentity) -> Result<Self::Conn, LoggerError> {
        let mut devices = self.devices.lock().await;
        let device = devices
            .get_mut(identity.address())
            .ok_or_else(|| LoggerError::Connect(format!("Unknown device {}", identity)))?;
        device.connect_attempts += 1;

        if device.fail_connects > 0 {
            device.fail_connects -= 1;
            return Err(LoggerError::Connect("simulated connect failure".to_string()));
        }
        let session = device
            .sessions
            .pop_front()
            .ok_or_else(|| LoggerError::Connect("no scripted session left".to_string()))?;

        let (tx, rx) = mpsc::channel(32);
        let keepalive = tx.clone();
        tokio::spawn(async move {
            for event in session.events {
                match event {
                    MockEvent::Notify {
                        channel,
                        payload,
                        delay_millis,
                    } => {
                        tokio::time::sleep(Duration::from_millis(delay_millis)).await;
                        if tx
                            .send(FeedItem::Note(Notification { channel, payload }))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    MockEvent::Drop { delay_millis } => {
                        tokio::time::sleep(Duration::from_millis(delay_millis)).await;
                        let _ = tx.send(FeedItem::Drop).await;
                        break;
                    }
                }
            }
        });

        Ok(MockConnection {
            rx,
            _keepalive: keepalive,
            subscribed: HashSet::new(),
            writes: Arc::clone(&device.writes),
            fail_writes: Arc::clone(&device.fail_writes),
            fail_subscribes: Arc::clone(&device.fail_subscribes),
            open: true,
        })
    }
}

pub struct MockConnection {
    rx: mpsc::Receiver<FeedItem>,
    _keepalive: mpsc::Sender<FeedItem>,
    subscribed: HashSet<Uuid>,
    writes: Arc<Mutex<Vec<(Uuid, Vec<u8>)>>>,
    fail_writes: Arc<AtomicU32>,
    fail_subscribes: Arc<AtomicU32>,
    open: bool,
}

#[async_trait]
impl BleConnection for MockConnection {
    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), LoggerError> {
        if !self.open {
            return Err(LoggerError::Write("connection closed".to_string()));
        }
        let pending_failures = self.fail_writes.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.fail_writes.store(pending_failures - 1, Ordering::SeqCst);
            return Err(LoggerError::Write("simulated write failure".to_string()));
        }
        self.writes.lock().await.push((characteristic, payload.to_vec()));
        Ok(())
    }

    async fn subscribe(&mut self, channel: Uuid) -> Result<(), LoggerError> {
        if !self.open {
            return Err(LoggerError::Subscribe("connection closed".to_string()));
        }
        let pending_failures = self.fail_subscribes.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.fail_subscribes.store(pending_failures - 1, Ordering::SeqCst);
            return Err(LoggerError::Subscribe(
                "simulated subscribe failure".to_string(),
            ));
        }
        self.subscribed.insert(channel);
        Ok(())
    }

    async fn unsubscribe(&mut self, channel: Uuid) -> Result<(), LoggerError> {
        self.subscribed.remove(&channel);
        Ok(())
    }

    async fn next_notification(&mut self) -> Option<Notification> {
        loop {
            if !self.open {
                return None;
            }
            match self.rx.recv().await {
                Some(FeedItem::Note(notification)) => {
                    // unsubscribed channels are invisible to the caller
                    if self.subscribed.contains(&notification.channel) {
                        return Some(notification);
                    }
                }
                Some(FeedItem::Drop) | None => {
                    self.open = false;
                    return None;
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), LoggerError> {
        self.open = false;
        Ok(())
    }
}
