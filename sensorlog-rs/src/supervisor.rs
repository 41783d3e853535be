//! Per-device connection lifecycle: connect, configure, subscribe, stream,
//! and bounded reconnect.

use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info, warn};
use uuid::Uuid;

use telemetry_common::{ChannelKind, Clock, DeviceIdentity, SampleSink};

use crate::models::config::LoggerConfig;
use crate::models::session::{ConnectionState, DeviceReport, DeviceSession};
use crate::models::shutdown::StopSignal;
use crate::ports::{BleConnection, BleTransport};
use crate::router::NotificationRouter;

enum StreamEnd {
    Dropped,
    Stopped,
    SinkFailed,
}

/// Owns the full lifecycle of exactly one peripheral.
///
/// Faults stay device-local: exhausted retries and sink failures terminate
/// this supervisor only, never its siblings. Every suspension point honors
/// the shared stop signal.
pub struct DeviceSupervisor<T: BleTransport> {
    transport: Arc<T>,
    config: Arc<LoggerConfig>,
    session: DeviceSession,
    stop: Arc<StopSignal>,
    sink: Box<dyn SampleSink>,
    samples_emitted: u64,
    last_seen: HashMap<ChannelKind, f64>,
    failure: Option<String>,
}

impl<T: BleTransport> DeviceSupervisor<T> {
    pub fn new(
        transport: Arc<T>,
        identity: DeviceIdentity,
        config: Arc<LoggerConfig>,
        stop: Arc<StopSignal>,
        sink: Box<dyn SampleSink>,
    ) -> Self {
        Self {
            transport,
            config,
            session: DeviceSession::new(identity),
            stop,
            sink,
            samples_emitted: 0,
            last_seen: HashMap::new(),
            failure: None,
        }
    }

    /// Drives the device until a terminal state, then reports.
    pub async fn run(mut self) -> DeviceReport {
        loop {
            let mut conn = match self.connect_with_retry().await {
                Some(conn) => conn,
                None => break,
            };

            self.configure(&mut conn).await;

            if let Err(e) = self.subscribe_all(&mut conn).await {
                warn!("{}: subscribe failed: {:?}", self.session.identity(), e);
                self.release_connection(&mut conn).await;
                if self.stop.is_stopped() {
                    self.session.set_state(ConnectionState::Stopped);
                    break;
                }
                self.session.set_state(ConnectionState::Disconnected);
                if !self.retry_or_fail("subscribe failed").await {
                    break;
                }
                continue;
            }

            // a fresh streaming phase gets a fresh retry budget
            self.session.reset_retries();

            match self.stream(&mut conn).await {
                StreamEnd::Stopped => {
                    self.release_connection(&mut conn).await;
                    self.session.set_state(ConnectionState::Stopped);
                    break;
                }
                StreamEnd::SinkFailed => {
                    self.release_connection(&mut conn).await;
                    self.session.set_state(ConnectionState::Failed);
                    break;
                }
                StreamEnd::Dropped => {
                    warn!("{}: connection dropped", self.session.identity());
                    self.session.clear_subscribed();
                    self.session.set_state(ConnectionState::Disconnected);
                    if !self.retry_or_fail("connection dropped").await {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.sink.flush().await {
            warn!("{}: sink flush failed: {}", self.session.identity(), e);
        }
        self.report()
    }

    // Bounded connect loop. None means a terminal state was reached.
    async fn connect_with_retry(&mut self) -> Option<T::Conn> {
        loop {
            if self.stop.is_stopped() {
                self.session.set_state(ConnectionState::Stopped);
                return None;
            }
            self.session.set_state(ConnectionState::Connecting);
            info!(
                "Attempting connection to {} (try {})",
                self.session.identity(),
                self.session.retry_count() + 1
            );

            let attempt = tokio::time::timeout(
                self.config.connect_timeout,
                self.transport.connect(self.session.identity()),
            );
            tokio::select! {
                _ = self.stop.stopped() => {
                    self.session.set_state(ConnectionState::Stopped);
                    return None;
                }
                result = attempt => match result {
                    Ok(Ok(conn)) => {
                        info!("{}: connected", self.session.identity());
                        return Some(conn);
                    }
                    Ok(Err(e)) => {
                        warn!("{}: connection attempt failed: {:?}", self.session.identity(), e);
                        if !self.retry_or_fail("connect failed").await {
                            return None;
                        }
                    }
                    Err(_) => {
                        warn!("{}: connection attempt timed out", self.session.identity());
                        if !self.retry_or_fail("connect timed out").await {
                            return None;
                        }
                    }
                }
            }
        }
    }

    // Counts one failed attempt, then either backs off (cancellable) or
    // settles into a terminal state. Returns whether another attempt is due.
    async fn retry_or_fail(&mut self, reason: &str) -> bool {
        let retries = self.session.bump_retry();
        if retries >= self.config.max_retries {
            error!(
                "{}: giving up after {} attempts ({})",
                self.session.identity(),
                retries,
                reason
            );
            self.failure = Some(format!("{} after {} attempts", reason, retries));
            self.session.set_state(ConnectionState::Failed);
            return false;
        }
        tokio::select! {
            _ = self.stop.stopped() => {
                self.session.set_state(ConnectionState::Stopped);
                false
            }
            _ = tokio::time::sleep(self.config.backoff_interval) => true,
        }
    }

    // Setup writes before subscribing. A failed write is non-fatal: partial
    // configuration (default hardware rate/range) beats no data.
    async fn configure(&mut self, conn: &mut T::Conn) {
        self.session.set_state(ConnectionState::Configuring);
        for (characteristic, payload) in self.config.profile.setup_writes() {
            if let Err(e) = conn.write(*characteristic, payload).await {
                warn!(
                    "{}: configuration write to {} failed, continuing with device defaults: {:?}",
                    self.session.identity(),
                    characteristic,
                    e
                );
            }
        }
    }

    // Records each subscription as it lands, so a later release can undo a
    // partially subscribed connection.
    async fn subscribe_all(&mut self, conn: &mut T::Conn) -> Result<(), crate::models::errors::LoggerError> {
        let channels: Vec<Uuid> = self
            .config
            .profile
            .channels()
            .iter()
            .map(|spec| spec.uuid())
            .collect();
        self.session.clear_subscribed();
        for channel in channels {
            conn.subscribe(channel).await?;
            self.session.push_subscribed(channel);
        }
        Ok(())
    }

    // Streams until the connection drops, the sink fails, or stop arrives.
    // Every (re)entry gets a fresh router, and with it a fresh sample buffer.
    async fn stream(&mut self, conn: &mut T::Conn) -> StreamEnd {
        self.session.set_state(ConnectionState::Streaming);
        info!("{}: streaming", self.session.identity());
        let mut router = NotificationRouter::new(self.config.profile.channels());

        let end = loop {
            tokio::select! {
                _ = self.stop.stopped() => break StreamEnd::Stopped,
                notification = conn.next_notification() => match notification {
                    Some(notification) => {
                        let arrival = Clock::now();
                        if let Some(sample) =
                            router.on_notification(notification.channel, &notification.payload, arrival.as_secs())
                        {
                            if let Err(e) = self.sink.emit(self.session.identity(), &sample).await {
                                error!("{}: sink rejected row: {}", self.session.identity(), e);
                                self.failure = Some(format!("sink failure: {}", e));
                                break StreamEnd::SinkFailed;
                            }
                            self.samples_emitted += 1;
                        }
                    }
                    None => break StreamEnd::Dropped,
                }
            }
        };

        for (kind, timestamp) in router.last_seen() {
            self.last_seen.insert(kind.clone(), *timestamp);
        }
        end
    }

    // Unsubscribes and disconnects; release errors are logged, not surfaced.
    async fn release_connection(&mut self, conn: &mut T::Conn) {
        for channel in self.session.subscribed().to_vec() {
            if let Err(e) = conn.unsubscribe(channel).await {
                warn!("{}: unsubscribe {} failed: {:?}", self.session.identity(), channel, e);
            }
        }
        if let Err(e) = conn.disconnect().await {
            warn!("{}: disconnect failed: {:?}", self.session.identity(), e);
        }
        self.session.clear_subscribed();
        info!("{}: disconnected", self.session.identity());
    }

    fn report(&self) -> DeviceReport {
        let mut last_seen: Vec<(ChannelKind, f64)> = self
            .last_seen
            .iter()
            .map(|(kind, timestamp)| (kind.clone(), *timestamp))
            .collect();
        last_seen.sort_by(|a, b| a.0.cmp(&b.0));
        DeviceReport {
            identity: self.session.identity().clone(),
            state: self.session.state().clone(),
            retry_count: self.session.retry_count(),
            samples_emitted: self.samples_emitted,
            last_seen,
            failure: self.failure.clone(),
        }
    }
}
