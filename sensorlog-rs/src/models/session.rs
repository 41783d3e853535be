use std::fmt;

use telemetry_common::{ChannelKind, DeviceIdentity};
use uuid::Uuid;

/// Lifecycle states of one device connection.
///
/// `Stopped` and `Failed` are terminal; a supervisor never leaves them
/// within a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Discovered,
    Connecting,
    Configuring,
    Streaming,
    Disconnected,
    Stopped,
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Stopped | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Discovered => "discovered",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Configuring => "configuring",
            ConnectionState::Streaming => "streaming",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Stopped => "stopped",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Mutable per-connection state, owned exclusively by one device supervisor.
#[derive(Clone, Debug)]
pub struct DeviceSession {
    identity: DeviceIdentity,
    subscribed: Vec<Uuid>,
    state: ConnectionState,
    retry_count: u32,
}

impl DeviceSession {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            subscribed: Vec::new(),
            state: ConnectionState::Discovered,
            retry_count: 0,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn bump_retry(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }

    pub fn reset_retries(&mut self) {
        self.retry_count = 0;
    }

    pub fn subscribed(&self) -> &[Uuid] {
        &self.subscribed
    }

    pub fn push_subscribed(&mut self, channel: Uuid) {
        self.subscribed.push(channel);
    }

    pub fn clear_subscribed(&mut self) {
        self.subscribed.clear();
    }
}

/// Per-device summary reported at shutdown.
#[derive(Clone, Debug)]
pub struct DeviceReport {
    pub identity: DeviceIdentity,
    pub state: ConnectionState,
    pub retry_count: u32,
    pub samples_emitted: u64,
    /// Host timestamp of the last reading seen per channel; a channel that
    /// never appears here is why a device emits no samples.
    pub last_seen: Vec<(ChannelKind, f64)>,
    pub failure: Option<String>,
}

impl DeviceReport {
    /// Report for a device that never acknowledged the stop signal within
    /// the grace period.
    pub fn lost(identity: DeviceIdentity) -> Self {
        Self::failed(
            identity,
            "did not acknowledge stop within grace period".to_string(),
        )
    }

    /// Report for a device that never ran, e.g. because its sink could not
    /// be created.
    pub fn failed(identity: DeviceIdentity, reason: String) -> Self {
        Self {
            identity,
            state: ConnectionState::Failed,
            retry_count: 0,
            samples_emitted: 0,
            last_seen: Vec::new(),
            failure: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_discovered() {
        let session = DeviceSession::new(DeviceIdentity::new("nRF_IMU", "AA:BB"));
        assert_eq!(*session.state(), ConnectionState::Discovered);
        assert_eq!(session.retry_count(), 0);
        assert!(session.subscribed().is_empty());
    }

    #[test]
    fn test_retry_counter() {
        let mut session = DeviceSession::new(DeviceIdentity::new("nRF_IMU", "AA:BB"));
        assert_eq!(session.bump_retry(), 1);
        assert_eq!(session.bump_retry(), 2);
        session.reset_retries();
        assert_eq!(session.retry_count(), 0);
    }

    #[test]
    fn test_subscription_tracking() {
        let mut session = DeviceSession::new(DeviceIdentity::new("nRF_IMU", "AA:BB"));
        let channel = Uuid::new_v4();
        session.push_subscribed(channel);
        assert_eq!(session.subscribed(), &[channel]);
        session.clear_subscribed();
        assert!(session.subscribed().is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ConnectionState::Stopped.is_terminal());
        assert!(ConnectionState::Failed.is_terminal());
        assert!(!ConnectionState::Streaming.is_terminal());
        assert!(!ConnectionState::Disconnected.is_terminal());
    }
}
