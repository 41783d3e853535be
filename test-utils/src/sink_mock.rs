use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use telemetry_common::{DeviceIdentity, Sample, SampleSink};

/// In-memory sink capturing every emitted row for assertions.
///
/// Clones share state, so a test can hand one clone to the service and keep
/// another for inspection. Emission failures can be injected to exercise the
/// sink-fault path.
#[derive(Clone, Default)]
pub struct SinkMock {
    rows: Arc<Mutex<Vec<(DeviceIdentity, Sample)>>>,
    flushes: Arc<AtomicU32>,
    fail_emits: Arc<AtomicU32>,
}

impl SinkMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<(DeviceIdentity, Sample)> {
        self.rows.lock().await.clone()
    }

    pub async fn samples_for(&self, identity: &DeviceIdentity) -> Vec<Sample> {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|(row_identity, _)| row_identity == identity)
            .map(|(_, sample)| sample.clone())
            .collect()
    }

    pub fn flush_count(&self) -> u32 {
        self.flushes.load(Ordering::SeqCst)
    }

    /// The next `count` calls to `emit` will fail.
    pub fn fail_next_emits(&self, count: u32) {
        self.fail_emits.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl SampleSink for SinkMock {
    async fn emit(&mut self, identity: &DeviceIdentity, sample: &Sample) -> Result<(), String> {
        let pending_failures = self.fail_emits.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.fail_emits.store(pending_failures - 1, Ordering::SeqCst);
            return Err("simulated sink failure".to_string());
        }
        self.rows
            .lock()
            .await
            .push((identity.clone(), sample.clone()));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), String> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_common::{ChannelKind, Measurement, Scalar};

    fn sample(bpm: f64) -> Sample {
        Sample::new(
            1.0,
            vec![(ChannelKind::HeartRate, Measurement::Scalar(Scalar::new(bpm)))],
        )
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let sink = SinkMock::new();
        let mut writer = sink.clone();
        let identity = DeviceIdentity::new("nRF_IMU", "AA:BB");

        writer.emit(&identity, &sample(72.0)).await.unwrap();

        assert_eq!(sink.rows().await.len(), 1);
        assert_eq!(sink.samples_for(&identity).await.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_emit_failure() {
        let sink = SinkMock::new();
        let mut writer = sink.clone();
        sink.fail_next_emits(1);
        let identity = DeviceIdentity::new("nRF_IMU", "AA:BB");

        assert!(writer.emit(&identity, &sample(72.0)).await.is_err());
        assert!(writer.emit(&identity, &sample(73.0)).await.is_ok());
        assert_eq!(sink.rows().await.len(), 1);
    }
}
