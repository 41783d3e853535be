use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use telemetry_common::{DeviceIdentity, SampleSink};

use crate::adapters::production::BleCentral;
use crate::models::config::LoggerConfig;
use crate::models::errors::LoggerError;
use crate::models::session::{ConnectionState, DeviceReport};
use crate::models::shutdown::{self, StopSignal};
use crate::ports::BleTransport;
use crate::sinks::CsvSink;
use crate::supervisor::DeviceSupervisor;

/// Coordinates one logging run across every matching peripheral.
///
/// Each device runs on its own task; a failing device never cancels its
/// siblings. The run ends when the stop signal fires or every device reached
/// a terminal state, whichever comes first.
pub struct LoggerService<T>
where
    T: BleTransport,
{
    transport: Arc<T>,
    config: Arc<LoggerConfig>,
    stop: Arc<StopSignal>,
}

impl<T> LoggerService<T>
where
    T: BleTransport,
{
    pub fn new(transport: T, config: LoggerConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            stop: Arc::new(StopSignal::new()),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Shared handle to the underlying transport.
    pub fn transport_handle(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    /// Handle for requesting a stop from outside (tests, embedding apps).
    pub fn stop_signal(&self) -> Arc<StopSignal> {
        Arc::clone(&self.stop)
    }

    /// Runs discovery, supervision and shutdown for one session.
    ///
    /// `make_sink` builds the destination for each matched device. Zero
    /// matching peripherals is an expected outcome, reported and returned as
    /// an empty run, not an error. The process stops on Ctrl+C, or after
    /// `run_for_millis` when given.
    pub async fn start<F>(
        &self,
        make_sink: F,
        run_for_millis: Option<u64>,
    ) -> Result<Vec<DeviceReport>, LoggerError>
    where
        F: Fn(&DeviceIdentity) -> Result<Box<dyn SampleSink>, String>,
    {
        if let Some(kind) = self.config.profile.duplicate_kind() {
            return Err(LoggerError::Other(format!(
                "Profile {} declares channel kind {} more than once",
                self.config.profile.label(),
                kind
            )));
        }

        info!("Scanning for {}...", self.config.profile.label());
        let discovered = self.transport.discover(self.config.scan_timeout).await?;
        let candidates: Vec<DeviceIdentity> = discovered
            .into_iter()
            .filter(|identity| self.config.profile.matches_name(identity.name()))
            .collect();

        if candidates.is_empty() {
            info!("No matching device found.");
            return Ok(Vec::new());
        }

        shutdown::listen_for_shutdown(Arc::clone(&self.stop), run_for_millis);

        let mut handles = Vec::with_capacity(candidates.len());
        let mut reports = Vec::with_capacity(candidates.len());
        for identity in candidates {
            info!("Found {}", identity);
            // a device whose sink cannot be created fails alone; its
            // siblings still get supervised
            let sink = match make_sink(&identity) {
                Ok(sink) => sink,
                Err(e) => {
                    error!("{}: could not create sink: {}", identity, e);
                    reports.push(DeviceReport::failed(
                        identity,
                        format!("sink creation failed: {}", e),
                    ));
                    continue;
                }
            };
            let supervisor = DeviceSupervisor::new(
                Arc::clone(&self.transport),
                identity.clone(),
                Arc::clone(&self.config),
                Arc::clone(&self.stop),
                sink,
            );
            handles.push((identity, tokio::spawn(supervisor.run())));
        }

        for (identity, mut handle) in handles {
            let report = tokio::select! {
                joined = &mut handle => joined.unwrap_or_else(|_| DeviceReport::lost(identity.clone())),
                _ = grace_elapsed(&self.stop, self.config.shutdown_grace) => {
                    warn!("{}: did not stop within the grace period, abandoning", identity);
                    handle.abort();
                    DeviceReport::lost(identity)
                }
            };
            reports.push(report);
        }

        for report in &reports {
            match report.state {
                ConnectionState::Failed => warn!(
                    "{}: {} ({} samples, {} retries): {}",
                    report.identity,
                    report.state,
                    report.samples_emitted,
                    report.retry_count,
                    report.failure.as_deref().unwrap_or("unknown failure"),
                ),
                _ => info!(
                    "{}: {} ({} samples)",
                    report.identity, report.state, report.samples_emitted
                ),
            }
        }
        Ok(reports)
    }
}

// Completes one grace period after the stop has been requested; never
// completes while the run is still live.
async fn grace_elapsed(stop: &StopSignal, grace: Duration) {
    stop.stopped().await;
    tokio::time::sleep(grace).await;
}

/// Starts the logger against real hardware, writing one CSV per device under
/// `output_dir`.
///
/// Returns a tuple containing:
/// * A `tokio::task::JoinHandle<()>` representing the spawned logging task.
/// * An `Arc<LoggerService<BleCentral>>` for requesting a stop.
///
/// An error `ClientBuild` is returned if no BLE adapter is available.
pub async fn run_service(
    config: LoggerConfig,
    output_dir: impl Into<PathBuf>,
) -> Result<(tokio::task::JoinHandle<()>, Arc<LoggerService<BleCentral>>), LoggerError> {
    let central = BleCentral::new().await?;
    let service = Arc::new(LoggerService::new(central, config));
    let output_dir = output_dir.into();

    let handle = tokio::spawn({
        let service_clone = Arc::clone(&service);
        async move {
            let channels = service_clone.config().profile.channels().to_vec();
            let make_sink = move |identity: &DeviceIdentity| {
                CsvSink::create(&output_dir, identity, &channels)
                    .map(|sink| Box::new(sink) as Box<dyn SampleSink>)
            };
            if let Err(e) = service_clone.start(make_sink, None).await {
                error!("Error in logger loop: {:?}", e);
            }
        }
    });
    Ok((handle, service))
}
