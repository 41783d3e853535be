use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;

const POLL_PERIOD_MS: u64 = 50;

/// Cooperative stop signal shared between the coordinator and every device
/// supervisor.
///
/// `stopped()` polls the flag alongside the notification so a waiter that
/// registers after `trigger()` still observes the stop in bounded time.
#[derive(Default)]
pub struct StopSignal {
    notify: Notify,
    stopped: AtomicBool,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Completes once the stop has been requested.
    pub async fn stopped(&self) {
        loop {
            if self.is_stopped() {
                return;
            }
            let _ = tokio::time::timeout(
                Duration::from_millis(POLL_PERIOD_MS),
                self.notify.notified(),
            )
            .await;
        }
    }
}

/// Triggers the stop signal on Ctrl+C, or after `run_for_millis` when given.
pub fn listen_for_shutdown(
    stop: Arc<StopSignal>,
    run_for_millis: Option<u64>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(time_to_live_millis) = run_for_millis {
            tokio::time::sleep(Duration::from_millis(time_to_live_millis)).await;
        } else {
            if let Err(e) = signal::ctrl_c().await {
                error!("Error while waiting for Ctrl+C: {}", e);
            }
            info!("Ctrl+C received. Sending stop signal...");
        }
        stop.trigger();
    })
}
