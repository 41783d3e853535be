use sensorlog_rs::models::config::{DeviceProfile, LoggerConfig};
use sensorlog_rs::services;

use tokio::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = LoggerConfig::new(DeviceProfile::ti_sensortag());

    // Start logging service; one CSV file per SensorTag under ./sensor_data
    let (handle, service) = services::run_service(config, "sensor_data")
        .await
        .unwrap();

    let timeout_duration = Duration::from_secs(200);
    let _ = tokio::time::timeout(timeout_duration, async {
        handle.await.unwrap();
    })
    .await;
    service.stop_signal().trigger();
}
