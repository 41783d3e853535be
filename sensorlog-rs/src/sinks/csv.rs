//! Append-only CSV destination, one timestamped file per device.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, LocalResult, TimeZone};

use telemetry_common::{DeviceIdentity, Sample, SampleSink};

use crate::channels::ChannelSpec;

/// Writes one row per completed sample and flushes immediately, so a crash
/// or power loss costs at most the row being written.
///
/// Column layout is fixed at creation: `TimeStamp`, then one column per
/// channel axis in channel declaration order.
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Creates `<dir>/<name>_<address>_<ddmmYYYY_HHMMSS>.csv` with its header
    /// row. The address is part of the filename so two devices advertising
    /// the same name never share a destination.
    pub fn create(
        dir: &Path,
        identity: &DeviceIdentity,
        channels: &[ChannelSpec],
    ) -> Result<Self, String> {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        let stamp = Local::now().format("%d%m%Y_%H%M%S");
        let path = dir.join(format!(
            "{}_{}_{}.csv",
            sanitize(identity.name()),
            sanitize(identity.address()),
            stamp
        ));
        let file = File::create(&path).map_err(|e| e.to_string())?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header = vec!["TimeStamp".to_string()];
        for spec in channels {
            header.extend(spec.kind().field_names());
        }
        writer.write_record(&header).map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())?;

        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SampleSink for CsvSink {
    async fn emit(&mut self, _identity: &DeviceIdentity, sample: &Sample) -> Result<(), String> {
        let mut record = vec![format_timestamp(sample.timestamp_secs())];
        record.extend(sample.values().into_iter().map(format_value));
        self.writer.write_record(&record).map_err(|e| e.to_string())?;
        self.writer.flush().map_err(|e| e.to_string())
    }

    async fn flush(&mut self) -> Result<(), String> {
        self.writer.flush().map_err(|e| e.to_string())
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn format_timestamp(secs: f64) -> String {
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    match Local.timestamp_opt(whole, nanos) {
        LocalResult::Single(datetime) => datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        _ => format!("{:.3}", secs),
    }
}

// Raw SensorTag readings are integers; keep them readable as such.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
