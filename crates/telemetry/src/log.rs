use std::path::Path;

use chrono::Local;
use serde_json::Value;

use linetrace_history::History;
use linetrace_protocol::constants::TELEMETRY_CAPACITY;
use linetrace_protocol::{ReportShape, TelemetryRecord};

use crate::error::TelemetryError;
use crate::export::{ExportSummary, write_export};

/// Bounded ring of telemetry reports.
///
/// Construct one per process and share it with the request handlers.
pub struct TelemetryLog {
    history: History<TelemetryRecord>,
}

impl TelemetryLog {
    /// Create a ring with the default capacity (100 reports).
    pub fn new() -> Self {
        Self::with_capacity(TELEMETRY_CAPACITY)
    }

    /// Create a ring holding at most `capacity` reports.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: History::new("telemetry", capacity),
        }
    }

    /// Parse a raw request body and ingest it.
    pub fn ingest_slice(&self, body: &[u8]) -> Result<TelemetryRecord, TelemetryError> {
        let payload: Value = serde_json::from_slice(body)?;
        self.ingest(payload)
    }

    /// Stamp a report with the receipt time and append it.
    ///
    /// Any JSON object is accepted; the schema is not checked.
    pub fn ingest(&self, payload: Value) -> Result<TelemetryRecord, TelemetryError> {
        let Value::Object(payload) = payload else {
            tracing::warn!("rejected non-object telemetry payload");
            return Err(TelemetryError::NotAnObject);
        };

        let record = self
            .history
            .append_with(|_| TelemetryRecord::new(payload, Local::now()))?;
        log_report(&record);
        Ok(record)
    }

    /// The most recent report, or `None` when the ring is empty.
    pub fn latest(&self) -> Result<Option<TelemetryRecord>, TelemetryError> {
        Ok(self.history.latest()?)
    }

    /// The newest `count` reports in the order they were received.
    pub fn history(&self, count: usize) -> Result<Vec<TelemetryRecord>, TelemetryError> {
        Ok(self.history.tail(count)?)
    }

    /// Every resident report, oldest first.
    pub fn snapshot(&self) -> Result<Vec<TelemetryRecord>, TelemetryError> {
        Ok(self.history.snapshot()?)
    }

    /// Empty the ring, returning how many reports were discarded.
    pub fn clear(&self) -> Result<usize, TelemetryError> {
        let cleared = self.history.clear()?;
        tracing::info!(cleared, "telemetry history cleared");
        Ok(cleared)
    }

    /// Write the resident window to a timestamped file under `dir`.
    ///
    /// The snapshot is taken under the guard; the file is written after it
    /// is released.
    pub fn export(&self, dir: &Path) -> Result<ExportSummary, TelemetryError> {
        let records = self.snapshot()?;
        let summary = write_export(dir, &records, Local::now())?;
        tracing::info!(
            filename = %summary.filename,
            count = summary.count,
            "telemetry exported"
        );
        Ok(summary)
    }

    pub fn len(&self) -> Result<usize, TelemetryError> {
        Ok(self.history.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, TelemetryError> {
        Ok(self.history.is_empty()?)
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

fn log_report(record: &TelemetryRecord) {
    let p = &record.payload;
    let shape = record.shape();
    match shape {
        ReportShape::Structured => {
            let motor = p.get("motor");
            let control = p.get("control");
            tracing::debug!(
                shape = shape.as_str(),
                sensors = ?p.get("sensors"),
                left_speed = ?motor.and_then(|m| m.get("left_speed")),
                right_speed = ?motor.and_then(|m| m.get("right_speed")),
                error = ?control.and_then(|c| c.get("error")),
                turn = ?control.and_then(|c| c.get("turn")),
                ip = ?p.get("wifi").and_then(|w| w.get("ip")),
                "telemetry received"
            );
        }
        ReportShape::Raw => {
            tracing::debug!(
                shape = shape.as_str(),
                sensor_values = ?p.get("sensor_values"),
                black_detected = ?p.get("black_detected"),
                sensor_binary = ?p.get("sensor_binary"),
                device_timestamp = ?p.get("timestamp"),
                "telemetry received"
            );
        }
        ReportShape::Unknown => {
            tracing::debug!(shape = shape.as_str(), keys = p.len(), "telemetry received");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn structured_report(error: f64) -> Value {
        json!({
            "sensors": [0, 1, 1, 0],
            "motor": { "left_speed": 40, "right_speed": 42 },
            "control": { "error": error, "turn": -3 },
            "wifi": { "ip": "192.168.3.20" }
        })
    }

    fn raw_report(black: u32) -> Value {
        json!({
            "sensor_values": [812, 120, 130, 790],
            "black_detected": black,
            "sensor_binary": "1001",
            "timestamp": 12345
        })
    }

    #[test]
    fn accepts_both_report_shapes() {
        let log = TelemetryLog::new();
        let a = log.ingest(structured_report(0.25)).unwrap();
        let b = log.ingest(raw_report(2)).unwrap();

        assert_eq!(a.shape(), ReportShape::Structured);
        assert_eq!(b.shape(), ReportShape::Raw);
        assert_eq!(log.len().unwrap(), 2);
    }

    #[test]
    fn rejects_non_objects() {
        let log = TelemetryLog::new();
        for payload in [json!([1, 2, 3]), json!("hello"), json!(null), json!(42)] {
            let err = log.ingest(payload).unwrap_err();
            assert!(matches!(err, TelemetryError::NotAnObject));
            assert!(err.is_malformed_payload());
        }
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn rejects_unparseable_bodies() {
        let log = TelemetryLog::new();
        let err = log.ingest_slice(b"{not json").unwrap_err();
        assert!(matches!(err, TelemetryError::Json(_)));
        assert!(err.is_malformed_payload());
        assert!(log.is_empty().unwrap());

        log.ingest_slice(br#"{"sensor_values": [1, 2]}"#).unwrap();
        assert_eq!(log.len().unwrap(), 1);
    }

    #[test]
    fn latest_is_none_until_first_report() {
        let log = TelemetryLog::new();
        assert!(log.latest().unwrap().is_none());

        log.ingest(raw_report(1)).unwrap();
        log.ingest(raw_report(3)).unwrap();
        let latest = log.latest().unwrap().unwrap();
        assert_eq!(latest.payload["black_detected"], 3);
    }

    #[test]
    fn history_returns_last_n_chronologically() {
        let log = TelemetryLog::new();
        for black in 0..15 {
            log.ingest(raw_report(black)).unwrap();
        }

        let recent = log.history(10).unwrap();
        let blacks: Vec<u64> = recent
            .iter()
            .map(|r| r.payload["black_detected"].as_u64().unwrap())
            .collect();
        assert_eq!(blacks, (5..15).collect::<Vec<_>>());

        assert_eq!(log.history(500).unwrap().len(), 15);
        assert!(log.history(0).unwrap().is_empty());
    }

    #[test]
    fn capacity_bounds_ring() {
        let log = TelemetryLog::new();
        for black in 0..130 {
            log.ingest(raw_report(black)).unwrap();
        }

        assert_eq!(log.len().unwrap(), 100);
        let oldest = &log.snapshot().unwrap()[0];
        assert_eq!(oldest.payload["black_detected"], 30);
    }

    #[test]
    fn clear_returns_count() {
        let log = TelemetryLog::with_capacity(5);
        for error in [0.1, 0.2, 0.3] {
            log.ingest(structured_report(error)).unwrap();
        }

        assert_eq!(log.clear().unwrap(), 3);
        assert!(log.latest().unwrap().is_none());
        assert_eq!(log.clear().unwrap(), 0);
    }

    #[test]
    fn export_writes_resident_window() {
        let tmp = tempfile::tempdir().unwrap();
        let log = TelemetryLog::with_capacity(3);
        for black in 0..4 {
            log.ingest(raw_report(black)).unwrap();
        }

        let summary = log.export(tmp.path()).unwrap();
        assert_eq!(summary.count, 3);
        assert!(summary.filename.starts_with("telemetry_"));

        let content = std::fs::read_to_string(tmp.path().join(&summary.filename)).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["black_detected"], 1);
        assert!(parsed[2]["server_timestamp"].is_string());
    }
}
