use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::SERVER_TIMESTAMP_KEY;

/// A telemetry report from the vehicle, stamped on receipt.
///
/// The payload schema belongs to the firmware and is passed through as-is.
/// On the wire the record is flat: the payload keys plus `server_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub server_timestamp: DateTime<Local>,
}

impl TelemetryRecord {
    /// Wraps a payload, overwriting any client-supplied `server_timestamp`.
    pub fn new(mut payload: Map<String, Value>, received_at: DateTime<Local>) -> Self {
        payload.remove(SERVER_TIMESTAMP_KEY);
        Self {
            payload,
            server_timestamp: received_at,
        }
    }

    /// Which firmware report layout this payload follows.
    pub fn shape(&self) -> ReportShape {
        ReportShape::detect(&self.payload)
    }
}

/// Known firmware report layouts.
///
/// Both layouts are accepted; the shape is only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportShape {
    /// `sensors`, `motor`, `control` and `wifi` sections.
    Structured,
    /// Flat `sensor_values`, `black_detected` and `sensor_binary` fields.
    Raw,
    Unknown,
}

impl ReportShape {
    pub fn detect(payload: &Map<String, Value>) -> Self {
        if payload.contains_key("sensors") {
            ReportShape::Structured
        } else if payload.contains_key("sensor_values") {
            ReportShape::Raw
        } else {
            ReportShape::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportShape::Structured => "structured",
            ReportShape::Raw => "raw",
            ReportShape::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn record_serializes_flat() {
        let payload = object(json!({
            "sensors": [0, 1, 1, 0],
            "motor": { "left_speed": 40, "right_speed": 55 }
        }));
        let record = TelemetryRecord::new(payload, Local::now());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sensors"], json!([0, 1, 1, 0]));
        assert_eq!(value["motor"]["left_speed"], 40);
        assert!(value["server_timestamp"].is_string());
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn client_server_timestamp_is_replaced() {
        let payload = object(json!({ "server_timestamp": "spoofed", "sensor_values": [1] }));
        let record = TelemetryRecord::new(payload, Local::now());

        assert!(!record.payload.contains_key(SERVER_TIMESTAMP_KEY));
        let value = serde_json::to_value(&record).unwrap();
        assert_ne!(value["server_timestamp"], "spoofed");
    }

    #[test]
    fn record_deserializes_back() {
        let payload = object(json!({ "sensor_values": [512, 300], "black_detected": 1 }));
        let record = TelemetryRecord::new(payload, Local::now());

        let json = serde_json::to_string(&record).unwrap();
        let parsed: TelemetryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn detects_report_shapes() {
        let structured = object(json!({ "sensors": [0, 0, 1], "control": { "error": 0.5 } }));
        let raw = object(json!({ "sensor_values": [1, 2, 3], "sensor_binary": "001" }));
        let other = object(json!({ "battery": 7.4 }));

        assert_eq!(ReportShape::detect(&structured), ReportShape::Structured);
        assert_eq!(ReportShape::detect(&raw), ReportShape::Raw);
        assert_eq!(ReportShape::detect(&other), ReportShape::Unknown);
        assert_eq!(ReportShape::detect(&structured).as_str(), "structured");
        assert_eq!(ReportShape::detect(&raw).as_str(), "raw");
    }
}
