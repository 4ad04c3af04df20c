// ── API-to-domain type conversions ──
//
// Bridges raw `fanlink_api` records into canonical `fanlink_core::model`
// types. Timestamps are parsed leniently: the controller emits RFC 3339,
// naive ISO-8601, and Python `logging` style depending on the endpoint.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use fanlink_api::models::{
    CurvePointRecord, HistoryRecord, LogRecord, SettingsRecord, StatusRecord,
};

use crate::model::{ControlMode, CurvePoint, HistorySample, LogEntry, Settings, StatusPatch};

// ── Helpers ────────────────────────────────────────────────────────

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S,%3f",
];

/// Parse a controller timestamp into UTC.
///
/// Offsets are honoured when present; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_timestamp_logged(raw: &str, field: &'static str) -> Option<DateTime<Utc>> {
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        debug!(field, value = raw, "unrecognised timestamp format");
    }
    parsed
}

// ── Status ─────────────────────────────────────────────────────────

impl From<StatusRecord> for StatusPatch {
    fn from(record: StatusRecord) -> Self {
        // An unparseable timestamp leaves the current one in place rather
        // than clearing it.
        let last_update = match record.last_update {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => parse_timestamp_logged(&raw, "last_update").map(Some),
        };

        Self {
            cpu_temp: record.cpu_temp,
            fan_speed: record.fan_speed,
            power: record.power,
            control_mode: record.control_mode.map(ControlMode::from),
            last_update,
        }
    }
}

// ── Push payloads ──────────────────────────────────────────────────
//
// Pushed objects are read key by key. A value of the wrong type costs
// only that key, never the rest of the frame.

/// Build a status patch from a `status_update` payload.
///
/// Ill-typed keys are skipped and leave the current value in place.
pub fn status_patch_from_fields(fields: &Map<String, Value>) -> StatusPatch {
    let number = |key: &'static str| {
        let value = fields.get(key)?;
        let parsed = value.as_f64();
        if parsed.is_none() {
            debug!(field = key, %value, "skipping non-numeric status field");
        }
        parsed
    };

    let control_mode = match fields.get("control_mode") {
        None => None,
        Some(Value::String(raw)) => Some(ControlMode::from(raw.as_str())),
        Some(other) => {
            debug!(field = "control_mode", value = %other, "skipping non-string status field");
            None
        }
    };

    let last_update = match fields.get("last_update") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(raw)) => parse_timestamp_logged(raw, "last_update").map(Some),
        Some(other) => {
            debug!(field = "last_update", value = %other, "skipping non-string status field");
            None
        }
    };

    StatusPatch {
        cpu_temp: number("cpu_temp"),
        fan_speed: number("fan_speed"),
        power: number("power"),
        control_mode,
        last_update,
    }
}

/// Build a log entry from a pushed `log` object.
///
/// `level`, `time` and `message` are lifted out when they are strings.
/// Anything else, including those keys with another type, stays in
/// `extra` untouched.
pub fn log_entry_from_fields(fields: Map<String, Value>) -> LogEntry {
    let mut entry = LogEntry::default();
    for (key, value) in fields {
        let slot = match key.as_str() {
            "level" => Some(&mut entry.level),
            "time" => Some(&mut entry.time),
            "message" => Some(&mut entry.message),
            _ => None,
        };
        match (slot, value) {
            (Some(slot), Value::String(text)) => *slot = Some(text),
            (Some(_), Value::Null) => {}
            (_, value) => {
                entry.extra.insert(key, value);
            }
        }
    }
    entry
}

// ── Curve ──────────────────────────────────────────────────────────

impl From<CurvePointRecord> for CurvePoint {
    fn from(record: CurvePointRecord) -> Self {
        Self {
            x: record.x,
            y: record.y,
        }
    }
}

impl From<CurvePoint> for CurvePointRecord {
    fn from(point: CurvePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
        }
    }
}

// ── History ────────────────────────────────────────────────────────

impl From<HistoryRecord> for HistorySample {
    fn from(record: HistoryRecord) -> Self {
        Self {
            time: record
                .time
                .as_deref()
                .and_then(|raw| parse_timestamp_logged(raw, "time")),
            cpu_temp: record.cpu_temp,
            fan_speed: record.fan_speed,
            power: record.power,
            extra: record.extra,
        }
    }
}

// ── Logs ───────────────────────────────────────────────────────────

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        Self {
            level: record.level,
            time: record.time,
            message: record.message,
            extra: record.extra,
        }
    }
}

// ── Settings ───────────────────────────────────────────────────────

impl From<SettingsRecord> for Settings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            ip_address: record.ip_address,
            username: record.username,
            password_set: !record.password.is_empty(),
            interval: record.interval,
        }
    }
}
