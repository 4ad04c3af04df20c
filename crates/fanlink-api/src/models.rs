// Wire types for the fan-controller REST API and push channel.
//
// Fields use `#[serde(default)]` liberally: push payloads are partial by
// nature and the controller omits values it has not sampled yet.
// Anything not modelled explicitly lands in `extra`.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString, IntoStaticStr};

// ── Status ───────────────────────────────────────────────────────────

/// Status record as sent by `GET /api/dashboard/status` and inside
/// `status_update` push frames.
///
/// Every field is optional so the same type can describe a partial
/// update. `last_update` distinguishes "absent" (`None`) from an explicit
/// `null` (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Deserialize a field that may be missing, `null`, or a value.
///
/// Used with `#[serde(default)]`: a missing field never reaches this
/// function and stays `None`; a present field becomes `Some(..)`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Curve ────────────────────────────────────────────────────────────

/// One control point of the fan curve.
///
/// Written as `{x, y}`; the reference controller names the axes
/// `temp` / `speed`, which are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePointRecord {
    #[serde(alias = "temp")]
    pub x: f64,
    #[serde(alias = "speed")]
    pub y: f64,
}

/// Body of `GET /api/curve` and `PUT /api/curve`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveBody {
    #[serde(default)]
    pub points: Vec<CurvePointRecord>,
}

// ── History ──────────────────────────────────────────────────────────

/// Time window accepted by `GET /api/dashboard/history?range=`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
    Serialize, Deserialize,
)]
pub enum HistoryRange {
    #[default]
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,
    #[strum(serialize = "6h")]
    #[serde(rename = "6h")]
    SixHours,
    #[strum(serialize = "24h")]
    #[serde(rename = "24h")]
    Day,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    Week,
}

impl HistoryRange {
    /// The query-string token for this range.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Envelope of `GET /api/dashboard/history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub data: Vec<HistoryRecord>,
}

/// A single time-series sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub cpu_temp: Option<f64>,
    #[serde(default)]
    pub fan_speed: Option<f64>,
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Logs ─────────────────────────────────────────────────────────────

/// Filter set for `GET /api/logs`.
///
/// The controller understands `level`, `search` and `limit`; any other
/// key/value pair in `extra` is forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub level: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub extra: BTreeMap<String, String>,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flatten into query-string pairs. Known keys win over `extra`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .extra
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "level" | "search" | "limit"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(ref level) = self.level {
            pairs.push(("level".into(), level.clone()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search".into(), search.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        pairs
    }
}

/// Envelope of `GET /api/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<LogRecord>,
}

/// A log line, either pulled from `/api/logs` or pushed as a `log` frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Settings ─────────────────────────────────────────────────────────

/// Controller settings from `GET /api/settings`.
///
/// The controller masks the stored password (`"******"`), so the value
/// here is only an indicator that one is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub interval: u32,
}

/// Partial settings update for `PUT /api/settings`.
///
/// Only present fields are serialized; the password is exposed to the
/// serializer and nowhere else.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.interval.is_none()
    }
}

#[allow(clippy::ref_option)]
fn serialize_secret<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

// ── Push channel ─────────────────────────────────────────────────────

/// Envelope of every push-channel text frame: `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ── Errors ───────────────────────────────────────────────────────────

/// Error body convention: `{"detail": "..."}` or, for validation
/// failures, `{"detail": [{"msg": "...", ...}, ...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Collapse the `detail` field into a single human-readable string.
    pub(crate) fn into_message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Array(items) => {
                let msgs: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(String::from)
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
