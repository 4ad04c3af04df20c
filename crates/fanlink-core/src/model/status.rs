// ── Device status ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is driving the fans.
///
/// The controller reports `auto` or `manual`; anything else is kept
/// verbatim so newer firmware modes still round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ControlMode {
    #[default]
    Auto,
    Manual,
    Other(String),
}

impl ControlMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Other(mode) => mode,
        }
    }
}

impl From<String> for ControlMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "auto" => Self::Auto,
            "manual" => Self::Manual,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for ControlMode {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<ControlMode> for String {
    fn from(mode: ControlMode) -> Self {
        match mode {
            ControlMode::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known device status.
///
/// Starts as all zeros, automatic control, no update time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub cpu_temp: f64,
    pub fan_speed: f64,
    pub power: f64,
    pub control_mode: ControlMode,
    pub last_update: Option<DateTime<Utc>>,
}

/// A partial status update. `None` means "leave the field alone".
///
/// `last_update` is doubly optional: `Some(None)` clears the timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPatch {
    pub cpu_temp: Option<f64>,
    pub fan_speed: Option<f64>,
    pub power: Option<f64>,
    pub control_mode: Option<ControlMode>,
    pub last_update: Option<Option<DateTime<Utc>>>,
}

impl StatusPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Status {
    /// Shallow merge: every field present in `patch` overwrites, every
    /// absent field keeps its current value.
    pub fn apply(&mut self, patch: StatusPatch) {
        if let Some(v) = patch.cpu_temp {
            self.cpu_temp = v;
        }
        if let Some(v) = patch.fan_speed {
            self.fan_speed = v;
        }
        if let Some(v) = patch.power {
            self.power = v;
        }
        if let Some(mode) = patch.control_mode {
            self.control_mode = mode;
        }
        if let Some(ts) = patch.last_update {
            self.last_update = ts;
        }
    }

    /// Build a full status from a patch, starting from the initial value.
    pub fn from_patch(patch: StatusPatch) -> Self {
        let mut status = Self::default();
        status.apply(patch);
        status
    }
}
