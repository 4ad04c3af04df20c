// ── Historical samples ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded sample from the controller's history table.
///
/// Fields the controller did not record are `None`. Unknown fields are
/// preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub time: Option<DateTime<Utc>>,
    pub cpu_temp: Option<f64>,
    pub fan_speed: Option<f64>,
    pub power: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
