// ── Fan curve ──

use serde::{Deserialize, Serialize};

/// One control point: temperature (`x`) to fan duty (`y`).
///
/// Points are stored in the order the controller (or the caller) gave
/// them; nothing here sorts or validates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    #[serde(alias = "temp")]
    pub x: f64,
    #[serde(alias = "speed")]
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
