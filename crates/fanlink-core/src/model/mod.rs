// ── Fan-controller domain model ──
//
// Canonical types mirrored by the `ResourceStore`. Conversion from the
// wire records in `fanlink_api::models` lives in `crate::convert`.

pub mod curve;
pub mod history;
pub mod logs;
pub mod settings;
pub mod status;

pub use curve::CurvePoint;
pub use history::HistorySample;
pub use logs::LogEntry;
pub use settings::Settings;
pub use status::{ControlMode, Status, StatusPatch};
