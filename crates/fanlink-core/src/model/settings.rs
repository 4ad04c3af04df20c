// ── Controller settings ──

use serde::{Deserialize, Serialize};

/// BMC connection settings and polling interval of the controller.
///
/// The controller never returns the stored password, only whether one
/// is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub ip_address: String,
    pub username: String,
    pub password_set: bool,
    /// Polling interval in seconds.
    pub interval: u32,
}
