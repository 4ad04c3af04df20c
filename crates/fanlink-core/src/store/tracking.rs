// ── Request lifecycle tracking ──
//
// One loading flag and one error slot per tracked resource, plus the
// push channel's own error slot. Published as a single snapshot so a UI
// can render spinners and banners from one `watch` subscription.

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

/// A remotely mirrored resource with its own request lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Status,
    Curve,
    History,
    Logs,
}

impl Resource {
    pub const ALL: [Self; 4] = [Self::Status, Self::Curve, Self::History, Self::Logs];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Curve => 1,
            Self::History => 2,
            Self::Logs => 3,
        }
    }
}

/// Addresses one error slot: a resource's, or the push channel's.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKey {
    Status,
    Curve,
    History,
    Logs,
    Channel,
}

impl ErrorKey {
    pub const ALL: [Self; 5] = [
        Self::Status,
        Self::Curve,
        Self::History,
        Self::Logs,
        Self::Channel,
    ];
}

impl From<Resource> for ErrorKey {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Status => Self::Status,
            Resource::Curve => Self::Curve,
            Resource::History => Self::History,
            Resource::Logs => Self::Logs,
        }
    }
}

/// Lifecycle of the latest-issued request for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub loading: bool,
    pub error: Option<String>,
}

/// Snapshot of every loading flag and error slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tracking {
    pub status: Slot,
    pub curve: Slot,
    pub history: Slot,
    pub logs: Slot,
    pub channel_error: Option<String>,
}

impl Tracking {
    pub fn slot(&self, resource: Resource) -> &Slot {
        match resource {
            Resource::Status => &self.status,
            Resource::Curve => &self.curve,
            Resource::History => &self.history,
            Resource::Logs => &self.logs,
        }
    }

    pub(crate) fn slot_mut(&mut self, resource: Resource) -> &mut Slot {
        match resource {
            Resource::Status => &mut self.status,
            Resource::Curve => &mut self.curve,
            Resource::History => &mut self.history,
            Resource::Logs => &mut self.logs,
        }
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        self.slot(resource).loading
    }

    pub fn error(&self, key: ErrorKey) -> Option<&str> {
        match key {
            ErrorKey::Status => self.status.error.as_deref(),
            ErrorKey::Curve => self.curve.error.as_deref(),
            ErrorKey::History => self.history.error.as_deref(),
            ErrorKey::Logs => self.logs.error.as_deref(),
            ErrorKey::Channel => self.channel_error.as_deref(),
        }
    }

    /// Clear one slot. Returns whether anything changed.
    pub(crate) fn clear(&mut self, key: ErrorKey) -> bool {
        let slot = match key {
            ErrorKey::Status => &mut self.status.error,
            ErrorKey::Curve => &mut self.curve.error,
            ErrorKey::History => &mut self.history.error,
            ErrorKey::Logs => &mut self.logs.error,
            ErrorKey::Channel => &mut self.channel_error,
        };
        slot.take().is_some()
    }

    pub fn any_loading(&self) -> bool {
        Resource::ALL.iter().any(|r| self.is_loading(*r))
    }

    /// Every non-empty error slot, in `ErrorKey::ALL` order.
    pub fn errors(&self) -> Vec<(ErrorKey, &str)> {
        ErrorKey::ALL
            .iter()
            .filter_map(|key| self.error(*key).map(|msg| (*key, msg)))
            .collect()
    }
}
