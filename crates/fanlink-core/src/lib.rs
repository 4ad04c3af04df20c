//! Live-state sync between a fan controller and its dashboards.
//!
//! - **[`ResourceStore`]**: local mirror of status, fan curve, history and
//!   the rolling log. Every pull or write runs inside a loading/error
//!   envelope per resource; the latest-issued request for a resource is
//!   the only one allowed to settle it.
//!
//! - **[`LiveChannel`]**: the push subscription. Merges `status_update`
//!   messages into the status, prepends `log` messages to the log buffer,
//!   and reconnects after a fixed delay whenever the link drops.
//!
//! - **[`Session`]**: bundles the REST client, the store and the channel
//!   for one controller from a single [`SessionConfig`].

pub mod channel;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use channel::{
    ChannelEvent, ChannelSink, ChannelState, LiveChannel, PushConnector, PushLink, WsConnector,
};
pub use config::{SessionConfig, TlsVerification};
pub use error::CoreError;
pub use session::Session;
pub use store::{ErrorKey, LOG_CAPACITY, LogBuffer, Resource, ResourceStore, Slot, Tracking};
pub use stream::StateStream;

pub use model::{ControlMode, CurvePoint, HistorySample, LogEntry, Settings, Status, StatusPatch};

// Wire-level types callers need to drive the store.
pub use fanlink_api::{HistoryRange, LogQuery, SettingsUpdate};
