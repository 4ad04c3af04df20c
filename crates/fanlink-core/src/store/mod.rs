// ── Resource store ──
//
// Owns the local mirror of everything the dashboard shows: status, fan
// curve, history and the rolling log. Each slice is a `watch` channel so
// consumers can read a snapshot or await changes. Request lifecycle
// (loading / error) lives in a separate `Tracking` snapshot.

mod fetch;
mod logs;
mod tracking;

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, trace};

use fanlink_api::{FanClient, HistoryRange};

use crate::model::{CurvePoint, HistorySample, LogEntry, Status, StatusPatch};
use crate::stream::StateStream;

pub use logs::{LOG_CAPACITY, LogBuffer};
pub use tracking::{ErrorKey, Resource, Slot, Tracking};

/// Central state container for one controller.
///
/// Shared by `Arc` between the application and the
/// [`LiveChannel`](crate::LiveChannel). The channel only ever merges
/// status, prepends log lines and writes the channel error slot; it never
/// touches a resource's loading flag or error slot.
pub struct ResourceStore {
    client: FanClient,
    status: watch::Sender<Arc<Status>>,
    curve: watch::Sender<Arc<Vec<CurvePoint>>>,
    history: watch::Sender<Arc<Vec<HistorySample>>>,
    history_range: watch::Sender<HistoryRange>,
    logs: watch::Sender<Arc<LogBuffer>>,
    tracking: watch::Sender<Tracking>,
    /// Latest issued request token per resource, indexed by `Resource::index`.
    issued: Mutex<[u64; 4]>,
}

impl ResourceStore {
    pub fn new(client: FanClient) -> Self {
        let (status, _) = watch::channel(Arc::new(Status::default()));
        let (curve, _) = watch::channel(Arc::new(Vec::new()));
        let (history, _) = watch::channel(Arc::new(Vec::new()));
        let (history_range, _) = watch::channel(HistoryRange::default());
        let (logs, _) = watch::channel(Arc::new(LogBuffer::new()));
        let (tracking, _) = watch::channel(Tracking::default());

        Self {
            client,
            status,
            curve,
            history,
            history_range,
            logs,
            tracking,
            issued: Mutex::new([0; 4]),
        }
    }

    /// The REST client used by the fetch/save operations.
    pub fn client(&self) -> &FanClient {
        &self.client
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn status(&self) -> Arc<Status> {
        self.status.borrow().clone()
    }

    pub fn curve(&self) -> Arc<Vec<CurvePoint>> {
        self.curve.borrow().clone()
    }

    pub fn history(&self) -> Arc<Vec<HistorySample>> {
        self.history.borrow().clone()
    }

    /// Range of the last successful history fetch.
    pub fn history_range(&self) -> HistoryRange {
        *self.history_range.borrow()
    }

    pub fn logs(&self) -> Arc<LogBuffer> {
        self.logs.borrow().clone()
    }

    pub fn tracking(&self) -> Tracking {
        self.tracking.borrow().clone()
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        self.tracking.borrow().is_loading(resource)
    }

    pub fn error(&self, key: ErrorKey) -> Option<String> {
        self.tracking.borrow().error(key).map(str::to_owned)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_status(&self) -> StateStream<Arc<Status>> {
        StateStream::new(self.status.subscribe())
    }

    pub fn subscribe_curve(&self) -> StateStream<Arc<Vec<CurvePoint>>> {
        StateStream::new(self.curve.subscribe())
    }

    pub fn subscribe_history(&self) -> StateStream<Arc<Vec<HistorySample>>> {
        StateStream::new(self.history.subscribe())
    }

    pub fn subscribe_logs(&self) -> StateStream<Arc<LogBuffer>> {
        StateStream::new(self.logs.subscribe())
    }

    pub fn subscribe_tracking(&self) -> StateStream<Tracking> {
        StateStream::new(self.tracking.subscribe())
    }

    // ── Error slots ──────────────────────────────────────────────────

    /// Clear one error slot. Other slots and all loading flags are untouched.
    pub fn clear_error(&self, key: ErrorKey) {
        self.tracking.send_if_modified(|t| t.clear(key));
    }

    /// Clear every error slot, the channel slot included.
    pub fn clear_all_errors(&self) {
        self.tracking.send_if_modified(|t| {
            ErrorKey::ALL
                .iter()
                .fold(false, |changed, key| t.clear(*key) || changed)
        });
    }

    // ── Push-channel mutators ────────────────────────────────────────

    /// Shallow-merge a partial status update.
    pub(crate) fn merge_status(&self, patch: StatusPatch) {
        if patch.is_empty() {
            trace!("empty status patch ignored");
            return;
        }
        self.status.send_modify(|status| Arc::make_mut(status).apply(patch));
    }

    /// Prepend a live log line, evicting beyond [`LOG_CAPACITY`].
    pub(crate) fn push_log(&self, entry: LogEntry) {
        self.logs
            .send_modify(|logs| Arc::make_mut(logs).push_front(entry));
    }

    pub(crate) fn set_channel_error(&self, error: Option<String>) {
        self.tracking.send_if_modified(|t| {
            if t.channel_error == error {
                return false;
            }
            debug!(error = ?error, "channel error slot updated");
            t.channel_error = error;
            true
        });
    }
}

impl fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStore")
            .field("base_url", &self.client.base_url().as_str())
            .field("tracking", &*self.tracking.borrow())
            .finish_non_exhaustive()
    }
}
