// ── Fetch / save envelope ──
//
// Every pull or write runs through `ResourceStore::track`: raise the
// loading flag, clear the slot's error, await the call, then settle the
// slot. Only the latest-issued request for a resource may settle it; a
// superseded response is returned to its caller and otherwise dropped.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use fanlink_api::{CurvePointRecord, HistoryRange, LogQuery};

use super::{Resource, ResourceStore};
use crate::error::CoreError;
use crate::model::{ControlMode, CurvePoint, HistorySample, LogEntry, Status, StatusPatch};

const FETCH_STATUS_FAILED: &str = "Failed to fetch status";
const FETCH_CURVE_FAILED: &str = "Failed to fetch fan curve";
const SAVE_CURVE_FAILED: &str = "Failed to save fan curve";
const FETCH_HISTORY_FAILED: &str = "Failed to fetch history";
const FETCH_LOGS_FAILED: &str = "Failed to fetch logs";
const RESTORE_AUTO_FAILED: &str = "Failed to restore automatic control";

impl ResourceStore {
    // ── Operations ───────────────────────────────────────────────────

    /// Pull the full status and replace the local copy.
    pub async fn fetch_status(&self) -> Result<Status, CoreError> {
        let call = async {
            let record = self.client.get_status().await?;
            Ok::<_, fanlink_api::Error>(Status::from_patch(StatusPatch::from(record)))
        };
        self.track(Resource::Status, FETCH_STATUS_FAILED, call, |status| {
            self.status.send_replace(Arc::new(status.clone()));
        })
        .await
    }

    /// Pull the fan curve and replace the local copy.
    pub async fn fetch_curve(&self) -> Result<Vec<CurvePoint>, CoreError> {
        let call = async {
            let body = self.client.get_curve().await?;
            let points: Vec<CurvePoint> = body.points.into_iter().map(CurvePoint::from).collect();
            Ok::<_, fanlink_api::Error>(points)
        };
        let apply = |points: &Vec<CurvePoint>| {
            self.curve.send_replace(Arc::new(points.clone()));
        };
        self.track(Resource::Curve, FETCH_CURVE_FAILED, call, apply)
            .await
    }

    /// Write a new fan curve.
    ///
    /// On success the local curve becomes exactly `points`; the controller
    /// is not re-read.
    pub async fn save_curve(&self, points: Vec<CurvePoint>) -> Result<(), CoreError> {
        let records: Vec<CurvePointRecord> = points.iter().copied().map(Into::into).collect();
        let call = self.client.put_curve(&records);
        self.track(Resource::Curve, SAVE_CURVE_FAILED, call, move |_| {
            self.curve.send_replace(Arc::new(points));
        })
        .await
    }

    /// Pull history for `range` (one hour when `None`) and replace the
    /// local series.
    pub async fn fetch_history(
        &self,
        range: impl Into<Option<HistoryRange>>,
    ) -> Result<Vec<HistorySample>, CoreError> {
        let range = range.into().unwrap_or_default();
        let call = async {
            let body = self.client.get_history(range).await?;
            let samples: Vec<HistorySample> =
                body.data.into_iter().map(HistorySample::from).collect();
            Ok::<_, fanlink_api::Error>(samples)
        };
        let apply = |samples: &Vec<HistorySample>| {
            self.history.send_replace(Arc::new(samples.clone()));
            self.history_range.send_replace(range);
        };
        self.track(Resource::History, FETCH_HISTORY_FAILED, call, apply)
            .await
    }

    /// Pull a page of logs and replace the buffer wholesale.
    ///
    /// The page is kept at the length the controller returned, even
    /// beyond [`LOG_CAPACITY`](super::LOG_CAPACITY).
    pub async fn fetch_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>, CoreError> {
        let call = async {
            let body = self.client.get_logs(query).await?;
            let entries: Vec<LogEntry> = body.logs.into_iter().map(LogEntry::from).collect();
            Ok::<_, fanlink_api::Error>(entries)
        };
        let apply = |entries: &Vec<LogEntry>| {
            self.logs
                .send_modify(|logs| Arc::make_mut(logs).replace(entries.clone()));
        };
        self.track(Resource::Logs, FETCH_LOGS_FAILED, call, apply)
            .await
    }

    /// Hand fan control back to the controller's automatic curve.
    ///
    /// Tracked as a status operation; on success `control_mode` becomes
    /// `auto` without waiting for the next push.
    pub async fn restore_auto_control(&self) -> Result<(), CoreError> {
        let call = self.client.restore_auto();
        self.track(Resource::Status, RESTORE_AUTO_FAILED, call, |_| {
            self.merge_status(StatusPatch {
                control_mode: Some(ControlMode::Auto),
                ..StatusPatch::default()
            });
        })
        .await
    }

    // ── Envelope ─────────────────────────────────────────────────────

    /// Issue a new request token and mark `resource` loading.
    fn begin(&self, resource: Resource) -> u64 {
        let mut issued = self.issued.lock().expect("request token lock poisoned");
        let token = issued[resource.index()] + 1;
        issued[resource.index()] = token;
        self.tracking.send_modify(|t| {
            let slot = t.slot_mut(resource);
            slot.loading = true;
            slot.error = None;
        });
        token
    }

    /// Run `call` inside the loading/error envelope of `resource`.
    ///
    /// `apply` runs only when this request is still the latest one for
    /// the resource, and before the loading flag drops.
    async fn track<T, F, A>(
        &self,
        resource: Resource,
        fallback: &'static str,
        call: F,
        apply: A,
    ) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, fanlink_api::Error>>,
        A: FnOnce(&T),
    {
        let token = self.begin(resource);
        debug!(%resource, token, "request started");

        let result = call.await;

        let issued = self.issued.lock().expect("request token lock poisoned");
        let latest = issued[resource.index()] == token;

        match result {
            Ok(value) => {
                if latest {
                    apply(&value);
                    self.tracking.send_modify(|t| t.slot_mut(resource).loading = false);
                    debug!(%resource, token, "request succeeded");
                } else {
                    debug!(%resource, token, "superseded response discarded");
                }
                Ok(value)
            }
            Err(err) => {
                let message = error_message(&err, fallback);
                if latest {
                    warn!(%resource, error = %err, "request failed");
                    self.tracking.send_modify(|t| {
                        let slot = t.slot_mut(resource);
                        slot.loading = false;
                        slot.error = Some(message.clone());
                    });
                } else {
                    debug!(%resource, token, error = %err, "superseded failure discarded");
                }
                Err(CoreError::Request {
                    resource,
                    message,
                    status: err.status(),
                })
            }
        }
    }
}

/// Most specific message for a failed request: the controller's `detail`,
/// then the transport-level message, then `fallback`.
pub(crate) fn error_message(err: &fanlink_api::Error, fallback: &str) -> String {
    if let Some(detail) = err.detail().filter(|d| !d.trim().is_empty()) {
        return detail.to_owned();
    }
    match err {
        fanlink_api::Error::Transport(_)
        | fanlink_api::Error::Api { .. }
        | fanlink_api::Error::WebSocketConnect(_)
        | fanlink_api::Error::Tls(_) => err.to_string(),
        fanlink_api::Error::InvalidUrl(_) | fanlink_api::Error::Deserialization { .. } => {
            fallback.to_owned()
        }
    }
}
