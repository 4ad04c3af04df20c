// ── Live push channel ──
//
// Keeps one push connection to the controller alive and folds what it
// delivers into the `ResourceStore`. Transport callbacks are tagged with
// the link generation they belong to, so anything a torn-down link says
// after `disconnect()` or a reconnect is ignored.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde_json::Value;
use strum::{Display, IntoStaticStr};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use fanlink_api::models::PushFrame;
use fanlink_api::{PushConnection, TransportEvent};

use crate::config::SessionConfig;
use crate::convert::{log_entry_from_fields, status_patch_from_fields};
use crate::error::CoreError;
use crate::model::LogEntry;
use crate::store::ResourceStore;

/// Push message carrying a partial status.
pub const TAG_STATUS_UPDATE: &str = "status_update";
/// Push message carrying one log line.
pub const TAG_LOG: &str = "log";

// ── ChannelState ─────────────────────────────────────────────────────

/// Lifecycle of the push channel.
///
/// `Idle → Connecting → Open → Closed → Connecting → …`; `disconnect()`
/// returns to `Idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelState {
    Idle,
    Connecting,
    Open,
    Closed,
}

// ── ChannelEvent ─────────────────────────────────────────────────────

/// Everything a push link can report.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Closed,
    MessageReceived { tag: String, payload: Value },
    TransportError(String),
}

impl ChannelEvent {
    /// Parse a raw text frame. Frames that are not a JSON object with a
    /// string `type` are dropped.
    pub fn from_frame(text: &str) -> Option<Self> {
        match serde_json::from_str::<PushFrame>(text) {
            Ok(frame) => Some(Self::MessageReceived {
                tag: frame.kind,
                payload: frame.data,
            }),
            Err(e) => {
                debug!(error = %e, len = text.len(), "dropping malformed push frame");
                None
            }
        }
    }

    /// Translate a WebSocket transport event. Malformed frames yield `None`.
    pub fn from_transport(event: TransportEvent) -> Option<Self> {
        match event {
            TransportEvent::Opened => Some(Self::Opened),
            TransportEvent::Frame(text) => Self::from_frame(&text),
            TransportEvent::Error(detail) => Some(Self::TransportError(detail)),
            TransportEvent::Closed { code, reason } => {
                debug!(?code, reason = %reason, "push link closed");
                Some(Self::Closed)
            }
        }
    }
}

// ── Connector seam ───────────────────────────────────────────────────

/// A live push link. Closing must be idempotent.
pub trait PushLink: Send {
    fn close(&self);
}

/// Opens push links. The production connector speaks WebSocket; tests
/// substitute a scripted one.
pub trait PushConnector: Send + Sync {
    /// Start opening a link to `url`. Events for the link are delivered
    /// through `sink`, possibly before this returns.
    fn open(&self, url: &Url, sink: ChannelSink) -> Box<dyn PushLink>;
}

/// Where a link reports its events.
///
/// Bound to one link generation; cheap to clone.
#[derive(Clone)]
pub struct ChannelSink {
    generation: u64,
    inner: Weak<ChannelInner>,
}

impl ChannelSink {
    pub fn deliver(&self, event: ChannelEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle(self.generation, event);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSink")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl PushLink for PushConnection {
    fn close(&self) {
        PushConnection::close(self);
    }
}

/// Connector backed by [`fanlink_api::websocket`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl PushConnector for WsConnector {
    fn open(&self, url: &Url, sink: ChannelSink) -> Box<dyn PushLink> {
        let conn = PushConnection::spawn(url.clone(), move |event| {
            if let Some(event) = ChannelEvent::from_transport(event) {
                sink.deliver(event);
            }
        });
        Box::new(conn)
    }
}

// ── LiveChannel ──────────────────────────────────────────────────────

/// Self-healing push subscription feeding a [`ResourceStore`].
///
/// Cheaply cloneable. On an unexpected close the channel waits
/// `reconnect_delay` and tries again, indefinitely, with at most one
/// retry outstanding.
#[derive(Clone)]
pub struct LiveChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    store: Arc<ResourceStore>,
    connector: Arc<dyn PushConnector>,
    endpoint: Url,
    reconnect_delay: Duration,
    state: watch::Sender<ChannelState>,
    guarded: Mutex<Guarded>,
}

#[derive(Default)]
struct Guarded {
    generation: u64,
    link: Option<Box<dyn PushLink>>,
    retry: Option<CancellationToken>,
}

impl LiveChannel {
    pub fn new(
        store: Arc<ResourceStore>,
        connector: Arc<dyn PushConnector>,
        endpoint: Url,
        reconnect_delay: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ChannelState::Idle);
        Self {
            inner: Arc::new(ChannelInner {
                store,
                connector,
                endpoint,
                reconnect_delay,
                state,
                guarded: Mutex::new(Guarded::default()),
            }),
        }
    }

    /// WebSocket channel for the controller described by `config`.
    pub fn websocket(store: Arc<ResourceStore>, config: &SessionConfig) -> Result<Self, CoreError> {
        Ok(Self::new(
            store,
            Arc::new(WsConnector),
            config.push_endpoint()?,
            config.reconnect_delay,
        ))
    }

    /// Open the push link unless one is already open or opening.
    ///
    /// A pending reconnect is cancelled; this call takes its place.
    /// Reconnects and the WebSocket task need a tokio runtime. Without
    /// one the link closes at once and no retry is scheduled.
    pub fn connect(&self) {
        ChannelInner::connect(&self.inner, true);
    }

    /// Tear the link down and stay down. Cancels any pending reconnect.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    pub fn state(&self) -> ChannelState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.state.subscribe()
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.inner.reconnect_delay
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.inner.store
    }

    /// Whether a reconnect is currently scheduled.
    pub fn has_pending_retry(&self) -> bool {
        self.inner.lock().retry.is_some()
    }
}

impl fmt::Debug for LiveChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveChannel")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ChannelInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Guarded> {
        self.guarded.lock().expect("channel state lock poisoned")
    }

    fn current_state(&self) -> ChannelState {
        *self.state.borrow()
    }

    fn connect(this: &Arc<Self>, cancel_retry: bool) {
        let generation = {
            let mut guarded = this.lock();
            if cancel_retry {
                if let Some(retry) = guarded.retry.take() {
                    debug!("manual connect supersedes pending reconnect");
                    retry.cancel();
                }
            }
            if matches!(
                this.current_state(),
                ChannelState::Open | ChannelState::Connecting
            ) {
                trace!("push channel already live, connect ignored");
                return;
            }
            guarded.generation += 1;
            this.state.send_replace(ChannelState::Connecting);
            guarded.generation
        };

        info!(url = %this.endpoint, generation, "opening push channel");
        let sink = ChannelSink {
            generation,
            inner: Arc::downgrade(this),
        };
        // The lock is released here: a connector may report events
        // synchronously from `open`.
        let link = this.connector.open(&this.endpoint, sink);

        let orphan = {
            let mut guarded = this.lock();
            let still_wanted = guarded.generation == generation
                && matches!(
                    this.current_state(),
                    ChannelState::Connecting | ChannelState::Open
                );
            if still_wanted {
                guarded.link = Some(link);
                None
            } else {
                Some(link)
            }
        };
        if let Some(link) = orphan {
            debug!(generation, "link superseded before it was stored");
            link.close();
        }
    }

    fn disconnect(&self) {
        let link = {
            let mut guarded = self.lock();
            if let Some(retry) = guarded.retry.take() {
                retry.cancel();
            }
            guarded.generation += 1;
            self.state.send_replace(ChannelState::Idle);
            guarded.link.take()
        };
        if let Some(link) = link {
            info!("closing push channel");
            link.close();
        }
        self.store.set_channel_error(None);
    }

    /// Apply one event from the link of `generation`.
    fn handle(self: &Arc<Self>, generation: u64, event: ChannelEvent) {
        let mut guarded = self.lock();
        if guarded.generation != generation {
            trace!(
                generation,
                current = guarded.generation,
                "event from stale link ignored"
            );
            return;
        }

        match event {
            ChannelEvent::Opened => {
                info!(generation, "push channel open");
                self.state.send_replace(ChannelState::Open);
                self.store.set_channel_error(None);
            }
            ChannelEvent::MessageReceived { tag, payload } => {
                apply_message(&self.store, &tag, payload);
            }
            ChannelEvent::TransportError(detail) => {
                warn!(generation, error = %detail, "push channel error");
                self.store
                    .set_channel_error(Some(format!("Live connection error: {detail}")));
            }
            ChannelEvent::Closed => {
                if self.current_state() == ChannelState::Closed {
                    trace!(generation, "duplicate close ignored");
                    return;
                }
                let stale = guarded.link.take();
                self.state.send_replace(ChannelState::Closed);
                self.store.set_channel_error(Some(format!(
                    "Live connection lost, retrying in {}",
                    format_delay(self.reconnect_delay)
                )));
                warn!(
                    generation,
                    delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
                    "push channel closed, reconnect scheduled"
                );
                if guarded.retry.is_none() {
                    guarded.retry = self.schedule_retry();
                }
                drop(guarded);
                drop(stale);
            }
        }
    }

    /// Spawn the single reconnect timer. Returns its cancel handle.
    fn schedule_retry(self: &Arc<Self>) -> Option<CancellationToken> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime, push channel will not reconnect");
            return None;
        };

        let token = CancellationToken::new();
        let task_token = token.clone();
        let weak = Arc::downgrade(self);
        // The deadline counts from the close, not from the first poll.
        let sleep = {
            let _entered = runtime.enter();
            tokio::time::sleep(self.reconnect_delay)
        };

        runtime.spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {
                    trace!("reconnect cancelled");
                }
                () = sleep => {
                    if let Some(inner) = weak.upgrade() {
                        inner.retry_fired(&task_token);
                    }
                }
            }
        });

        Some(token)
    }

    fn retry_fired(self: &Arc<Self>, token: &CancellationToken) {
        {
            let mut guarded = self.lock();
            // Cancelled between the timer firing and taking the lock.
            if token.is_cancelled() || guarded.retry.is_none() {
                return;
            }
            guarded.retry = None;
        }
        debug!("reconnecting push channel");
        Self::connect(self, false);
    }
}

impl Drop for ChannelInner {
    fn drop(&mut self) {
        if let Ok(guarded) = self.guarded.get_mut() {
            if let Some(retry) = guarded.retry.take() {
                retry.cancel();
            }
            if let Some(link) = guarded.link.take() {
                link.close();
            }
        }
    }
}

// ── Message routing ──────────────────────────────────────────────────

fn apply_message(store: &ResourceStore, tag: &str, payload: Value) {
    match tag {
        TAG_STATUS_UPDATE => match payload {
            Value::Object(fields) => store.merge_status(status_patch_from_fields(&fields)),
            other => debug!(payload = %other, "dropping non-object status_update payload"),
        },
        TAG_LOG => match decode_log(payload) {
            Some(entry) => store.push_log(entry),
            None => debug!("dropping undecodable log payload"),
        },
        other => trace!(tag = other, "ignoring push message"),
    }
}

fn decode_log(payload: Value) -> Option<LogEntry> {
    match payload {
        Value::String(message) => Some(LogEntry::message(message)),
        Value::Object(fields) => Some(log_entry_from_fields(fields)),
        _ => None,
    }
}

/// `3000ms` renders as `3s`, `1500ms` as `1.5s`.
fn format_delay(delay: Duration) -> String {
    if delay.subsec_millis() == 0 {
        format!("{}s", delay.as_secs())
    } else {
        format!("{:.1}s", delay.as_secs_f64())
    }
}
