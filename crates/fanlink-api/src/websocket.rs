//! Push-channel transport.
//!
//! Opens one WebSocket to the controller's push endpoint and reports what
//! happens on it as a stream of [`TransportEvent`]s delivered to a callback,
//! in the order a browser would fire them: `Opened`, then any number of
//! `Frame`s and `Error`s, then exactly one `Closed`. A failed handshake
//! yields `Error` followed by `Closed`.
//!
//! This module never reconnects on its own. Recovery policy belongs to the
//! caller (see `fanlink_core::LiveChannel`), which opens a fresh
//! [`PushConnection`] per attempt.
//!
//! # Example
//!
//! ```rust,ignore
//! use fanlink_api::websocket::{PushConnection, TransportEvent};
//! use url::Url;
//!
//! let url = Url::parse("ws://192.168.1.50:8000/ws")?;
//! let conn = PushConnection::spawn(url, |event| match event {
//!     TransportEvent::Frame(text) => println!("{text}"),
//!     other => println!("{other:?}"),
//! });
//!
//! conn.close();
//! ```

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── TransportEvent ───────────────────────────────────────────────────

/// Something that happened on a single push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; frames may follow.
    Opened,
    /// A text frame arrived. Contents are not parsed here.
    Frame(String),
    /// The connection failed or a read errored. Always followed by `Closed`.
    Error(String),
    /// The connection is gone. Emitted exactly once per connection.
    Closed { code: Option<u16>, reason: String },
}

const NO_RUNTIME: &str = "no tokio runtime";

// ── PushConnection ───────────────────────────────────────────────────

/// Handle to one running push connection.
///
/// Dropping the handle tears the connection down, same as [`close`](Self::close).
#[derive(Debug)]
pub struct PushConnection {
    cancel: CancellationToken,
}

impl PushConnection {
    /// Spawn the connection task and return immediately.
    ///
    /// The handshake happens asynchronously; `on_event` is invoked from the
    /// spawned task and must not block. Outside a tokio runtime nothing is
    /// spawned: `on_event` receives `Error` then `Closed` before this
    /// returns.
    pub fn spawn<F>(url: Url, mut on_event: F) -> Self
    where
        F: FnMut(TransportEvent) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let task_cancel = cancel.clone();
                runtime.spawn(async move {
                    run_connection(url, task_cancel, on_event).await;
                });
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "push channel needs a tokio runtime");
                on_event(TransportEvent::Error(NO_RUNTIME.into()));
                on_event(TransportEvent::Closed {
                    code: None,
                    reason: NO_RUNTIME.into(),
                });
            }
        }
        Self { cancel }
    }

    /// Request a graceful close. A `Closed` event still follows.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether [`close`](Self::close) has been requested.
    pub fn is_closing(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PushConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn run_connection<F>(url: Url, cancel: CancellationToken, mut on_event: F)
where
    F: FnMut(TransportEvent),
{
    tracing::info!(url = %url, "connecting push channel");

    let connect = tokio_tungstenite::connect_async(url.as_str());
    let ws_stream = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            on_event(TransportEvent::Closed {
                code: None,
                reason: "closed before handshake completed".into(),
            });
            return;
        }
        result = connect => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                let err = Error::WebSocketConnect(e.to_string());
                tracing::warn!(error = %err, "push channel handshake failed");
                on_event(TransportEvent::Error(err.to_string()));
                on_event(TransportEvent::Closed {
                    code: None,
                    reason: "handshake failed".into(),
                });
                return;
            }
        }
    };

    tracing::info!("push channel connected");
    on_event(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    let closed = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if let Err(e) = write.send(tungstenite::Message::Close(None)).await {
                    tracing::debug!(error = %e, "failed to send close frame");
                }
                break TransportEvent::Closed {
                    code: Some(1000),
                    reason: "closed by client".into(),
                };
            }
            frame = read.next() => match frame {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    on_event(TransportEvent::Frame(text.to_string()));
                }
                Some(Ok(tungstenite::Message::Ping(_))) => {
                    // tungstenite answers pings automatically
                    tracing::trace!("push channel ping");
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    let (code, reason) = frame.map_or((None, String::new()), |cf| {
                        (Some(u16::from(cf.code)), cf.reason.to_string())
                    });
                    tracing::info!(?code, reason = %reason, "push channel close frame received");
                    break TransportEvent::Closed { code, reason };
                }
                Some(Err(e)) => {
                    let err = Error::WebSocketConnect(e.to_string());
                    tracing::warn!(error = %err, "push channel read failed");
                    on_event(TransportEvent::Error(err.to_string()));
                    break TransportEvent::Closed {
                        code: None,
                        reason: "read error".into(),
                    };
                }
                None => {
                    tracing::info!("push channel stream ended");
                    break TransportEvent::Closed {
                        code: None,
                        reason: "stream ended".into(),
                    };
                }
                Some(Ok(_)) => {
                    // Binary, Pong, raw Frame -- ignored
                }
            }
        }
    };

    on_event(closed);
}
