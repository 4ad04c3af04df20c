// ── Core error types ──
//
// User-facing errors from fanlink-core. Failed store operations surface
// as `Request`, carrying the same message that lands in the resource's
// error slot. Everything else is translated from `fanlink_api::Error`.

use thiserror::Error;

use crate::store::Resource;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store operations ─────────────────────────────────────────────
    /// A fetch/save on a tracked resource failed.
    ///
    /// `message` is exactly what was written to the resource's error slot.
    #[error("{message}")]
    Request {
        resource: Resource,
        message: String,
        /// HTTP status code (if the controller answered at all).
        status: Option<u16>,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The message as the user should see it.
    ///
    /// For `Request` this is the error-slot text; for everything else the
    /// `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, when the failure came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } | Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fanlink_api::Error> for CoreError {
    fn from(err: fanlink_api::Error) -> Self {
        match err {
            fanlink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fanlink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fanlink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fanlink_api::Error::Api { status, detail, .. } => CoreError::Api {
                message: detail.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            fanlink_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            fanlink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_server_detail() {
        let err = CoreError::from(fanlink_api::Error::Api {
            status: 422,
            detail: Some("interval must be between 5 and 300".into()),
            body: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "API error: interval must be between 5 and 300"
        );
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn request_error_displays_slot_message() {
        let err = CoreError::Request {
            resource: Resource::History,
            message: "range out of bounds".into(),
            status: Some(400),
        };
        assert_eq!(err.to_string(), "range out of bounds");
        assert_eq!(err.user_message(), "range out of bounds");
    }

    #[test]
    fn deserialization_becomes_internal() {
        let err = CoreError::from(fanlink_api::Error::Deserialization {
            message: "expected value".into(),
            body: "oops".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
