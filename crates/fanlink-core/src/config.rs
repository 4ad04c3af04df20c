// ── Runtime session configuration ──
//
// These types describe *how* to reach a fan controller. They never touch
// disk: the CLI (via fanlink-config) builds a `SessionConfig` and hands
// it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Default push-channel path on the controller.
pub const DEFAULT_PUSH_PATH: &str = "/ws";

/// Fixed delay between a lost push connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default bound on every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one controller session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller root, e.g. `http://192.168.1.50:8000`.
    pub base_url: Url,
    /// Path of the push endpoint, joined onto the base host.
    pub push_path: String,
    /// Delay before the push channel reconnects after losing the link.
    pub reconnect_delay: Duration,
    pub tls: TlsVerification,
    /// Request timeout. Keeps loading flags from sticking on a stalled
    /// controller.
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            push_path: DEFAULT_PUSH_PATH.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The WebSocket URL of the push channel for this controller.
    pub fn push_endpoint(&self) -> Result<Url, CoreError> {
        push_endpoint(&self.base_url, &self.push_path)
    }
}

/// Derive the push endpoint from an HTTP base URL.
///
/// `https` maps to `wss` and `http` to `ws`; host and port are kept and
/// the path is replaced by `push_path`. Query and fragment are dropped.
pub fn push_endpoint(base_url: &Url, push_path: &str) -> Result<Url, CoreError> {
    let scheme = match base_url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme `{other}` (expected http or https)"),
            });
        }
    };

    let mut url = base_url.clone();
    url.set_scheme(scheme).map_err(|()| CoreError::Config {
        message: format!("cannot derive push endpoint from {base_url}"),
    })?;

    let path = if push_path.starts_with('/') {
        push_path.to_owned()
    } else {
        format!("/{push_path}")
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn endpoint(base: &str, path: &str) -> String {
        push_endpoint(&Url::parse(base).unwrap(), path)
            .unwrap()
            .to_string()
    }

    #[test]
    fn http_maps_to_ws_with_port() {
        assert_eq!(
            endpoint("http://192.168.1.50:8000", "/ws"),
            "ws://192.168.1.50:8000/ws"
        );
    }

    #[test]
    fn https_maps_to_wss_and_replaces_path() {
        assert_eq!(
            endpoint("https://fans.example.com/dashboard?x=1", "ws"),
            "wss://fans.example.com/ws"
        );
    }

    #[test]
    fn other_schemes_are_rejected() {
        let result = push_endpoint(&Url::parse("ftp://host").unwrap(), "/ws");
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[test]
    fn session_defaults() {
        let config = SessionConfig::new(Url::parse("http://10.0.0.2").unwrap());
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.push_path, "/ws");
        assert_eq!(config.push_endpoint().unwrap().as_str(), "ws://10.0.0.2/ws");
    }
}
