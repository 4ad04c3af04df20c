// REST API HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining and the controller's
// `{"detail": ...}` error convention. Endpoint groups (dashboard, curve,
// logs, settings) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for the fan controller's REST API.
///
/// All methods return decoded payloads; non-success responses are turned
/// into [`Error::Api`] carrying the server's `detail` when present.
#[derive(Debug, Clone)]
pub struct FanClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FanClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root (e.g. `http://192.168.1.50:8000`);
    /// endpoint paths are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    ///
    /// Any path prefix on the base URL (reverse-proxy mounts) is kept.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let mut builder = self.http.get(url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        parse_response(resp).await
    }

    /// Send a PUT request with JSON body and decode the JSON response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_response(resp).await
    }

    /// Send a POST request without a body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;

        parse_response(resp).await
    }
}

/// Check the HTTP status and decode the body.
///
/// Non-success bodies are probed for the `{"detail": ...}` convention so
/// the most specific message reaches the caller.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        return Err(Error::Api {
            status: status.as_u16(),
            detail,
            body: truncate(&body, 512).to_owned(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = truncate(&body, 200);
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

/// Truncate on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
