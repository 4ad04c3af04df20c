// ── Session facade ──
//
// One controller, one `SessionConfig`: the REST client, the resource
// store it feeds, and the push channel that keeps the store live.

use std::sync::Arc;

use tracing::debug;

use fanlink_api::transport::{TlsMode, TransportConfig};
use fanlink_api::{FanClient, SettingsUpdate};

use crate::channel::{LiveChannel, PushConnector};
use crate::config::{SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::Settings;
use crate::store::ResourceStore;

/// Entry point for consumers.
///
/// Cheaply cloneable. Creating a session performs no I/O; call
/// [`channel().connect()`](LiveChannel::connect) to go live and the
/// store's `fetch_*` methods to pull state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    config: SessionConfig,
    store: Arc<ResourceStore>,
    channel: LiveChannel,
}

impl Session {
    /// Build a session speaking WebSocket for the push channel.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let store = Arc::new(ResourceStore::new(build_client(&config)?));
        let channel = LiveChannel::websocket(Arc::clone(&store), &config)?;
        Ok(Self::assemble(config, store, channel))
    }

    /// Build a session with a custom push connector.
    pub fn with_connector(
        config: SessionConfig,
        connector: Arc<dyn PushConnector>,
    ) -> Result<Self, CoreError> {
        let store = Arc::new(ResourceStore::new(build_client(&config)?));
        let channel = LiveChannel::new(
            Arc::clone(&store),
            connector,
            config.push_endpoint()?,
            config.reconnect_delay,
        );
        Ok(Self::assemble(config, store, channel))
    }

    fn assemble(config: SessionConfig, store: Arc<ResourceStore>, channel: LiveChannel) -> Self {
        debug!(base_url = %config.base_url, push = %channel.endpoint(), "session created");
        Self {
            inner: Arc::new(SessionInner {
                config,
                store,
                channel,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &FanClient {
        self.inner.store.client()
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.inner.store
    }

    pub fn channel(&self) -> &LiveChannel {
        &self.inner.channel
    }

    // ── Settings (untracked) ─────────────────────────────────────────

    /// Read the controller's BMC settings.
    pub async fn fetch_settings(&self) -> Result<Settings, CoreError> {
        let record = self.client().get_settings().await?;
        Ok(Settings::from(record))
    }

    /// Write the fields set in `update`. An empty update is a no-op.
    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<(), CoreError> {
        if update.is_empty() {
            debug!("empty settings update skipped");
            return Ok(());
        }
        self.client().put_settings(update).await?;
        Ok(())
    }

    /// Stop the push channel.
    pub fn shutdown(&self) {
        self.inner.channel.disconnect();
    }
}

/// Build the REST client for the controller described by `config`.
fn build_client(config: &SessionConfig) -> Result<FanClient, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    };
    Ok(FanClient::new(config.base_url.clone(), &transport)?)
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
