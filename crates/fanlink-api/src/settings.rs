// Controller settings endpoints
//
// BMC address, credentials and polling interval used by the controller's
// monitor loop.

use tracing::debug;

use crate::client::FanClient;
use crate::error::Error;
use crate::models::{SettingsRecord, SettingsUpdate};

impl FanClient {
    /// Get the controller settings (password masked by the server).
    ///
    /// `GET /api/settings`
    pub async fn get_settings(&self) -> Result<SettingsRecord, Error> {
        let url = self.api_url("settings")?;
        debug!("fetching settings");
        self.get(url, &[]).await
    }

    /// Update a subset of the controller settings.
    ///
    /// `PUT /api/settings` with only the fields that are set.
    pub async fn put_settings(&self, update: &SettingsUpdate) -> Result<(), Error> {
        let url = self.api_url("settings")?;
        debug!(
            ip_address = update.ip_address.is_some(),
            username = update.username.is_some(),
            password = update.password.is_some(),
            interval = ?update.interval,
            "saving settings"
        );
        let _: serde_json::Value = self.put(url, update).await?;
        Ok(())
    }
}
