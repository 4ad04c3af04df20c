// Dashboard endpoints
//
// Live status snapshot, historical samples, and the control-mode handover
// back to the device's own fan logic.

use tracing::debug;

use crate::client::FanClient;
use crate::error::Error;
use crate::models::{HistoryRange, HistoryResponse, StatusRecord};

impl FanClient {
    /// Get the current status snapshot.
    ///
    /// `GET /api/dashboard/status`
    pub async fn get_status(&self) -> Result<StatusRecord, Error> {
        let url = self.api_url("dashboard/status")?;
        debug!("fetching status");
        self.get(url, &[]).await
    }

    /// Get historical samples for a time window.
    ///
    /// `GET /api/dashboard/history?range={range}`
    pub async fn get_history(&self, range: HistoryRange) -> Result<HistoryResponse, Error> {
        let url = self.api_url("dashboard/history")?;
        debug!(range = %range, "fetching history");
        self.get(url, &[("range".into(), range.as_str().into())])
            .await
    }

    /// Hand fan control back to the device firmware.
    ///
    /// `POST /api/dashboard/restore-auto`
    pub async fn restore_auto(&self) -> Result<(), Error> {
        let url = self.api_url("dashboard/restore-auto")?;
        debug!("restoring automatic fan control");
        let _: serde_json::Value = self.post(url).await?;
        Ok(())
    }
}
