// Log endpoints

use tracing::debug;

use crate::client::FanClient;
use crate::error::Error;
use crate::models::{LogQuery, LogsResponse};

impl FanClient {
    /// Get controller log lines, newest first.
    ///
    /// `GET /api/logs?level=..&search=..&limit=..` plus any extra filters.
    pub async fn get_logs(&self, query: &LogQuery) -> Result<LogsResponse, Error> {
        let url = self.api_url("logs")?;
        let pairs = query.to_pairs();
        debug!(filters = pairs.len(), "fetching logs");
        self.get(url, &pairs).await
    }
}
