// Fan curve endpoints

use tracing::debug;

use crate::client::FanClient;
use crate::error::Error;
use crate::models::{CurveBody, CurvePointRecord};

impl FanClient {
    /// Get the configured fan curve.
    ///
    /// `GET /api/curve`
    pub async fn get_curve(&self) -> Result<CurveBody, Error> {
        let url = self.api_url("curve")?;
        debug!("fetching fan curve");
        self.get(url, &[]).await
    }

    /// Replace the fan curve.
    ///
    /// `PUT /api/curve` with `{"points": [...]}`. The controller validates
    /// the points; this client sends them as given.
    pub async fn put_curve(&self, points: &[CurvePointRecord]) -> Result<(), Error> {
        let url = self.api_url("curve")?;
        debug!(count = points.len(), "saving fan curve");
        let body = CurveBody {
            points: points.to_vec(),
        };
        let _: serde_json::Value = self.put(url, &body).await?;
        Ok(())
    }
}
