use mwp_types::dashboard::{DeviceData, TrafficUsage};
use tracing::debug;

use super::{ApiClient, ApiError};

/// Days of traffic history requested when the caller does not say.
pub const DEFAULT_TRAFFIC_RANGE: u32 = 7;

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_device_data(&self) -> Result<DeviceData, ApiError> {
        self.get_data("/device/stats").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_daily_traffic_usage(&self, range: Option<u32>) -> Result<Vec<TrafficUsage>, ApiError> {
        let range = range.unwrap_or(DEFAULT_TRAFFIC_RANGE);
        let usage: Vec<TrafficUsage> = self.get_list(&format!("/device/traffic?range={range}")).await?;
        debug!(range, points = usage.len(), "fetched traffic usage");
        Ok(usage)
    }
}
