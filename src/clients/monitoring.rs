use super::BackendClient;
use crate::error::ApiError;
use crate::models::api::{LineSeries, StatusDistribution};

impl BackendClient {
    pub async fn network_traffic(&self, token: &str) -> Result<LineSeries, ApiError> {
        self.get("/api/monitoring/network-traffic", Some(token)).await
    }

    pub async fn disk_io(&self, token: &str) -> Result<LineSeries, ApiError> {
        self.get("/api/monitoring/disk-io", Some(token)).await
    }

    pub async fn response_time(&self, token: &str) -> Result<LineSeries, ApiError> {
        self.get("/api/monitoring/response-time", Some(token)).await
    }

    pub async fn request_status(&self, token: &str) -> Result<StatusDistribution, ApiError> {
        self.get("/api/monitoring/request-status", Some(token)).await
    }
}
