use super::BackendClient;
use crate::error::ApiError;
use crate::models::api::{DashboardStats, OverviewStats};

impl BackendClient {
    pub async fn overview_stats(&self, token: &str) -> Result<OverviewStats, ApiError> {
        self.get("/api/stats/overview", Some(token)).await
    }

    pub async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.get("/api/stats/dashboard", Some(token)).await
    }
}
