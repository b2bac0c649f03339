use reqwest::Method;

use super::{Ack, BackendClient};
use crate::error::ApiError;
use crate::models::api::{LogList, LogStats};

/// Server-side log query. Empty fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub limit: u32,
    pub level: String,
    pub container_id: String,
    pub time_range: String,
}

impl BackendClient {
    pub async fn logs(&self, token: &str, q: &LogQuery) -> Result<LogList, ApiError> {
        let limit = if q.limit == 0 { 100 } else { q.limit };
        let query = [
            ("limit", limit.to_string()),
            ("level", q.level.clone()),
            ("container_id", q.container_id.clone()),
            ("time_range", q.time_range.clone()),
        ];
        self.get_query("/api/logs", Some(token), &query).await
    }

    pub async fn log_stats(&self, token: &str, time_range: &str) -> Result<LogStats, ApiError> {
        let range = if time_range.is_empty() { "24h" } else { time_range };
        self.get_query("/api/logs/stats", Some(token), &[("time_range", range.to_string())])
            .await
    }

    pub async fn clear_logs(&self, token: &str) -> Result<Ack, ApiError> {
        self.ack(Method::DELETE, "/api/logs", Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::LogQuery;
    use crate::clients::testing::spawn_backend;
    use axum::extract::RawQuery;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn only_set_filters_are_sent() {
        let router = Router::new().route(
            "/api/logs",
            get(|RawQuery(q): RawQuery| async move {
                assert_eq!(q.as_deref(), Some("limit=100&level=ERROR&time_range=1h"));
                Json(json!({"success": true, "data": {"logs": [], "stats": null}}))
            }),
        );
        let client = spawn_backend(router).await;
        let q = LogQuery {
            level: "ERROR".into(),
            time_range: "1h".into(),
            ..Default::default()
        };
        let list = client.logs("t", &q).await.unwrap();
        assert!(list.logs.is_empty());
        assert!(list.stats.is_none());
    }
}
