use reqwest::Method;

use super::{Ack, BackendClient, segment};
use crate::error::ApiError;
use crate::models::api::{Alert, AlertDetail, AlertDetailData, AlertList, AlertRule, AlertRuleList, AlertRuleUpdate};

impl BackendClient {
    pub async fn alerts(&self, token: &str) -> Result<AlertList, ApiError> {
        self.get("/api/alerts", Some(token)).await
    }

    pub async fn alert(&self, token: &str, id: &str) -> Result<Alert, ApiError> {
        self.get(&format!("/api/alerts/{}", segment(id)), Some(token))
            .await
    }

    pub async fn alert_detail(&self, token: &str, id: &str) -> Result<AlertDetail, ApiError> {
        let data: AlertDetailData = self
            .get(
                &format!("/api/alerts/{}/detail", segment(id)),
                Some(token),
            )
            .await?;
        Ok(data.alert)
    }

    pub async fn resolve_alert(&self, token: &str, id: &str) -> Result<Ack, ApiError> {
        self.ack(
            Method::PUT,
            &format!("/api/alerts/{}/resolve", segment(id)),
            Some(token),
        )
        .await
    }

    pub async fn alert_rules(&self, token: &str) -> Result<Vec<AlertRule>, ApiError> {
        let list: AlertRuleList = self.get("/api/alert-rules", Some(token)).await?;
        Ok(list.rules)
    }

    pub async fn update_alert_rule(
        &self,
        token: &str,
        id: &str,
        update: &AlertRuleUpdate,
    ) -> Result<Ack, ApiError> {
        self.ack_with(
            Method::PUT,
            &format!("/api/alert-rules/{}", segment(id)),
            Some(token),
            update,
        )
        .await
    }

    pub async fn delete_alert_rule(&self, token: &str, id: &str) -> Result<Ack, ApiError> {
        self.ack(
            Method::DELETE,
            &format!("/api/alert-rules/{}", segment(id)),
            Some(token),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::testing::spawn_backend;
    use axum::extract::Path;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn detail_is_unwrapped_from_alert_key() {
        let router = Router::new().route(
            "/api/alerts/{id}/detail",
            get(|Path(id): Path<String>| async move {
                Json(json!({"success": true, "data": {"alert": {
                    "id": id, "severity": "Critical", "status": "Active",
                    "labels": {"node": "worker-1"}, "tags": ["memory"]
                }}}))
            }),
        );
        let client = spawn_backend(router).await;

        let detail = client.alert_detail("t", "ALT-7").await.unwrap();
        assert_eq!(detail.id, "ALT-7");
        assert_eq!(detail.labels["node"], "worker-1");
        assert!(detail.description.is_none());
    }

    #[tokio::test]
    async fn resolve_uses_put() {
        let router = Router::new().route(
            "/api/alerts/{id}/resolve",
            put(|| async { Json(json!({"success": true, "message": "resolved"})) }),
        );
        let client = spawn_backend(router).await;
        let ack = client.resolve_alert("t", "ALT-1").await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("resolved"));
    }
}
