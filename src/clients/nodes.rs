use super::{BackendClient, segment};
use crate::error::ApiError;
use crate::models::api::{LineSeries, Node, NodeList};

impl BackendClient {
    pub async fn nodes(&self, token: &str) -> Result<Vec<Node>, ApiError> {
        let list: NodeList = self.get("/api/nodes", Some(token)).await?;
        Ok(list.nodes)
    }

    pub async fn node(&self, token: &str, name: &str) -> Result<Node, ApiError> {
        self.get(&format!("/api/nodes/{}", segment(name)), Some(token))
            .await
    }

    pub async fn node_stats(&self, token: &str, name: &str) -> Result<LineSeries, ApiError> {
        self.get(
            &format!("/api/nodes/{}/stats", segment(name)),
            Some(token),
        )
        .await
    }
}
