use super::{BackendClient, segment};
use crate::error::ApiError;
use crate::models::api::{Container, ContainerPage};

impl BackendClient {
    pub async fn containers(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ContainerPage, ApiError> {
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.get_query("/api/containers", Some(token), &query).await
    }

    pub async fn container(&self, token: &str, id: &str) -> Result<Container, ApiError> {
        self.get(&format!("/api/containers/{}", segment(id)), Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::testing::spawn_backend;
    use axum::extract::RawQuery;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn requests_exact_page_and_keeps_row_order() {
        let router = Router::new().route(
            "/api/containers",
            get(|RawQuery(q): RawQuery| async move {
                assert_eq!(q.as_deref(), Some("page=2&per_page=20"));
                Json(json!({"success": true, "data": {
                    "containers": [
                        {"id": "c3", "name": "zeta"},
                        {"id": "c1", "name": "alpha"}
                    ],
                    "pagination": {"page": 2, "per_page": 20, "total": 22, "total_pages": 2}
                }}))
            }),
        );
        let client = spawn_backend(router).await;

        let page = client.containers("t", 2, 20).await.unwrap();
        let names: Vec<&str> = page.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
