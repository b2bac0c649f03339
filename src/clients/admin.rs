use reqwest::Method;

use super::{Ack, BackendClient, segment};
use crate::error::ApiError;
use crate::models::api::{AdminStats, UserPage, UserPayload};

impl BackendClient {
    pub async fn admin_stats(&self, token: &str) -> Result<AdminStats, ApiError> {
        self.get("/api/admin/stats", Some(token)).await
    }

    pub async fn users(&self, token: &str, page: u32, per_page: u32) -> Result<UserPage, ApiError> {
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.get_query("/api/admin/users", Some(token), &query).await
    }

    pub async fn create_user(&self, token: &str, user: &UserPayload) -> Result<Ack, ApiError> {
        self.ack_with(Method::POST, "/api/admin/users", Some(token), user)
            .await
    }

    pub async fn update_user(&self, token: &str, id: &str, user: &UserPayload) -> Result<Ack, ApiError> {
        self.ack_with(
            Method::PUT,
            &format!("/api/admin/users/{}", segment(id)),
            Some(token),
            user,
        )
        .await
    }

    pub async fn delete_user(&self, token: &str, id: &str) -> Result<Ack, ApiError> {
        self.ack(
            Method::DELETE,
            &format!("/api/admin/users/{}", segment(id)),
            Some(token),
        )
        .await
    }
}
