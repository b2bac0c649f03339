use reqwest::Method;

use super::{Ack, BackendClient};
use crate::error::ApiError;
use crate::models::api::{CurrentUser, LoginRequest, LoginResponse};

impl BackendClient {
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username,
            password,
            remember_me,
        };
        self.post("/api/auth/login", None, &body).await
    }

    pub async fn logout(&self, token: &str) -> Result<Ack, ApiError> {
        self.ack(Method::POST, "/api/auth/logout", Some(token)).await
    }

    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, ApiError> {
        self.get("/api/auth/me", Some(token)).await
    }

    pub async fn heartbeat(&self, path: &str, token: &str) -> Result<Ack, ApiError> {
        self.ack(Method::POST, path, Some(token)).await
    }
}
