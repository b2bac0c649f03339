use super::BackendClient;
use crate::error::ApiError;
use crate::models::api::EventList;

impl BackendClient {
    pub async fn events(&self, token: &str) -> Result<EventList, ApiError> {
        self.get("/api/events", Some(token)).await
    }
}
