use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: StatusCode,
        message: Option<String>,
    },

    #[error("{path} returned 401 Unauthorized")]
    Unauthorized { path: String, message: Option<String> },

    #[error("{path} answered success=false: {message}")]
    Rejected { path: String, message: String },

    #[error("decoding response of {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} returned no data")]
    MissingData { path: String },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Text suitable for a toast. Backend messages win; transport and decode
    /// failures collapse to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            }
            | ApiError::Unauthorized {
                message: Some(m), ..
            } => m.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Pull a human message out of an error body. The backend answers either with
/// its own envelope (`message`) or with a framework error (`detail`).
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "detail"]
        .iter()
        .filter_map(|k| value.get(*k))
        .find_map(|v| v.as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_then_detail() {
        assert_eq!(
            error_message(br#"{"success":false,"message":"bad input"}"#).as_deref(),
            Some("bad input")
        );
        assert_eq!(
            error_message(br#"{"detail":"expired session"}"#).as_deref(),
            Some("expired session")
        );
        assert_eq!(error_message(b"<html>gateway</html>"), None);
        assert_eq!(error_message(br#"{"message":""}"#), None);
    }

    #[test]
    fn user_message_falls_back_for_unparseable_bodies() {
        let parsed = ApiError::Status {
            path: "/api/admin/users".into(),
            status: StatusCode::CONFLICT,
            message: Some("username taken".into()),
        };
        let opaque = ApiError::Status {
            path: "/api/admin/users".into(),
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(parsed.user_message("Request failed."), "username taken");
        assert_eq!(opaque.user_message("Request failed."), "Request failed.");
    }
}
