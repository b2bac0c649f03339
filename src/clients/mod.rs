pub mod admin;
pub mod alerts;
pub mod auth;
pub mod containers;
pub mod events;
pub mod logs;
pub mod monitoring;
pub mod nodes;
pub mod stats;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ApiError, error_message};

/// Response wrapper every backend endpoint uses.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of a call whose payload the console does not need.
#[derive(Debug, Clone, Default)]
pub struct Ack {
    pub message: Option<String>,
}

const NO_BODY: Option<&()> = None;

pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let env = self.call(Method::GET, path, token, NO_BODY).await?;
        decode_data(env, path)
    }

    /// GET with query parameters; empty values are left out.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let query: Vec<&(&str, String)> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        let req = self.request(Method::GET, path, token).query(&query);
        let env = self.dispatch(req, path).await?;
        decode_data(env, path)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let env = self.call(Method::POST, path, token, Some(body)).await?;
        decode_data(env, path)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let env = self.call(Method::PUT, path, token, Some(body)).await?;
        decode_data(env, path)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let env = self.call(Method::DELETE, path, token, NO_BODY).await?;
        decode_data(env, path)
    }

    /// Send without a body and keep only the envelope message.
    pub async fn ack(&self, method: Method, path: &str, token: Option<&str>) -> Result<Ack, ApiError> {
        let env = self.call(method, path, token, NO_BODY).await?;
        Ok(Ack {
            message: env.message,
        })
    }

    /// Like [`ack`](Self::ack) with a JSON body.
    pub async fn ack_with<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<Ack, ApiError> {
        let env = self.call(method, path, token, Some(body)).await?;
        Ok(Ack {
            message: env.message,
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<Envelope, ApiError> {
        let mut req = self.request(method, path, token);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.dispatch(req, path).await
    }

    async fn dispatch(&self, req: RequestBuilder, path: &str) -> Result<Envelope, ApiError> {
        let resp = req.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                path: path.to_string(),
                message: error_message(&bytes),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                message: error_message(&bytes),
            });
        }

        let env: Envelope = serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })?;
        if !env.success {
            return Err(ApiError::Rejected {
                path: path.to_string(),
                message: env
                    .message
                    .clone()
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(env)
    }
}

fn decode_data<T: DeserializeOwned>(env: Envelope, path: &str) -> Result<T, ApiError> {
    let data = env.data.ok_or_else(|| ApiError::MissingData {
        path: path.to_string(),
    })?;
    serde_json::from_value(data).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Percent-encodes a value placed in a URL path.
pub(crate) fn segment(v: &str) -> String {
    urlencoding::encode(v).into_owned()
}

#[cfg(test)]
pub(crate) mod testing {
    //! A stand-in monitoring backend on an ephemeral port.

    use axum::Router;
    use std::time::Duration;
    use tokio::net::TcpListener;

    use super::BackendClient;

    pub async fn spawn_backend(router: Router) -> BackendClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        BackendClient::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap()
    }
}
