use axum::{
    Json,
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::json;
use std::time::Duration;

use crate::config::Config;

/// Token kept across browser restarts ("remember me").
pub const PERSISTENT_TOKEN: &str = "access_token";
/// Token that dies with the browser session.
pub const SESSION_TOKEN: &str = "session_access_token";
pub const REMEMBERED_USER: &str = "remembered_user";

#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub remember_for: Duration,
}

impl CookieSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            secure: cfg.session.secure_cookies,
            remember_for: cfg.remember_for(),
        }
    }

    fn attrs(&self) -> &'static str {
        if self.secure {
            "; Path=/; HttpOnly; SameSite=Lax; Secure"
        } else {
            "; Path=/; HttpOnly; SameSite=Lax"
        }
    }
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// Persistent token first, then the session one.
pub fn token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, PERSISTENT_TOKEN).or_else(|| read_cookie(headers, SESSION_TOKEN))
}

/// Cookies that store a fresh token. The other slot is cleared so a later
/// read cannot pick up a stale token.
pub fn save_token(token: &str, remember: bool, settings: &CookieSettings) -> Vec<String> {
    if remember {
        vec![
            format!(
                "{}={}{}; Max-Age={}",
                PERSISTENT_TOKEN,
                token,
                settings.attrs(),
                settings.remember_for.as_secs()
            ),
            expire(SESSION_TOKEN, settings),
        ]
    } else {
        vec![
            format!("{}={}{}", SESSION_TOKEN, token, settings.attrs()),
            expire(PERSISTENT_TOKEN, settings),
        ]
    }
}

pub fn expire(name: &str, settings: &CookieSettings) -> String {
    format!("{}={}; Max-Age=0", name, settings.attrs())
}

pub fn clear_tokens(settings: &CookieSettings) -> Vec<String> {
    vec![expire(PERSISTENT_TOKEN, settings), expire(SESSION_TOKEN, settings)]
}

pub fn remember_user(username: &str, settings: &CookieSettings) -> String {
    format!(
        "{}={}{}; Max-Age={}",
        REMEMBERED_USER,
        STANDARD.encode(username),
        settings.attrs(),
        settings.remember_for.as_secs()
    )
}

pub fn remembered_user(headers: &HeaderMap) -> Option<String> {
    let raw = read_cookie(headers, REMEMBERED_USER)?;
    let bytes = STANDARD.decode(raw).ok()?;
    String::from_utf8(bytes).ok()
}

/// Append `Set-Cookie` headers, skipping any value that is not a valid header.
pub fn set_cookies(headers: &mut HeaderMap, cookies: impl IntoIterator<Item = String>) {
    for c in cookies {
        match HeaderValue::from_str(&c) {
            Ok(v) => {
                headers.append(SET_COOKIE, v);
            }
            Err(e) => tracing::warn!("dropping invalid cookie: {}", e),
        }
    }
}

/// Authenticated page request. Without a token the browser is sent to the
/// login page.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token(&parts.headers)
            .map(|token| Session { token })
            .ok_or_else(|| Redirect::to("/"))
    }
}

/// Authenticated script request (fragments, actions, data). Without a token
/// it answers 401 with a redirect hint for the script.
#[derive(Debug, Clone)]
pub struct ApiSession {
    pub token: String,
}

pub struct SessionExpired;

impl IntoResponse for SessionExpired {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "redirect": "/" }))).into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ApiSession {
    type Rejection = SessionExpired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token(&parts.headers)
            .map(|token| ApiSession { token })
            .ok_or(SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CookieSettings {
        CookieSettings {
            secure: false,
            remember_for: Duration::from_secs(7 * 86400),
        }
    }

    fn with_cookie(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(COOKIE, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn remembered_token_is_persistent() {
        let cookies = save_token("abc", true, &settings());
        assert!(cookies[0].starts_with("access_token=abc;"));
        assert!(cookies[0].contains("Max-Age=604800"));
        assert!(cookies[1].starts_with("session_access_token=;"));

        let cookies = save_token("abc", false, &settings());
        assert!(cookies[0].starts_with("session_access_token=abc;"));
        assert!(!cookies[0].contains("Max-Age"));
    }

    #[test]
    fn persistent_token_read_first() {
        let h = with_cookie("session_access_token=s1; access_token=p1");
        assert_eq!(token(&h).as_deref(), Some("p1"));
        let h = with_cookie("theme=dark; session_access_token=s1");
        assert_eq!(token(&h).as_deref(), Some("s1"));
        let h = with_cookie("access_token=; theme=dark");
        assert_eq!(token(&h), None);
    }

    #[test]
    fn clearing_expires_both() {
        let cookies = clear_tokens(&settings());
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.ends_with("Max-Age=0")));
    }

    #[test]
    fn remembered_user_round_trips_through_base64() {
        let c = remember_user("kim.lee", &settings());
        let value = c.split(';').next().unwrap();
        let h = with_cookie(value);
        assert_eq!(remembered_user(&h).as_deref(), Some("kim.lee"));
    }

    #[test]
    fn secure_flag_follows_config() {
        let s = CookieSettings {
            secure: true,
            ..settings()
        };
        assert!(save_token("t", false, &s)[0].contains("; Secure"));
    }
}
