use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use super::session_expired;
use super::ui::{LoginTemplate, render_template};
use crate::AppState;
use crate::forms::LoginForm;
use crate::page::Page;
use crate::session::{self, ApiSession, REMEMBERED_USER};

fn login_failed(form: &LoginForm, message: String) -> Response {
    let page = render_template(&LoginTemplate {
        error: Some(message),
        username: form.username.clone(),
        remember: form.remember(),
    });
    (StatusCode::UNAUTHORIZED, page).into_response()
}

pub async fn handle_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return login_failed(&form, "Please enter username and password.".to_string());
    }

    let login = match state.backend.login(username, &form.password, form.remember()).await {
        Ok(login) => login,
        Err(e) => {
            tracing::warn!("login failed for {}: {}", username, e);
            return login_failed(&form, e.user_message("Login failed."));
        }
    };
    tracing::info!("user {} signed in", login.username);

    let settings = state.cookies();
    let mut cookies = session::save_token(&login.access_token, form.remember(), &settings);
    if form.remember() {
        cookies.push(session::remember_user(username, &settings));
    } else {
        cookies.push(session::expire(REMEMBERED_USER, &settings));
    }
    let mut headers = HeaderMap::new();
    session::set_cookies(&mut headers, cookies);
    (headers, Redirect::to(&Page::Home.href())).into_response()
}

/// Cookies and views are dropped whatever the backend answers.
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::token(&headers) {
        if let Err(e) = state.backend.logout(&token).await {
            tracing::warn!("backend logout failed: {}", e);
        }
        state.views.close_owner(&token).await;
    }

    let settings = state.cookies();
    let mut cookies = session::clear_tokens(&settings);
    cookies.push(session::expire(REMEMBERED_USER, &settings));
    let mut out = HeaderMap::new();
    session::set_cookies(&mut out, cookies);
    (out, Redirect::to("/")).into_response()
}

pub async fn handle_heartbeat(State(state): State<AppState>, session: ApiSession) -> Response {
    match state
        .backend
        .heartbeat(&state.config.session.heartbeat_path, &session.token)
        .await
    {
        Ok(_) => Json(json!({ "ok": true })).into_response(),
        Err(e) if e.is_unauthorized() => {
            tracing::info!("heartbeat rejected, session expired");
            state.views.close_owner(&session.token).await;
            session_expired(&state)
        }
        Err(e) => {
            tracing::warn!("heartbeat failed: {}", e);
            Json(json!({ "ok": false })).into_response()
        }
    }
}
