//! Registration, login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;

use super::extract::{Caller, Client, SESSION_COOKIE};
use super::{blocking, HttpError};
use crate::app::App;
use crate::domain::Session;

/// Username / password form shared by register and login.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn form_view(view: &str) -> Json<serde_json::Value> {
    Json(json!({ "view": view, "fields": ["username", "password"] }))
}

fn session_cookie(session: &Session) -> String {
    let max_age = (session.expires_at - session.issued_at).num_seconds().max(0);
    format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}", session.token)
}

fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn with_cookie(redirect: Redirect, cookie: &str) -> Response {
    let mut response = redirect.into_response();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

pub async fn register_form() -> impl IntoResponse {
    form_view("register")
}

pub async fn login_form() -> impl IntoResponse {
    form_view("login")
}

pub async fn register(
    State(app): State<App>,
    Form(form): Form<Credentials>,
) -> Result<Redirect, HttpError> {
    blocking(move || app.identity.register(&form.username, &form.password)).await?;
    Ok(Redirect::to("/login"))
}

pub async fn login(
    State(app): State<App>,
    Client(client): Client,
    Form(form): Form<Credentials>,
) -> Result<Response, HttpError> {
    let login = blocking(move || app.access.login(&form.username, &form.password, &client)).await?;
    Ok(with_cookie(
        Redirect::to(login.landing.path()),
        &session_cookie(&login.session),
    ))
}

pub async fn logout(State(app): State<App>, caller: Caller) -> Result<Response, HttpError> {
    caller.session.actor()?;
    if let Some(token) = caller.token {
        app.access.logout(&token);
    }
    Ok(with_cookie(Redirect::to("/login"), &clear_cookie()))
}
