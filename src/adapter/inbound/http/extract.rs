//! Request extractors: client context and the caller's session.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{COOKIE, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::{blocking, HttpError};
use crate::app::App;
use crate::domain::{ClientContext, SessionState, SessionToken};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "roster_session";

/// Everything known about who sent a request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub session: SessionState,
    pub token: Option<SessionToken>,
    pub client: ClientContext,
}

/// Peer address and user agent of a request.
pub fn client_context(parts: &Parts) -> ClientContext {
    let ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let agent = parts
        .headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok());
    ClientContext::new(ip, agent)
}

/// Just the client context, for handlers that run before a session exists.
#[derive(Debug, Clone)]
pub struct Client(pub ClientContext);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Client {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_context(parts)))
    }
}

/// The session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionToken::new(value))
}

#[axum::async_trait]
impl FromRequestParts<App> for Caller {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let client = client_context(parts);
        let token = session_token(&parts.headers);

        let access = app.access.clone();
        let (lookup_token, lookup_client) = (token.clone(), client.clone());
        let session =
            blocking(move || access.session(lookup_token.as_ref(), &lookup_client)).await?;

        Ok(Self {
            session,
            token,
            client,
        })
    }
}
