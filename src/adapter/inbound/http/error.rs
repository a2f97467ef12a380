//! Mapping core errors onto HTTP responses.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// A core error on its way out as a response.
#[derive(Debug)]
pub struct HttpError(pub Error);

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl HttpError {
    /// Status code for the wrapped error. Unauthenticated callers are
    /// redirected instead and never see this.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::AuthenticationFailure | Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Authorization { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::DuplicateEntity { .. } | Error::MissingGradeRecord { .. } => StatusCode::CONFLICT,
            Error::Parse(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Config(_)
            | Error::Io(_)
            | Error::Connection(_)
            | Error::Database(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if let Error::Unauthenticated(_) = self.0 {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            let body = json!({ "error": self.0.code(), "message": "internal error" });
            return (status, Json(body)).into_response();
        }

        let mut body = json!({
            "error": self.0.code(),
            "message": self.0.to_string(),
        });
        if let Error::Validation(validation) = &self.0 {
            let fields: BTreeMap<&str, String> = validation
                .messages()
                .into_iter()
                .map(|(field, message)| (field.as_str(), message))
                .collect();
            body["fields"] = json!(fields);
        }
        (status, Json(body)).into_response()
    }
}
