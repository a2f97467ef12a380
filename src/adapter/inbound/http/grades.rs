//! Grade sheets and grade assignment.

use axum::extract::{Path, State};
use axum::{Form, Json};
use serde::Deserialize;

use super::extract::Caller;
use super::{blocking, HttpError};
use crate::app::App;
use crate::application::GradeSheet;

/// Grade assignment form: `name` is the student's username.
#[derive(Debug, Default, Deserialize)]
pub struct GradeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade: String,
}

pub async fn sheet(
    State(app): State<App>,
    caller: Caller,
    Path(course): Path<String>,
) -> Result<Json<GradeSheet>, HttpError> {
    let sheet = blocking(move || app.ledger.sheet(&caller.session, &course)).await?;
    Ok(Json(sheet))
}

pub async fn assign(
    State(app): State<App>,
    caller: Caller,
    Path(course): Path<String>,
    Form(form): Form<GradeForm>,
) -> Result<Json<GradeSheet>, HttpError> {
    let sheet = blocking(move || {
        app.ledger
            .assign(&caller.session, &course, &form.name, &form.grade)?;
        app.ledger.sheet(&caller.session, &course)
    })
    .await?;
    Ok(Json(sheet))
}
