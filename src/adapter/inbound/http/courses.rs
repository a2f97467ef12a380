//! Home, catalog and enrollment transitions.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use serde::Deserialize;

use super::extract::Caller;
use super::{blocking, HttpError};
use crate::app::App;
use crate::application::{Catalog, Home, NewCourse};

/// Form naming a course.
#[derive(Debug, Default, Deserialize)]
pub struct CourseName {
    #[serde(default)]
    pub name: String,
}

/// Course creation form.
#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
    pub capacity: Option<String>,
}

pub async fn home(State(app): State<App>, caller: Caller) -> Result<Json<Home>, HttpError> {
    let home = blocking(move || app.enrollment.home(&caller.session)).await?;
    Ok(Json(home))
}

pub async fn catalog(State(app): State<App>, caller: Caller) -> Result<Json<Catalog>, HttpError> {
    let catalog = blocking(move || app.enrollment.catalog(&caller.session)).await?;
    Ok(Json(catalog))
}

pub async fn create_course(
    State(app): State<App>,
    caller: Caller,
    Form(form): Form<CourseForm>,
) -> Result<Redirect, HttpError> {
    let course = NewCourse {
        name: form.name,
        time: form.time,
        capacity: form.capacity,
    };
    blocking(move || app.enrollment.create_course(&caller.session, &course)).await?;
    Ok(Redirect::to("/home"))
}

pub async fn enroll(
    State(app): State<App>,
    caller: Caller,
    Form(form): Form<CourseName>,
) -> Result<Redirect, HttpError> {
    blocking(move || app.enrollment.enroll(&caller.session, &form.name)).await?;
    Ok(Redirect::to("/catalog"))
}

pub async fn unenroll(
    State(app): State<App>,
    caller: Caller,
    Form(form): Form<CourseName>,
) -> Result<Redirect, HttpError> {
    blocking(move || app.enrollment.unenroll(&caller.session, &form.name)).await?;
    Ok(Redirect::to("/catalog"))
}

pub async fn unenroll_user(
    State(app): State<App>,
    caller: Caller,
    Path((student, course)): Path<(String, String)>,
) -> Result<Redirect, HttpError> {
    let course = blocking(move || app.enrollment.unenroll_user(&caller.session, &student, &course))
        .await?;
    Ok(Redirect::to(&grades_path(&course.name)))
}

/// Grade sheet path for a course name, which may contain reserved characters.
pub(crate) fn grades_path(course: &str) -> String {
    format!("/grades/{}", urlencoding::encode(course))
}
