//! Administrative editor endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::Caller;
use super::{blocking, HttpError};
use crate::app::App;
use crate::application::{CourseEdit, CourseListing, GradeListing, UserEdit, UserListing};
use crate::domain::{Course, CourseId, Field, Grade, GradeId, Role, User, UserId, ValidationError};
use crate::error::Result as CoreResult;

#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub username: String,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserForm {
    fn into_edit(self) -> CoreResult<UserEdit> {
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Role>()
                    .map_err(|reason| ValidationError::invalid(Field::Role, reason))?,
            ),
        };
        Ok(UserEdit {
            username: self.username,
            password: self.password,
            role,
        })
    }
}

/// Course form. Member lists are comma-separated usernames.
#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
    pub capacity: Option<String>,
    pub teachers: Option<String>,
    pub students: Option<String>,
}

fn split_names(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

impl From<CourseForm> for CourseEdit {
    fn from(form: CourseForm) -> Self {
        Self {
            name: form.name,
            time: form.time,
            capacity: form.capacity,
            teachers: split_names(form.teachers),
            students: split_names(form.students),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GradeForm {
    #[serde(default)]
    pub value: String,
}

/// `/admin`: administrators go to the user table, everyone else home.
pub async fn index(caller: Caller) -> Result<Redirect, HttpError> {
    let actor = caller.session.actor()?;
    Ok(match actor.as_admin("use the admin editor") {
        Ok(_) => Redirect::to("/admin/users"),
        Err(_) => Redirect::to("/home"),
    })
}

fn deleted(kind: &str, id: impl std::fmt::Display) -> Json<Value> {
    Json(json!({ "deleted": kind, "id": id.to_string() }))
}

pub async fn users(
    State(app): State<App>,
    caller: Caller,
) -> Result<Json<Vec<UserListing>>, HttpError> {
    Ok(Json(blocking(move || app.admin.users(&caller.session)).await?))
}

pub async fn create_user(
    State(app): State<App>,
    caller: Caller,
    Form(form): Form<UserForm>,
) -> Result<(StatusCode, Json<User>), HttpError> {
    let user = blocking(move || app.admin.create_user(&caller.session, &form.into_edit()?)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Json<User>, HttpError> {
    let user = blocking(move || {
        app.admin
            .update_user(&caller.session, UserId::new(id), &form.into_edit()?)
    })
    .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<Value>, HttpError> {
    blocking(move || app.admin.delete_user(&caller.session, UserId::new(id))).await?;
    Ok(deleted("user", id))
}

pub async fn courses(
    State(app): State<App>,
    caller: Caller,
) -> Result<Json<Vec<CourseListing>>, HttpError> {
    Ok(Json(blocking(move || app.admin.courses(&caller.session)).await?))
}

pub async fn create_course(
    State(app): State<App>,
    caller: Caller,
    Form(form): Form<CourseForm>,
) -> Result<(StatusCode, Json<Course>), HttpError> {
    let edit = CourseEdit::from(form);
    let course = blocking(move || app.admin.create_course(&caller.session, &edit)).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
    Form(form): Form<CourseForm>,
) -> Result<Json<Course>, HttpError> {
    let edit = CourseEdit::from(form);
    let course =
        blocking(move || app.admin.update_course(&caller.session, CourseId::new(id), &edit)).await?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<Value>, HttpError> {
    blocking(move || app.admin.delete_course(&caller.session, CourseId::new(id))).await?;
    Ok(deleted("course", id))
}

pub async fn grades(
    State(app): State<App>,
    caller: Caller,
) -> Result<Json<Vec<GradeListing>>, HttpError> {
    Ok(Json(blocking(move || app.admin.grades(&caller.session)).await?))
}

pub async fn update_grade(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
    Form(form): Form<GradeForm>,
) -> Result<Json<Grade>, HttpError> {
    let grade = blocking(move || {
        app.admin
            .update_grade(&caller.session, GradeId::new(id), &form.value)
    })
    .await?;
    Ok(Json(grade))
}

pub async fn delete_grade(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<Value>, HttpError> {
    blocking(move || app.admin.delete_grade(&caller.session, GradeId::new(id))).await?;
    Ok(deleted("grade", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn member_lists_split_on_commas() {
        assert_eq!(split_names(None), None);
        assert_eq!(split_names(Some(String::new())), Some(vec![]));
        assert_eq!(
            split_names(Some(" ada, grace ,,".into())),
            Some(vec!["ada".to_string(), "grace".to_string()])
        );
    }

    #[test]
    fn bad_role_is_a_validation_error() {
        let form = UserForm {
            username: "ada".into(),
            password: None,
            role: Some("Dean".into()),
        };
        assert!(matches!(form.into_edit(), Err(Error::Validation(_))));
    }
}
