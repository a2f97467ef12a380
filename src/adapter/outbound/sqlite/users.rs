//! SQLite identity store.
//!
//! Rows in `users`. Usernames are unique and compared case-sensitively.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::database::model::{NewUserRow, UserRow};
use super::database::schema::{course_students, course_teachers, grades, users};
use crate::domain::{Role, User, UserId};
use crate::error::{Error, Result};

/// Insert a user created at `created_at`.
///
/// # Errors
/// Returns [`Error::DuplicateEntity`] if the username is taken.
pub fn insert(
    conn: &mut SqliteConnection,
    username: &str,
    password_hash: &str,
    role: Role,
    created_at: DateTime<Utc>,
) -> Result<User> {
    if find_by_username(conn, username)?.is_some() {
        return Err(Error::duplicate("user", username));
    }

    diesel::insert_into(users::table)
        .values(&NewUserRow {
            username,
            password_hash,
            role: role.as_str(),
            created_at: created_at.to_rfc3339(),
        })
        .execute(conn)?;

    find_by_username(conn, username)?
        .ok_or_else(|| Error::Internal(format!("inserted user {username} not found")))
}

/// Look a user up by exact username.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = users::table
        .filter(users::username.eq(username))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    row.map(UserRow::into_user).transpose()
}

/// Look a user up by id.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find_by_id(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>> {
    let row: Option<UserRow> = users::table
        .find(id.get())
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    row.map(UserRow::into_user).transpose()
}

/// Resolve every username, failing on the first unknown one.
///
/// # Errors
/// Returns [`Error::NotFound`] naming the first unknown username.
pub fn find_all_by_username(conn: &mut SqliteConnection, usernames: &[String]) -> Result<Vec<User>> {
    usernames
        .iter()
        .map(|name| {
            find_by_username(conn, name)?.ok_or_else(|| Error::not_found("user", name.as_str()))
        })
        .collect()
}

/// All users in registration order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn list(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = users::table
        .order(users::id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    rows.into_iter().map(UserRow::into_user).collect()
}

/// Users with the given ids, in id order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn list_by_ids(conn: &mut SqliteConnection, ids: &[i32]) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(ids.to_vec()))
        .order(users::id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    rows.into_iter().map(UserRow::into_user).collect()
}

/// Rename a user.
///
/// # Errors
/// Returns [`Error::DuplicateEntity`] if another user already has the name.
pub fn rename(conn: &mut SqliteConnection, id: UserId, username: &str) -> Result<()> {
    if let Some(existing) = find_by_username(conn, username)? {
        if existing.id != id {
            return Err(Error::duplicate("user", username));
        }
    }
    diesel::update(users::table.find(id.get()))
        .set(users::username.eq(username))
        .execute(conn)?;
    Ok(())
}

/// Change a user's role. Returns false if the user does not exist.
///
/// # Errors
/// Returns an error if the update fails.
pub fn set_role(conn: &mut SqliteConnection, id: UserId, role: Role) -> Result<bool> {
    let updated = diesel::update(users::table.find(id.get()))
        .set(users::role.eq(role.as_str()))
        .execute(conn)?;
    Ok(updated > 0)
}

/// Replace a user's password hash.
///
/// # Errors
/// Returns an error if the update fails.
pub fn set_password_hash(conn: &mut SqliteConnection, id: UserId, password_hash: &str) -> Result<()> {
    diesel::update(users::table.find(id.get()))
        .set(users::password_hash.eq(password_hash))
        .execute(conn)?;
    Ok(())
}

/// Delete a user together with their memberships and grades.
///
/// # Errors
/// Returns an error if a delete fails.
pub fn delete(conn: &mut SqliteConnection, id: UserId) -> Result<bool> {
    diesel::delete(grades::table.filter(grades::student_id.eq(id.get()))).execute(conn)?;
    diesel::delete(course_students::table.filter(course_students::student_id.eq(id.get())))
        .execute(conn)?;
    diesel::delete(course_teachers::table.filter(course_teachers::teacher_id.eq(id.get())))
        .execute(conn)?;
    let deleted = diesel::delete(users::table.find(id.get())).execute(conn)?;
    Ok(deleted > 0)
}
