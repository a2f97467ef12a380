//! Builders for domain primitives used across tests.

use crate::app::App;
use crate::domain::{ClientContext, Role, SessionState, User};

/// Password every fixture user is created with.
pub const PASSWORD: &str = "password";

/// A browser-like client on localhost.
pub fn client() -> ClientContext {
    client_with_agent("roster-tests")
}

pub fn client_with_agent(agent: &str) -> ClientContext {
    ClientContext::new(Some([127, 0, 0, 1].into()), Some(agent))
}

/// Create a user with [`PASSWORD`].
///
/// # Panics
/// Panics if the user cannot be created.
pub fn user(app: &App, username: &str, role: Role) -> User {
    app.identity
        .create_user(username, PASSWORD, role)
        .expect("fixture user")
}

/// Create a user and return a session acting as them.
pub fn session(app: &App, username: &str, role: Role) -> SessionState {
    SessionState::from(user(app, username, role))
}

pub fn student(app: &App, username: &str) -> SessionState {
    session(app, username, Role::Student)
}

pub fn teacher(app: &App, username: &str) -> SessionState {
    session(app, username, Role::Teacher)
}

pub fn admin(app: &App, username: &str) -> SessionState {
    session(app, username, Role::Admin)
}
