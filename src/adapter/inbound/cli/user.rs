//! Handlers for the `user` command group.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::{SetRoleArgs, UserCreateArgs};
use crate::adapter::inbound::cli::output;
use crate::app::App;
use crate::config::Config;
use crate::domain::User;
use crate::error::Result;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.to_string(),
        }
    }
}

/// Execute `user create`.
pub fn create(config: &Config, args: &UserCreateArgs) -> Result<()> {
    let app = App::open(config)?;
    let user = app
        .identity
        .create_user(&args.username, &args.password, args.role)?;

    if output::is_json() {
        output::json_output(json!({ "command": "user.create", "user": user }));
        return Ok(());
    }
    output::success(&format!("Created {} {}", user.role, user.username));
    Ok(())
}

/// Execute `user list`.
pub fn list(config: &Config) -> Result<()> {
    let app = App::open(config)?;
    let users = app.identity.list()?;

    if output::is_json() {
        output::json_output(json!({ "command": "user.list", "users": users }));
        return Ok(());
    }
    if users.is_empty() {
        output::note("No users registered");
        return Ok(());
    }
    let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
    output::table(&rows);
    Ok(())
}

/// Execute `user set-role`.
pub fn set_role(config: &Config, args: &SetRoleArgs) -> Result<()> {
    let app = App::open(config)?;
    let user = app.identity.set_role(&args.username, args.role)?;

    if output::is_json() {
        output::json_output(json!({ "command": "user.set_role", "user": user }));
        return Ok(());
    }
    output::success(&format!("{} is now {}", user.username, user.role));
    Ok(())
}
