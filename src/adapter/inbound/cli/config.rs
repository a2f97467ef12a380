//! Handlers for the `config` command group.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::config::Config;
use crate::error::Result;

/// Execute `config show`.
pub fn show(config: &Config) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": serde_json::to_value(config)?,
        }));
        return Ok(());
    }

    output::section("Server");
    output::field("Host", &config.server.host);
    output::field("Port", config.server.port);

    output::section("Database");
    output::field("URL", &config.database.url);
    output::field("Pool size", config.database.pool_size);

    output::section("Session");
    output::field("Lifetime", format!("{}s", config.session.lifetime_secs));
    output::field("Bind client", config.session.bind_fingerprint);

    output::section("Admin");
    match &config.admin.username {
        Some(username) => {
            output::field("Username", username);
            output::field("Password", "(set)");
        }
        None => output::note("(no bootstrap admin)"),
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`. Loading already validated the file, so
/// reaching this point means it is valid.
pub fn validate(config: &Config) -> Result<()> {
    config.bind_addr()?;

    if output::is_json() {
        output::json_output(json!({ "command": "config.validate", "valid": true }));
        return Ok(());
    }
    output::success("Configuration is valid");
    Ok(())
}
