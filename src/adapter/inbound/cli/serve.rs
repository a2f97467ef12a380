//! Handlers for `serve` and `migrate`.

use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use crate::adapter::inbound::cli::command::ServeArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::http;
use crate::app::App;
use crate::config::Config;
use crate::error::Result;

/// Execute `serve`: open the database and serve HTTP until Ctrl-C.
pub async fn execute(mut config: Config, args: &ServeArgs) -> Result<()> {
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr = config.bind_addr()?;

    let app = App::open(&config)?;
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "serve",
            "listening": local.to_string(),
            "database": config.database.url,
        }));
    } else {
        output::success(&format!("Listening on http://{local}"));
        output::field("Database", &config.database.url);
        output::field("Session TTL", format!("{}s", config.session.lifetime_secs));
    }

    http::serve(app, listener, shutdown_signal()).await?;
    output::success("Server stopped");
    Ok(())
}

/// Execute `migrate`: create or upgrade the schema, then bootstrap the
/// configured administrator.
pub fn migrate(config: &Config) -> Result<()> {
    App::open(config)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "migrate",
            "database": config.database.url,
            "admin": config.admin.username,
        }));
        return Ok(());
    }

    output::success("Database is up to date");
    output::field("Database", &config.database.url);
    if let Some(username) = &config.admin.username {
        output::field("Admin", username);
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
