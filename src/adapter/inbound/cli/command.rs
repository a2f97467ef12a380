//! Command-line interface definitions.
//!
//! Defines the `roster` CLI using `clap`. The CLI runs the web server,
//! prepares the database, and covers the out-of-band administration the
//! web surface cannot do on its own (granting the first Teacher or Admin
//! role, inspecting configuration).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Role;

/// Course enrollment service
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file [default: roster.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the roster CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server (foreground)
    Serve(ServeArgs),

    /// Create or upgrade the database schema
    Migrate,

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Inspect courses
    #[command(subcommand)]
    Course(CourseCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `roster serve`.
#[derive(clap::Args, Debug, Default)]
pub struct ServeArgs {
    /// Override `[server] host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `[server] port`
    #[arg(long)]
    pub port: Option<u16>,
}

/// Subcommands for `roster user`.
#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user with the given role.
    Create(UserCreateArgs),
    /// List every user.
    List,
    /// Change a user's role.
    SetRole(SetRoleArgs),
}

/// Arguments for `roster user create`.
#[derive(clap::Args, Debug)]
pub struct UserCreateArgs {
    pub username: String,

    /// Initial password
    #[arg(long)]
    pub password: String,

    /// Role [Student, Teacher, Admin]
    #[arg(long, default_value = "Student", value_parser = parse_role)]
    pub role: Role,
}

/// Arguments for `roster user set-role`.
#[derive(clap::Args, Debug)]
pub struct SetRoleArgs {
    pub username: String,

    /// New role [Student, Teacher, Admin]
    #[arg(value_parser = parse_role)]
    pub role: Role,
}

/// Subcommands for `roster course`.
#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// List every course with its teachers and remaining seats.
    List,
}

/// Subcommands for `roster config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration without starting anything.
    Validate,
}

fn parse_role(raw: &str) -> std::result::Result<Role, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["roster", "user", "list", "--json", "-c", "x.toml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::User(UserCommand::List)));
    }

    #[test]
    fn set_role_parses_role_names() {
        let cli = Cli::try_parse_from(["roster", "user", "set-role", "ada", "teacher"]).unwrap();
        match cli.command {
            Commands::User(UserCommand::SetRole(args)) => {
                assert_eq!(args.username, "ada");
                assert_eq!(args.role, Role::Teacher);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["roster", "user", "set-role", "ada", "dean"]).is_err());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["roster", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
