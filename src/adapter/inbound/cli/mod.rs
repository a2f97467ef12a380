//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod course;
pub mod output;
pub mod serve;
pub mod user;

use command::{Cli, Commands, ConfigCommand, CourseCommand, UserCommand};
use output::OutputConfig;

use crate::config::Config;
use crate::error::Result;

/// Run a parsed command line to completion.
///
/// # Errors
/// Returns the first error raised by configuration loading or the command.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet));
    output::configure_color(&cli.color);

    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            config.init_logging();
            serve::execute(config, &args).await
        }
        Commands::Migrate => {
            config.init_logging();
            serve::migrate(&config)
        }
        Commands::User(UserCommand::Create(args)) => user::create(&config, &args),
        Commands::User(UserCommand::List) => user::list(&config),
        Commands::User(UserCommand::SetRole(args)) => user::set_role(&config, &args),
        Commands::Course(CourseCommand::List) => course::list(&config),
        Commands::Config(ConfigCommand::Show) => self::config::show(&config),
        Commands::Config(ConfigCommand::Validate) => self::config::validate(&config),
    }
}
