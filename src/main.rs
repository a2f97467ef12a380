use clap::Parser;
use roster::adapter::inbound::cli::{self, command::Cli, output};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        error!(error = %e, code = e.code(), "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
