mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use easyznab::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    easyznab::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => {
            let mut config = Config::load_with(args.config)
                .map_err(|e| format!("Failed to load config: {}", e))?;
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            easyznab::api::run(config).await?
        }
    }

    Ok(())
}
