use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "easyznab")]
#[command(about = "Easynews search exposed as a Newznab indexer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides `server.bind_addr`)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Path to the TOML configuration file (overrides `EASYZNAB_CONFIG`)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_args() {
        let cli = Cli::parse_from([
            "easyznab",
            "server",
            "--address",
            "127.0.0.1:9000",
            "--config",
            "custom.toml",
        ]);

        let Commands::Server(args) = cli.command;
        assert_eq!(args.address, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }
}
