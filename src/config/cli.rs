use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "movies-service")]
#[command(about = "Movie aggregation service with resilient downstream clients and live streams")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the bind address from the config file
    #[arg(long)]
    pub bind: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Aggregating movies API backed by the movie-info and reviews services
    Movies,
    /// Movie-info backend with in-memory storage
    MovieInfo,
    /// Reviews backend with in-memory storage
    Reviews,
}
