use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "reelfeed-cli", version, about = "Reelfeed CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the feed and redemption timer interactively from stdin
    Run(commands::run::RunArgs),
    /// Inspect the reel catalog
    Feed {
        #[command(subcommand)]
        action: commands::feed::FeedAction,
    },
    /// Generate redemption codes
    Code(commands::code::CodeArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Feed { action } => commands::feed::run(action),
        Commands::Code(args) => commands::code::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
