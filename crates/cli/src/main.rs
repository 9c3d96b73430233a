//! chatrelay CLI — the main entry point.
//!
//! Commands:
//! - `chat`    — Run one exchange (or an interactive session)
//! - `history` — Show recent exchanges for an external user id
//! - `ping`    — Check storage connectivity
//! - `serve`   — Start the HTTP gateway with presence rotation

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatrelay",
    about = "chatrelay — a resilient chat-relay bot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the bot
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// External user id to chat as
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Display name to chat as
        #[arg(short, long, default_value = "CLI User")]
        name: String,
    },

    /// Show recent exchanges for a user
    History {
        /// External user id
        user: String,

        /// Maximum number of exchanges to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Check storage connectivity
    Ping,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message, user, name } => commands::chat::run(message, user, name).await?,
        Commands::History { user, limit } => commands::history::run(user, limit).await?,
        Commands::Ping => commands::ping::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}
