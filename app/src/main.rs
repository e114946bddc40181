#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InitStrategy, ServeInput, ServeStrategy,
    VersionStrategy,
};

#[derive(Parser)]
#[command(name = "studybud")]
#[command(about = "Agentic study assistant service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind address (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a single message through the engine
    Chat {
        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Session to attach the message to
        #[arg(short, long)]
        session: Option<String>,

        /// Explicit intent (explain, quiz, summarize)
        #[arg(short, long)]
        intent: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => ServeStrategy.execute(ServeInput { host, port }).await,
        Commands::Chat {
            message,
            session,
            intent,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    session_id: session,
                    intent,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
