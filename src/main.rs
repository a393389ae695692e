use anyhow::{Context, Result};
use clap::Parser;
use std::{net::IpAddr, path::PathBuf, time::Duration};
use tracing::{error, info};

use studychef::config::{ClientConfig, RelayConfig};
use studychef::sessions::SessionStore;
use studychef::{constants, ui, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the chat relay that forwards conversations to the completion provider.
    Serve {
        #[arg(long, default_value = "0.0.0.0", help = "Address to bind.")]
        host: IpAddr,
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the relay.")]
        port: u16,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "Completion provider API key.")]
        api_key: Option<String>,
        #[arg(long, env = "OPENAI_API_BASE", help = "Base URL of the completion provider.")]
        api_base: Option<String>,
        #[arg(long, env = "STUDYCHEF_MODEL", help = "Model identifier sent to the provider.")]
        model: Option<String>,
        #[arg(long, default_value_t = 30, help = "Delay between streamed words, in milliseconds.")]
        chunk_delay_ms: u64,
        #[arg(long, help = "Directory with a prebuilt web client to serve at /.")]
        static_dir: Option<PathBuf>,
    },
    /// Chat with StudyChef in the terminal.
    Chat {
        #[arg(long, env = "STUDYCHEF_RELAY_URL", help = "Base URL of a running relay.")]
        relay_url: Option<String>,
        #[arg(long, env = "STUDYCHEF_DATA_DIR", help = "Directory holding saved chats.")]
        data_dir: Option<PathBuf>,
    },
    /// Inspect saved chats.
    History {
        #[arg(long, env = "STUDYCHEF_DATA_DIR", help = "Directory holding saved chats.")]
        data_dir: Option<PathBuf>,
        #[command(subcommand)]
        action: Option<HistoryCommands>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum HistoryCommands {
    /// List saved chats, most recent first.
    List,
    /// Delete a saved chat.
    Delete {
        #[arg(help = "Id of the chat to delete.")]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,studychef=debug).
    // Logs go to stderr so they never interleave with the chat on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            api_key,
            api_base,
            model,
            chunk_delay_ms,
            static_dir,
        } => {
            let defaults = RelayConfig::default();
            let config = RelayConfig {
                api_key,
                api_base: api_base.unwrap_or(defaults.api_base),
                model: model.unwrap_or(defaults.model),
                chunk_delay: Duration::from_millis(chunk_delay_ms),
                static_dir,
                ..defaults
            };
            info!("Starting StudyChef relay on port {}...", port);

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server((host, port).into(), config).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat { relay_url, data_dir } => {
            let config = ClientConfig::new(relay_url, data_dir);
            ui::run_chat(config).await.context("Chat session failed")?;
        }
        Commands::History { data_dir, action } => {
            let config = ClientConfig::new(None, data_dir);
            let mut store = SessionStore::open(config.store_path());
            match action.unwrap_or(HistoryCommands::List) {
                HistoryCommands::List => ui::print_history(store.chats(), None),
                HistoryCommands::Delete { id } => {
                    store
                        .delete(&id)
                        .with_context(|| format!("Failed to delete chat {}", id))?;
                    println!("Deleted {}", id);
                }
            }
        }
    }

    Ok(())
}
