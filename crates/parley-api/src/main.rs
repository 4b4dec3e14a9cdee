//! Parley CLI and server entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes the database and services, then
//! either starts the HTTP/WebSocket server or runs a one-shot command.

mod http;
mod state;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use state::AppState;

#[derive(Parser)]
#[command(name = "parley", version, about = "Real-time chat backend")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve {
        /// Bind address (overrides config.toml)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config.toml)
        #[arg(long)]
        port: Option<u16>,
        /// Export spans via the OpenTelemetry stdout exporter
        #[arg(long)]
        otel: bool,
    },
    /// Print storage counts (chats, messages, leads)
    Status {
        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug,sqlx=info",
        _ => "trace",
    };
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    parley_observe::tracing_setup::init_tracing(filter, otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Parley listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} WebSocket endpoint at {}",
                console::style("↔").bold(),
                console::style(format!("ws://{addr}/ws")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            parley_observe::tracing_setup::shutdown_tracing();
            println!("\n  Server stopped.");
        }

        Commands::Status { json } => {
            let chats = state.query_service.count_chats().await?;
            let messages = state.query_service.count_messages().await?;
            let users = state.query_service.list_users().await?.len();
            let leads = state.query_service.list_leads().await?.len();

            if json {
                let status = serde_json::json!({
                    "data_dir": state.data_dir,
                    "chats": chats,
                    "messages": messages,
                    "users": users,
                    "leads": leads,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!();
                println!(
                    "  {} Parley storage at {}",
                    console::style("💬").bold(),
                    console::style(state.data_dir.display()).cyan()
                );
                println!();
                println!("  chats:    {chats}");
                println!("  messages: {messages}");
                println!("  users:    {users}");
                println!("  leads:    {leads}");
                println!();
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
