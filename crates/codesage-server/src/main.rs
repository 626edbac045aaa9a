//! CodeSage server CLI
//!
//! A WebSocket server for AI-assisted live coding interviews.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codesage::{Config, EXAMPLE_CONFIG, Language};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

mod handlers;
mod state;
mod ws;

use state::AppState;

#[derive(Parser)]
#[command(name = "codesage")]
#[command(about = "A server for AI-assisted live coding interviews")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: codesage.toml)
        #[arg(short, long, default_value = "codesage.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run the interview server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List supported languages
    Languages,

    /// Show the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Languages => {
            list_languages();
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    if config.generator.api_key().is_none() {
        info!(
            env = %config.generator.api_key_env,
            "no generator API key set, interviewer replies will use fallbacks"
        );
    }

    let state = Arc::new(AppState::new(&config)?);
    let app = ws::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "listening");
    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}

fn list_languages() {
    println!("Supported languages:\n");

    for language in Language::ALL {
        let lang_type = if language.is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        println!("  {:<15} ({lang_type})", language.tag());
    }
}

fn show_config(config: &Config) {
    println!("Server:");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);
    println!();
    println!("Execution:");
    println!("  Timeout: {}s", config.execution.timeout_secs);
    println!("  Max concurrent: {}", config.execution.max_concurrent);
    println!();
    println!("Generator:");
    println!("  Model: {}", config.generator.model);
    println!("  Endpoint: {}", config.generator.endpoint);
    println!("  API key env: {}", config.generator.api_key_env);
    println!("  Timeout: {}s", config.generator.timeout_secs);
}

async fn init_config(output: &PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
