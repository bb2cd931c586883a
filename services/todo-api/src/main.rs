//! Todo item API server.
//!
//! # Usage
//!
//! ```bash
//! TODO_AUTH_MODE=dev cargo run --bin todo-api
//!
//! curl -u bob:bob localhost:3000/api/v1/todo
//! ```

use anyhow::Context;
use todo_api::config::{self, Config, DEFAULT_LOG_FILTER};
use todo_api::debug::available_cpus;
use todo_api::{Application, interrupt_token};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::args().nth(1).as_deref() {
        Some("-h" | "--help") => {
            print!("{}", config::usage());
            return Ok(());
        }
        Some("-v" | "--version") => {
            println!("todo-api {} ({})", env!("CARGO_PKG_VERSION"), config::BUILD);
            return Ok(());
        }
        _ => {}
    }

    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(cpus = available_cpus(), build = config::BUILD, "Starting todo-api service");

    let config = Config::from_env().context("parsing config")?;
    tracing::info!(?config, "Configuration loaded");

    let token = interrupt_token().context("installing signal handlers")?;
    let app = Application::build(config).context("initializing application")?;

    app.run(token).await.context("running server")
}
