//! Service entry point.
//!
//! # Startup Flow
//!
//! 1. Parse command-line flags (the config directory)
//! 2. Load and validate configuration from file + environment
//! 3. Initialize the logger from the validated configuration
//! 4. Create the database connection pool
//! 5. Run database migrations
//! 6. Build the HTTP router and start serving
//!
//! Every failure along this path is fatal: it is logged as a single
//! diagnostic line identifying the failed stage and the process exits with a
//! non-zero status. No component below this file terminates the process
//! itself, which keeps each of them testable in isolation.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tower_http::trace::TraceLayer;

use bedrock_api::{config, db, logging, routes};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "bedrock-api", version, about = "Small HTTP API server")]
struct Cli {
    /// Directory containing the `config` file
    #[arg(long = "config-dir", default_value = ".")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration. The logger is configured by the result, so a
    // failure here can only go to stderr.
    let config = match config::load(&cli.config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error in configuration: {err}");
            process::exit(1);
        }
    };

    logging::init(&config.server);
    tracing::info!(
        "configuration loaded from {}",
        cli.config_dir.join("config").display()
    );

    // Connect and run database migrations
    let pool = match db::connect(&config.database).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("failed to connect to database: {err}");
            process::exit(1);
        }
    };
    tracing::info!("database pool created");

    if let Err(err) = db::run_migrations(&pool).await {
        tracing::error!("failed to run database migrations: {err}");
        process::exit(1);
    }
    tracing::info!("database migrations complete");

    // Register routes and add request tracing
    let app = routes::router(pool).layer(TraceLayer::new_for_http());

    // Bind to the configured address and start serving
    let addr = format!("{}:{}", config.server.address, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind {addr}: {err}");
            process::exit(1);
        }
    };
    tracing::info!("starting server on {addr}");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {err}");
        process::exit(1);
    }
}
