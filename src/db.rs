//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a MySQL connection pool sized from configuration
//! - Running database migrations automatically
//!
//! The initial connection is retried a bounded number of times with
//! exponential backoff, and every attempt carries a hard timeout, so an
//! unreachable database fails startup in a predictable amount of time.

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::config::DatabaseConfig;

/// Type alias for the MySQL connection pool.
///
/// Instead of writing `Pool<MySql>` everywhere, we can use `DbPool`.
pub type DbPool = MySqlPool;

/// Connections older than this are recycled on next borrow even when the
/// pool is otherwise idle-compliant, to tolerate network-level staleness.
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(10 * 60);

/// First retry delay; doubles on every further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Longest delay the backoff schedule is allowed to reach.
const RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

/// Build the connection target from the database configuration.
///
/// The connection uses the 4-byte-safe `utf8mb4` charset, decodes temporal
/// columns automatically through the chrono integration, and leaves the
/// session time zone at the server default so temporal values are
/// interpreted in local time rather than pinned to UTC.
///
/// The driver's own statement logging is disabled; the application's
/// tracing subscriber is the only log author.
pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.address)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.db_name)
        .charset("utf8mb4")
        .timezone(None::<String>)
        .disable_statement_logging()
}

/// Pool sizing and lifetime policy from the database configuration.
///
/// `max_open_conns` bounds how many physical connections may exist at once;
/// `max_idle_conns` becomes the pool's warm floor of idle connections (the
/// nearest sqlx knob to a retained-idle bound). Each connection attempt is
/// bounded by the configured timeout.
fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .max_lifetime(MAX_CONNECTION_LIFETIME)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
}

/// Delay before retry number `attempt` (1-based), capped at [`RETRY_MAX_DELAY`].
fn backoff_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(RETRY_MAX_DELAY)
}

/// Create a connection pool to the MySQL database.
///
/// A connection pool maintains multiple database connections that are
/// reused across HTTP requests instead of opening a new connection for each
/// one. The first connection is established eagerly so that an unreachable
/// host or rejected credentials surface here, at startup, rather than on the
/// first request.
///
/// Up to `connect_attempts` attempts are made, sleeping with exponential
/// backoff in between; the error from the last attempt is returned if all of
/// them fail. The caller treats that as fatal.
///
/// # Errors
///
/// Returns an error if:
/// - The database host is unreachable within the configured timeout
/// - Authentication fails
/// - The named database does not exist
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match pool_options(config)
            .connect_with(connect_options(config))
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < config.connect_attempts => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    "database connection attempt {attempt} of {} failed: {err}; \
                     retrying in {delay:?}",
                    config.connect_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Run database migrations from the `migrations/` directory.
///
/// The macro embeds all SQL migration files at compile time and executes the
/// pending ones in order. Applied migrations are tracked in the
/// `_sqlx_migrations` table, so each migration runs only once and invoking
/// this repeatedly against an up-to-date schema is a no-op.
///
/// No migrations are declared yet; the mechanism is wired so that model
/// schemas added later are synchronized at every startup.
///
/// # Errors
///
/// Returns an error if a migration file is invalid or the database rejects
/// one of its statements.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
