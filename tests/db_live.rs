//! Live-database integration tests.
//!
//! Ignored by default: they need a reachable MySQL instance. Point the
//! `TEST_DATABASE_*` environment variables at one and run with
//! `cargo test -- --ignored`.

use bedrock_api::config::DatabaseConfig;
use bedrock_api::db;

fn live_config() -> DatabaseConfig {
    let var = |name: &str, fallback: &str| std::env::var(name).unwrap_or_else(|_| fallback.into());
    DatabaseConfig {
        db_name: var("TEST_DATABASE_NAME", "test"),
        user: var("TEST_DATABASE_USER", "root"),
        password: var("TEST_DATABASE_PASSWORD", ""),
        address: var("TEST_DATABASE_ADDRESS", "127.0.0.1"),
        port: var("TEST_DATABASE_PORT", "3306").parse().expect("numeric port"),
        max_idle_conns: 2,
        max_open_conns: 5,
        connect_timeout_secs: 5,
        connect_attempts: 1,
    }
}

#[tokio::test]
#[ignore = "needs a reachable MySQL instance"]
async fn connects_and_migrations_are_idempotent() -> anyhow::Result<()> {
    let pool = db::connect(&live_config()).await?;

    // Running migrations twice against the same schema must not error or
    // duplicate anything; sqlx tracks applied migrations in its ledger table.
    db::run_migrations(&pool).await?;
    db::run_migrations(&pool).await?;

    Ok(())
}

#[tokio::test]
#[ignore = "needs a reachable MySQL instance"]
async fn unreachable_host_surfaces_an_error() {
    let mut config = live_config();
    config.address = "127.0.0.1".to_string();
    config.port = 1; // nothing listens here
    config.connect_timeout_secs = 1;
    config.connect_attempts = 2;

    assert!(db::connect(&config).await.is_err());
}
