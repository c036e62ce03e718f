//! Router-level test for the version endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::mysql::MySqlPoolOptions;
use tower::ServiceExt;

use bedrock_api::{db, routes};

/// A pool that never actually connects; the version endpoint does not touch
/// the database.
fn lazy_pool() -> db::DbPool {
    let config = bedrock_api::config::DatabaseConfig {
        db_name: "app".to_string(),
        user: "app".to_string(),
        password: "secret".to_string(),
        address: "127.0.0.1".to_string(),
        port: 3306,
        max_idle_conns: 1,
        max_open_conns: 1,
        connect_timeout_secs: 1,
        connect_attempts: 1,
    };
    MySqlPoolOptions::new().connect_lazy_with(db::connect_options(&config))
}

#[tokio::test]
async fn version_endpoint_reports_the_crate_version() -> anyhow::Result<()> {
    let app = routes::router(lazy_pool());

    let response = app
        .oneshot(Request::builder().uri("/api/v1").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(
        body["version"]["id"],
        format!("v{}", env!("CARGO_PKG_VERSION"))
    );
    assert_eq!(body["version"]["status"], "experimental");

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> anyhow::Result<()> {
    let app = routes::router(lazy_pool());

    let response = app
        .oneshot(Request::builder().uri("/api/v2").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
