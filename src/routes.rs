//! Route registration and the version endpoint.
//!
//! The only route in the current API surface is `GET /api/v1`, which reports
//! the API version. The router owns the database pool so that handlers added
//! later can extract it with `State`.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::db::DbPool;

/// API version information.
#[derive(Debug, Serialize)]
pub struct Version {
    /// Version identifier
    pub id: &'static str,

    /// Release maturity of this version
    pub status: &'static str,

    /// Date this version was released
    pub date: &'static str,
}

/// Response body for the version endpoint.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: Version,
}

/// Handle the request to get the API version information.
async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: Version {
            id: concat!("v", env!("CARGO_PKG_VERSION")),
            status: "experimental",
            date: "2026-08-07",
        },
    })
}

/// Build the application router with all v1 routes registered.
pub fn router(pool: DbPool) -> Router {
    Router::new()
        .route("/api/v1", get(get_version))
        .with_state(pool)
}
