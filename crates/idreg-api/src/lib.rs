//! # idreg-api — HTTP Service for the Identity Registry
//!
//! Hosts one registry instance behind an Axum router. The host supplies
//! what the registry needs from its environment: the calling principal
//! (from the `x-idreg-principal` header), a logical clock height per
//! mutating request, and one-at-a-time execution.
//!
//! ## API Surface
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `POST /v1/identities` | create-identity |
//! | `PUT /v1/identities/{id}/hash` | update-identity-data |
//! | `POST /v1/identities/{id}/verification` | verify-identity |
//! | `GET /v1/identities/{id}` | get-identity-data |
//! | `GET /v1/identities/{id}/verified` | is-identity-verified |
//! | `GET /v1/identities/{id}/kyc-level` | get-kyc-level |
//! | `GET /v1/identities/{id}/history` | journal for one identity |
//! | `GET /v1/owners/{principal}` | identity owned by a principal |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the traced API routes.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::identity::router())
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe. Always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The registry is in memory, so ready once started.
async fn readiness() -> &'static str {
    "ready"
}
