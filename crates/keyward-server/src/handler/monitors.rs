//! Health check handlers.

use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::handler::Result;
use crate::service::ServiceState;

/// Response for the liveness probe.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct PingResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Liveness probe; requires no authentication.
async fn ping() -> Result<Json<PingResponse>> {
    Ok(Json(PingResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    }))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn ping_is_public() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/ping").await;
        response.assert_status_ok();

        let body: PingResponse = response.json();
        assert_eq!(body.status, "ok");

        Ok(())
    }
}
