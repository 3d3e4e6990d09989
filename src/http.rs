//! HTTP plumbing shared by the services (feature `http`).
//!
//! - `GET /health`: returns `{ "ok": true, "service": "<name>" }`
//! - [`serve`]: runs a router until the shutdown token is cancelled

use std::net::SocketAddr;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build the `/health` router for a service.
pub fn health_router(service_name: &str) -> Router {
    let name = service_name.to_string();
    Router::new().route("/health", get(move || health_handler(name)))
}

async fn health_handler(service_name: String) -> impl IntoResponse {
    Json(json!({ "ok": true, "service": service_name }))
}

/// Bind `addr` (e.g. `"0.0.0.0:8080"`).
pub async fn bind(addr: &str) -> Result<TcpListener, std::io::Error> {
    TcpListener::bind(addr).await
}

/// Serve `app` on `listener` until `shutdown` is cancelled, then drain
/// in-flight requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(addr = ?addr, "server is running");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
