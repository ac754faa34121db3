mod routes;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Liveness probe for the hosting platform. Shares nothing with the pipeline.
pub fn router() -> Router {
    routes::health_routes().layer(TraceLayer::new_for_http())
}

pub async fn serve(host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Health endpoint listening on http://{}/health", addr);
    axum::serve(listener, router()).await?;
    Ok(())
}
