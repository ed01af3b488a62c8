use anyhow::Result;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{self, AppState};

pub async fn run(state: AppState) -> Result<()> {
    let port = state.config.port;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Weather service running at http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
