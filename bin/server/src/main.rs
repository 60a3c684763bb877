use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dto;
mod routers;
mod service;
#[cfg(test)]
mod tests;

use config::Settings;
use service::PortfolioService;

/// Health check endpoint
#[instrument]
async fn healthcheck() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({"status": "healthy"})))
}

/// Assemble routes and layers around a ready service
fn build_router(service: Arc<PortfolioService>, static_dir: Option<&str>) -> Router {
    let app = Router::new()
        .route("/healthcheck", get(healthcheck))
        .nest("/api", routers::create_router());

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
            .layer(CorsLayer::permissive())
            .layer(Extension(service)),
    )
}

/// Initialize the Axum web server
fn create_app(settings: &Settings) -> Result<Router, anyhow::Error> {
    let service = Arc::new(PortfolioService::new(settings)?);
    if let Some(dir) = &settings.static_dir {
        info!("Serving static pages from {}", dir);
    }
    Ok(build_router(service, settings.static_dir.as_deref()))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portfolio_server=debug,portfolio_core=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::load()?;
    info!("Starting portfolio server with settings: {:?}", settings);

    // Create the app
    let app = create_app(&settings)?;

    // Start the server
    let listener = tokio::net::TcpListener::bind(&settings.server_address()).await?;
    info!("Server listening on {}", settings.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
