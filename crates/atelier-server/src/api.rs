use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use atelier_shared::constants::STUDIO_NAME;
use atelier_shared::protocol::{
    ContactResponse, GalleryResponse, GalleryScanResponse, HealthResponse, InfoResponse,
};
use atelier_shared::ContactSubmission;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gallery;
use crate::gateway::MailGateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: MailGateway,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/info", get(server_info))
        .route("/api/contact", post(submit_contact))
        .route("/api/gallery", get(gallery_featured))
        .route("/api/gallery/scan", get(gallery_scan))
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn server_info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: STUDIO_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 200 `{message}` on delivery, 400 `{error}` for missing fields or an
/// undecodable body, 500 `{error, details}` when the mail transport fails.
async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactResponse>, ServerError> {
    let Json(submission) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let result = state.gateway.dispatch(&submission).await;
    let message = ServerError::check_submission(result)?;
    Ok(Json(ContactResponse { message }))
}

async fn gallery_featured(State(state): State<AppState>) -> Json<GalleryResponse> {
    Json(gallery::featured(
        &state.config.gallery_url_prefix,
        state.config.featured_limit,
    ))
}

async fn gallery_scan(State(state): State<AppState>) -> Json<GalleryScanResponse> {
    let images = gallery::scan_dir(&state.config.gallery_dir, &state.config.gallery_url_prefix).await;
    Json(GalleryScanResponse { images })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
