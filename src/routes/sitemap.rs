use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{app_state::AppState, error::AppError, services::build_sitemap};

pub async fn sitemap_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let xml = build_sitemap(state.store.as_ref(), &state.site).await?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.health_check().await?;
    Ok(Json(json!({"status": "ok"})))
}

pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/health", get(health_handler))
}
