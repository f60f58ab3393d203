use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::AppError,
    infrastructure::Principal,
    services::{LikeOutcome, SharePayload},
};

pub async fn like_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    principal: Principal,
) -> Result<Json<LikeOutcome>, AppError> {
    Ok(Json(state.engagement.toggle_like(&id, principal.id()).await?))
}

pub async fn share_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SharePayload>, AppError> {
    Ok(Json(state.engagement.share(&id).await?))
}

pub async fn view_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>, AppError> {
    let views = state.engagement.record_view(&id).await?;
    Ok(Json(json!({"id": id, "views": views})))
}

pub fn engagement_routes() -> Router<AppState> {
    Router::new()
        .route("/articles/{id}/like", post(like_handler))
        .route("/articles/{id}/share", post(share_handler))
        .route("/articles/{id}/view", post(view_handler))
}
