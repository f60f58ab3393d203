use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    entities::Comment,
    error::AppError,
    infrastructure::Principal,
    services::DEFAULT_COMMENT_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub limit: Option<usize>,
}

pub async fn post_comment_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    principal: Principal,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state.comments.post(&id, principal.id(), &req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(params): Query<ListCommentsQuery>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_COMMENT_LIMIT);
    Ok(Json(state.comments.list(&id, limit).await?))
}

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/articles/{id}/comments",
        get(list_comments_handler).post(post_comment_handler),
    )
}
