use axum::{
    extract::{Path as AxumPath, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    error::AppError,
    services::{
        ActivityPeriod, ActivityReport, AnalyticsSummary, ArticleAnalytics, TrendingArticle,
        DEFAULT_TRENDING_LIMIT,
    },
};

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub period: Option<String>,
}

pub async fn summary_handler(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(state.analytics.summary().await?))
}

pub async fn trending_handler(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<Vec<TrendingArticle>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
    Ok(Json(state.analytics.trending(limit).await?))
}

pub async fn activity_handler(
    State(state): State<AppState>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<ActivityReport>, AppError> {
    let period: ActivityPeriod = params
        .period
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("period is required".to_string()))?
        .parse()?;
    Ok(Json(state.analytics.activity(period).await?))
}

pub async fn detail_handler(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
) -> Result<Json<ArticleAnalytics>, AppError> {
    Ok(Json(state.analytics.detail(&slug).await?))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/summary", get(summary_handler))
        .route("/analytics/trending", get(trending_handler))
        .route("/analytics/activity", get(activity_handler))
        .route("/analytics/{slug}/detail", get(detail_handler))
}
