use axum::{
    extract::{DefaultBodyLimit, Multipart, Path as AxumPath, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    entities::Article,
    error::AppError,
    infrastructure::Principal,
    routes::forms::ArticleForm,
    services::{ListArticles, DEFAULT_PAGE_SIZE},
};

const ARTICLE_CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub q: Option<String>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
}

pub async fn list_articles_handler(
    State(state): State<AppState>,
    Query(params): Query<ListArticlesQuery>,
) -> Result<Json<Vec<Article>>, AppError> {
    let articles = state
        .articles
        .list(ListArticles {
            query: params.q,
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            page_token: params.page_token,
        })
        .await?;
    Ok(Json(articles))
}

pub async fn create_article_handler(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let draft = ArticleForm::from_multipart(multipart).await?.into_draft()?;
    let article = state.articles.create(principal.id(), draft).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn get_article_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let article = state.articles.get(&id).await?;
    Ok(([(header::CACHE_CONTROL, ARTICLE_CACHE_CONTROL)], Json(article)))
}

pub async fn update_article_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    principal: Principal,
    multipart: Multipart,
) -> Result<Json<Article>, AppError> {
    let patch = ArticleForm::from_multipart(multipart).await?.into_patch();
    let article = state.articles.update(principal.id(), &id, patch).await?;
    Ok(Json(article))
}

pub async fn delete_article_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    principal: Principal,
) -> Result<Json<Value>, AppError> {
    state.articles.delete(principal.id(), &id).await?;
    Ok(Json(json!({"ok": true, "deleted": id})))
}

/// Article forms carry media, so they get their own body limit instead of
/// axum's 2 MB default.
pub fn article_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles_handler).post(create_article_handler))
        .route(
            "/articles/{id}",
            get(get_article_handler)
                .put(update_article_handler)
                .delete(delete_article_handler),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
