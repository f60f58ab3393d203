// HTTP surface - one module per resource group

pub mod analytics;
pub mod articles;
pub mod comments;
pub mod engagement;
pub mod forms;
pub mod sitemap;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;

pub fn create_blog_router(state: AppState) -> Router {
    Router::new()
        .merge(articles::article_routes(state.max_upload_bytes))
        .merge(comments::comment_routes())
        .merge(engagement::engagement_routes())
        .merge(analytics::analytics_routes())
        .merge(sitemap::site_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
