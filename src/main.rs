// Blog CMS Server

use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_cms::{app_state::AppState, config::Config, routes::create_blog_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blog_cms=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(&config).await?;

    let app = create_blog_router(app_state)
        .nest_service("/media", ServeDir::new(&config.storage.media_dir));

    let addr = config.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Blog CMS listening on http://{}", addr);
    info!("Public site: {}", config.site.site_url);

    axum::serve(listener, app).await?;

    Ok(())
}
