use std::sync::Arc;

use crate::{
    config::{Config, SiteConfig, DEFAULT_MAX_UPLOAD_BYTES},
    infrastructure::{
        BlobStore, DocumentStore, IdentityVerifier, JwtIdentityVerifier, LocalBlobStore,
        SqliteDocumentStore,
    },
    services::{AnalyticsService, ArticleService, CommentService, EngagementService},
};

/// Shared by every handler. Collaborators sit behind `Arc<dyn ...>` so tests
/// can swap in their own.
#[derive(Clone)]
pub struct AppState {
    pub site: SiteConfig,
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub articles: ArticleService,
    pub engagement: EngagementService,
    pub comments: CommentService,
    pub analytics: AnalyticsService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Initialize document store
        let store = SqliteDocumentStore::new(&config.database.url).await?;

        let blobs = LocalBlobStore::new(&config.storage.media_dir, &config.storage.public_base_url);
        let verifier = JwtIdentityVerifier::new(&config.auth);

        Ok(Self::with_collaborators(
            config.site.clone(),
            Arc::new(store),
            Arc::new(blobs),
            Arc::new(verifier),
        )
        .with_upload_limit(config.storage.max_upload_bytes))
    }

    pub fn with_collaborators(
        site: SiteConfig,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            articles: ArticleService::new(store.clone(), blobs),
            engagement: EngagementService::new(store.clone(), site.clone()),
            comments: CommentService::new(store.clone()),
            analytics: AnalyticsService::new(store.clone()),
            site,
            store,
            verifier,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
