// EngagementService - likes (toggle per principal), shares and views.
// Every counter change rides in the same store operation as the record it mirrors.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    config::SiteConfig,
    entities::{article_path, Article, Like, LIKES_SUBCOLLECTION},
    error::{AppError, AppResult},
    infrastructure::{to_fields, DocumentStore, FieldUpdate},
    services::{
        article_service::article_not_found,
        social_metadata::{build_share_payload, SharePayload},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: u64,
}

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn DocumentStore>,
    site: SiteConfig,
}

impl EngagementService {
    pub fn new(store: Arc<dyn DocumentStore>, site: SiteConfig) -> Self {
        Self { store, site }
    }

    /// Absent -> Present or Present -> Absent for one (article, principal).
    ///
    /// Runs as one transaction that opens with a write (deleting the like
    /// record), so two concurrent toggles by the same principal are
    /// serialised by the store and each sees the other's outcome.
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, slug: &str, principal: &str) -> AppResult<LikeOutcome> {
        let article = article_path(slug);
        let like = article.collection(LIKES_SUBCOLLECTION).doc(principal);

        let mut tx = self.store.begin_transaction().await?;
        let liked = if tx.delete(&like).await? {
            tx.update(&article, &[FieldUpdate::increment(Article::FIELD_LIKES, -1)])
                .await
                .map_err(article_not_found)?;
            false
        } else {
            tx.update(&article, &[FieldUpdate::increment(Article::FIELD_LIKES, 1)])
                .await
                .map_err(article_not_found)?;
            let record = Like {
                user_id: principal.to_string(),
                created_at: Utc::now(),
            };
            tx.create(&like, to_fields(&record)?).await?;
            true
        };

        let document = tx
            .get(&article)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
        let likes_count = Article::from_document(&document)?.likes_count;
        tx.commit().await?;

        info!("{} {} {}", principal, if liked { "liked" } else { "unliked" }, slug);
        Ok(LikeOutcome { liked, likes_count })
    }

    /// Monotonic; no record of who shared.
    #[instrument(skip(self))]
    pub async fn share(&self, slug: &str) -> AppResult<SharePayload> {
        let path = article_path(slug);
        self.store
            .update(&path, &[FieldUpdate::increment(Article::FIELD_SHARES, 1)])
            .await
            .map_err(article_not_found)?;

        let document = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
        let article = Article::from_document(&document)?;
        Ok(build_share_payload(&article, &self.site))
    }

    pub async fn record_view(&self, slug: &str) -> AppResult<u64> {
        let path = article_path(slug);
        self.store
            .update(&path, &[FieldUpdate::increment(Article::FIELD_VIEWS, 1)])
            .await
            .map_err(article_not_found)?;

        let document = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
        Ok(Article::from_document(&document)?.views)
    }
}
