// CommentService - append-only comments with the parent counter kept in step

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{article_path, Article, Comment, COMMENTS_SUBCOLLECTION},
    error::{AppError, AppResult},
    infrastructure::{to_fields, DocumentQuery, DocumentStore, FieldUpdate, SortDirection},
    services::article_service::article_not_found,
};

pub const DEFAULT_COMMENT_LIMIT: usize = 50;
pub const MAX_COMMENT_LIMIT: usize = 100;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The comment document and the `comments_count` bump commit together
    /// or not at all.
    #[instrument(skip(self, text))]
    pub async fn post(&self, slug: &str, principal: &str, text: &str) -> AppResult<Comment> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Comment text is required".to_string()));
        }

        let article = article_path(slug);
        let comment = Comment::new(principal, text, Utc::now());

        let mut tx = self.store.begin_transaction().await?;
        tx.update(&article, &[FieldUpdate::increment(Article::FIELD_COMMENTS, 1)])
            .await
            .map_err(article_not_found)?;
        let id = tx
            .add(&article.collection(COMMENTS_SUBCOLLECTION), to_fields(&comment)?)
            .await?;
        tx.commit().await?;

        info!("Comment {} posted on {} by {}", id, slug, principal);
        Ok(Comment { id, ..comment })
    }

    /// Newest first, at most `limit` (capped at `MAX_COMMENT_LIMIT`).
    pub async fn list(&self, slug: &str, limit: usize) -> AppResult<Vec<Comment>> {
        if limit == 0 {
            return Err(AppError::BadRequest("limit must be at least 1".to_string()));
        }

        let article = article_path(slug);
        if self.store.get(&article).await?.is_none() {
            return Err(AppError::NotFound("Article not found".to_string()));
        }

        let query = DocumentQuery::new(
            article.collection(COMMENTS_SUBCOLLECTION),
            "created_at",
            SortDirection::Descending,
        )
        .limit(limit.min(MAX_COMMENT_LIMIT));

        self.store
            .query(query)
            .await?
            .iter()
            .map(Comment::from_document)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteDocumentStore;
    use tempfile::TempDir;

    async fn setup() -> (CommentService, Arc<dyn DocumentStore>) {
        let store: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocumentStore::new_in_memory().await.unwrap());
        let article = Article {
            id: "post".to_string(),
            slug: "post".to_string(),
            ..Default::default()
        };
        store.create(&article_path("post"), article.to_fields().unwrap()).await.unwrap();
        (CommentService::new(store.clone()), store)
    }

    async fn comments_count(store: &Arc<dyn DocumentStore>) -> u64 {
        let doc = store.get(&article_path("post")).await.unwrap().unwrap();
        Article::from_document(&doc).unwrap().comments_count
    }

    #[tokio::test]
    async fn test_post_increments_counter_by_one() {
        let (service, store) = setup().await;

        let comment = service.post("post", "alice", "First!").await.unwrap();
        assert!(!comment.id.is_empty());
        assert_eq!(comment.user_id, "alice");
        assert_eq!(comments_count(&store).await, 1);

        service.post("post", "bob", "Second").await.unwrap();
        assert_eq!(comments_count(&store).await, 2);

        let stored = store
            .scan(&article_path("post").collection(COMMENTS_SUBCOLLECTION))
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_posts_keep_counter_in_step() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("blog.db").display());
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(&url).await.unwrap());
        let article = Article {
            id: "post".to_string(),
            slug: "post".to_string(),
            ..Default::default()
        };
        store.create(&article_path("post"), article.to_fields().unwrap()).await.unwrap();
        let service = CommentService::new(store.clone());

        let handles: Vec<_> = (0..30)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.post("post", &format!("user-{}", i % 5), &format!("comment {}", i)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store
            .scan(&article_path("post").collection(COMMENTS_SUBCOLLECTION))
            .await
            .unwrap();
        assert_eq!(stored.len(), 30);
        assert_eq!(comments_count(&store).await, 30);
    }

    #[tokio::test]
    async fn test_post_on_missing_article_writes_nothing() {
        let (service, store) = setup().await;
        let result = service.post("ghost", "alice", "hello?").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let orphans = store
            .scan(&article_path("ghost").collection(COMMENTS_SUBCOLLECTION))
            .await
            .unwrap();
        assert!(orphans.is_empty());
    }

    #[tokio::test]
    async fn test_blank_comment_rejected() {
        let (service, store) = setup().await;
        let result = service.post("post", "alice", "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(comments_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let (service, _) = setup().await;
        for text in ["one", "two", "three"] {
            service.post("post", "alice", text).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let comments = service.list("post", 2).await.unwrap();
        let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["three", "two"]);

        assert!(matches!(service.list("ghost", 10).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.list("post", 0).await, Err(AppError::BadRequest(_))));
    }
}
