// ArticleService - article documents, slugs, uploads and author checks

use chrono::Utc;
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    entities::{
        article::META_DESCRIPTION_CHARS, article_path, articles_collection, generate_slug,
        timestamp, truncate_chars, Article, COMMENTS_SUBCOLLECTION, LIKES_SUBCOLLECTION,
    },
    error::{AppError, AppResult},
    infrastructure::{
        upload_file, BlobStore, DocumentQuery, DocumentStore, FieldUpdate, SortDirection, Upload,
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
/// Search looks at this many of the newest articles and no further.
pub const SEARCH_SCAN_LIMIT: usize = 100;

const THUMBNAIL_FOLDER: &str = "thumbnails";
const MEDIA_FOLDER: &str = "media";

/// Input for a new article.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub thumbnail: Option<Upload>,
    pub media: Vec<Upload>,
}

/// Partial update; `None` leaves a field untouched. `tags` and `keywords`
/// replace the stored lists, `media` is appended to them.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub thumbnail: Option<Upload>,
    pub media: Vec<Upload>,
}

#[derive(Debug, Clone)]
pub struct ListArticles {
    pub query: Option<String>,
    pub page_size: usize,
    pub page_token: Option<String>,
}

impl Default for ListArticles {
    fn default() -> Self {
        Self {
            query: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_token: None,
        }
    }
}

pub(crate) fn article_not_found(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::NotFound("Article not found".to_string()),
        other => other,
    }
}

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, author_id: &str, draft: ArticleDraft) -> AppResult<Article> {
        if draft.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let slug = generate_slug(&draft.title);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Title must contain at least one letter or digit".to_string(),
            ));
        }

        let path = article_path(&slug);
        // Fail before uploading anything for a slug that is already taken.
        if self.store.get(&path).await?.is_some() {
            return Err(AppError::Conflict(format!("Article {} already exists", slug)));
        }

        let (thumbnail_url, media_urls) = self.upload_assets(draft.thumbnail, draft.media).await?;

        let now = Utc::now();
        let meta_title = draft
            .meta_title
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| draft.title.clone());
        let meta_description = draft
            .meta_description
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| truncate_chars(&draft.content, META_DESCRIPTION_CHARS).to_string());

        let article = Article {
            id: slug.clone(),
            slug: slug.clone(),
            title: draft.title,
            content: draft.content,
            author_id: author_id.to_string(),
            thumbnail_url,
            media_urls,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            views: 0,
            meta_title: Some(meta_title),
            meta_description: Some(meta_description),
            keywords: draft.keywords,
        };

        self.store.create(&path, article.to_fields()?).await?;
        info!("Created article {} by {}", slug, author_id);

        self.get(&slug).await
    }

    pub async fn get(&self, slug: &str) -> AppResult<Article> {
        let document = self
            .store
            .get(&article_path(slug))
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
        Article::from_document(&document)
    }

    /// Newest first. With a search query this is a linear scan over the
    /// newest `SEARCH_SCAN_LIMIT` articles; older matches are not found.
    #[instrument(skip(self))]
    pub async fn list(&self, params: ListArticles) -> AppResult<Vec<Article>> {
        if !(1..=MAX_PAGE_SIZE).contains(&params.page_size) {
            return Err(AppError::BadRequest(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let newest_first = DocumentQuery::new(
            articles_collection(),
            Article::FIELD_CREATED_AT,
            SortDirection::Descending,
        );

        if let Some(needle) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = needle.to_lowercase();
            let documents = self.store.query(newest_first.limit(SEARCH_SCAN_LIMIT)).await?;
            let mut matches = Vec::new();
            for document in &documents {
                let article = Article::from_document(document)?;
                if article.matches_search(&needle) {
                    matches.push(article);
                }
                if matches.len() == params.page_size {
                    break;
                }
            }
            return Ok(matches);
        }

        let mut query = newest_first.limit(params.page_size);
        if let Some(token) = params.page_token.as_deref().filter(|t| !t.is_empty()) {
            match self.page_cursor(token).await? {
                Some(cursor) => query = query.start_after(cursor, token),
                None => debug!("Unknown page_token {}, serving the first page", token),
            }
        }

        self.store
            .query(query)
            .await?
            .iter()
            .map(Article::from_document)
            .collect()
    }

    /// Creation timestamp of the article named by a page token, if it exists.
    async fn page_cursor(&self, token: &str) -> AppResult<Option<Value>> {
        let Some(document) = self.store.get(&article_path(token)).await? else {
            return Ok(None);
        };
        match Article::from_document(&document) {
            Ok(article) => Ok(Some(Value::String(timestamp::format(&article.created_at)))),
            Err(e) => {
                warn!("Ignoring undecodable page_token {}: {}", token, e);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, principal: &str, slug: &str, patch: ArticlePatch) -> AppResult<Article> {
        let existing = self.get(slug).await?;
        ensure_author(&existing, principal)?;

        let (thumbnail_url, media_urls) = self.upload_assets(patch.thumbnail, patch.media).await?;

        let mut updates = Vec::new();
        if let Some(title) = patch.title {
            updates.push(FieldUpdate::set("title", title));
        }
        if let Some(content) = patch.content {
            updates.push(FieldUpdate::set("content", content));
        }
        if let Some(tags) = patch.tags {
            updates.push(FieldUpdate::set("tags", tags));
        }
        if let Some(meta_title) = patch.meta_title {
            updates.push(FieldUpdate::set("meta_title", meta_title));
        }
        if let Some(meta_description) = patch.meta_description {
            updates.push(FieldUpdate::set("meta_description", meta_description));
        }
        if let Some(keywords) = patch.keywords {
            updates.push(FieldUpdate::set("keywords", keywords));
        }
        if let Some(url) = thumbnail_url {
            updates.push(FieldUpdate::set("thumbnail_url", url));
        }
        if !media_urls.is_empty() {
            updates.push(FieldUpdate::append(
                Article::FIELD_MEDIA,
                media_urls.into_iter().map(Value::String).collect(),
            ));
        }
        updates.push(FieldUpdate::set(
            Article::FIELD_UPDATED_AT,
            timestamp::format(&Utc::now()),
        ));

        self.store
            .update(&article_path(slug), &updates)
            .await
            .map_err(article_not_found)?;
        info!("Updated article {} ({} fields)", slug, updates.len());

        self.get(slug).await
    }

    /// Removes the article together with its comments and likes.
    #[instrument(skip(self))]
    pub async fn delete(&self, principal: &str, slug: &str) -> AppResult<()> {
        let existing = self.get(slug).await?;
        ensure_author(&existing, principal)?;

        let path = article_path(slug);
        let mut tx = self.store.begin_transaction().await?;
        let comments = tx.delete_collection(&path.collection(COMMENTS_SUBCOLLECTION)).await?;
        let likes = tx.delete_collection(&path.collection(LIKES_SUBCOLLECTION)).await?;
        if !tx.delete(&path).await? {
            return Err(AppError::NotFound("Article not found".to_string()));
        }
        tx.commit().await?;

        info!(
            "Deleted article {} with {} comments and {} likes",
            slug, comments, likes
        );
        Ok(())
    }

    /// Uploads finish before any document write; one failure fails the request.
    async fn upload_assets(
        &self,
        thumbnail: Option<Upload>,
        media: Vec<Upload>,
    ) -> AppResult<(Option<String>, Vec<String>)> {
        let blobs = self.blobs.as_ref();
        let thumbnail_upload = async move {
            match thumbnail {
                Some(upload) => upload_file(blobs, upload, THUMBNAIL_FOLDER).await.map(Some),
                None => Ok(None),
            }
        };
        let media_uploads =
            try_join_all(media.into_iter().map(|upload| upload_file(blobs, upload, MEDIA_FOLDER)));

        futures::try_join!(thumbnail_upload, media_uploads).map_err(|e| {
            warn!("Asset upload failed: {}", e);
            e
        })
    }
}

fn ensure_author(article: &Article, principal: &str) -> AppResult<()> {
    if article.author_id != principal {
        return Err(AppError::Forbidden(
            "Only the author can modify this article".to_string(),
        ));
    }
    Ok(())
}
