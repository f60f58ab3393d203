use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{counter, null_as_default, timestamp};
use crate::error::AppResult;
use crate::infrastructure::database::{to_fields, CollectionPath, Document, DocumentPath};

pub const ARTICLES_COLLECTION: &str = "articles";
pub const COMMENTS_SUBCOLLECTION: &str = "comments";
pub const LIKES_SUBCOLLECTION: &str = "likes";

/// Characters of content used when no meta description is given.
pub const META_DESCRIPTION_CHARS: usize = 150;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub fn articles_collection() -> CollectionPath {
    CollectionPath::root(ARTICLES_COLLECTION)
}

pub fn article_path(slug: &str) -> DocumentPath {
    articles_collection().doc(slug)
}

/// Lowercase, collapse every non-alphanumeric run to `-`, trim the ends.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// First `max` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Article document. Every field has a zero-value default so documents
/// written by older revisions (missing counters, `null` lists) still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author_id: String,
    pub thumbnail_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub media_urls: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "counter")]
    pub likes_count: u64,
    #[serde(deserialize_with = "counter")]
    pub comments_count: u64,
    #[serde(deserialize_with = "counter")]
    pub shares_count: u64,
    #[serde(deserialize_with = "counter")]
    pub views: u64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

impl Article {
    pub const FIELD_CREATED_AT: &'static str = "created_at";
    pub const FIELD_UPDATED_AT: &'static str = "updated_at";
    pub const FIELD_LIKES: &'static str = "likes_count";
    pub const FIELD_COMMENTS: &'static str = "comments_count";
    pub const FIELD_SHARES: &'static str = "shares_count";
    pub const FIELD_VIEWS: &'static str = "views";
    pub const FIELD_MEDIA: &'static str = "media_urls";

    /// The document key is authoritative for `id`, and for `slug` when absent.
    pub fn from_document(document: &Document) -> AppResult<Self> {
        let mut article: Article = document.decode()?;
        article.id = document.id.clone();
        if article.slug.is_empty() {
            article.slug = document.id.clone();
        }
        Ok(article)
    }

    pub fn to_fields(&self) -> AppResult<serde_json::Map<String, serde_json::Value>> {
        to_fields(self)
    }

    /// `2*likes + 3*comments + 4*shares + 0.5*views`
    pub fn trending_score(&self) -> f64 {
        self.likes_count as f64 * 2.0
            + self.comments_count as f64 * 3.0
            + self.shares_count as f64 * 4.0
            + self.views as f64 * 0.5
    }

    pub fn matches_search(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle_lowercase))
    }
}
