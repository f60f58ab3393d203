// Multipart article forms

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    infrastructure::Upload,
    services::{ArticleDraft, ArticlePatch},
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Fields of an article form as submitted. Empty text fields are `None`.
#[derive(Debug, Default)]
pub struct ArticleForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub thumbnail: Option<Upload>,
    pub media: Vec<Upload>,
}

/// Comma separated list, trimmed, empty entries dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn bad_form(err: MultipartError) -> AppError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(err.body_text()),
        _ => AppError::BadRequest(format!("Invalid form data: {}", err.body_text())),
    }
}

impl ArticleForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ArticleForm::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "thumbnail" | "media" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await.map_err(bad_form)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let upload = Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    };
                    if name == "thumbnail" {
                        form.thumbnail = Some(upload);
                    } else {
                        form.media.push(upload);
                    }
                }
                _ => {
                    let Some(value) = non_empty(field.text().await.map_err(bad_form)?) else {
                        continue;
                    };
                    match name.as_str() {
                        "title" => form.title = Some(value),
                        "content" => form.content = Some(value),
                        "tags" => form.tags = Some(split_list(&value)),
                        "meta_title" => form.meta_title = Some(value),
                        "meta_description" => form.meta_description = Some(value),
                        "keywords" => form.keywords = Some(split_list(&value)),
                        other => debug!("Ignoring unknown form field {}", other),
                    }
                }
            }
        }

        Ok(form)
    }

    pub fn into_draft(self) -> AppResult<ArticleDraft> {
        let title = self
            .title
            .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;
        let content = self
            .content
            .ok_or_else(|| AppError::Validation("Content is required".to_string()))?;

        Ok(ArticleDraft {
            title,
            content,
            tags: self.tags.unwrap_or_default(),
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            keywords: self.keywords.unwrap_or_default(),
            thumbnail: self.thumbnail,
            media: self.media,
        })
    }

    pub fn into_patch(self) -> ArticlePatch {
        ArticlePatch {
            title: self.title,
            content: self.content,
            tags: self.tags,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            keywords: self.keywords,
            thumbnail: self.thumbnail,
            media: self.media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empties() {
        assert_eq!(split_list(" rust, web ,,  , axum "), vec!["rust", "web", "axum"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_draft_requires_title_and_content() {
        let form = ArticleForm {
            content: Some("body".to_string()),
            ..Default::default()
        };
        assert!(matches!(form.into_draft(), Err(AppError::Validation(_))));

        let form = ArticleForm {
            title: Some("Title".to_string()),
            content: Some("body".to_string()),
            ..Default::default()
        };
        let draft = form.into_draft().unwrap();
        assert!(draft.tags.is_empty());
        assert!(draft.meta_title.is_none());
    }
}
