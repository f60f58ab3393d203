use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, timestamp};
use crate::error::AppResult;
use crate::infrastructure::database::Document;

/// A comment under an article. Immutable once written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    /// Store-generated key; not part of the stored fields.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: &str, text: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at,
        }
    }

    pub fn from_document(document: &Document) -> AppResult<Self> {
        let mut comment: Comment = document.decode()?;
        comment.id = document.id.clone();
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::to_fields;

    #[test]
    fn test_stored_fields_omit_empty_id() {
        let comment = Comment::new("alice", "Nice post", Utc::now());
        let fields = to_fields(&comment).unwrap();
        assert!(!fields.contains_key("id"));

        let decoded = Comment::from_document(&Document {
            id: "c1".to_string(),
            fields,
        })
        .unwrap();
        assert_eq!(decoded.id, "c1");
        assert_eq!(decoded.user_id, "alice");
    }
}
