// Typed document schemas, decoded once at the store boundary

pub mod article;
pub mod comment;
pub mod like;

pub use article::{
    article_path, articles_collection, generate_slug, truncate_chars, Article,
    ARTICLES_COLLECTION, COMMENTS_SUBCOLLECTION, LIKES_SUBCOLLECTION,
};
pub use comment::Comment;
pub use like::Like;

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field. Legacy documents carry both.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Engagement counters. `null`, missing and negative values (left by older
/// revisions) all decode as zero.
pub fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(value.max(0) as u64)
}

/// UTC timestamps as fixed-width RFC 3339 (microsecond precision), so the
/// stored strings sort in chronological order.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(serde::de::Error::custom),
            None => Ok(DateTime::<Utc>::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timestamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(5);
        let a = timestamp::format(&whole);
        let b = timestamp::format(&fractional);
        assert_eq!(a, "2024-05-01T12:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
