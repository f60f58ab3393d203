// Social metadata - Open Graph tags and pre-filled share links for an article.
// Pure functions of the article and the public site identity.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::entities::{truncate_chars, Article};

pub const DESCRIPTION_CHARS: usize = 150;

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

/// Response of a share action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePayload {
    pub shared: bool,
    pub shares_count: u64,
    pub share_url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub og: BTreeMap<String, String>,
    pub share_links: BTreeMap<String, String>,
}

fn display_title(article: &Article) -> &str {
    if article.title.trim().is_empty() {
        "Article"
    } else {
        &article.title
    }
}

/// Meta description (or content when absent), capped at 150 characters
/// with an ellipsis when cut.
pub fn share_description(article: &Article) -> String {
    let source = article
        .meta_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&article.content);

    if source.chars().count() > DESCRIPTION_CHARS {
        format!("{}...", truncate_chars(source, DESCRIPTION_CHARS))
    } else {
        source.to_string()
    }
}

/// Thumbnail, else the first media URL that looks like an image, else the site default.
pub fn share_image(article: &Article, site: &SiteConfig) -> String {
    if let Some(thumbnail) = article.thumbnail_url.as_deref().filter(|t| !t.is_empty()) {
        return thumbnail.to_string();
    }

    article
        .media_urls
        .iter()
        .find(|url| {
            let lowered = url.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
        })
        .cloned()
        .unwrap_or_else(|| site.default_image.clone())
}

pub fn open_graph_tags(article: &Article, site: &SiteConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("og:title".to_string(), display_title(article).to_string()),
        ("og:description".to_string(), share_description(article)),
        ("og:image".to_string(), share_image(article, site)),
        ("og:url".to_string(), site.article_url(&article.id)),
        ("og:type".to_string(), "article".to_string()),
    ])
}

pub fn share_links(article: &Article, site: &SiteConfig) -> BTreeMap<String, String> {
    let url = site.article_url(&article.id);
    let title = display_title(article);
    let description = share_description(article);

    let enc_url = urlencoding::encode(&url);
    let enc_title = urlencoding::encode(title);

    BTreeMap::from([
        (
            "twitter".to_string(),
            format!("https://twitter.com/intent/tweet?text={}&url={}", enc_title, enc_url),
        ),
        (
            "facebook".to_string(),
            format!("https://www.facebook.com/sharer/sharer.php?u={}", enc_url),
        ),
        (
            "linkedin".to_string(),
            format!("https://www.linkedin.com/sharing/share-offsite/?url={}", enc_url),
        ),
        (
            "whatsapp".to_string(),
            format!("https://wa.me/?text={}", urlencoding::encode(&format!("{} {}", title, url))),
        ),
        (
            "email".to_string(),
            format!(
                "mailto:?subject={}&body={}",
                enc_title,
                urlencoding::encode(&format!("{}\n\n{}", description, url))
            ),
        ),
    ])
}

pub fn build_share_payload(article: &Article, site: &SiteConfig) -> SharePayload {
    SharePayload {
        shared: true,
        shares_count: article.shares_count,
        share_url: site.article_url(&article.id),
        title: display_title(article).to_string(),
        description: share_description(article),
        image: share_image(article, site),
        og: open_graph_tags(article, site),
        share_links: share_links(article, site),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::new("https://blog.test")
    }

    fn article() -> Article {
        Article {
            id: "hello-world".to_string(),
            slug: "hello-world".to_string(),
            title: "Hello & Goodbye".to_string(),
            content: "Body text".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_description_truncation() {
        let mut long = article();
        long.meta_description = Some("y".repeat(151));
        let description = share_description(&long);
        assert_eq!(description, format!("{}...", "y".repeat(150)));

        let mut exact = article();
        exact.meta_description = Some("z".repeat(150));
        assert_eq!(share_description(&exact), "z".repeat(150));

        assert_eq!(share_description(&article()), "Body text");
    }

    #[test]
    fn test_image_fallbacks() {
        let site = site();
        let mut a = article();
        assert_eq!(share_image(&a, &site), "https://blog.test/static/default-og.png");

        a.media_urls = vec!["https://cdn/clip.mp4".to_string(), "https://cdn/pic.JPG".to_string()];
        assert_eq!(share_image(&a, &site), "https://cdn/pic.JPG");

        a.thumbnail_url = Some("https://cdn/thumb.png".to_string());
        assert_eq!(share_image(&a, &site), "https://cdn/thumb.png");
    }

    #[test]
    fn test_open_graph_tags() {
        let tags = open_graph_tags(&article(), &site());
        assert_eq!(tags["og:title"], "Hello & Goodbye");
        assert_eq!(tags["og:url"], "https://blog.test/articles/hello-world");
        assert_eq!(tags["og:type"], "article");
    }

    #[test]
    fn test_share_links_are_encoded() {
        let links = share_links(&article(), &site());
        assert_eq!(links.len(), 5);
        assert_eq!(
            links["twitter"],
            "https://twitter.com/intent/tweet?text=Hello%20%26%20Goodbye&url=https%3A%2F%2Fblog.test%2Farticles%2Fhello-world"
        );
        assert_eq!(
            links["facebook"],
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fblog.test%2Farticles%2Fhello-world"
        );
        assert!(links["linkedin"].starts_with("https://www.linkedin.com/sharing/share-offsite/?url=https%3A%2F%2F"));
        assert!(links["whatsapp"].starts_with("https://wa.me/?text=Hello%20%26%20Goodbye%20https%3A"));
        assert!(links["email"].starts_with("mailto:?subject=Hello%20%26%20Goodbye&body=Body%20text%0A%0Ahttps%3A"));
    }
}
