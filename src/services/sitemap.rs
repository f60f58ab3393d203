// Sitemap - one <url><loc> per article at its canonical public path

use crate::{
    config::SiteConfig,
    entities::articles_collection,
    error::AppResult,
    infrastructure::DocumentStore,
};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_sitemap<'a, I>(site: &SiteConfig, slugs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n",
        SITEMAP_NAMESPACE
    );
    for slug in slugs {
        xml.push_str("<url><loc>");
        xml.push_str(&escape_xml(&site.article_url(slug)));
        xml.push_str("</loc></url>\n");
    }
    xml.push_str("</urlset>");
    xml
}

/// The document id is the slug, so no field decoding is needed.
pub async fn build_sitemap(store: &dyn DocumentStore, site: &SiteConfig) -> AppResult<String> {
    let documents = store.scan(&articles_collection()).await?;
    Ok(render_sitemap(site, documents.iter().map(|doc| doc.id.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::article_path;
    use crate::infrastructure::SqliteDocumentStore;
    use serde_json::{json, Map};

    #[test]
    fn test_empty_sitemap_is_well_formed() {
        let xml = render_sitemap(&SiteConfig::new("https://blog.test"), Vec::<&str>::new());
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n</urlset>"
        );
    }

    #[test]
    fn test_locations_are_escaped() {
        let xml = render_sitemap(&SiteConfig::new("https://blog.test/"), ["a&b"]);
        assert!(xml.contains("<url><loc>https://blog.test/articles/a&amp;b</loc></url>\n"));
    }

    #[tokio::test]
    async fn test_one_entry_per_article() {
        let store = SqliteDocumentStore::new_in_memory().await.unwrap();
        for slug in ["first-post", "second-post"] {
            let mut fields = Map::new();
            fields.insert("title".to_string(), json!(slug));
            store.create(&article_path(slug), fields).await.unwrap();
        }

        let xml = build_sitemap(&store, &SiteConfig::new("https://blog.test")).await.unwrap();
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://blog.test/articles/first-post</loc>"));
        assert!(xml.contains("<loc>https://blog.test/articles/second-post</loc>"));
        assert!(xml.ends_with("</urlset>"));
    }
}
