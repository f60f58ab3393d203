use serde::{Deserialize, Serialize};
use std::env;

use crate::error::AppError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where uploaded media lands and the prefix it is published under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub media_dir: String,
    pub public_base_url: String,
    /// Largest accepted article form body, uploads included.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// Public site identity used for canonical URLs, sitemap entries and share payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_url: String,
    pub default_image: String,
}

impl SiteConfig {
    pub fn new(site_url: impl Into<String>) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        let default_image = format!("{}/static/default-og.png", site_url);
        Self {
            site_url,
            default_image,
        }
    }

    pub fn article_url(&self, slug: &str) -> String {
        format!("{}/articles/{}", self.site_url, slug)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine; the process environment still applies.
        let _ = dotenvy::dotenv();

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            AppError::ConfigurationError("Set JWT_SECRET in the environment or .env".to_string())
        })?;

        let mut site = SiteConfig::new(
            env::var("SITE_URL").unwrap_or_else(|_| "https://vikayblog.com".to_string()),
        );
        if let Ok(image) = env::var("DEFAULT_OG_IMAGE") {
            site.default_image = image;
        }

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/blog_cms.db".to_string()),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            storage: StorageConfig {
                media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "data/media".to_string()),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            auth: AuthConfig {
                jwt_secret,
                issuer: env::var("JWT_ISSUER").ok(),
                audience: env::var("JWT_AUDIENCE").ok(),
            },
            site,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
