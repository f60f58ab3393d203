#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use blog_cms::{
    app_state::AppState,
    config::{AuthConfig, SiteConfig, DEFAULT_MAX_UPLOAD_BYTES},
    infrastructure::{
        security::Claims, DocumentStore, JwtIdentityVerifier, LocalBlobStore, SqliteDocumentStore,
    },
    routes::create_blog_router,
};

pub const SECRET: &str = "integration-secret";
pub const SITE_URL: &str = "https://blog.test";
const BOUNDARY: &str = "blog-cms-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn DocumentStore>,
    _media: TempDir,
}

pub async fn test_app() -> TestApp {
    test_app_with_upload_limit(DEFAULT_MAX_UPLOAD_BYTES).await
}

pub async fn test_app_with_upload_limit(max_upload_bytes: usize) -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let store: Arc<dyn DocumentStore> =
        Arc::new(SqliteDocumentStore::new_in_memory().await.unwrap());
    let blobs = Arc::new(LocalBlobStore::new(media.path(), "http://localhost:3000"));
    let verifier = Arc::new(JwtIdentityVerifier::new(&AuthConfig {
        jwt_secret: SECRET.to_string(),
        issuer: None,
        audience: None,
    }));

    let state = AppState::with_collaborators(SiteConfig::new(SITE_URL), store.clone(), blobs, verifier)
        .with_upload_limit(max_upload_bytes);
    TestApp {
        router: create_blog_router(state),
        store,
        _media: media,
    }
}

pub fn token_for(principal: &str) -> String {
    let claims = Claims {
        sub: principal.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
        iat: None,
        iss: None,
        aud: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

/// A multipart body of text fields plus an optional `(field, file name, bytes)` file part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> Reply {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec();
    Reply { status, headers, body }
}

pub async fn api(
    router: &Router,
    method: &str,
    uri: &str,
    principal: Option<&str>,
    body: Option<serde_json::Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(principal) = principal {
        builder = builder.header("authorization", format!("Bearer {}", token_for(principal)));
    }
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    send(router, builder.body(body).unwrap()).await
}

pub async fn form(
    router: &Router,
    method: &str,
    uri: &str,
    principal: Option<&str>,
    body: Vec<u8>,
) -> Reply {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY));
    if let Some(principal) = principal {
        builder = builder.header("authorization", format!("Bearer {}", token_for(principal)));
    }
    send(router, builder.body(Body::from(body)).unwrap()).await
}

pub async fn create_article(router: &Router, author: &str, title: &str) -> serde_json::Value {
    let reply = form(
        router,
        "POST",
        "/articles",
        Some(author),
        multipart_body(&[("title", title), ("content", "Some content"), ("tags", "rust, web")], None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
    reply.json()
}
