// Engines over the document store, blob store and site identity

pub mod analytics_service;
pub mod article_service;
pub mod comment_service;
pub mod engagement_service;
pub mod sitemap;
pub mod social_metadata;

pub use analytics_service::{
    ActivityPeriod, ActivityReport, AnalyticsService, AnalyticsSummary, ArticleAnalytics,
    EngagementCounters, TrendingArticle, DEFAULT_TRENDING_LIMIT,
};
pub use article_service::{
    ArticleDraft, ArticlePatch, ArticleService, ListArticles, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use comment_service::{CommentService, DEFAULT_COMMENT_LIMIT, MAX_COMMENT_LIMIT};
pub use engagement_service::{EngagementService, LikeOutcome};
pub use sitemap::{build_sitemap, render_sitemap};
pub use social_metadata::{build_share_payload, SharePayload};
