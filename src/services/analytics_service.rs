// AnalyticsService - summary, trending and activity over a full scan of articles.
// No index and no cache: cost grows linearly with the number of articles.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::{
    entities::{article_path, articles_collection, timestamp, Article},
    error::{AppError, AppResult},
    infrastructure::DocumentStore,
};

pub const DEFAULT_TRENDING_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl ActivityPeriod {
    pub fn lookback(&self) -> Duration {
        match self {
            ActivityPeriod::Day => Duration::days(1),
            ActivityPeriod::Week => Duration::days(7),
            ActivityPeriod::Month => Duration::days(30),
            ActivityPeriod::Year => Duration::days(365),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityPeriod::Day => "day",
            ActivityPeriod::Week => "week",
            ActivityPeriod::Month => "month",
            ActivityPeriod::Year => "year",
        }
    }
}

impl FromStr for ActivityPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ActivityPeriod::Day),
            "week" => Ok(ActivityPeriod::Week),
            "month" => Ok(ActivityPeriod::Month),
            "year" => Ok(ActivityPeriod::Year),
            _ => Err(AppError::BadRequest(
                "Invalid period. Use day, week, month, or year.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_articles: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingArticle {
    pub id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub score: f64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementCounters {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

impl From<&Article> for EngagementCounters {
    fn from(article: &Article) -> Self {
        Self {
            likes: article.likes_count,
            comments: article.comments_count,
            shares: article.shares_count,
            views: article.views,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub period: String,
    pub labels: Vec<String>,
    pub datasets: Vec<EngagementCounters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleAnalytics {
    pub id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

pub fn summarize(articles: &[Article]) -> AnalyticsSummary {
    articles
        .iter()
        .fold(AnalyticsSummary::default(), |mut acc, article| {
            acc.total_articles += 1;
            acc.total_views += article.views;
            acc.total_likes += article.likes_count;
            acc.total_comments += article.comments_count;
            acc.total_shares += article.shares_count;
            acc
        })
}

/// Highest score first; equal scores keep scan order.
pub fn rank_trending(articles: &[Article], limit: usize) -> Vec<TrendingArticle> {
    let mut ranking: Vec<TrendingArticle> = articles
        .iter()
        .map(|article| TrendingArticle {
            id: article.id.clone(),
            title: article.title.clone(),
            thumbnail_url: article.thumbnail_url.clone(),
            score: article.trending_score(),
            likes: article.likes_count,
            comments: article.comments_count,
            shares: article.shares_count,
            views: article.views,
        })
        .collect();

    ranking.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranking.truncate(limit);
    ranking
}

/// Articles created within the period before `now`, in scan order.
pub fn activity_window(articles: &[Article], period: ActivityPeriod, now: DateTime<Utc>) -> ActivityReport {
    let start = now - period.lookback();
    let (labels, datasets) = articles
        .iter()
        .filter(|article| article.created_at >= start)
        .map(|article| (article.title.clone(), EngagementCounters::from(article)))
        .unzip();

    ActivityReport {
        period: period.as_str().to_string(),
        labels,
        datasets,
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn DocumentStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn scan_articles(&self) -> AppResult<Vec<Article>> {
        let documents = self.store.scan(&articles_collection()).await?;
        debug!("Analytics scan over {} articles", documents.len());
        documents.iter().map(Article::from_document).collect()
    }

    pub async fn summary(&self) -> AppResult<AnalyticsSummary> {
        Ok(summarize(&self.scan_articles().await?))
    }

    pub async fn trending(&self, limit: usize) -> AppResult<Vec<TrendingArticle>> {
        Ok(rank_trending(&self.scan_articles().await?, limit))
    }

    pub async fn activity(&self, period: ActivityPeriod) -> AppResult<ActivityReport> {
        Ok(activity_window(&self.scan_articles().await?, period, Utc::now()))
    }

    pub async fn detail(&self, slug: &str) -> AppResult<ArticleAnalytics> {
        let document = self
            .store
            .get(&article_path(slug))
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
        let article = Article::from_document(&document)?;

        Ok(ArticleAnalytics {
            id: article.id,
            title: article.title,
            views: article.views,
            likes: article.likes_count,
            comments: article.comments_count,
            shares: article.shares_count,
            created_at: article.created_at,
            updated_at: article.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: &str, likes: u64, comments: u64, shares: u64, views: u64) -> Article {
        Article {
            id: id.to_string(),
            title: id.to_uppercase(),
            likes_count: likes,
            comments_count: comments,
            shares_count: shares,
            views,
            ..Default::default()
        }
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("day".parse::<ActivityPeriod>().unwrap(), ActivityPeriod::Day);
        assert_eq!("year".parse::<ActivityPeriod>().unwrap().lookback(), Duration::days(365));
        assert!(matches!("fortnight".parse::<ActivityPeriod>(), Err(AppError::BadRequest(_))));
        assert!("Day".parse::<ActivityPeriod>().is_err());
    }

    #[test]
    fn test_summary_sums_every_counter() {
        let summary = summarize(&[article("a", 1, 2, 3, 4), article("b", 10, 20, 30, 40)]);
        assert_eq!(
            summary,
            AnalyticsSummary {
                total_articles: 2,
                total_views: 44,
                total_likes: 11,
                total_comments: 22,
                total_shares: 33,
            }
        );
    }

    #[test]
    fn test_comment_outranks_like() {
        let ranking = rank_trending(&[article("liked", 1, 0, 0, 0), article("commented", 0, 1, 0, 0)], 1);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].id, "commented");
        assert_eq!(ranking[0].score, 3.0);
    }

    #[test]
    fn test_ties_keep_scan_order() {
        let articles = vec![
            article("first", 0, 0, 1, 0),
            article("second", 2, 0, 0, 0),
            article("top", 0, 0, 0, 100),
            article("third", 0, 0, 0, 8),
        ];
        let ids: Vec<_> = rank_trending(&articles, 10).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_activity_day_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let mut recent = article("recent", 1, 2, 3, 4);
        recent.created_at = now - Duration::hours(23);
        let mut stale = article("stale", 0, 0, 0, 0);
        stale.created_at = now - Duration::hours(25);

        let report = activity_window(&[stale, recent], ActivityPeriod::Day, now);
        assert_eq!(report.period, "day");
        assert_eq!(report.labels, vec!["RECENT".to_string()]);
        assert_eq!(
            report.datasets,
            vec![EngagementCounters { likes: 1, comments: 2, shares: 3, views: 4 }]
        );
    }
}
