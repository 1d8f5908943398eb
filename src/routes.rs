use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::Article;
use crate::error::Error;
use crate::pagination::PageRequest;
use crate::service::NewsService;

pub struct AppState {
    pub service: NewsService,
    pub default_limit: i64,
    pub max_limit: i64,
}

/// Page and limit arrive as free text from the query string; anything that
/// does not parse as an integer is treated as absent, which the pagination
/// layer turns into page 1 / the default limit.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.parse().ok()))
}

#[derive(Deserialize)]
pub struct FeedParams {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct NewsParams {
    pub search: Option<String>,
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SubscriptionsParams {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct SubscriptionBody {
    pub email: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub success: bool,
    pub page: i64,
    pub limit: i64,
    pub news: Vec<Article>,
    #[serde(rename = "totalArticles")]
    pub total_articles: i64,
}

#[derive(Serialize)]
pub struct NewsResponse {
    pub page: i64,
    pub limit: i64,
    pub news: Vec<Article>,
    #[serde(rename = "totalArticles")]
    pub total_articles: i64,
}

#[derive(Serialize)]
pub struct KeywordsResponse {
    pub success: bool,
    pub keywords: Vec<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn required_email(email: Option<&str>) -> Result<&str, Error> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::InvalidArgument("Email is required".to_string()))
}

fn required_pair(body: &SubscriptionBody) -> Result<(&str, &str), Error> {
    let email = body.email.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let keyword = body.keyword.as_deref().map(str::trim).filter(|v| !v.is_empty());
    match (email, keyword) {
        (Some(email), Some(keyword)) => Ok((email, keyword)),
        _ => Err(Error::InvalidArgument("Please enter all fields".to_string())),
    }
}

// Route handlers

pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, Error> {
    let email = required_email(params.email.as_deref())?;
    let request = PageRequest::new(
        params.page,
        params.limit,
        state.default_limit,
        state.max_limit,
    );

    let page = state.service.personal_feed(email, request).await?;
    Ok(Json(FeedResponse {
        success: true,
        page: page.page,
        limit: page.limit,
        news: page.articles,
        total_articles: page.total_articles,
    }))
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, Error> {
    let request = PageRequest::new(
        params.page,
        params.limit,
        state.default_limit,
        state.max_limit,
    );

    let page = state
        .service
        .global_news(params.search.as_deref(), params.source.as_deref(), request)
        .await?;
    Ok(Json(NewsResponse {
        page: page.page,
        limit: page.limit,
        news: page.articles,
        total_articles: page.total_articles,
    }))
}

pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubscriptionsParams>,
) -> Result<Json<KeywordsResponse>, Error> {
    let email = required_email(params.email.as_deref())?;
    let keywords = state.service.subscriptions(email).await?;
    Ok(Json(KeywordsResponse {
        success: true,
        keywords,
    }))
}

pub async fn add_subscription(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscriptionBody>,
) -> Result<Json<MessageResponse>, Error> {
    let (email, keyword) = required_pair(&body)?;
    state.service.subscribe(email, keyword).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Keyword subscribed successfully".to_string(),
    }))
}

pub async fn remove_subscription(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscriptionBody>,
) -> Result<Json<MessageResponse>, Error> {
    let (email, keyword) = required_pair(&body)?;
    state.service.unsubscribe(email, keyword).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Keyword unsubscribed successfully".to_string(),
    }))
}

pub async fn health() -> &'static str {
    "OK"
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/feed", get(feed))
        .route("/api/news", get(news))
        .route(
            "/api/subscriptions",
            get(list_subscriptions)
                .post(add_subscription)
                .delete(remove_subscription),
        )
        .route("/health", get(health))
        .with_state(state)
}
