//! The assemblers behind the API: personalized feed, global listing and
//! subscription management, composed from the store, the predicate builder
//! and the pagination arithmetic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::db::{Article, Database};
use crate::error::Error;
use crate::pagination::PageRequest;
use crate::query::Predicate;

/// One window of matched articles plus the metadata a client needs to
/// render page controls. Request-scoped, never persisted.
#[derive(Debug)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub page: i64,
    pub limit: i64,
    pub total_articles: i64,
}

pub struct NewsService {
    db: Arc<Database>,
    query_timeout: Duration,
}

impl NewsService {
    pub fn new(db: Arc<Database>, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Bounds one store call. A call that outlives the budget surfaces as
    /// `Unavailable` so the request fails fast instead of hanging; retry
    /// policy is the caller's decision.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout(self.query_timeout, fut)
            .await
            .map_err(|_| Error::Unavailable("Store query timed out".to_string()))?
    }

    async fn resolve_user(&self, email: &str) -> Result<i64, Error> {
        if email.trim().is_empty() {
            return Err(Error::InvalidArgument("Email is required".to_string()));
        }
        self.bounded(self.db.user_id_by_email(email))
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// The personalized feed: every keyword the identity has subscribed,
    /// OR-matched against article titles, newest first.
    pub async fn personal_feed(
        &self,
        email: &str,
        request: PageRequest,
    ) -> Result<NewsPage, Error> {
        let user_id = self.resolve_user(email).await?;
        let keywords = self.bounded(self.db.list_subscriptions(user_id)).await?;
        if keywords.is_empty() {
            // An OR over zero keywords is not a query; "no subscriptions"
            // is its own outcome, distinct from "no matches".
            return Err(Error::NotFound("No keywords subscribed".to_string()));
        }

        let predicate = Predicate::TitleAnyKeyword(keywords);
        self.assemble(&predicate, request).await
    }

    /// The global listing: optional free-text title search AND optional
    /// exact source filter. An absent or empty filter is omitted outright,
    /// so no-filters compiles to an explicit match-all.
    pub async fn global_news(
        &self,
        search: Option<&str>,
        source: Option<&str>,
        request: PageRequest,
    ) -> Result<NewsPage, Error> {
        let mut predicate = Predicate::All;
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            predicate = predicate.and(Predicate::TitleAnyKeyword(vec![term.to_string()]));
        }
        if let Some(name) = source.map(str::trim).filter(|s| !s.is_empty()) {
            predicate = predicate.and(Predicate::SourceEquals(name.to_string()));
        }

        self.assemble(&predicate, request).await
    }

    /// Count plus windowed fetch from one predicate value. A page past the
    /// end of the result set yields an empty window, not an error; the
    /// fetch is skipped entirely in that case.
    async fn assemble(
        &self,
        predicate: &Predicate,
        request: PageRequest,
    ) -> Result<NewsPage, Error> {
        let total_articles = self.bounded(self.db.count_articles(predicate)).await?;

        let articles = if request.offset() < total_articles {
            self.bounded(
                self.db
                    .fetch_articles(predicate, request.limit, request.offset()),
            )
            .await?
        } else {
            Vec::new()
        };

        Ok(NewsPage {
            articles,
            page: request.page,
            limit: request.limit,
            total_articles,
        })
    }

    pub async fn subscribe(&self, email: &str, keyword: &str) -> Result<(), Error> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::InvalidArgument("Keyword is required".to_string()));
        }

        let user_id = self.resolve_user(email).await?;
        self.bounded(self.db.add_subscription(user_id, keyword))
            .await
    }

    pub async fn unsubscribe(&self, email: &str, keyword: &str) -> Result<(), Error> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::InvalidArgument("Keyword is required".to_string()));
        }

        let user_id = self.resolve_user(email).await?;
        let removed = self
            .bounded(self.db.remove_subscription(user_id, keyword))
            .await?;
        if !removed {
            debug!(email, keyword, "unsubscribe from a keyword that was never subscribed");
            return Err(Error::NotFound("Keyword not found".to_string()));
        }
        Ok(())
    }

    pub async fn subscriptions(&self, email: &str) -> Result<Vec<String>, Error> {
        let user_id = self.resolve_user(email).await?;
        self.bounded(self.db.list_subscriptions(user_id)).await
    }
}
