use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};

use crate::error::Error;
use crate::query::Predicate;

/// A news article as served on the wire.
///
/// `id` is the recency tiebreak and stays out of the external
/// representation. Timestamps are RFC 3339 strings; lexicographic order on
/// `created_at` is chronological order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    #[serde(skip_serializing)]
    pub id: i64,
    pub title: String,
    pub link: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub source: String,
    pub created_at: String,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn initialize(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // UNIQUE(user_id, keyword) is what makes concurrent duplicate adds
        // collapse to a single row; the application never relies on a
        // check-then-insert to hold.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                keyword TEXT NOT NULL,
                UNIQUE(user_id, keyword)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                link TEXT NOT NULL UNIQUE,
                date TEXT,
                description TEXT,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_news_created_at
            ON news(created_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Provisions an identity if it does not exist yet and returns its id.
    /// The auth layer calls this on first successful login; it is safe to
    /// call repeatedly.
    pub async fn ensure_user(&self, email: &str) -> Result<i64, Error> {
        sqlx::query(
            r#"
            INSERT INTO users (email, created_at)
            VALUES (?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn user_id_by_email(&self, email: &str) -> Result<Option<i64>, Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Inserts a subscription row. A duplicate (user, keyword) pair trips
    /// the unique constraint and surfaces as `AlreadyExists`.
    pub async fn add_subscription(&self, user_id: i64, keyword: &str) -> Result<(), Error> {
        sqlx::query("INSERT INTO subscriptions (user_id, keyword) VALUES (?, ?)")
            .bind(user_id)
            .bind(keyword)
            .execute(&self.pool)
            .await
            .map_err(|err| match Error::from(err) {
                Error::AlreadyExists(_) => {
                    Error::AlreadyExists("Already subscribed to this keyword".to_string())
                }
                other => other,
            })?;
        Ok(())
    }

    /// Removes a subscription row; returns whether one existed.
    pub async fn remove_subscription(&self, user_id: i64, keyword: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND keyword = ?")
            .bind(user_id)
            .bind(keyword)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_subscriptions(&self, user_id: i64) -> Result<Vec<String>, Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT keyword FROM subscriptions WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(keyword,)| keyword).collect())
    }

    /// Appends an article to the corpus. Ingestion runs outside this
    /// service; re-ingesting a known link refreshes the mutable fields but
    /// keeps the original `created_at` so recency order never shifts.
    pub async fn insert_article(
        &self,
        title: &str,
        link: &str,
        date: Option<DateTime<Utc>>,
        description: Option<&str>,
        source: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO news (title, link, date, description, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(link) DO UPDATE SET
                title = excluded.title,
                date = excluded.date,
                description = excluded.description,
                source = excluded.source
            "#,
        )
        .bind(title)
        .bind(link)
        .bind(date.map(|d| d.to_rfc3339()))
        .bind(description)
        .bind(source)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts articles matching the predicate. Built from the same compiled
    /// clause as [`fetch_articles`], so count and fetch cannot drift apart.
    pub async fn count_articles(&self, predicate: &Predicate) -> Result<i64, Error> {
        let (clause, params) = predicate.to_sql();
        let sql = format!("SELECT COUNT(*) FROM news WHERE {clause}");

        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        for param in &params {
            query = query.bind(param);
        }
        let (count,) = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Fetches one window of matching articles, most recent first. Ties on
    /// `created_at` break on `id` so a fixed (page, limit) never shows an
    /// article twice or drops one across page boundaries.
    pub async fn fetch_articles(
        &self,
        predicate: &Predicate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>, Error> {
        let (clause, params) = predicate.to_sql();
        let sql = format!(
            r#"
            SELECT id, title, link, date, description, source, created_at
            FROM news
            WHERE {clause}
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        );

        let mut query = sqlx::query_as::<_, Article>(&sql);
        for param in &params {
            query = query.bind(param);
        }
        let articles = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }
}
