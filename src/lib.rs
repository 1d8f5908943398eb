//! Newsfeed - a keyword-subscription news service
//!
//! This crate serves a shared corpus of news articles over a small JSON API.
//! Users subscribe to keywords and get a personalized, paginated feed of
//! articles whose titles match any of their keywords; a global listing
//! supports free-text search and source filtering over the same corpus.

pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod service;
