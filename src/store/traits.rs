//! `SessionStore` trait — the persistence interface the quiz core consumes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Persisted quiz session document.
///
/// Kept in its raw stored shape; `Session::from_record` is responsible for
/// validating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: Uuid,
    /// 0 = not started, 1..=N = answering question N, N+1 = complete.
    pub step: i64,
    /// Question key → choice symbol.
    pub answers: BTreeMap<String, String>,
    /// Category name → count.
    pub scores: BTreeMap<String, i64>,
    pub timestamp: DateTime<Utc>,
}

/// Backend-agnostic storage for the single global quiz session.
///
/// The store is expected to hold zero or one session document. Writes are
/// last-write-wins; there is no version check.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Load the current session, if any.
    async fn load_session(&self) -> Result<Option<SessionRecord>, DatabaseError>;

    /// Insert or replace a session document.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), DatabaseError>;

    /// Delete every stored session. Returns the number removed.
    async fn clear_sessions(&self) -> Result<usize, DatabaseError>;

    /// Delete every stored session and write `record`.
    ///
    /// Backends with transactions should override this so readers never see
    /// the empty store in between.
    async fn replace_session(&self, record: &SessionRecord) -> Result<(), DatabaseError> {
        self.clear_sessions().await?;
        self.save_session(record).await
    }
}
