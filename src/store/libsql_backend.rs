//! libSQL backend — async `SessionStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{SessionRecord, SessionStore};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    // Try RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // SQLite datetime() output, with or without fractional seconds
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| DatabaseError::Serialization(format!("session timestamp '{s}': {e}")))
}

/// Map a libsql Row to a SessionRecord.
///
/// Column order matches SESSION_COLUMNS:
/// 0:id, 1:step, 2:answers, 3:scores, 4:timestamp
fn row_to_session(row: &libsql::Row) -> Result<SessionRecord, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("session id: {e}")))?;
    let step: i64 = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("session step: {e}")))?;
    let answers_str: String = row
        .get(2)
        .map_err(|e| DatabaseError::Serialization(format!("session answers: {e}")))?;
    let scores_str: String = row
        .get(3)
        .map_err(|e| DatabaseError::Serialization(format!("session scores: {e}")))?;
    let timestamp_str: String = row
        .get(4)
        .map_err(|e| DatabaseError::Serialization(format!("session timestamp: {e}")))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("session id '{id_str}': {e}")))?;
    let answers: BTreeMap<String, String> = serde_json::from_str(&answers_str)
        .map_err(|e| DatabaseError::Serialization(format!("session answers: {e}")))?;
    let scores: BTreeMap<String, i64> = serde_json::from_str(&scores_str)
        .map_err(|e| DatabaseError::Serialization(format!("session scores: {e}")))?;

    Ok(SessionRecord {
        id,
        step,
        answers,
        scores,
        timestamp: parse_datetime(&timestamp_str)?,
    })
}

/// Serialized column values for a session upsert.
struct SessionRow {
    id: String,
    step: i64,
    answers: String,
    scores: String,
    timestamp: String,
}

impl SessionRow {
    fn from_record(record: &SessionRecord) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: record.id.to_string(),
            step: record.step,
            answers: serde_json::to_string(&record.answers)
                .map_err(|e| DatabaseError::Serialization(e.to_string()))?,
            scores: serde_json::to_string(&record.scores)
                .map_err(|e| DatabaseError::Serialization(e.to_string()))?,
            timestamp: record.timestamp.to_rfc3339(),
        })
    }
}

async fn upsert_session(conn: &Connection, row: SessionRow) -> Result<(), DatabaseError> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO quiz_sessions (id, step, answers, scores, timestamp, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (id) DO UPDATE SET
            step = ?2, answers = ?3, scores = ?4, timestamp = ?5, updated_at = ?6",
        params![row.id, row.step, row.answers, row.scores, row.timestamp, now],
    )
    .await
    .map_err(|e| DatabaseError::Query(format!("save_session: {e}")))?;
    Ok(())
}

// ── Trait implementation ────────────────────────────────────────────

const SESSION_COLUMNS: &str = "id, step, answers, scores, timestamp";

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn load_session(&self) -> Result<Option<SessionRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM quiz_sessions
                     ORDER BY updated_at DESC LIMIT 2"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("load_session: {e}")))?;

        let first = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("load_session: {e}")))?;
        let Some(row) = first else {
            return Ok(None);
        };
        let record = row_to_session(&row)?;

        if let Ok(Some(_)) = rows.next().await {
            warn!(session_id = %record.id, "More than one stored session; using the most recent");
        }

        debug!(session_id = %record.id, step = record.step, "Session loaded");
        Ok(Some(record))
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), DatabaseError> {
        upsert_session(self.conn(), SessionRow::from_record(record)?).await?;
        debug!(session_id = %record.id, step = record.step, "Session saved");
        Ok(())
    }

    async fn clear_sessions(&self) -> Result<usize, DatabaseError> {
        let count = self
            .conn()
            .execute("DELETE FROM quiz_sessions", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("clear_sessions: {e}")))?;
        Ok(count as usize)
    }

    async fn replace_session(&self, record: &SessionRecord) -> Result<(), DatabaseError> {
        let row = SessionRow::from_record(record)?;
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| DatabaseError::Query(format!("replace_session begin: {e}")))?;

        let removed = tx
            .execute("DELETE FROM quiz_sessions", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("replace_session delete: {e}")))?;
        upsert_session(&tx, row).await?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Query(format!("replace_session commit: {e}")))?;

        debug!(session_id = %record.id, removed, "Session replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn make_record(step: i64) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            step,
            answers: BTreeMap::from([("weekend".to_string(), "B".to_string())]),
            scores: BTreeMap::from([
                ("fantasy".to_string(), 0),
                ("motivation".to_string(), 0),
                ("healing".to_string(), 1),
                ("dark".to_string(), 0),
            ]),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let db = test_db().await;
        assert!(db.load_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_and_load() {
        let db = test_db().await;
        let record = make_record(2);
        db.save_session(&record).await.unwrap();

        let loaded = db.load_session().await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.step, 2);
        assert_eq!(loaded.answers, record.answers);
        assert_eq!(loaded.scores, record.scores);
        assert_eq!(loaded.timestamp.timestamp(), record.timestamp.timestamp());
    }

    #[tokio::test]
    async fn save_overwrites_same_id() {
        let db = test_db().await;
        let mut record = make_record(2);
        db.save_session(&record).await.unwrap();

        record.step = 3;
        record.answers.insert("mood".into(), "A".into());
        db.save_session(&record).await.unwrap();

        let loaded = db.load_session().await.unwrap().unwrap();
        assert_eq!(loaded.step, 3);
        assert_eq!(loaded.answers.len(), 2);
        assert_eq!(db.clear_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_sessions_removes_everything() {
        let db = test_db().await;
        db.save_session(&make_record(1)).await.unwrap();
        db.save_session(&make_record(2)).await.unwrap();

        assert_eq!(db.clear_sessions().await.unwrap(), 2);
        assert!(db.load_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_leaves_exactly_one_session() {
        let db = test_db().await;
        db.save_session(&make_record(3)).await.unwrap();
        db.save_session(&make_record(4)).await.unwrap();

        let fresh = make_record(0);
        db.replace_session(&fresh).await.unwrap();

        let loaded = db.load_session().await.unwrap().unwrap();
        assert_eq!(loaded.id, fresh.id);
        assert_eq!(db.clear_sessions().await.unwrap(), 1);
    }

    /// Insert a raw row, bypassing `SessionRow` serialization.
    async fn insert_raw(db: &LibSqlBackend, answers: &str, scores: &str, timestamp: &str) {
        db.conn()
            .execute(
                "INSERT INTO quiz_sessions (id, step, answers, scores, timestamp, updated_at)
                 VALUES (?1, 1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    answers,
                    scores,
                    timestamp,
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn malformed_json_is_a_serialization_error() {
        let db = test_db().await;
        insert_raw(&db, "not json", "{}", &Utc::now().to_rfc3339()).await;

        let err = db.load_session().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Serialization(_)));
    }

    #[tokio::test]
    async fn bad_timestamp_is_a_serialization_error() {
        let db = test_db().await;
        insert_raw(&db, "{}", "{}", "last tuesday").await;

        let err = db.load_session().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Serialization(ref m) if m.contains("last tuesday")));
    }

    #[tokio::test]
    async fn non_text_json_column_is_a_serialization_error() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO quiz_sessions (id, step, answers, scores, timestamp, updated_at)
                 VALUES (?1, 1, '{}', 42, ?2, ?2)",
                params![Uuid::new_v4().to_string(), Utc::now().to_rfc3339()],
            )
            .await
            .unwrap();

        let err = db.load_session().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Serialization(ref m) if m.contains("scores")));
    }

    #[test]
    fn parse_datetime_accepts_sqlite_format() {
        let dt = parse_datetime("2026-01-02 03:04:05").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        assert!(parse_datetime("2026-01-02T03:04:05.5+07:00").is_ok());
        assert!(parse_datetime("").is_err());
    }

    #[tokio::test]
    async fn local_file_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/movie-dna.db");
        let record = make_record(2);

        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.save_session(&record).await.unwrap();
        }

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let loaded = db.load_session().await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
    }
}
