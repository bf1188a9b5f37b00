//! SQLite store for scoring session history.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::PoseCoachError;
use crate::scorer::types::ComparisonResult;

use super::types::{SessionDetail, SessionSummary};

/// SQLite store for past comparison results.
/// All operations are synchronous (rusqlite is blocking).
/// Callers in async contexts should use `tokio::task::spawn_blocking`.
pub struct SessionHistory {
    conn: Connection,
}

impl SessionHistory {
    /// Create or open the history database.
    pub fn new(db_path: &Path) -> Result<Self, PoseCoachError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PoseCoachError::History(format!("Failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| PoseCoachError::History(format!("Failed to open history db: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS scoring_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reference_name TEXT NOT NULL,
                category TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                total_score REAL NOT NULL,
                result_json TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| PoseCoachError::History(format!("Failed to create table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_reference
             ON scoring_sessions(reference_name)",
            [],
        )
        .map_err(|e| PoseCoachError::History(format!("Failed to create reference index: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_created
             ON scoring_sessions(created_at DESC)",
            [],
        )
        .map_err(|e| PoseCoachError::History(format!("Failed to create date index: {}", e)))?;

        info!("Opened session history database at {:?}", db_path);
        Ok(Self { conn })
    }

    /// Record a comparison result. Returns the session ID.
    pub fn record(
        &self,
        reference_name: &str,
        category: Option<&str>,
        result: &ComparisonResult,
    ) -> Result<i64, PoseCoachError> {
        let result_json = serde_json::to_string(result)
            .map_err(|e| PoseCoachError::History(format!("Failed to serialize result: {}", e)))?;

        self.conn
            .execute(
                "INSERT INTO scoring_sessions (reference_name, category, total_score, result_json)
                 VALUES (?1, ?2, ?3, ?4)",
                params![reference_name, category, result.total_score, result_json],
            )
            .map_err(|e| PoseCoachError::History(format!("Failed to insert session: {}", e)))?;

        let id = self.conn.last_insert_rowid();
        info!(
            "Recorded session {} against reference '{}' (total {:.1})",
            id, reference_name, result.total_score
        );
        Ok(id)
    }

    /// List sessions newest first, optionally filtered by reference name.
    pub fn list(&self, reference_name: Option<&str>) -> Result<Vec<SessionSummary>, PoseCoachError> {
        let (sql, bind): (&str, Vec<&str>) = match reference_name {
            Some(name) => (
                "SELECT id, reference_name, created_at, total_score
                 FROM scoring_sessions WHERE reference_name = ?1
                 ORDER BY created_at DESC, id DESC",
                vec![name],
            ),
            None => (
                "SELECT id, reference_name, created_at, total_score
                 FROM scoring_sessions ORDER BY created_at DESC, id DESC",
                vec![],
            ),
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| PoseCoachError::History(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(bind), |row| {
                Ok(SessionSummary {
                    id: row.get(0)?,
                    reference_name: row.get(1)?,
                    created_at: row.get(2)?,
                    total_score: row.get(3)?,
                })
            })
            .map_err(|e| PoseCoachError::History(format!("Failed to query sessions: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| PoseCoachError::History(format!("Failed to collect sessions: {}", e)))
    }

    /// Get full details of a session, including the stored result.
    pub fn get(&self, session_id: i64) -> Result<SessionDetail, PoseCoachError> {
        self.conn
            .query_row(
                "SELECT id, reference_name, category, created_at, result_json
                 FROM scoring_sessions WHERE id = ?1",
                params![session_id],
                |row| {
                    let result_json: String = row.get(4)?;
                    let result: ComparisonResult =
                        serde_json::from_str(&result_json).map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                4,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?;
                    Ok(SessionDetail {
                        id: row.get(0)?,
                        reference_name: row.get(1)?,
                        category: row.get(2)?,
                        created_at: row.get(3)?,
                        result,
                    })
                },
            )
            .map_err(|e| PoseCoachError::History(format!("Session not found: {}", e)))
    }
}
