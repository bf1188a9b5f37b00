//! SQLite-backed reference pose catalog.
//!
//! Reference poses are stored as JSON snapshots with a normalized search
//! column, so lookups by name fragment are instant and offline.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::PoseCoachError;
use crate::scorer::types::PoseSnapshot;

use super::types::{PoseMatch, ReferencePose, ReferencePoseFile};

/// SQLite-backed catalog of reference poses with fuzzy search.
pub struct ReferenceCatalog {
    conn: Connection,
}

impl ReferenceCatalog {
    /// Open or create the catalog database.
    pub fn new(db_path: &Path) -> Result<Self, PoseCoachError> {
        let conn = Connection::open(db_path)
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to open catalog database: {}", e)))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reference_poses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL,
                athlete TEXT,
                snapshot_json TEXT NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                search_text TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_poses_search ON reference_poses(search_text);
            CREATE INDEX IF NOT EXISTS idx_poses_category ON reference_poses(category);",
        )
        .map_err(|e| PoseCoachError::Catalog(format!("Failed to create catalog tables: {}", e)))?;

        Ok(Self { conn })
    }

    /// Insert or replace a reference pose by name. Returns its row id.
    pub fn add(
        &self,
        name: &str,
        category: &str,
        athlete: Option<&str>,
        snapshot: &PoseSnapshot,
        source: &str,
    ) -> Result<i64, PoseCoachError> {
        let snapshot_json = serde_json::to_string(snapshot)
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to serialize snapshot: {}", e)))?;
        let search_text = format!(
            "{} {} {}",
            name.to_lowercase(),
            category.to_lowercase(),
            athlete.unwrap_or_default().to_lowercase()
        )
        .replace('_', " ")
        .trim()
        .to_string();

        self.conn
            .execute(
                "INSERT INTO reference_poses (name, category, athlete, snapshot_json, source, created_at, search_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                     category = excluded.category,
                     athlete = excluded.athlete,
                     snapshot_json = excluded.snapshot_json,
                     source = excluded.source,
                     search_text = excluded.search_text",
                params![name, category, athlete, snapshot_json, source, Utc::now().to_rfc3339(), search_text],
            )
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to insert reference pose: {}", e)))?;

        let id: i64 = self
            .conn
            .query_row(
                "SELECT id FROM reference_poses WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to read back pose id: {}", e)))?;
        Ok(id)
    }

    /// Look up a reference pose by row id.
    pub fn get(&self, id: i64) -> Result<Option<ReferencePose>, PoseCoachError> {
        self.lookup(
            "SELECT id, name, category, athlete, snapshot_json, source, created_at
             FROM reference_poses WHERE id = ?1",
            params![id],
        )
    }

    /// Look up a reference pose by exact name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<ReferencePose>, PoseCoachError> {
        self.lookup(
            "SELECT id, name, category, athlete, snapshot_json, source, created_at
             FROM reference_poses WHERE name = ?1",
            params![name],
        )
    }

    fn lookup(
        &self,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> Result<Option<ReferencePose>, PoseCoachError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to prepare lookup: {}", e)))?;

        let mut rows = stmt
            .query_map(bind, row_to_pose)
            .map_err(|e| PoseCoachError::Catalog(format!("Pose lookup failed: {}", e)))?;

        match rows.next() {
            Some(Ok(pose)) => Ok(Some(pose)),
            Some(Err(e)) => Err(PoseCoachError::Catalog(format!("Pose lookup failed: {}", e))),
            None => Ok(None),
        }
    }

    /// List all reference poses, optionally filtered by category.
    pub fn list(&self, category: Option<&str>) -> Result<Vec<ReferencePose>, PoseCoachError> {
        let (sql, bind): (&str, Vec<&str>) = match category {
            Some(c) => (
                "SELECT id, name, category, athlete, snapshot_json, source, created_at
                 FROM reference_poses WHERE category = ?1 ORDER BY name",
                vec![c],
            ),
            None => (
                "SELECT id, name, category, athlete, snapshot_json, source, created_at
                 FROM reference_poses ORDER BY name",
                vec![],
            ),
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to prepare list: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(bind), row_to_pose)
            .map_err(|e| PoseCoachError::Catalog(format!("List query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| PoseCoachError::Catalog(format!("List query failed: {}", e)))
    }

    /// Number of stored reference poses.
    pub fn count(&self) -> Result<usize, PoseCoachError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reference_poses", [], |row| row.get(0))
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to count catalog: {}", e)))?;
        Ok(count as usize)
    }

    /// Fuzzy search by name/category words. Returns matches sorted best first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<PoseMatch>, PoseCoachError> {
        let query_lower = query.trim().to_lowercase().replace('_', " ");
        if query_lower.is_empty() {
            return Ok(vec![]);
        }
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, category, athlete, snapshot_json, source, created_at, search_text
                 FROM reference_poses",
            )
            .map_err(|e| PoseCoachError::Catalog(format!("Failed to prepare search: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row_to_pose(row)?, row.get::<_, String>(7)?))
            })
            .map_err(|e| PoseCoachError::Catalog(format!("Search query failed: {}", e)))?;

        let mut matches: Vec<PoseMatch> = Vec::new();
        for row in rows {
            let (pose, search_text) = row
                .map_err(|e| PoseCoachError::Catalog(format!("Search query failed: {}", e)))?;
            let score = compute_match_score(&query_words, &search_text);
            if score > 0.0 {
                matches.push(PoseMatch { pose, score });
            }
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        Ok(matches)
    }

    /// Import all reference pose JSON files under a directory (recursive).
    /// Files that fail to parse are skipped with a warning. Returns the
    /// number of poses imported.
    pub fn import_dir(&self, dir: &Path) -> Result<usize, PoseCoachError> {
        let mut imported = 0;
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            let file: ReferencePoseFile = match serde_json::from_str(&content) {
                Ok(f) => f,
                Err(e) => {
                    warn!("Skipping invalid pose file {}: {}", path.display(), e);
                    continue;
                }
            };

            self.add(
                &file.name,
                &file.category,
                file.athlete.as_deref(),
                &file.snapshot,
                &path.display().to_string(),
            )?;
            imported += 1;
        }
        info!("Imported {} reference poses from {}", imported, dir.display());
        Ok(imported)
    }
}

/// Map a catalog row to a `ReferencePose`, deserializing the snapshot JSON.
fn row_to_pose(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReferencePose> {
    let snapshot_json: String = row.get(4)?;
    let snapshot: PoseSnapshot = serde_json::from_str(&snapshot_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ReferencePose {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        athlete: row.get(3)?,
        snapshot,
        source: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Score a query against a pose's search text. Word-level matching with
/// prefix and substring tiers; 0 means no usable match.
fn compute_match_score(query_words: &[&str], search_text: &str) -> f32 {
    if query_words.is_empty() {
        return 0.0;
    }

    let search_words: Vec<&str> = search_text.split_whitespace().collect();

    let mut total_score = 0.0;
    let mut all_matched = true;

    for qw in query_words {
        let word_score = if search_words.iter().any(|sw| sw == qw) {
            10.0
        } else if search_words.iter().any(|sw| sw.starts_with(qw)) {
            8.0
        } else if search_words.iter().any(|sw| sw.contains(qw)) {
            5.0
        } else {
            all_matched = false;
            0.0
        };
        total_score += word_score;
    }

    if total_score == 0.0 {
        return 0.0;
    }
    if !all_matched {
        total_score *= 0.3;
    }

    // Bonus for matching the pose name's first word
    if search_words
        .first()
        .is_some_and(|sw| sw.starts_with(query_words[0]))
    {
        total_score += 5.0;
    }

    total_score / query_words.len() as f32
}
