use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// One completed session as stored in the history log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub label: String,
    pub minutes: u32,
    pub timestamp: DateTime<Local>,
}

/// Append-only log of completed sessions backed by SQLite. The app treats
/// it as optional: when it fails to open, the analytics panel simply omits
/// history.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Opens (or creates) the database at its default location.
    pub fn new() -> Result<Self> {
        let db_path =
            AppDirs::history_db_path().unwrap_or_else(|| PathBuf::from("zendo_history.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                minutes INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Appends one completed session.
    pub fn record(&self, label: &str, minutes: u32) -> Result<()> {
        self.record_at(label, minutes, Local::now())
    }

    pub fn record_at(&self, label: &str, minutes: u32, timestamp: DateTime<Local>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (label, minutes, timestamp) VALUES (?1, ?2, ?3)",
            params![label, minutes as i64, timestamp.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Latest `limit` sessions, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT label, minutes, timestamp
            FROM sessions
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let row_iter = stmt.query_map([limit as i64], |row| {
            let timestamp_str: String = row.get(2)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionRow {
                label: row.get(0)?,
                minutes: row.get::<_, i64>(1)? as u32,
                timestamp,
            })
        })?;

        let mut rows = Vec::new();
        for row in row_iter {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Total minutes per calendar day for the most recent `days` days with
    /// any activity, newest first. Day keys are ISO dates.
    pub fn minutes_by_day(&self, days: usize) -> Result<Vec<(String, u32)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT substr(timestamp, 1, 10) AS day, SUM(minutes) AS total
            FROM sessions
            GROUP BY day
            ORDER BY day DESC
            LIMIT ?1
            "#,
        )?;

        let day_iter = stmt.query_map([days as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u32))
        })?;

        let mut totals = Vec::new();
        for day in day_iter {
            totals.push(day?);
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, HistoryDb) {
        let dir = tempdir().unwrap();
        let db = HistoryDb::open(dir.path().join("history.db")).unwrap();
        (dir, db)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("state").join("deep").join("history.db");
        assert!(HistoryDb::open(&nested).is_ok());
        assert!(nested.exists());
    }

    #[test]
    fn recorded_sessions_come_back_newest_first() {
        let (_dir, db) = open_temp();
        db.record_at("focus", 25, at(2025, 6, 2, 9)).unwrap();
        db.record_at("focus", 50, at(2025, 6, 2, 11)).unwrap();
        db.record_at("focus", 15, at(2025, 6, 2, 10)).unwrap();

        let rows = db.recent(10).unwrap();
        let minutes: Vec<u32> = rows.iter().map(|r| r.minutes).collect();
        assert_eq!(minutes, [50, 15, 25]);
        assert_eq!(rows[0].label, "focus");
    }

    #[test]
    fn recent_honours_the_limit() {
        let (_dir, db) = open_temp();
        for hour in 8..14 {
            db.record_at("focus", 25, at(2025, 6, 2, hour)).unwrap();
        }
        assert_eq!(db.recent(3).unwrap().len(), 3);
        assert_eq!(db.recent(100).unwrap().len(), 6);
    }

    #[test]
    fn minutes_by_day_aggregates_per_calendar_day() {
        let (_dir, db) = open_temp();
        db.record_at("focus", 25, at(2025, 6, 1, 9)).unwrap();
        db.record_at("focus", 25, at(2025, 6, 1, 15)).unwrap();
        db.record_at("focus", 40, at(2025, 6, 2, 9)).unwrap();

        let totals = db.minutes_by_day(7).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0], ("2025-06-02".to_string(), 40));
        assert_eq!(totals[1], ("2025-06-01".to_string(), 50));
    }

    #[test]
    fn empty_database_reads_cleanly() {
        let (_dir, db) = open_temp();
        assert!(db.recent(5).unwrap().is_empty());
        assert!(db.minutes_by_day(5).unwrap().is_empty());
    }

    #[test]
    fn reopening_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let db = HistoryDb::open(&path).unwrap();
            db.record_at("focus", 25, at(2025, 6, 2, 9)).unwrap();
        }
        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.recent(5).unwrap().len(), 1);
    }
}
