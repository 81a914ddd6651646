use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Persisted focus totals. `total_focus_minutes` and `completed_sessions`
/// only ever grow; `today_focus_minutes` restarts on the first session of
/// each calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnalyticsRecord {
    #[serde(rename = "todayFocusTime")]
    pub today_focus_minutes: u32,
    #[serde(rename = "totalFocusTime")]
    pub total_focus_minutes: u32,
    #[serde(rename = "currentStreak")]
    pub current_streak_days: u32,
    #[serde(rename = "completedSessions")]
    pub completed_sessions: u32,
    #[serde(rename = "lastSessionDate")]
    pub last_session_date: Option<NaiveDate>,
}

pub trait AnalyticsStore {
    fn load(&self) -> AnalyticsRecord;
    fn save(&self, record: &AnalyticsRecord) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileAnalyticsStore {
    path: PathBuf,
}

impl FileAnalyticsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::analytics_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileAnalyticsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsStore for FileAnalyticsStore {
    fn load(&self) -> AnalyticsRecord {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(record) = serde_json::from_slice::<AnalyticsRecord>(&bytes) {
                return record;
            }
        }
        AnalyticsRecord::default()
    }

    fn save(&self, record: &AnalyticsRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(record).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryAnalyticsStore {
    saved: RefCell<Option<AnalyticsRecord>>,
}

impl MemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: AnalyticsRecord) -> Self {
        Self {
            saved: RefCell::new(Some(record)),
        }
    }
}

impl AnalyticsStore for MemoryAnalyticsStore {
    fn load(&self) -> AnalyticsRecord {
        self.saved.borrow().unwrap_or_default()
    }

    fn save(&self, record: &AnalyticsRecord) -> std::io::Result<()> {
        *self.saved.borrow_mut() = Some(*record);
        Ok(())
    }
}

/// Focus analytics: the current record plus the store it persists through.
/// Every mutation writes the full record back immediately.
pub struct Analytics {
    record: AnalyticsRecord,
    store: Box<dyn AnalyticsStore>,
}

impl Analytics {
    /// Loads the stored record, zeroing today's focus time when the last
    /// recorded session happened on an earlier day.
    pub fn load(store: Box<dyn AnalyticsStore>) -> Self {
        Self::load_at(store, Local::now().date_naive())
    }

    pub fn load_at(store: Box<dyn AnalyticsStore>, today: NaiveDate) -> Self {
        let mut record = store.load();
        if record.last_session_date != Some(today) {
            record.today_focus_minutes = 0;
        }
        Self { record, store }
    }

    pub fn record(&self) -> &AnalyticsRecord {
        &self.record
    }

    /// Credits one completed focus session of `duration_minutes`.
    pub fn record_session(&mut self, duration_minutes: u32) {
        self.record_session_at(Local::now().date_naive(), duration_minutes)
    }

    /// The streak increments on the first completed session of a calendar
    /// day and is left untouched for the rest of that day.
    // TODO: a missed day should probably break the streak; needs a gap check
    // against last_session_date before incrementing.
    pub fn record_session_at(&mut self, today: NaiveDate, duration_minutes: u32) {
        let is_new_day = self.record.last_session_date != Some(today);

        self.record.today_focus_minutes = if is_new_day {
            duration_minutes
        } else {
            self.record.today_focus_minutes + duration_minutes
        };
        self.record.total_focus_minutes += duration_minutes;
        self.record.completed_sessions += 1;
        if is_new_day {
            self.record.current_streak_days += 1;
        }
        self.record.last_session_date = Some(today);

        let _ = self.store.save(&self.record);
    }

    /// Percent of the daily goal reached, capped at 100. Counts lifetime
    /// completed sessions against the daily goal.
    pub fn today_progress_percent(&self, daily_goal: u32) -> f64 {
        ((self.record.completed_sessions as f64 / daily_goal as f64) * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn fresh() -> Analytics {
        Analytics::load_at(Box::new(MemoryAnalyticsStore::new()), day("2025-06-02"))
    }

    #[test]
    fn default_record_is_all_zero() {
        let record = AnalyticsRecord::default();
        assert_eq!(record.today_focus_minutes, 0);
        assert_eq!(record.total_focus_minutes, 0);
        assert_eq!(record.current_streak_days, 0);
        assert_eq!(record.completed_sessions, 0);
        assert_eq!(record.last_session_date, None);
    }

    #[test]
    fn first_session_of_a_day_replaces_todays_total() {
        let mut analytics = fresh();
        analytics.record_session_at(day("2025-06-02"), 25);

        let record = analytics.record();
        assert_eq!(record.today_focus_minutes, 25);
        assert_eq!(record.total_focus_minutes, 25);
        assert_eq!(record.completed_sessions, 1);
        assert_eq!(record.current_streak_days, 1);
        assert_eq!(record.last_session_date, Some(day("2025-06-02")));
    }

    #[test]
    fn same_day_sessions_accumulate() {
        let mut analytics = fresh();
        analytics.record_session_at(day("2025-06-02"), 10);
        analytics.record_session_at(day("2025-06-02"), 10);

        let record = analytics.record();
        assert_eq!(record.today_focus_minutes, 20);
        assert_eq!(record.total_focus_minutes, 20);
        assert_eq!(record.completed_sessions, 2);
        // streak only moved on the first session of the day
        assert_eq!(record.current_streak_days, 1);
    }

    #[test]
    fn new_day_resets_today_and_bumps_streak() {
        let mut analytics = fresh();
        analytics.record_session_at(day("2025-06-02"), 40);
        analytics.record_session_at(day("2025-06-03"), 25);

        let record = analytics.record();
        assert_eq!(record.today_focus_minutes, 25);
        assert_eq!(record.total_focus_minutes, 65);
        assert_eq!(record.completed_sessions, 2);
        assert_eq!(record.current_streak_days, 2);
        assert_eq!(record.last_session_date, Some(day("2025-06-03")));
    }

    #[test]
    fn streak_survives_a_gap_of_days() {
        // no decay on missed days: a session after a long gap still increments
        let mut analytics = fresh();
        analytics.record_session_at(day("2025-06-02"), 25);
        analytics.record_session_at(day("2025-06-30"), 25);
        assert_eq!(analytics.record().current_streak_days, 2);
    }

    #[test]
    fn every_session_persists_the_full_record() {
        let store = MemoryAnalyticsStore::new();
        let mut analytics = Analytics::load_at(Box::new(store), day("2025-06-02"));
        analytics.record_session_at(day("2025-06-02"), 25);

        let saved = analytics.store.load();
        assert_eq!(saved, *analytics.record());
        assert_eq!(saved.total_focus_minutes, 25);
    }

    #[test]
    fn load_resets_stale_today_total_only() {
        let stored = AnalyticsRecord {
            today_focus_minutes: 75,
            total_focus_minutes: 300,
            current_streak_days: 4,
            completed_sessions: 12,
            last_session_date: Some(day("2025-06-01")),
        };
        let store = MemoryAnalyticsStore::with_record(stored);
        let analytics = Analytics::load_at(Box::new(store), day("2025-06-02"));

        let record = analytics.record();
        assert_eq!(record.today_focus_minutes, 0);
        assert_eq!(record.total_focus_minutes, 300);
        assert_eq!(record.current_streak_days, 4);
        assert_eq!(record.completed_sessions, 12);
    }

    #[test]
    fn load_keeps_today_total_for_same_day() {
        let stored = AnalyticsRecord {
            today_focus_minutes: 50,
            total_focus_minutes: 100,
            current_streak_days: 2,
            completed_sessions: 4,
            last_session_date: Some(day("2025-06-02")),
        };
        let store = MemoryAnalyticsStore::with_record(stored);
        let analytics = Analytics::load_at(Box::new(store), day("2025-06-02"));
        assert_eq!(analytics.record().today_focus_minutes, 50);
    }

    #[test]
    fn progress_counts_lifetime_sessions_and_caps_at_100() {
        let mut analytics = fresh();
        assert_eq!(analytics.today_progress_percent(4), 0.0);

        analytics.record_session_at(day("2025-06-02"), 25);
        analytics.record_session_at(day("2025-06-02"), 25);
        assert_eq!(analytics.today_progress_percent(4), 50.0);

        for _ in 0..6 {
            analytics.record_session_at(day("2025-06-02"), 25);
        }
        // 8 lifetime sessions against a goal of 4 pins the bar at 100
        assert_eq!(analytics.today_progress_percent(4), 100.0);
    }

    #[test]
    fn progress_stays_within_bounds() {
        let mut analytics = fresh();
        for goal in 1..=12 {
            let pct = analytics.today_progress_percent(goal);
            assert!((0.0..=100.0).contains(&pct));
        }
        analytics.record_session_at(day("2025-06-02"), 25);
        for goal in 1..=12 {
            let pct = analytics.today_progress_percent(goal);
            assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analytics.json");
        let store = FileAnalyticsStore::with_path(&path);
        let record = AnalyticsRecord {
            today_focus_minutes: 25,
            total_focus_minutes: 150,
            current_streak_days: 3,
            completed_sessions: 6,
            last_session_date: Some(day("2025-06-02")),
        };
        store.save(&record).unwrap();
        assert_eq!(store.load(), record);
    }

    #[test]
    fn missing_or_malformed_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let missing = FileAnalyticsStore::with_path(dir.path().join("nope.json"));
        assert_eq!(missing.load(), AnalyticsRecord::default());

        let path = dir.path().join("analytics.json");
        std::fs::write(&path, b"[[[").unwrap();
        let malformed = FileAnalyticsStore::with_path(&path);
        assert_eq!(malformed.load(), AnalyticsRecord::default());
    }

    #[test]
    fn serialized_record_uses_wire_keys() {
        let value = serde_json::to_value(AnalyticsRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("todayFocusTime"));
        assert!(obj.contains_key("totalFocusTime"));
        assert!(obj.contains_key("currentStreak"));
        assert!(obj.contains_key("completedSessions"));
        assert!(obj.contains_key("lastSessionDate"));
    }

    #[test]
    fn total_is_at_least_today_when_last_session_is_today() {
        let mut analytics = fresh();
        for _ in 0..5 {
            analytics.record_session_at(day("2025-06-02"), 25);
            let record = analytics.record();
            assert!(record.total_focus_minutes >= record.today_focus_minutes);
        }
    }
}
