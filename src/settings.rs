use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Persisted timer preferences. Field names on disk keep the record readable
/// as plain camelCase JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(rename = "pomodoroTime")]
    pub pomodoro_minutes: u32,
    #[serde(rename = "shortBreakTime")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreakTime")]
    pub long_break_minutes: u32,
    #[serde(rename = "dailyGoal")]
    pub daily_goal_sessions: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            daily_goal_sessions: 4,
        }
    }
}

/// All-optional patch merged into the current settings by
/// [`SettingsState::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub pomodoro_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub daily_goal_sessions: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    /// Returns a copy with the patch fields applied over the current values.
    pub fn merged(&self, patch: SettingsPatch) -> Settings {
        Settings {
            pomodoro_minutes: patch.pomodoro_minutes.unwrap_or(self.pomodoro_minutes),
            short_break_minutes: patch.short_break_minutes.unwrap_or(self.short_break_minutes),
            long_break_minutes: patch.long_break_minutes.unwrap_or(self.long_break_minutes),
            daily_goal_sessions: patch.daily_goal_sessions.unwrap_or(self.daily_goal_sessions),
        }
    }
}

impl From<Settings> for SettingsPatch {
    fn from(s: Settings) -> Self {
        Self {
            pomodoro_minutes: Some(s.pomodoro_minutes),
            short_break_minutes: Some(s.short_break_minutes),
            long_break_minutes: Some(s.long_break_minutes),
            daily_goal_sessions: Some(s.daily_goal_sessions),
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: RefCell<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            saved: RefCell::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.saved.borrow().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        *self.saved.borrow_mut() = Some(*settings);
        Ok(())
    }
}

/// Owns the current settings plus the store they persist through. `update`
/// saves the merged record wholesale; callers re-derive anything computed
/// from it immediately after.
pub struct SettingsState {
    current: Settings,
    store: Box<dyn SettingsStore>,
}

impl SettingsState {
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let current = store.load();
        Self { current, store }
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    pub fn update(&mut self, patch: SettingsPatch) {
        self.current = self.current.merged(patch);
        // fire-and-forget write, same as every other persistence call
        let _ = self.store.save(&self.current);
    }

    /// Applies a patch to the in-memory settings without touching the store.
    /// Used for command-line overrides that should not outlive the run.
    pub fn apply_transient(&mut self, patch: SettingsPatch) {
        self.current = self.current.merged(patch);
    }
}
