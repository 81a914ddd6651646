use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Persisted preferences, one JSON record.
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Persisted focus analytics, one JSON record.
    pub fn analytics_path() -> PathBuf {
        Self::config_dir().join("analytics.json")
    }

    /// Completed-session history database under $HOME/.local/state/zendo
    pub fn history_db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("zendo");
            Some(state_dir.join("history.db"))
        } else {
            ProjectDirs::from("", "", "zendo")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("history.db"))
        }
    }

    fn config_dir() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "zendo") {
            proj_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }
}
