use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "wordmix";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the session record lives.
    pub fn session_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("session.json")
        } else {
            PathBuf::from("wordmix_session.json")
        }
    }

    /// Log file; kept out of the terminal the UI draws on.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("wordmix.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("wordmix.log"))
        }
    }
}
