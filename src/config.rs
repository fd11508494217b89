use std::path::PathBuf;

use crate::draft::{DraftStore, FileDraftStore, MemoryDraftStore, NoopDraftStore};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "INTERNMATCH_API_URL";
pub const LOG_ENV: &str = "INTERNMATCH_LOG";

/// Process-wide settings, resolved once in `main` and handed to the parts
/// that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// `None` when the platform offers no per-user data directory.
    pub data_dir: Option<PathBuf>,
    pub persist: bool,
}

impl Config {
    pub fn new(base_url: Option<&str>, persist: bool) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            data_dir: default_data_dir(),
            persist,
        }
    }

    pub fn draft_store(&self) -> Box<dyn DraftStore> {
        match (&self.data_dir, self.persist) {
            (_, false) => Box::new(MemoryDraftStore::new()),
            (Some(dir), true) => Box::new(FileDraftStore::new(dir)),
            (None, true) => {
                tracing::warn!("no data directory available, draft will not be kept");
                Box::new(NoopDraftStore)
            }
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
            .join("internmatch.log")
    }
}

/// Trailing slashes are stripped; a missing or blank value falls back to the
/// local default.
pub fn normalize_base_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(url) if !url.trim_end_matches('/').is_empty() => {
            url.trim_end_matches('/').to_string()
        }
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "internmatch")
        .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
}
