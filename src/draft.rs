use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::ResumeDraft;

pub const DRAFT_KEY: &str = "resume-draft";

/// A single-slot cache for the in-progress resume. Failures never reach the
/// caller: a draft that cannot be read loads as empty, a draft that cannot be
/// written is dropped.
pub trait DraftStore: Send {
    fn load(&self) -> ResumeDraft;
    fn save(&self, draft: &ResumeDraft);
}

fn decode(raw: &str) -> ResumeDraft {
    match serde_json::from_str(raw) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(error = %e, "stored draft is unreadable, starting empty");
            ResumeDraft::default()
        }
    }
}

// --- File-backed store ---

pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", DRAFT_KEY)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> ResumeDraft {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw),
            Err(e) => {
                tracing::debug!(path = %self.path().display(), error = %e, "no stored draft");
                ResumeDraft::default()
            }
        }
    }

    fn save(&self, draft: &ResumeDraft) {
        let write = || -> anyhow::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, serde_json::to_vec(draft)?)?;
            Ok(())
        };
        if let Err(e) = write() {
            tracing::warn!(path = %self.path().display(), error = %e, "failed to save draft");
        }
    }
}

// --- In-memory store ---

#[derive(Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_raw(raw: &str) -> Self {
        Self {
            slot: Mutex::new(Some(raw.to_string())),
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> ResumeDraft {
        let slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        slot.as_deref().map(decode).unwrap_or_default()
    }

    fn save(&self, draft: &ResumeDraft) {
        match serde_json::to_string(draft) {
            Ok(raw) => {
                *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(raw);
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize draft"),
        }
    }
}

// --- No-op store ---

pub struct NoopDraftStore;

impl DraftStore for NoopDraftStore {
    fn load(&self) -> ResumeDraft {
        ResumeDraft::default()
    }

    fn save(&self, _draft: &ResumeDraft) {}
}
