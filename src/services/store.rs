//! Context store — named project snapshots plus the auto-saved live state.
//!
//! DESIGN
//! ======
//! Two JSON documents in the data directory: `contexts.json` holds the
//! capped list of named snapshots (newest first), `live_state.json` holds
//! the single most-recent working state used for one-step revert. Every
//! write serializes the whole document; every read is defensive, so a
//! missing file or corrupt JSON degrades to "no saved state" with a log
//! line rather than an error to the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::warn;
use uuid::Uuid;

use super::workspace::{ChatMessage, FileNode, contains_node, now_ms};

/// Snapshot list cap; the oldest entry is evicted past this.
pub const MAX_CONTEXTS: usize = 10;

/// Live-state chat history cap, bounding storage growth.
pub const MAX_LIVE_CHAT_MESSAGES: usize = 50;

const CONTEXTS_FILE: &str = "contexts.json";
const LIVE_STATE_FILE: &str = "live_state.json";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The active file id points at no node in the submitted tree.
    #[error("active file id {0} does not reference a project node")]
    InvalidActiveFile(Uuid),

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named, timestamped snapshot of the project for later restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub id: Uuid,
    pub name: String,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub files: Vec<FileNode>,
    pub active_file_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The auto-persisted working state: files plus recent chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveState {
    pub id: Uuid,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub files: Vec<FileNode>,
    pub active_file_id: Option<Uuid>,
    pub chat_messages: Vec<ChatMessage>,
}

/// Metadata edit applied to an existing snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// STORE
// =============================================================================

/// Handle to the on-disk store. Clone-cheap; all clones share one lock so
/// read-modify-write cycles on the snapshot list stay atomic.
#[derive(Clone)]
pub struct ContextStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl ContextStore {
    /// Open the store, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the directory cannot be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, lock: Arc::new(Mutex::new(())) })
    }

    // ------------------------------------------------------------------
    // Named snapshots
    // ------------------------------------------------------------------

    /// Create a snapshot, prepend it, evict past the cap, persist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidActiveFile`] for a dangling active id,
    /// or an io/encode error if persisting fails.
    pub fn save(
        &self,
        files: Vec<FileNode>,
        active_file_id: Option<Uuid>,
        name: Option<&str>,
    ) -> Result<ProjectContext, StoreError> {
        validate_active_file(&files, active_file_id)?;

        let _guard = self.guard();
        let mut contexts = self.read_contexts();

        let context = ProjectContext {
            id: Uuid::new_v4(),
            name: name
                .map(str::to_owned)
                .unwrap_or_else(|| format!("Saved Context {}", format_timestamp(now_ms()))),
            timestamp: now_ms(),
            files,
            active_file_id,
            description: None,
        };

        contexts.insert(0, context.clone());
        contexts.truncate(MAX_CONTEXTS);
        self.write_json(CONTEXTS_FILE, &contexts)?;

        Ok(context)
    }

    /// All snapshots, most recent first. Fails soft to an empty list.
    #[must_use]
    pub fn list(&self) -> Vec<ProjectContext> {
        let _guard = self.guard();
        self.read_contexts()
    }

    #[must_use]
    pub fn get_by_id(&self, id: Uuid) -> Option<ProjectContext> {
        let _guard = self.guard();
        self.read_contexts().into_iter().find(|ctx| ctx.id == id)
    }

    /// Remove a snapshot by id; returns whether a removal occurred.
    ///
    /// # Errors
    ///
    /// Returns an io/encode error if persisting the shortened list fails.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut contexts = self.read_contexts();
        let before = contexts.len();
        contexts.retain(|ctx| ctx.id != id);
        if contexts.len() == before {
            return Ok(false);
        }
        self.write_json(CONTEXTS_FILE, &contexts)?;
        Ok(true)
    }

    /// Edit a snapshot's name/description in place; returns whether the id
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns an io/encode error if persisting fails.
    pub fn update(&self, id: Uuid, update: &ContextUpdate) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut contexts = self.read_contexts();
        let Some(context) = contexts.iter_mut().find(|ctx| ctx.id == id) else {
            return Ok(false);
        };
        if let Some(name) = &update.name {
            context.name.clone_from(name);
        }
        if let Some(description) = &update.description {
            context.description = Some(description.clone());
        }
        self.write_json(CONTEXTS_FILE, &contexts)?;
        Ok(true)
    }

    /// Remove the entire snapshot list.
    ///
    /// # Errors
    ///
    /// Returns an io error if the file exists but cannot be removed.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.guard();
        match fs::remove_file(self.dir.join(CONTEXTS_FILE)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Live state
    // ------------------------------------------------------------------

    /// Persist the single live-state record, truncating chat history to the
    /// most recent [`MAX_LIVE_CHAT_MESSAGES`] entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidActiveFile`] for a dangling active id,
    /// or an io/encode error if persisting fails.
    pub fn save_live_state(
        &self,
        files: Vec<FileNode>,
        active_file_id: Option<Uuid>,
        mut chat_messages: Vec<ChatMessage>,
    ) -> Result<LiveState, StoreError> {
        validate_active_file(&files, active_file_id)?;

        if chat_messages.len() > MAX_LIVE_CHAT_MESSAGES {
            chat_messages.drain(..chat_messages.len() - MAX_LIVE_CHAT_MESSAGES);
        }

        let state = LiveState {
            id: Uuid::new_v4(),
            timestamp: now_ms(),
            files,
            active_file_id,
            chat_messages,
        };

        let _guard = self.guard();
        self.write_json(LIVE_STATE_FILE, &state)?;
        Ok(state)
    }

    /// The last persisted live state, or `None` (logged) when absent or
    /// unreadable.
    #[must_use]
    pub fn get_live_state(&self) -> Option<LiveState> {
        let _guard = self.guard();
        self.read_json(LIVE_STATE_FILE)
    }

    // ------------------------------------------------------------------
    // Persistence plumbing
    // ------------------------------------------------------------------

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn read_contexts(&self) -> Vec<ProjectContext> {
        self.read_json(CONTEXTS_FILE).unwrap_or_default()
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(file, error = %e, "store: read failed, treating as no saved state");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(file, error = %e, "store: corrupt record, treating as no saved state");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(value)?;
        fs::write(self.dir.join(file), serialized)?;
        Ok(())
    }
}

fn validate_active_file(files: &[FileNode], active_file_id: Option<Uuid>) -> Result<(), StoreError> {
    match active_file_id {
        Some(id) if !contains_node(files, id) => Err(StoreError::InvalidActiveFile(id)),
        _ => Ok(()),
    }
}

fn format_timestamp(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    OffsetDateTime::from_unix_timestamp(ms / 1000)
        .ok()
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
