use crate::models::MoodEntry;
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Key under which the entry array lives inside the data file.
pub const STORAGE_KEY: &str = "mf_mood_entries_v1";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedLog {
    #[serde(rename = "mf_mood_entries_v1", default)]
    entries: Vec<MoodEntry>,
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/state.json")
}

/// Append-only, newest-first log of check-ins backed by a JSON file.
///
/// Reads never fail: a missing or unreadable file is an empty log. Writes go
/// through a temp file and a rename so a reader sees either the old log or the
/// new one.
#[derive(Clone)]
pub struct EntryStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl EntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_all(&self) -> Vec<MoodEntry> {
        load_entries(&self.path).await
    }

    /// Prepends `entry` and persists the log. Storage faults are logged and
    /// the write is dropped.
    pub async fn append(&self, entry: MoodEntry) {
        let _guard = self.write_lock.lock().await;
        let mut entries = load_entries(&self.path).await;
        entries.insert(0, entry);

        if let Err(err) = persist_entries(&self.path, entries).await {
            error!("failed to persist entries: {err}");
        } else {
            debug!(path = %self.path.display(), "entry appended");
        }
    }

    /// Removes the whole log. Callers must have confirmation from the user.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

async fn load_entries(path: &Path) -> Vec<MoodEntry> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<PersistedLog>(&bytes) {
            Ok(log) => log.entries,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Vec::new()
        }
    }
}

async fn persist_entries(path: &Path, entries: Vec<MoodEntry>) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(&PersistedLog { entries })?;
    let tmp = tmp_path(path);
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORAGE_KEY.into());
    name.push(".tmp");
    path.with_file_name(name)
}
