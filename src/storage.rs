use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

pub const DAILY_NOTES_DIR: &str = "daily-notes";
pub const TASKS_DIR: &str = "tasks";
pub const FOLDER_CONFIG_KEY: &str = "config.json";
pub const SESSION_KEY: &str = "state.json";
pub const LOCAL_STORE_FILE: &str = "local-storage.json";
const LOCAL_KEY_PREFIX: &str = "vault:";

/// Text blob storage addressed by `/`-separated relative paths.
///
/// Failures are logged and reported as absence or `false`; nothing here
/// returns an error to the caller.
#[derive(Clone, Debug)]
pub enum Storage {
    Directory(DirectoryStore),
    Local(LocalStore),
}

impl Storage {
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self::Directory(DirectoryStore::new(root))
    }

    pub async fn local(file: impl Into<PathBuf>) -> Self {
        Self::Local(LocalStore::open(file).await)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Directory(store) => format!("directory {}", store.root.display()),
            Self::Local(store) => format!("local store {}", store.file.display()),
        }
    }

    pub async fn read(&self, path: &str) -> Option<String> {
        match self {
            Self::Directory(store) => store.read(path).await,
            Self::Local(store) => store.read(path).await,
        }
    }

    pub async fn write(&self, path: &str, text: &str) -> bool {
        match self {
            Self::Directory(store) => store.write(path, text).await,
            Self::Local(store) => store.write(path, text).await,
        }
    }

    /// Reads and parses a JSON blob; malformed content counts as absent.
    pub async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let text = self.read(path).await?;
        if text.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(path, "failed to parse json: {err}");
                None
            }
        }
    }

    pub async fn write_json<T: Serialize>(&self, path: &str, value: &T) -> bool {
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.write(path, &text).await,
            Err(err) => {
                error!(path, "failed to serialize json: {err}");
                false
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let clean = relative
            .components()
            .all(|part| matches!(part, Component::Normal(_)));
        if path.is_empty() || !clean {
            error!(path, "rejected storage path outside the vault");
            return None;
        }
        Some(self.root.join(relative))
    }

    async fn read(&self, path: &str) -> Option<String> {
        let full = self.resolve(path)?;
        match fs::read_to_string(&full).await {
            Ok(text) => Some(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "no such file");
                None
            }
            Err(err) => {
                error!(path, "failed to read file: {err}");
                None
            }
        }
    }

    async fn write(&self, path: &str, text: &str) -> bool {
        let Some(full) = self.resolve(path) else {
            return false;
        };
        if let Some(parent) = full.parent() {
            if let Err(err) = fs::create_dir_all(parent).await {
                error!(path, "failed to create directory: {err}");
                return false;
            }
        }
        match fs::write(&full, text).await {
            Ok(()) => true,
            Err(err) => {
                error!(path, "failed to write file: {err}");
                false
            }
        }
    }
}

/// Flat key-value store persisted as one JSON object on disk.
#[derive(Clone, Debug)]
pub struct LocalStore {
    file: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl LocalStore {
    pub async fn open(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let entries = load_entries(&file).await;
        Self {
            file,
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    async fn read(&self, path: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries.get(&local_key(path)).cloned()
    }

    async fn write(&self, path: &str, text: &str) -> bool {
        let mut entries = self.entries.lock().await;
        entries.insert(local_key(path), text.to_string());

        let payload = match serde_json::to_vec_pretty(&*entries) {
            Ok(payload) => payload,
            Err(err) => {
                error!(path, "failed to encode local store: {err}");
                return false;
            }
        };
        if let Some(parent) = self.file.parent() {
            if let Err(err) = fs::create_dir_all(parent).await {
                error!("failed to create local store directory: {err}");
                return false;
            }
        }
        match fs::write(&self.file, payload).await {
            Ok(()) => true,
            Err(err) => {
                error!(path, "failed to persist local store: {err}");
                false
            }
        }
    }
}

async fn load_entries(file: &Path) -> BTreeMap<String, String> {
    match fs::read(file).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse local store: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read local store: {err}");
            BTreeMap::new()
        }
    }
}

fn local_key(path: &str) -> String {
    format!("{LOCAL_KEY_PREFIX}{path}")
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn daily_note_path(folder_id: &str, date: NaiveDate) -> String {
    format!("{folder_id}/{}.md", date_key(date))
}

pub fn supportive_note_path(folder_id: &str, date: NaiveDate) -> String {
    format!("{folder_id}/{DAILY_NOTES_DIR}/{}.md", date_key(date))
}

pub fn tasks_path(folder_id: &str, date: NaiveDate) -> String {
    format!("{folder_id}/{TASKS_DIR}/{}.json", date_key(date))
}
