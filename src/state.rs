use crate::autosave::Autosave;
use crate::config::{Config, StorageMode, MAX_FOLDERS};
use crate::defaults::DefaultData;
use crate::models::{Folder, Task};
use crate::session::{Session, SessionSnapshot};
use crate::storage::{
    daily_note_path, supportive_note_path, tasks_path, Storage, FOLDER_CONFIG_KEY, SESSION_KEY,
};
use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub defaults: Arc<DefaultData>,
    pub session: Arc<Mutex<Session>>,
    pub autosave: Arc<Autosave>,
    pub task_writes: Arc<Mutex<()>>,
}

/// One day's stored content for a folder.
#[derive(Debug, Default)]
pub struct DayContent {
    pub note: String,
    pub tasks: Vec<Task>,
    pub supportive_note: String,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Storage,
        defaults: DefaultData,
        snapshot: SessionSnapshot,
    ) -> Self {
        let session = Session::restore(defaults.folders.clone(), snapshot);
        let autosave = Autosave::new(config.autosave_delay);
        Self {
            config: Arc::new(config),
            storage,
            defaults: Arc::new(defaults),
            session: Arc::new(Mutex::new(session)),
            autosave: Arc::new(autosave),
            task_writes: Arc::new(Mutex::new(())),
        }
    }

    /// Builds the state from configuration: picks the backend, resolves
    /// folders and restores the last session snapshot.
    pub async fn load(config: Config) -> Self {
        let storage = match config.storage_mode {
            StorageMode::Directory => Storage::directory(&config.data_dir),
            StorageMode::Local => Storage::local(config.local_store_path()).await,
        };
        info!("using {}", storage.describe());

        let defaults = if config.demo {
            DefaultData::demo()
        } else {
            DefaultData::with_folders(load_folders(&storage).await)
        };
        let snapshot = storage
            .read_json::<SessionSnapshot>(SESSION_KEY)
            .await
            .unwrap_or_default();

        info!(folders = defaults.folders.len(), demo = config.demo, "day timer ready");
        Self::new(config, storage, defaults, snapshot)
    }

    pub async fn load_day(&self, folder_id: &str, date: NaiveDate) -> DayContent {
        let note = self
            .storage
            .read(&daily_note_path(folder_id, date))
            .await
            .unwrap_or_default();
        let tasks = self
            .storage
            .read_json::<Vec<Task>>(&tasks_path(folder_id, date))
            .await
            .unwrap_or_default();
        let supportive_note = self
            .storage
            .read(&supportive_note_path(folder_id, date))
            .await
            .unwrap_or_default();
        DayContent {
            note,
            tasks,
            supportive_note,
        }
    }

    /// Empty notes are never written.
    pub async fn save_note(&self, folder_id: &str, date: NaiveDate, note: &str) -> bool {
        if note.is_empty() {
            return false;
        }
        self.storage.write(&daily_note_path(folder_id, date), note).await
    }

    /// Writes the open folder's note now, dropping any pending autosave.
    pub async fn flush_note(&self, session: &Session, now: &DateTime<Local>) -> bool {
        self.autosave.cancel().await;
        let Some(folder) = &session.open_folder else {
            return false;
        };
        self.save_note(&folder.id, session.working_date(now), &session.current_day_note)
            .await
    }

    pub async fn save_tasks(&self, folder_id: &str, date: NaiveDate, tasks: &[Task]) -> bool {
        self.storage.write_json(&tasks_path(folder_id, date), &tasks).await
    }

    pub async fn save_snapshot(&self, snapshot: &SessionSnapshot) -> bool {
        self.storage.write_json(SESSION_KEY, snapshot).await
    }
}

async fn load_folders(storage: &Storage) -> Vec<Folder> {
    let Some(mut folders) = storage.read_json::<Vec<Folder>>(FOLDER_CONFIG_KEY).await else {
        warn!("no folder configuration found in {FOLDER_CONFIG_KEY}");
        return Vec::new();
    };
    if folders.len() > MAX_FOLDERS {
        warn!(count = folders.len(), "folder configuration truncated to {MAX_FOLDERS}");
        folders.truncate(MAX_FOLDERS);
    }
    folders
}
