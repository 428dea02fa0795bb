use crate::animation::AnimationTimings;
use crate::storage::LOCAL_STORE_FILE;
use std::{env, path::PathBuf, time::Duration};

pub const MAX_FOLDERS: usize = 10;
pub const DEFAULT_FOLDER_COLORS: [&str; 5] =
    ["#2E5C8A", "#C84630", "#F4B942", "#4A7C59", "#6B4E9E"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Directory,
    Local,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage_mode: StorageMode,
    pub demo: bool,
    pub autosave_delay: Duration,
    pub animations: AnimationTimings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            storage_mode: StorageMode::Directory,
            demo: true,
            autosave_delay: Duration::from_millis(2000),
            animations: AnimationTimings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let data_dir = lookup("DAY_TIMER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let storage_mode = match lookup("DAY_TIMER_STORAGE").as_deref().map(str::trim) {
            Some("local") => StorageMode::Local,
            _ => StorageMode::Directory,
        };
        let demo = lookup("DAY_TIMER_DEMO")
            .map(|value| parse_flag(&value))
            .unwrap_or(defaults.demo);
        let autosave_delay = lookup("DAY_TIMER_AUTOSAVE_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.autosave_delay);

        Self {
            port,
            data_dir,
            storage_mode,
            demo,
            autosave_delay,
            animations: defaults.animations,
        }
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_STORE_FILE)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
