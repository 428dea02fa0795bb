use crate::animation::Transition;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESET_TIME: &str = "00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayResetType {
    #[default]
    Calendar,
    Time,
    Custom,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
    #[serde(default)]
    pub day_reset_type: DayResetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Browse,
    Working,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCover {
    pub id: String,
    pub title: String,
    pub description: String,
    pub gradient: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub view: View,
    pub current_index: usize,
    pub counter: String,
    pub folders: Vec<FolderCover>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingResponse {
    pub view: View,
    pub folder: Folder,
    pub gradient: String,
    pub date: String,
    pub note: String,
    pub tasks: Vec<Task>,
    pub daily_note_html: String,
    pub supportive_html: String,
    pub incomplete_tasks: Vec<Task>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub task: Option<Task>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_config_uses_camel_case_fields() {
        let raw = r##"[{"id":"f","title":"Fitness","description":"","color":"#4A7C59",
            "dayResetType":"time","resetTime":"06:00"}]"##;
        let folders: Vec<Folder> = serde_json::from_str(raw).unwrap();
        assert_eq!(folders[0].day_reset_type, DayResetType::Time);
        assert_eq!(folders[0].reset_time.as_deref(), Some("06:00"));
    }

    #[test]
    fn unrecognised_reset_type_parses_as_unknown() {
        let raw = r##"{"id":"f","title":"t","color":"#000000","dayResetType":"weekly"}"##;
        let folder: Folder = serde_json::from_str(raw).unwrap();
        assert_eq!(folder.day_reset_type, DayResetType::Unknown);
    }

    #[test]
    fn missing_reset_type_defaults_to_calendar() {
        let raw = r##"{"id":"f","title":"t","color":"#000000"}"##;
        let folder: Folder = serde_json::from_str(raw).unwrap();
        assert_eq!(folder.day_reset_type, DayResetType::Calendar);
        assert!(folder.reset_time.is_none());
    }
}
