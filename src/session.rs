//! The application state the view layer reads and mutates.
//!
//! `Session` holds no I/O: callers load and persist content around its
//! transitions, and every transition completes inside a single `&mut self`
//! call so no half-applied state is observable.

use crate::animation::{any_blocking, Transition};
use crate::day_reset::{DayResetState, ResetOutcome};
use crate::models::{Direction, Folder, Task, View};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The part of a session that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub current_folder_index: usize,
    #[serde(default)]
    pub last_resets: BTreeMap<String, DateTime<Local>>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub view: View,
    pub folders: Vec<Folder>,
    pub current_folder_index: usize,
    pub open_folder: Option<Folder>,
    pub current_day_note: String,
    pub current_tasks: Vec<Task>,
    pub supportive_note: String,
    pub supportive_content: String,
    pub day_reset: DayResetState,
    pub last_resets: BTreeMap<String, DateTime<Local>>,
    pub is_animating: bool,
}

impl Session {
    pub fn new(folders: Vec<Folder>) -> Self {
        Self {
            view: View::Browse,
            folders,
            current_folder_index: 0,
            open_folder: None,
            current_day_note: String::new(),
            current_tasks: Vec::new(),
            supportive_note: String::new(),
            supportive_content: String::new(),
            day_reset: DayResetState::default(),
            last_resets: BTreeMap::new(),
            is_animating: false,
        }
    }

    pub fn restore(folders: Vec<Folder>, snapshot: SessionSnapshot) -> Self {
        let mut session = Self::new(folders);
        session.set_current_folder_index(snapshot.current_folder_index);
        session.last_resets = snapshot.last_resets;
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_folder_index: self.current_folder_index,
            last_resets: self.last_resets.clone(),
        }
    }

    pub fn current_folder(&self) -> Option<&Folder> {
        self.folders.get(self.current_folder_index)
    }

    /// Out-of-range indices are ignored.
    pub fn set_current_folder_index(&mut self, index: usize) {
        if index < self.folders.len() {
            self.current_folder_index = index;
        }
    }

    /// Moves the carousel one step, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) -> Option<usize> {
        let count = self.folders.len();
        if count == 0 {
            return None;
        }
        let index = match direction {
            Direction::Next => (self.current_folder_index + 1) % count,
            Direction::Prev => (self.current_folder_index + count - 1) % count,
        };
        self.set_current_folder_index(index);
        Some(index)
    }

    pub fn open_folder_by_id(&mut self, folder_id: &str) -> bool {
        let Some((index, folder)) = self
            .folders
            .iter()
            .enumerate()
            .find(|(_, folder)| folder.id == folder_id)
        else {
            return false;
        };

        let folder = folder.clone();
        self.current_folder_index = index;
        self.day_reset = DayResetState::new(self.last_resets.get(&folder.id).cloned());
        self.open_folder = Some(folder);
        self.view = View::Working;
        true
    }

    pub fn close_folder(&mut self) {
        self.open_folder = None;
        self.view = View::Browse;
        self.current_day_note.clear();
        self.current_tasks.clear();
        self.supportive_note.clear();
        self.supportive_content.clear();
        self.day_reset.clear_incomplete();
    }

    /// Date the open folder's note and task list belong to: the day of the
    /// last reset, or `now`'s date before the first one.
    pub fn working_date(&self, now: &DateTime<Local>) -> NaiveDate {
        self.day_reset
            .last_reset
            .as_ref()
            .map(|last| last.date_naive())
            .unwrap_or_else(|| now.date_naive())
    }

    pub fn load_day(&mut self, note: String, tasks: Vec<Task>, supportive_note: String) {
        self.current_day_note = note;
        self.current_tasks = tasks;
        self.supportive_note = supportive_note;
    }

    pub fn needs_day_reset(&self, now: &DateTime<Local>) -> bool {
        match &self.open_folder {
            Some(folder) => self.day_reset.needs_reset(folder, now),
            None => false,
        }
    }

    /// Archives unfinished tasks and clears the note and task list.
    /// Returns `None` when no folder is open.
    pub fn perform_day_reset(&mut self, now: DateTime<Local>) -> Option<ResetOutcome> {
        let folder_id = self.open_folder.as_ref()?.id.clone();
        let tasks = std::mem::take(&mut self.current_tasks);
        self.current_day_note.clear();
        let outcome = self.day_reset.perform_reset(tasks, now);
        self.last_resets.insert(folder_id, outcome.reset_at);
        Some(outcome)
    }

    pub fn clear_incomplete_tasks(&mut self) {
        self.day_reset.clear_incomplete();
    }

    /// Flips completion on the matching task and returns its new value.
    /// Unknown ids leave the list untouched.
    pub fn toggle_task(&mut self, task_id: &str) -> Option<Task> {
        let task = self.current_tasks.iter_mut().find(|task| task.id == task_id)?;
        task.completed = !task.completed;
        Some(task.clone())
    }

    pub fn set_day_note(&mut self, text: String) {
        self.current_day_note = text;
    }

    /// Engages the animation guard if any of `transitions` blocks.
    pub fn begin_transitions(&mut self, transitions: &[Transition]) {
        if any_blocking(transitions) {
            self.is_animating = true;
        }
    }

    pub fn finish_animation(&mut self) {
        self.is_animating = false;
    }
}
