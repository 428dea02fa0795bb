//! Descriptions of the visual transitions the browser plays after a state
//! change. State is already final when a transition is returned; the page
//! only sequences the visuals and acknowledges blocking ones through
//! `POST /api/animation/complete`.

use crate::models::Direction;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTimings {
    pub folder_open_ms: u64,
    pub folder_close_ms: u64,
    pub folder_flip_ms: u64,
    pub page_tear_ms: u64,
    pub task_complete_ms: u64,
    pub incomplete_flash_ms: u64,
    pub section_reveal_ms: u64,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            folder_open_ms: 1200,
            folder_close_ms: 800,
            folder_flip_ms: 800,
            page_tear_ms: 600,
            task_complete_ms: 400,
            incomplete_flash_ms: 2000,
            section_reveal_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TransitionKind {
    OpenFolder { folder_id: String },
    CloseFolder,
    FlipFolder { direction: Direction },
    PageTear,
    SectionReveal,
    TaskComplete { task_id: String },
    IncompleteFlash { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(flatten)]
    pub kind: TransitionKind,
    pub duration_ms: u64,
    /// Blocking transitions hold the animation guard until acknowledged.
    pub blocking: bool,
}

impl Transition {
    pub fn open_folder(timings: &AnimationTimings, folder_id: &str) -> Self {
        Self::blocking(
            TransitionKind::OpenFolder {
                folder_id: folder_id.to_string(),
            },
            timings.folder_open_ms,
        )
    }

    pub fn close_folder(timings: &AnimationTimings) -> Self {
        Self::blocking(TransitionKind::CloseFolder, timings.folder_close_ms)
    }

    pub fn flip_folder(timings: &AnimationTimings, direction: Direction) -> Self {
        Self::blocking(TransitionKind::FlipFolder { direction }, timings.folder_flip_ms)
    }

    pub fn page_tear(timings: &AnimationTimings) -> Self {
        Self::blocking(TransitionKind::PageTear, timings.page_tear_ms)
    }

    pub fn section_reveal(timings: &AnimationTimings) -> Self {
        Self::cosmetic(TransitionKind::SectionReveal, timings.section_reveal_ms)
    }

    pub fn task_complete(timings: &AnimationTimings, task_id: &str) -> Self {
        Self::cosmetic(
            TransitionKind::TaskComplete {
                task_id: task_id.to_string(),
            },
            timings.task_complete_ms,
        )
    }

    pub fn incomplete_flash(timings: &AnimationTimings, count: usize) -> Self {
        Self::cosmetic(TransitionKind::IncompleteFlash { count }, timings.incomplete_flash_ms)
    }

    fn blocking(kind: TransitionKind, duration_ms: u64) -> Self {
        Self {
            kind,
            duration_ms,
            blocking: true,
        }
    }

    fn cosmetic(kind: TransitionKind, duration_ms: u64) -> Self {
        Self {
            kind,
            duration_ms,
            blocking: false,
        }
    }
}

pub fn any_blocking(transitions: &[Transition]) -> bool {
    transitions.iter().any(|t| t.blocking)
}
