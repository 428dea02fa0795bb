use crate::animation::Transition;
use crate::day_reset::ResetOutcome;
use crate::errors::AppError;
use crate::markdown::render_escaped;
use crate::models::{
    AckResponse, BrowseResponse, FolderCover, NavigateRequest, NoteRequest, ToggleResponse,
    WorkingResponse,
};
use crate::session::Session;
use crate::state::AppState;
use crate::storage::{daily_note_path, date_key, supportive_note_path};
use crate::ui::{folder_gradient, render_index};
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Local};
use std::{future::Future, sync::Arc};
use tokio::sync::MutexGuard;
use tracing::{error, info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config))
}

pub async fn get_folders(State(state): State<AppState>) -> Json<BrowseResponse> {
    let session = state.session.lock().await;
    Json(browse_response(&session, Vec::new()))
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<BrowseResponse>, AppError> {
    let mut session = idle_session(&state).await?;
    if session.navigate(payload.direction).is_none() {
        return Err(AppError::bad_request("no folders to navigate"));
    }

    let transitions = vec![Transition::flip_folder(&state.config.animations, payload.direction)];
    session.begin_transitions(&transitions);
    let snapshot = session.snapshot();
    let response = browse_response(&session, transitions);
    drop(session);

    state.save_snapshot(&snapshot).await;
    Ok(Json(response))
}

pub async fn open_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
) -> Result<Json<WorkingResponse>, AppError> {
    let now = Local::now();
    let mut session = idle_session(&state).await?;
    state.flush_note(&session, &now).await;
    if !session.open_folder_by_id(&folder_id) {
        error!(folder = %folder_id, "folder not found");
        return Err(AppError::not_found(format!("folder '{folder_id}' not found")));
    }

    let day = state.load_day(&folder_id, session.working_date(&now)).await;
    session.load_day(day.note, day.tasks, day.supportive_note);

    let mut transitions = vec![Transition::open_folder(&state.config.animations, &folder_id)];
    if session.needs_day_reset(&now) {
        if let Some(outcome) = apply_reset(&state, &mut session, now).await {
            push_flash(&state, &outcome, &mut transitions);
        }
    }
    if session.current_tasks.is_empty() {
        session.current_tasks = state.defaults.starter_tasks_for(&folder_id);
    }
    session.supportive_content = state.defaults.supportive_content.clone();
    transitions.push(Transition::section_reveal(&state.config.animations));

    session.begin_transitions(&transitions);
    let snapshot = session.snapshot();
    let response = working_response(&state, &session, &now, transitions)?;
    drop(session);

    state.save_snapshot(&snapshot).await;
    info!(folder = %folder_id, "folder opened");
    Ok(Json(response))
}

pub async fn get_working(State(state): State<AppState>) -> Result<Json<WorkingResponse>, AppError> {
    let now = Local::now();
    let session = state.session.lock().await;
    Ok(Json(working_response(&state, &session, &now, Vec::new())?))
}

pub async fn close_folder(State(state): State<AppState>) -> Result<Json<BrowseResponse>, AppError> {
    let now = Local::now();
    let mut session = idle_session(&state).await?;
    let folder_id = open_folder_id(&session)?;

    state.flush_note(&session, &now).await;
    session.close_folder();

    let transitions = vec![Transition::close_folder(&state.config.animations)];
    session.begin_transitions(&transitions);
    let snapshot = session.snapshot();
    let response = browse_response(&session, transitions);
    drop(session);

    state.save_snapshot(&snapshot).await;
    info!(folder = %folder_id, "folder closed");
    Ok(Json(response))
}

pub async fn reset_day(State(state): State<AppState>) -> Result<Json<WorkingResponse>, AppError> {
    let now = Local::now();
    let mut session = idle_session(&state).await?;
    let folder_id = open_folder_id(&session)?;

    state.flush_note(&session, &now).await;

    let mut transitions = vec![Transition::page_tear(&state.config.animations)];
    if let Some(outcome) = apply_reset(&state, &mut session, now).await {
        push_flash(&state, &outcome, &mut transitions);
    }

    session.begin_transitions(&transitions);
    let snapshot = session.snapshot();
    let response = working_response(&state, &session, &now, transitions)?;
    drop(session);

    state.save_snapshot(&snapshot).await;
    info!(folder = %folder_id, "manual day reset");
    Ok(Json(response))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let now = Local::now();
    let mut session = state.session.lock().await;
    let folder_id = open_folder_id(&session)?;

    let Some(task) = session.toggle_task(&task_id) else {
        warn!(task = %task_id, "toggle for unknown task ignored");
        return Ok(Json(ToggleResponse {
            task: None,
            transitions: Vec::new(),
        }));
    };

    let date = session.working_date(&now);
    let tasks = session.current_tasks.clone();
    // Taken before the session is released so writes land in toggle order.
    let write_slot = Arc::clone(&state.task_writes).lock_owned().await;
    drop(session);

    let writer = state.clone();
    persist_in_background("task list", async move {
        let saved = writer.save_tasks(&folder_id, date, &tasks).await;
        drop(write_slot);
        saved
    });

    let transitions = if task.completed {
        vec![Transition::task_complete(&state.config.animations, &task.id)]
    } else {
        Vec::new()
    };
    Ok(Json(ToggleResponse {
        task: Some(task),
        transitions,
    }))
}

pub async fn clear_incomplete(State(state): State<AppState>) -> Json<AckResponse> {
    state.session.lock().await.clear_incomplete_tasks();
    Json(AckResponse { ok: true })
}

pub async fn update_note(
    State(state): State<AppState>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<AckResponse>, AppError> {
    let now = Local::now();
    let mut session = state.session.lock().await;
    let folder_id = open_folder_id(&session)?;
    let date = session.working_date(&now);
    session.set_day_note(payload.text.clone());

    // Scheduled under the session lock so writers register in edit order.
    let writer = state.clone();
    state
        .autosave
        .schedule(async move {
            if writer.save_note(&folder_id, date, &payload.text).await {
                info!(folder = %folder_id, "note autosaved");
            }
        })
        .await;
    drop(session);
    Ok(Json(AckResponse { ok: true }))
}

pub async fn animation_complete(State(state): State<AppState>) -> Json<AckResponse> {
    state.session.lock().await.finish_animation();
    Json(AckResponse { ok: true })
}

async fn idle_session(state: &AppState) -> Result<MutexGuard<'_, Session>, AppError> {
    let session = state.session.lock().await;
    if session.is_animating {
        return Err(AppError::animating());
    }
    Ok(session)
}

fn open_folder_id(session: &Session) -> Result<String, AppError> {
    session
        .open_folder
        .as_ref()
        .map(|folder| folder.id.clone())
        .ok_or_else(|| AppError::not_found("no folder is open"))
}

/// Runs the reset on `session` and prepares the fresh day around it.
async fn apply_reset(
    state: &AppState,
    session: &mut Session,
    now: DateTime<Local>,
) -> Option<ResetOutcome> {
    let previous_date = session.day_reset.last_reset.map(|last| last.date_naive());
    let outcome = session.perform_day_reset(now)?;
    let folder_id = session.open_folder.as_ref()?.id.clone();
    let date = session.working_date(&now);

    session.supportive_note = state
        .storage
        .read(&supportive_note_path(&folder_id, date))
        .await
        .unwrap_or_default();
    session.current_tasks = state.defaults.starter_tasks_for(&folder_id);

    // A second reset on the same date must not bring the old note back.
    if previous_date == Some(date) {
        state.storage.write(&daily_note_path(&folder_id, date), "").await;
    }
    state.save_tasks(&folder_id, date, &session.current_tasks).await;

    info!(
        folder = %folder_id,
        carried = outcome.incomplete_tasks.len(),
        dropped = outcome.completed_dropped,
        "day reset"
    );
    Some(outcome)
}

fn push_flash(state: &AppState, outcome: &ResetOutcome, transitions: &mut Vec<Transition>) {
    if !outcome.incomplete_tasks.is_empty() {
        transitions.push(Transition::incomplete_flash(
            &state.config.animations,
            outcome.incomplete_tasks.len(),
        ));
    }
}

fn persist_in_background<F>(what: &'static str, write: F)
where
    F: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        if !write.await {
            warn!("failed to persist {what}");
        }
    });
}

fn browse_response(session: &Session, transitions: Vec<Transition>) -> BrowseResponse {
    let total = session.folders.len();
    let counter = if total == 0 {
        "0 / 0".to_string()
    } else {
        format!("{} / {}", session.current_folder_index + 1, total)
    };
    let folders = session
        .folders
        .iter()
        .enumerate()
        .map(|(index, folder)| FolderCover {
            id: folder.id.clone(),
            title: folder.title.clone(),
            description: folder.description.clone(),
            gradient: folder_gradient(&folder.color, index),
        })
        .collect();

    BrowseResponse {
        view: session.view,
        current_index: session.current_folder_index,
        counter,
        folders,
        transitions,
    }
}

fn working_response(
    state: &AppState,
    session: &Session,
    now: &DateTime<Local>,
    transitions: Vec<Transition>,
) -> Result<WorkingResponse, AppError> {
    let folder = session
        .open_folder
        .clone()
        .ok_or_else(|| AppError::not_found("no folder is open"))?;

    let daily_note = if session.supportive_note.is_empty() {
        &state.defaults.daily_note
    } else {
        &session.supportive_note
    };
    let supportive = if session.supportive_content.is_empty() {
        &state.defaults.supportive_content
    } else {
        &session.supportive_content
    };
    let incomplete_tasks = if session.day_reset.showing_incomplete_tasks {
        session.day_reset.incomplete_tasks.clone()
    } else {
        Vec::new()
    };

    Ok(WorkingResponse {
        view: session.view,
        gradient: folder_gradient(&folder.color, session.current_folder_index),
        date: date_key(session.working_date(now)),
        note: session.current_day_note.clone(),
        tasks: session.current_tasks.clone(),
        daily_note_html: render_escaped(daily_note),
        supportive_html: render_escaped(supportive),
        incomplete_tasks,
        transitions,
        folder,
    })
}
