//! Day rollover decisions and the incomplete-task carryover lifecycle.
//!
//! All comparisons use the local wall clock of `now`: a "day" is a
//! calendar date in the timezone `now` is expressed in.

use crate::models::{DayResetType, Folder, Task, DEFAULT_RESET_TIME};
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tracing::warn;

/// Whether a new working day has begun for `folder` since `last_reset`.
pub fn needs_reset<Tz: TimeZone>(
    folder: &Folder,
    last_reset: Option<&DateTime<Tz>>,
    now: &DateTime<Tz>,
) -> bool {
    let Some(last_reset) = last_reset else {
        return true;
    };

    let today = now.date_naive();
    let last_day = last_reset.with_timezone(&now.timezone()).date_naive();

    match folder.day_reset_type {
        DayResetType::Calendar => today != last_day,
        DayResetType::Time => {
            let raw = folder.reset_time.as_deref().unwrap_or(DEFAULT_RESET_TIME);
            let Some(reset_time) = parse_reset_time(raw) else {
                warn!(folder = %folder.id, reset_time = raw, "unparseable reset time");
                return false;
            };
            let reset_at = today.and_time(reset_time);
            now.naive_local() >= reset_at && today != last_day
        }
        DayResetType::Custom | DayResetType::Unknown => false,
    }
}

pub fn parse_reset_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// Reset bookkeeping for the open folder.
///
/// `incomplete_tasks` is only non-empty while `showing_incomplete_tasks`
/// is set; both are cleared together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayResetState {
    pub last_reset: Option<DateTime<Local>>,
    pub incomplete_tasks: Vec<Task>,
    pub showing_incomplete_tasks: bool,
}

/// Outcome of [`DayResetState::perform_reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResetOutcome {
    pub incomplete_tasks: Vec<Task>,
    pub completed_dropped: usize,
    pub reset_at: DateTime<Local>,
}

impl DayResetState {
    pub fn new(last_reset: Option<DateTime<Local>>) -> Self {
        Self {
            last_reset,
            ..Self::default()
        }
    }

    pub fn needs_reset(&self, folder: &Folder, now: &DateTime<Local>) -> bool {
        needs_reset(folder, self.last_reset.as_ref(), now)
    }

    /// Archives the unfinished part of `current_tasks` and stamps `now` as
    /// the new reset instant. The caller clears its note and task list
    /// from the returned outcome in the same `&mut` borrow.
    pub fn perform_reset(
        &mut self,
        current_tasks: Vec<Task>,
        now: DateTime<Local>,
    ) -> ResetOutcome {
        let total = current_tasks.len();
        let incomplete: Vec<Task> = current_tasks
            .into_iter()
            .filter(|task| !task.completed)
            .collect();
        let completed_dropped = total - incomplete.len();

        self.showing_incomplete_tasks = true;
        self.incomplete_tasks = incomplete.clone();
        self.last_reset = Some(now);

        ResetOutcome {
            incomplete_tasks: incomplete,
            completed_dropped,
            reset_at: now,
        }
    }

    pub fn clear_incomplete(&mut self) {
        self.incomplete_tasks.clear();
        self.showing_incomplete_tasks = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder(kind: DayResetType, reset_time: Option<&str>) -> Folder {
        Folder {
            id: "goal".into(),
            title: "Goal".into(),
            description: String::new(),
            color: "#2E5C8A".into(),
            day_reset_type: kind,
            reset_time: reset_time.map(str::to_string),
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).earliest().unwrap()
    }

    fn tasks(flags: &[bool]) -> Vec<Task> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| Task {
                id: format!("t{i}"),
                text: format!("task {i}"),
                completed: *done,
            })
            .collect()
    }

    #[test]
    fn first_use_always_resets() {
        let now = at(2024, 1, 1, 12, 0);
        for kind in [
            DayResetType::Calendar,
            DayResetType::Time,
            DayResetType::Custom,
            DayResetType::Unknown,
        ] {
            assert!(needs_reset(&folder(kind, Some("06:00")), None, &now));
        }
    }

    #[test]
    fn calendar_policy_follows_date_change() {
        let f = folder(DayResetType::Calendar, None);
        let last = at(2024, 1, 1, 23, 0);
        assert!(needs_reset(&f, Some(&last), &at(2024, 1, 2, 0, 30)));
        assert!(!needs_reset(&f, Some(&last), &at(2024, 1, 1, 23, 59)));
    }

    #[test]
    fn time_policy_waits_for_reset_time_on_a_new_day() {
        let f = folder(DayResetType::Time, Some("06:00"));
        let last = at(2024, 1, 1, 5, 0);
        assert!(needs_reset(&f, Some(&last), &at(2024, 1, 2, 6, 30)));
        assert!(!needs_reset(&f, Some(&last), &at(2024, 1, 2, 5, 30)));
        assert!(!needs_reset(&f, Some(&last), &at(2024, 1, 1, 7, 0)));
    }

    #[test]
    fn time_policy_defaults_to_midnight() {
        let f = folder(DayResetType::Time, None);
        let last = at(2024, 1, 1, 22, 0);
        assert!(needs_reset(&f, Some(&last), &at(2024, 1, 2, 0, 0)));
    }

    #[test]
    fn time_policy_with_garbage_reset_time_never_resets() {
        let f = folder(DayResetType::Time, Some("six"));
        let last = at(2024, 1, 1, 5, 0);
        assert!(!needs_reset(&f, Some(&last), &at(2024, 1, 3, 12, 0)));
    }

    #[test]
    fn custom_and_unknown_policies_never_reset_after_first_use() {
        let last = at(2024, 1, 1, 5, 0);
        let now = at(2024, 3, 1, 5, 0);
        assert!(!needs_reset(&folder(DayResetType::Custom, None), Some(&last), &now));
        assert!(!needs_reset(&folder(DayResetType::Unknown, None), Some(&last), &now));
    }

    #[test]
    fn comparison_uses_the_timezone_of_now() {
        let f = folder(DayResetType::Calendar, None);
        let offset = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-01-01T20:00Z is already 2024-01-02 at +09:00.
        let last = at(2024, 1, 1, 20, 0).with_timezone(&offset);
        let now = offset.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        assert!(!needs_reset(&f, Some(&last), &now));
    }

    #[test]
    fn perform_reset_partitions_tasks() {
        let mut state = DayResetState::default();
        let input = tasks(&[true, false, true, false, false]);
        let outcome = state.perform_reset(input.clone(), local(2024, 1, 2, 9, 0));

        assert_eq!(
            outcome.incomplete_tasks.len() + outcome.completed_dropped,
            input.len()
        );
        assert!(outcome.incomplete_tasks.iter().all(|task| !task.completed));
        let ids: Vec<_> = outcome.incomplete_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t3", "t4"]);
        assert_eq!(state.incomplete_tasks, outcome.incomplete_tasks);
        assert!(state.showing_incomplete_tasks);
        assert_eq!(state.last_reset, Some(local(2024, 1, 2, 9, 0)));
    }

    #[test]
    fn perform_reset_with_everything_done_carries_nothing() {
        let mut state = DayResetState::default();
        let outcome = state.perform_reset(tasks(&[true, true]), local(2024, 1, 2, 9, 0));
        assert!(outcome.incomplete_tasks.is_empty());
        assert_eq!(outcome.completed_dropped, 2);
        assert!(state.incomplete_tasks.is_empty());
    }

    #[test]
    fn no_double_reset_at_the_same_instant() {
        let now = local(2024, 1, 2, 9, 0);
        for f in [
            folder(DayResetType::Calendar, None),
            folder(DayResetType::Time, Some("06:00")),
            folder(DayResetType::Custom, None),
        ] {
            let mut state = DayResetState::default();
            assert!(state.needs_reset(&f, &now));
            state.perform_reset(tasks(&[false]), now);
            assert!(!state.needs_reset(&f, &now));
        }
    }

    #[test]
    fn clear_incomplete_is_idempotent() {
        let mut state = DayResetState::default();
        state.perform_reset(tasks(&[false, false]), local(2024, 1, 2, 9, 0));

        state.clear_incomplete();
        let once = state.clone();
        state.clear_incomplete();

        assert_eq!(state, once);
        assert!(state.incomplete_tasks.is_empty());
        assert!(!state.showing_incomplete_tasks);
        assert!(state.last_reset.is_some());
    }
}
