use crate::models::{DayResetType, Folder, Task};

/// Content shown when nothing has been written for a folder yet.
#[derive(Debug, Clone)]
pub struct DefaultData {
    pub folders: Vec<Folder>,
    pub starter_tasks: Vec<String>,
    pub daily_note: String,
    pub supportive_content: String,
}

impl DefaultData {
    pub fn demo() -> Self {
        Self {
            folders: vec![
                folder(
                    "demo-goal-1",
                    "Writing Project",
                    "Finish the first draft",
                    "#2E5C8A",
                    DayResetType::Calendar,
                    None,
                ),
                folder(
                    "demo-goal-2",
                    "Fitness Goal",
                    "Get stronger, feel better",
                    "#4A7C59",
                    DayResetType::Time,
                    Some("06:00"),
                ),
                folder(
                    "demo-goal-3",
                    "Learn Spanish",
                    "Practice every day",
                    "#6B4E9E",
                    DayResetType::Calendar,
                    None,
                ),
            ],
            starter_tasks: vec![
                "Review yesterday's progress".into(),
                "Work on main objective for 25 minutes".into(),
                "Document what you learned".into(),
            ],
            daily_note: concat!(
                "**Welcome back!**\n\n",
                "Focus on making progress today, not perfection. Small steps forward."
            )
            .into(),
            supportive_content: concat!(
                "**Progress Tip:** Break large tasks into 25-minute focused sessions.\n\n",
                "*Remember: consistency beats intensity.*"
            )
            .into(),
        }
    }

    /// Same starter content as [`DefaultData::demo`] but folders come from
    /// the vault configuration.
    pub fn with_folders(folders: Vec<Folder>) -> Self {
        Self {
            folders,
            ..Self::demo()
        }
    }

    pub fn starter_tasks_for(&self, folder_id: &str) -> Vec<Task> {
        self.starter_tasks
            .iter()
            .enumerate()
            .map(|(i, text)| Task::new(format!("{folder_id}-task-{}", i + 1), text.clone()))
            .collect()
    }
}

fn folder(
    id: &str,
    title: &str,
    description: &str,
    color: &str,
    day_reset_type: DayResetType,
    reset_time: Option<&str>,
) -> Folder {
    Folder {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        color: color.into(),
        day_reset_type,
        reset_time: reset_time.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_tasks_are_scoped_to_the_folder() {
        let data = DefaultData::demo();
        let tasks = data.starter_tasks_for("demo-goal-2");
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id, "demo-goal-2-task-1");
        assert!(tasks.iter().all(|task| !task.completed));
    }

    #[test]
    fn demo_fitness_folder_resets_at_six() {
        let data = DefaultData::demo();
        let fitness = &data.folders[1];
        assert_eq!(fitness.day_reset_type, DayResetType::Time);
        assert_eq!(fitness.reset_time.as_deref(), Some("06:00"));
    }
}
