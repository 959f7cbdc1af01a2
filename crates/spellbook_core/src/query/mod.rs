use crate::error::AppError;
use crate::model::Task;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Date,
    Status,
}

impl SortMode {
    pub fn from_name(name: &str) -> Option<SortMode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "date" => Some(SortMode::Date),
            "status" => Some(SortMode::Status),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortMode::Date => "date",
            SortMode::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

pub fn summarize(tasks: &[Task]) -> Summary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    Summary {
        total,
        completed,
        pending: total - completed,
    }
}

/// Case-insensitive substring match on the task text. An empty search term
/// passes everything through unchanged.
pub fn filter_tasks(tasks: &[Task], search: &str) -> Vec<Task> {
    if search.is_empty() {
        return tasks.to_vec();
    }

    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.text.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Orders tasks newest-first; `Status` additionally lifts pending tasks
/// above completed ones. The sort is stable, so equal timestamps keep their
/// insertion order.
pub fn sort_tasks(tasks: Vec<Task>, mode: SortMode) -> Result<Vec<Task>, AppError> {
    let mut keyed = Vec::with_capacity(tasks.len());
    for task in tasks {
        let created = OffsetDateTime::parse(&task.created_at, &Rfc3339)
            .map_err(|_| AppError::invalid_data("created_at must be RFC3339"))?;
        keyed.push((created, task));
    }

    match mode {
        SortMode::Date => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        SortMode::Status => {
            keyed.sort_by(|a, b| a.1.completed.cmp(&b.1.completed).then(b.0.cmp(&a.0)));
        }
    }

    Ok(keyed.into_iter().map(|(_, task)| task).collect())
}

/// The fixed render pipeline: filter first, then sort, so ordering never
/// sees excluded items.
pub fn visible_tasks(tasks: &[Task], search: &str, mode: SortMode) -> Result<Vec<Task>, AppError> {
    sort_tasks(filter_tasks(tasks, search), mode)
}
