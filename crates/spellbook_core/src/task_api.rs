use crate::error::AppError;
use crate::model::Task;
use crate::storage::json_store;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Read-only snapshot of the store for rendering. When the underlying file
/// could not be read the snapshot is empty and `load_error` carries the
/// diagnostic (the session keeps running either way).
#[derive(Debug, Clone)]
pub struct StoreView {
    pub tasks: Vec<Task>,
    pub load_error: Option<AppError>,
}

/// Next free id: one past the highest id currently in the store. Ids are
/// never derived from the clock, so two back-to-back adds cannot collide.
pub(crate) fn next_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|task| task.id).max().map_or(1, |id| id + 1)
}

pub(crate) fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn add_task(text: &str) -> Result<Option<Task>, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, text)
}

pub fn toggle_task(id: u64) -> Result<Option<Task>, AppError> {
    let path = json_store::store_path()?;
    toggle_task_with_path(&path, id)
}

pub fn delete_task(id: u64) -> Result<Option<Task>, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, id)
}

pub fn mark_all_completed() -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    mark_all_completed_with_path(&path)
}

pub fn remove_completed() -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    remove_completed_with_path(&path)
}

pub fn clear_all(confirmed: bool) -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    clear_all_with_path(&path, confirmed)
}

pub fn list_tasks() -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    json_store::load_tasks(&path)
}

/// Snapshot for read-only views: a broken store degrades to an empty list
/// instead of failing the whole command.
pub fn list_tasks_lenient() -> Result<StoreView, AppError> {
    let path = json_store::store_path()?;
    let load = json_store::load_tasks_with_fallback(&path);
    Ok(StoreView {
        tasks: load.tasks,
        load_error: load.error,
    })
}

/// Whitespace-only text is a silent no-op: nothing is stored, nothing is
/// saved, and no error is raised.
fn add_task_with_path(path: &Path, text: &str) -> Result<Option<Task>, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = Task {
        id: next_id(&tasks),
        text: trimmed.to_string(),
        completed: false,
        created_at: now_rfc3339()?,
    };

    tasks.push(task.clone());
    json_store::save_tasks(path, &tasks)?;

    Ok(Some(task))
}

/// Flips `completed` on the matching task. An absent id is a no-op, not an
/// error, and does not rewrite the store.
fn toggle_task_with_path(path: &Path, id: u64) -> Result<Option<Task>, AppError> {
    let mut tasks = json_store::load_tasks(path)?;

    let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
        return Ok(None);
    };
    task.completed = !task.completed;
    let updated = task.clone();

    json_store::save_tasks(path, &tasks)?;

    Ok(Some(updated))
}

fn delete_task_with_path(path: &Path, id: u64) -> Result<Option<Task>, AppError> {
    let mut tasks = json_store::load_tasks(path)?;

    let Some(index) = tasks.iter().position(|task| task.id == id) else {
        return Ok(None);
    };
    let removed = tasks.remove(index);

    json_store::save_tasks(path, &tasks)?;

    Ok(Some(removed))
}

fn mark_all_completed_with_path(path: &Path) -> Result<usize, AppError> {
    let mut tasks = json_store::load_tasks(path)?;

    for task in &mut tasks {
        task.completed = true;
    }
    let marked = tasks.len();

    json_store::save_tasks(path, &tasks)?;

    Ok(marked)
}

fn remove_completed_with_path(path: &Path) -> Result<usize, AppError> {
    let mut tasks = json_store::load_tasks(path)?;

    let before = tasks.len();
    tasks.retain(|task| !task.completed);
    let removed = before - tasks.len();

    json_store::save_tasks(path, &tasks)?;

    Ok(removed)
}

/// Confirmation is an explicit parameter rather than a blocking prompt in
/// the library; callers gather the yes/no decision however suits them.
/// Without confirmation the store is left untouched.
fn clear_all_with_path(path: &Path, confirmed: bool) -> Result<usize, AppError> {
    if !confirmed {
        return Ok(0);
    }

    let tasks = json_store::load_tasks(path)?;
    let removed = tasks.len();

    json_store::save_tasks(path, &[])?;

    Ok(removed)
}
