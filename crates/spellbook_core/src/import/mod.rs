use crate::error::AppError;
use crate::model::Task;
use crate::storage::json_store;
use crate::task_api;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Demo source kept from the original application.
pub const DEFAULT_DEMO_URL: &str = "https://jsonplaceholder.typicode.com/todos?_limit=5";

/// Record shape served by the demo API. The `completed` value is honored
/// as provided; everything else about the record is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoTask {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// One-shot import of sample tasks. The merge is all-or-nothing: the whole
/// payload is fetched and decoded before the store is touched, so a failure
/// leaves the store exactly as it was. Returns the tasks that were added.
pub fn import_demo_tasks(url: &str) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    import_demo_tasks_with_path(&path, url)
}

fn import_demo_tasks_with_path(path: &Path, url: &str) -> Result<Vec<Task>, AppError> {
    let items = fetch_demo_tasks(url)?;
    info!("fetched {} demo tasks from {url}", items.len());

    let mut tasks = json_store::load_tasks(path)?;
    let imported = merge_demo_tasks(&mut tasks, &items)?;
    json_store::save_tasks(path, &tasks)?;

    Ok(imported)
}

fn fetch_demo_tasks(url: &str) -> Result<Vec<DemoTask>, AppError> {
    let body = ureq::get(url)
        .call()
        .map_err(|err| AppError::network(err.to_string()))?
        .into_string()
        .map_err(|err| AppError::network(err.to_string()))?;
    demo_tasks_from_json(&body)
}

fn demo_tasks_from_json(body: &str) -> Result<Vec<DemoTask>, AppError> {
    serde_json::from_str(body).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Appends every decoded item with a fresh id and an import-time
/// `created_at`. Items whose title trims to nothing are skipped so the
/// non-empty-text invariant holds for imported tasks too.
fn merge_demo_tasks(tasks: &mut Vec<Task>, items: &[DemoTask]) -> Result<Vec<Task>, AppError> {
    let created_at = task_api::now_rfc3339()?;
    let mut id = task_api::next_id(tasks);
    let mut imported = Vec::new();

    for item in items {
        let text = item.title.trim();
        if text.is_empty() {
            continue;
        }

        let task = Task {
            id,
            text: text.to_string(),
            completed: item.completed,
            created_at: created_at.clone(),
        };
        id += 1;
        tasks.push(task.clone());
        imported.push(task);
    }

    Ok(imported)
}
