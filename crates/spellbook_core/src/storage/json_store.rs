use crate::error::AppError;
use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "spells.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<Task>,
}

/// Result of a lenient load: on read or parse failure the store is treated
/// as empty and the failure is handed back for the caller to report.
#[derive(Debug, Clone)]
pub struct StoreLoad {
    pub tasks: Vec<Task>,
    pub error: Option<AppError>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("SPELLBOOK_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("spellbook")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("spellbook")
            .join(STORE_FILE_NAME))
    }
}

/// Strict load: a missing file is an empty store, but any read, parse, or
/// validation failure fails the whole load. Mutating operations use this so
/// a corrupt store is never silently overwritten.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredTasks =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    for (index, task) in stored.tasks.iter().enumerate() {
        if task.text.trim().is_empty() {
            return Err(AppError::invalid_data("stored task has empty text"));
        }
        let duplicate = stored.tasks[..index].iter().any(|other| other.id == task.id);
        if duplicate {
            return Err(AppError::invalid_data("duplicate task id in store"));
        }
    }

    Ok(stored.tasks)
}

/// Lenient load for read-only views: failures degrade to an empty store
/// instead of aborting, with the error captured for diagnostics.
pub fn load_tasks_with_fallback(path: &Path) -> StoreLoad {
    match load_tasks(path) {
        Ok(tasks) => StoreLoad { tasks, error: None },
        Err(err) => StoreLoad {
            tasks: Vec::new(),
            error: Some(err),
        },
    }
}

/// Full overwrite of the store slot; there is no incremental persistence.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        tasks: tasks.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_VERSION, load_tasks, load_tasks_with_fallback, save_tasks};
    use crate::model::Task;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("spellbook-{nanos}-{file_name}"))
    }

    fn sample_task(id: u64, text: &str) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("round-trip.json");
        let tasks = vec![
            sample_task(1, "Lumos"),
            Task {
                id: 2,
                text: "Expelliarmus".to_string(),
                completed: true,
                created_at: "2026-08-02T09:30:00Z".to_string(),
            },
        ];

        save_tasks(&path, &tasks).unwrap();
        let loaded = load_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let path = temp_path("missing.json");
        let loaded = load_tasks(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_rejects_malformed_json() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json ").unwrap();

        let err = load_tasks(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn load_rejects_unknown_schema_version() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"tasks\": []\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = load_tasks(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let path = temp_path("dup-ids.json");
        let content = "{\n  \"schema_version\": 1,\n  \"tasks\": [\n    {\"id\": 1, \"text\": \"Lumos\", \"completed\": false, \"created_at\": \"2026-08-01T00:00:00Z\"},\n    {\"id\": 1, \"text\": \"Nox\", \"completed\": false, \"created_at\": \"2026-08-01T00:00:01Z\"}\n  ]\n}";
        fs::write(&path, content).unwrap();

        let err = load_tasks(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn load_rejects_blank_task_text() {
        let path = temp_path("blank-text.json");
        let content = "{\n  \"schema_version\": 1,\n  \"tasks\": [\n    {\"id\": 1, \"text\": \"   \", \"completed\": false, \"created_at\": \"2026-08-01T00:00:00Z\"}\n  ]\n}";
        fs::write(&path, content).unwrap();

        let err = load_tasks(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn load_accepts_record_without_completed_field() {
        let path = temp_path("no-completed.json");
        let content = "{\n  \"schema_version\": 1,\n  \"tasks\": [\n    {\"id\": 1, \"text\": \"Lumos\", \"created_at\": \"2026-08-01T00:00:00Z\"}\n  ]\n}";
        fs::write(&path, content).unwrap();

        let loaded = load_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].completed);
    }

    #[test]
    fn fallback_load_degrades_to_empty_store() {
        let path = temp_path("fallback.json");
        fs::write(&path, "not even close to json").unwrap();

        let load = load_tasks_with_fallback(&path);
        fs::remove_file(&path).ok();

        assert!(load.tasks.is_empty());
        assert_eq!(load.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn fallback_load_of_missing_file_has_no_error() {
        let path = temp_path("fallback-missing.json");
        let load = load_tasks_with_fallback(&path);

        assert!(load.tasks.is_empty());
        assert!(load.error.is_none());
    }
}
