pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod query;
pub mod storage;
pub mod task_api;
