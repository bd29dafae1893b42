pub mod config;
pub mod task_store;

pub use config::{Config, ConfigError};
pub use task_store::{SqliteTaskStore, StoreError, TaskSource};

#[cfg(test)]
pub use task_store::MockTaskSource;
