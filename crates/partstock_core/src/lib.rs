//! Core domain logic for PartStock.
//! This crate is the single source of truth for inventory invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, InventoryConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::part::{InputError, InputField, Part, DEFAULT_LOW_STOCK_THRESHOLD};
pub use notify::{
    start_notifier, ChangeNotifier, DbSnapshotSource, NotificationError, NotifierPipeline,
    NotifierWorkers, SmtpMailer,
};
pub use repo::part_repo::{PartRepository, RepoError, RepoResult, SqlitePartRepository};
pub use service::change_sink::{
    ChangeSink, MutationEvent, MutationKind, NoopChangeSink, RecordingChangeSink,
};
pub use service::inventory_service::{
    InventoryError, InventoryResult, InventoryService, MutationOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
