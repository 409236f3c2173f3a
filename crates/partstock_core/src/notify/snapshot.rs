//! Read-only inventory snapshots for the notifier.

use crate::db::open_db_read_only;
use crate::model::part::Part;
use crate::repo::part_repo::{PartRepository, RepoResult, SqlitePartRepository};
use std::path::PathBuf;

/// Source of full-inventory snapshots.
///
/// Implementations are shared across worker threads, so they must not hold a
/// connection; each call reads through its own handle.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> RepoResult<Vec<Part>>;
}

/// Snapshot source that opens the database file afresh, read-only, on every
/// call. A missing or unmigrated file is an error, never an empty snapshot.
#[derive(Debug, Clone)]
pub struct DbSnapshotSource {
    path: PathBuf,
}

impl DbSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for DbSnapshotSource {
    fn snapshot(&self) -> RepoResult<Vec<Part>> {
        let conn = open_db_read_only(&self.path)?;
        SqlitePartRepository::new(&conn).list_parts()
    }
}
