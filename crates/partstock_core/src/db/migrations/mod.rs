//! Inventory schema steps, keyed by `PRAGMA user_version`.
//!
//! Step 1 creates the `inventory` table; step 2 adds the `inventory_meta`
//! marker and the triggers that stamp it on every row change. Pending steps
//! run inside one transaction, so a file is either fully migrated or left at
//! its previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_inventory.sql")),
    (2, include_str!("0002_last_update_marker.sql")),
];

/// Schema version this binary writes and expects to read.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the schema version stored in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the schema up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _)| *version > from)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from, to
    );
    Ok(())
}

/// Fails unless `conn` is at exactly [`latest_version`]. Never writes.
pub fn ensure_current(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let expected = latest_version();
    if found > expected {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: expected,
        });
    }
    if found < expected {
        return Err(DbError::SchemaNotReady {
            db_version: found,
            expected,
        });
    }
    Ok(())
}
