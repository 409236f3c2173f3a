//! Part repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the durable name → quantity table used by the inventory service.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `part_name` is unique; inserting an existing name yields `DuplicateKey`.
//! - Every write touches exactly one row and is atomic on its own.
//! - Read paths reject negative persisted quantities instead of masking them.

use crate::db::DbError;
use crate::model::part::Part;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PART_SELECT_SQL: &str = "SELECT part_name, quantity FROM inventory";
const LAST_UPDATED_KEY: &str = "last_updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for part persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    DuplicateKey(String),
    NotFound(String),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(name) => write!(f, "part already exists: {name}"),
            Self::NotFound(name) => write!(f, "part not found: {name}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted part data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the inventory table.
///
/// Ordering of list/search results is not part of the contract.
pub trait PartRepository {
    fn insert_part(&self, name: &str, quantity: i64) -> RepoResult<()>;
    fn update_quantity(&self, name: &str, quantity: i64) -> RepoResult<()>;
    /// Deletes the row if present. Returns whether a row was removed.
    fn remove_part(&self, name: &str) -> RepoResult<bool>;
    fn get_quantity(&self, name: &str) -> RepoResult<Option<i64>>;
    fn list_parts(&self) -> RepoResult<Vec<Part>>;
    fn list_below(&self, threshold: i64) -> RepoResult<Vec<Part>>;
    /// Case-insensitive (ASCII) substring match on part name.
    fn search_parts(&self, needle: &str) -> RepoResult<Vec<Part>>;
    /// Epoch milliseconds of the last committed write, if any.
    fn last_updated_at(&self) -> RepoResult<Option<i64>>;
}

/// SQLite-backed part repository.
pub struct SqlitePartRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePartRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn collect_parts(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Part>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut parts = Vec::new();
        while let Some(row) = rows.next()? {
            parts.push(parse_part_row(row)?);
        }
        Ok(parts)
    }
}

impl PartRepository for SqlitePartRepository<'_> {
    fn insert_part(&self, name: &str, quantity: i64) -> RepoResult<()> {
        match self.conn.execute(
            "INSERT INTO inventory (part_name, quantity) VALUES (?1, ?2);",
            params![name, quantity],
        ) {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateKey(name.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    fn update_quantity(&self, name: &str, quantity: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE inventory SET quantity = ?1 WHERE part_name = ?2;",
            params![quantity, name],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }

        Ok(())
    }

    fn remove_part(&self, name: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM inventory WHERE part_name = ?1;", [name])?;
        Ok(changed > 0)
    }

    fn get_quantity(&self, name: &str) -> RepoResult<Option<i64>> {
        let quantity = self
            .conn
            .query_row(
                "SELECT quantity FROM inventory WHERE part_name = ?1;",
                [name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match quantity {
            Some(value) if value < 0 => Err(RepoError::InvalidData(format!(
                "negative quantity `{value}` for part `{name}`"
            ))),
            other => Ok(other),
        }
    }

    fn list_parts(&self) -> RepoResult<Vec<Part>> {
        self.collect_parts(&format!("{PART_SELECT_SQL} ORDER BY part_name ASC;"), [])
    }

    fn list_below(&self, threshold: i64) -> RepoResult<Vec<Part>> {
        self.collect_parts(
            &format!("{PART_SELECT_SQL} WHERE quantity < ?1 ORDER BY part_name ASC;"),
            [threshold],
        )
    }

    fn search_parts(&self, needle: &str) -> RepoResult<Vec<Part>> {
        let pattern = format!("%{}%", escape_like(needle));
        self.collect_parts(
            &format!(
                "{PART_SELECT_SQL} WHERE part_name LIKE ?1 ESCAPE '\\' ORDER BY part_name ASC;"
            ),
            [pattern],
        )
    }

    fn last_updated_at(&self) -> RepoResult<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM inventory_meta WHERE key = ?1;",
                [LAST_UPDATED_KEY],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(value)
    }
}

fn parse_part_row(row: &Row<'_>) -> RepoResult<Part> {
    let name: String = row.get("part_name")?;
    let quantity: i64 = row.get("quantity")?;
    if quantity < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative quantity `{quantity}` for part `{name}`"
        )));
    }
    Ok(Part { name, quantity })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => {
            inner.code == ErrorCode::ConstraintViolation
                && matches!(
                    inner.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
