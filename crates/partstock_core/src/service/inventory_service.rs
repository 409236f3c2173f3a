//! Inventory use-case service.
//!
//! # Responsibility
//! - Expose one operation per user action over raw text input.
//! - Validate, delegate to the repository, then hand committed mutations to
//!   the change sink.
//!
//! # Invariants
//! - Every mutating operation goes through `mutate_and_notify`, so the sink
//!   sees exactly one event per successful mutation and none on failure.
//! - Read operations never touch the sink.
//! - Stored quantities stay `>= 0`: consumption is clamped at zero.
//! - Deleting a missing part is a success, unlike use/restock on a missing
//!   part which fail with `NotFound`.

use crate::model::part::{
    parse_part_name, parse_quantity, parse_search_query, InputError, InputField, Part,
};
use crate::repo::part_repo::{PartRepository, RepoError};
use crate::service::change_sink::{ChangeSink, MutationEvent, MutationKind};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Synchronous failure returned to the caller of an inventory operation.
#[derive(Debug)]
pub enum InventoryError {
    /// Empty or non-numeric field.
    InvalidInput(InputError),
    /// Operation targets a part that does not exist.
    NotFound(String),
    /// Add targets a name that already exists.
    DuplicateKey(String),
    /// Durable table could not be read or written.
    StoreUnavailable(RepoError),
}

impl InventoryError {
    /// Stable machine-readable code, used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl Display for InventoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "part `{name}` does not exist"),
            Self::DuplicateKey(name) => write!(f, "part `{name}` already exists"),
            Self::StoreUnavailable(err) => write!(f, "inventory store unavailable: {err}"),
        }
    }
}

impl Error for InventoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateKey(_) => None,
        }
    }
}

impl From<InputError> for InventoryError {
    fn from(value: InputError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for InventoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateKey(name) => Self::DuplicateKey(name),
            RepoError::NotFound(name) => Self::NotFound(name),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Result of one successful mutation.
///
/// `Display` renders the confirmation shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub part_name: String,
    /// Amount the user asked for (added, used or restocked). `None` on delete.
    pub amount: Option<i64>,
    /// Quantity after the mutation. `None` on delete.
    pub quantity: Option<i64>,
}

impl Display for MutationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let amount = self.amount.unwrap_or_default();
        let quantity = self.quantity.unwrap_or_default();
        match self.kind {
            MutationKind::Add => write!(
                f,
                "Part `{}` added successfully with quantity {quantity}",
                self.part_name
            ),
            MutationKind::Use => write!(
                f,
                "{amount} parts used successfully; `{}` now has {quantity}",
                self.part_name
            ),
            MutationKind::Restock => write!(
                f,
                "{amount} parts added to `{}` successfully; now {quantity}",
                self.part_name
            ),
            MutationKind::Delete => write!(f, "`{}` deleted successfully", self.part_name),
        }
    }
}

/// Inventory service facade over a repository and a change sink.
///
/// Holds no inventory state of its own.
pub struct InventoryService<R: PartRepository, S: ChangeSink> {
    repo: R,
    sink: S,
}

impl<R: PartRepository, S: ChangeSink> InventoryService<R, S> {
    /// Creates a service over the provided repository and sink.
    pub fn new(repo: R, sink: S) -> Self {
        Self { repo, sink }
    }

    /// Adds a new part with an initial quantity.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name or a quantity that is not a
    ///   non-negative integer.
    /// - `DuplicateKey` when the name already exists; the stored quantity is
    ///   left unchanged.
    pub fn add_part(&self, name: &str, qty: &str) -> InventoryResult<MutationOutcome> {
        self.mutate_and_notify(MutationKind::Add, |repo| {
            let name = parse_part_name(name)?;
            let quantity = parse_quantity(qty)?;
            repo.insert_part(name, quantity)?;
            Ok(MutationOutcome {
                kind: MutationKind::Add,
                part_name: name.to_string(),
                amount: Some(quantity),
                quantity: Some(quantity),
            })
        })
    }

    /// Consumes `qty_used` units. The new quantity is `max(0, current - used)`.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name or malformed quantity.
    /// - `NotFound` when the part does not exist; nothing is written.
    pub fn use_part(&self, name: &str, qty_used: &str) -> InventoryResult<MutationOutcome> {
        self.mutate_and_notify(MutationKind::Use, |repo| {
            let name = parse_part_name(name)?;
            let used = parse_quantity(qty_used)?;
            let current = repo
                .get_quantity(name)?
                .ok_or_else(|| InventoryError::NotFound(name.to_string()))?;

            let next = current.saturating_sub(used).max(0);
            repo.update_quantity(name, next)?;
            Ok(MutationOutcome {
                kind: MutationKind::Use,
                part_name: name.to_string(),
                amount: Some(used),
                quantity: Some(next),
            })
        })
    }

    /// Adds `qty_add` units to an existing part. No upper bound beyond `i64`.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name, malformed quantity, or a sum that
    ///   overflows `i64`.
    /// - `NotFound` when the part does not exist; nothing is written.
    pub fn restock_part(&self, name: &str, qty_add: &str) -> InventoryResult<MutationOutcome> {
        self.mutate_and_notify(MutationKind::Restock, |repo| {
            let name = parse_part_name(name)?;
            let added = parse_quantity(qty_add)?;
            let current = repo
                .get_quantity(name)?
                .ok_or_else(|| InventoryError::NotFound(name.to_string()))?;

            let next = current.checked_add(added).ok_or_else(|| {
                InventoryError::InvalidInput(InputError {
                    field: InputField::Quantity,
                    message: format!("adding {added} to {current} exceeds the supported range"),
                })
            })?;
            repo.update_quantity(name, next)?;
            Ok(MutationOutcome {
                kind: MutationKind::Restock,
                part_name: name.to_string(),
                amount: Some(added),
                quantity: Some(next),
            })
        })
    }

    /// Deletes a part. A missing part is not an error.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name.
    pub fn delete_part(&self, name: &str) -> InventoryResult<MutationOutcome> {
        self.mutate_and_notify(MutationKind::Delete, |repo| {
            let name = parse_part_name(name)?;
            repo.remove_part(name)?;
            Ok(MutationOutcome {
                kind: MutationKind::Delete,
                part_name: name.to_string(),
                amount: None,
                quantity: None,
            })
        })
    }

    /// Returns every part currently stored. Ordering is not guaranteed.
    pub fn get_inventory(&self) -> InventoryResult<Vec<Part>> {
        Ok(self.repo.list_parts()?)
    }

    /// Returns parts whose quantity is strictly below `threshold`.
    ///
    /// Callers without a preference pass
    /// [`DEFAULT_LOW_STOCK_THRESHOLD`](crate::model::part::DEFAULT_LOW_STOCK_THRESHOLD).
    pub fn get_low_stock(&self, threshold: i64) -> InventoryResult<Vec<Part>> {
        Ok(self.repo.list_below(threshold)?)
    }

    /// Returns parts whose name contains `query` (ASCII case-insensitive).
    ///
    /// # Errors
    /// - `InvalidInput` for a blank query.
    pub fn find_parts(&self, query: &str) -> InventoryResult<Vec<Part>> {
        let needle = parse_search_query(query)?;
        Ok(self.repo.search_parts(needle)?)
    }

    /// Returns the stored quantity for `name`, or `None` when absent.
    pub fn get_current_quantity(&self, name: &str) -> InventoryResult<Option<i64>> {
        let name = parse_part_name(name)?;
        Ok(self.repo.get_quantity(name)?)
    }

    /// Epoch milliseconds of the last committed mutation, if any.
    pub fn last_updated_at(&self) -> InventoryResult<Option<i64>> {
        Ok(self.repo.last_updated_at()?)
    }

    /// Runs one mutation and, only if it succeeds, notifies the sink once.
    fn mutate_and_notify<F>(
        &self,
        kind: MutationKind,
        mutation: F,
    ) -> InventoryResult<MutationOutcome>
    where
        F: FnOnce(&R) -> InventoryResult<MutationOutcome>,
    {
        let started_at = Instant::now();
        match mutation(&self.repo) {
            Ok(outcome) => {
                info!(
                    "event=inventory_mutation module=service status=ok kind={} duration_ms={}",
                    kind,
                    started_at.elapsed().as_millis()
                );
                self.sink.mutation_committed(MutationEvent {
                    kind,
                    part_name: outcome.part_name.clone(),
                });
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=inventory_mutation module=service status=error kind={} duration_ms={} error_code={}",
                    kind,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }
}
