//! Inventory domain model.
//!
//! # Responsibility
//! - Define the part record shared by store, service and notifier.
//! - Own the parsing rules for user-entered names and quantities.
//!
//! # Invariants
//! - Every part is identified by its unique, non-empty name.
//! - Quantities are never negative.

pub mod part;
