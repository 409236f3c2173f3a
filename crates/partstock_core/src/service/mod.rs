//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the inventory operation API.
//! - Keep shell layers decoupled from storage and notification details.

pub mod change_sink;
pub mod inventory_service;
