//! Part domain model and input parsing.
//!
//! # Responsibility
//! - Define the canonical `(name, quantity)` record.
//! - Parse raw text fields from the presentation shell into typed values.
//!
//! # Invariants
//! - A parsed name is trimmed and non-empty.
//! - A parsed quantity is a base-10 integer `>= 0`.
//! - Parsing never panics on malformed input.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Quantity below which a part counts as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// One inventory row: a uniquely named part and its quantity on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub quantity: i64,
}

impl Part {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

impl Display for Part {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.quantity)
    }
}

/// Which user-facing field failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    PartName,
    Quantity,
    SearchQuery,
}

impl InputField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartName => "part name",
            Self::Quantity => "quantity",
            Self::SearchQuery => "search query",
        }
    }
}

/// Validation error for raw text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    pub field: InputField,
    pub message: String,
}

impl InputError {
    fn new(field: InputField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.field.as_str(), self.message)
    }
}

impl Error for InputError {}

/// Parses a part name. Surrounding whitespace is dropped.
pub fn parse_part_name(raw: &str) -> Result<&str, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::new(
            InputField::PartName,
            "please enter a part name",
        ));
    }
    Ok(trimmed)
}

/// Parses a quantity literal.
///
/// Accepts an optional leading `+`, as `str::parse` does. Rejects anything
/// that is not a base-10 integer, and rejects negative values.
pub fn parse_quantity(raw: &str) -> Result<i64, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::new(
            InputField::Quantity,
            "please enter a quantity",
        ));
    }
    let value = trimmed.parse::<i64>().map_err(|_| {
        InputError::new(
            InputField::Quantity,
            format!("`{trimmed}` is not a whole number"),
        )
    })?;
    if value < 0 {
        return Err(InputError::new(
            InputField::Quantity,
            format!("`{value}` must not be negative"),
        ));
    }
    Ok(value)
}

/// Parses a substring search query. Blank queries are rejected.
pub fn parse_search_query(raw: &str) -> Result<&str, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::new(
            InputField::SearchQuery,
            "please enter a search query",
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{parse_part_name, parse_quantity, parse_search_query, InputField, Part};

    #[test]
    fn part_name_is_trimmed() {
        assert_eq!(parse_part_name("  hex bolt ").unwrap(), "hex bolt");
    }

    #[test]
    fn blank_part_name_is_rejected() {
        let err = parse_part_name("   ").unwrap_err();
        assert_eq!(err.field, InputField::PartName);
    }

    #[test]
    fn quantity_accepts_plain_integers() {
        assert_eq!(parse_quantity("10").unwrap(), 10);
        assert_eq!(parse_quantity(" 0 ").unwrap(), 0);
        assert_eq!(parse_quantity("+7").unwrap(), 7);
    }

    #[test]
    fn quantity_rejects_non_numeric_text() {
        for raw in ["", "ten", "1.5", "3e2", "0x10", "12abc"] {
            let err = parse_quantity(raw).unwrap_err();
            assert_eq!(err.field, InputField::Quantity, "input {raw:?}");
        }
    }

    #[test]
    fn quantity_rejects_negative_values() {
        let err = parse_quantity("-3").unwrap_err();
        assert!(err.message.contains("negative"));
    }

    #[test]
    fn quantity_rejects_values_outside_i64() {
        assert!(parse_quantity("99999999999999999999").is_err());
    }

    #[test]
    fn search_query_must_not_be_blank() {
        assert_eq!(
            parse_search_query("\t").unwrap_err().field,
            InputField::SearchQuery
        );
        assert_eq!(parse_search_query(" nut ").unwrap(), "nut");
    }

    #[test]
    fn part_displays_as_name_and_quantity() {
        assert_eq!(Part::new("hex bolt", 12).to_string(), "hex bolt: 12");
    }
}
