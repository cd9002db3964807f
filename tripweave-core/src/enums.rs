//! Enum types for Tripweave entities

use crate::{ActivityId, EntityIdType, LocationId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CURRENCY
// ============================================================================

/// Currency a trip budget is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Rub,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[Currency::Rub, Currency::Usd, Currency::Eur, Currency::Gbp]
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(CurrencyParseError(s.to_string())),
        }
    }
}

/// Error when parsing an unsupported currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyParseError(pub String);

impl fmt::Display for CurrencyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported currency: {}", self.0)
    }
}

impl std::error::Error for CurrencyParseError {}

// ============================================================================
// ITEM KINDS
// ============================================================================

/// Kind of item a point of interest, search hit or review refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Location,
    Activity,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Location => "location",
            ItemType::Activity => "activity",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "location" => Ok(ItemType::Location),
            "activity" => Ok(ItemType::Activity),
            _ => Err(format!("Unknown item type: {}", s)),
        }
    }
}

/// Typed reference to a location or an activity.
///
/// Used wherever the backend expects exactly one of `location_id` /
/// `activity_id`, so "both" and "neither" are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Location(LocationId),
    Activity(ActivityId),
}

impl ItemRef {
    pub fn from_parts(item_type: ItemType, id: i64) -> Self {
        match item_type {
            ItemType::Location => ItemRef::Location(LocationId::new(id)),
            ItemType::Activity => ItemRef::Activity(ActivityId::new(id)),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            ItemRef::Location(_) => ItemType::Location,
            ItemRef::Activity(_) => ItemType::Activity,
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            ItemRef::Location(id) => id.value(),
            ItemRef::Activity(id) => id.value(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.item_type(), self.raw_id())
    }
}
