//! Identity types for Tripweave entities.
//!
//! The backend keys every entity with an integer primary key. Each key gets its
//! own newtype so a `MapId` can never be passed where a `RouteId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common behaviour of the strongly-typed integer identifiers.
pub trait EntityIdType: Copy + Eq + fmt::Display {
    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    fn new(value: i64) -> Self;

    fn value(&self) -> i64;
}

/// Error when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {entity} id: {input}")]
pub struct EntityIdParseError {
    pub entity: &'static str,
    pub input: String,
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;

            fn new(value: i64) -> Self {
                Self(value)
            }

            fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = EntityIdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| EntityIdParseError {
                        entity: $entity,
                        input: s.to_string(),
                    })
            }
        }
    };
}

define_entity_id!(
    /// Authenticated user. Sent as the `X-User-ID` header.
    UserId,
    "user"
);
define_entity_id!(
    /// Generated route.
    RouteId,
    "route"
);
define_entity_id!(
    /// Row of the route/location map: identifies one point of interest within a route.
    MapId,
    "map"
);
define_entity_id!(LocationId, "location");
define_entity_id!(ActivityId, "activity");
define_entity_id!(ReviewId, "review");
define_entity_id!(QueryId, "query");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integer() {
        let id: RouteId = " 42 ".parse().unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn parse_error_names_entity() {
        let err = "abc".parse::<MapId>().unwrap_err();
        assert_eq!(err.entity, "map");
        assert_eq!(err.to_string(), "Invalid map id: abc");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UserId::new(7));
    }
}
