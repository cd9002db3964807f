//! Point-of-interest search results.

use crate::{ItemRef, ItemType};
use serde::{Deserialize, Serialize};

/// One hit from `GET /search/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: i64,
    pub item_type: ItemType,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl SearchItem {
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::from_parts(self.item_type, self.id)
    }

    /// `name, city, country` with absent parts skipped.
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        parts.extend(self.city.as_deref());
        parts.extend(self.country.as_deref());
        parts.join(", ")
    }
}

/// Query string of `GET /search/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery<'a> {
    pub query: &'a str,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_skips_missing_parts() {
        let item = SearchItem {
            id: 1,
            item_type: ItemType::Location,
            name: "Louvre".to_string(),
            description: None,
            city: Some("Paris".to_string()),
            country: None,
        };
        assert_eq!(item.label(), "Louvre, Paris");
        assert_eq!(item.item_ref().item_type(), ItemType::Location);
    }
}
