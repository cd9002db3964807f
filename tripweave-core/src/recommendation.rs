//! Personalized recommendations built from the user's profile.

use crate::{ItemRef, ItemType};
use serde::{Deserialize, Serialize};

/// One entry of `GET /recommendations/personalized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub id: i64,
    pub name: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl RecommendedItem {
    /// Target for the review panel.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::from_parts(self.item_type, self.id)
    }

    pub fn place(&self) -> Option<String> {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}
