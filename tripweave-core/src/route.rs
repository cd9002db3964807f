//! Route documents and their points of interest.

use crate::{ActivityId, ItemRef, LocationId, MapId, QueryId, RouteId};
use serde::{Deserialize, Serialize};

/// A generated itinerary as returned by the backend.
///
/// The client never patches a document: every successful route mutation
/// replaces it wholesale with the server's copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    pub route_id: RouteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<QueryId>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub total_cost_currency: Option<String>,
    #[serde(default)]
    pub duration_days: Option<i32>,
    pub route_text: String,
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(rename = "locations_on_route", default)]
    pub points_of_interest: Vec<PoiEntry>,
}

impl RouteDocument {
    pub fn poi(&self, map_id: MapId) -> Option<&PoiEntry> {
        self.points_of_interest.iter().find(|p| p.map_id == map_id)
    }

    /// Points of interest in visit order. Order values are taken verbatim from
    /// the server; the client never renumbers them.
    pub fn ordered_pois(&self) -> Vec<&PoiEntry> {
        let mut pois: Vec<&PoiEntry> = self.points_of_interest.iter().collect();
        pois.sort_by_key(|p| p.visit_order);
        pois
    }

    /// One-line cost summary, e.g. `1234.50 RUB`.
    pub fn cost_summary(&self) -> String {
        match (self.total_cost, self.total_cost_currency.as_deref()) {
            (Some(cost), Some(currency)) => format!("{:.2} {}", cost, currency),
            (Some(cost), None) => format!("{:.2}", cost),
            _ => "unknown".to_string(),
        }
    }
}

/// One point of interest placed at a position within a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiEntry {
    pub map_id: MapId,
    pub visit_order: i32,
    pub location_id: LocationId,
    pub location_name: String,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub activity_description: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub visit_duration_hours: Option<f64>,
}

impl PoiEntry {
    /// Name shown to the user: the location, plus the activity in parentheses.
    pub fn display_name(&self) -> String {
        match &self.activity_name {
            Some(activity) => format!("{} ({})", self.location_name, activity),
            None => self.location_name.clone(),
        }
    }
}

/// Body of `POST /routes/{route_id}/locations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPoiRequest {
    pub item_id: i64,
    pub item_type: crate::ItemType,
}

impl From<ItemRef> for AddPoiRequest {
    fn from(item: ItemRef) -> Self {
        Self {
            item_id: item.raw_id(),
            item_type: item.item_type(),
        }
    }
}

/// Body of `PUT /routes/{route_id}/locations/{map_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacePoiRequest {
    pub new_item_id: i64,
    pub new_item_type: crate::ItemType,
}

impl From<ItemRef> for ReplacePoiRequest {
    fn from(item: ItemRef) -> Self {
        Self {
            new_item_id: item.raw_id(),
            new_item_type: item.item_type(),
        }
    }
}
