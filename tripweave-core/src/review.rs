//! Reviews of locations and activities.

use crate::time::{self, Timestamp};
use crate::{ActivityId, ItemRef, LocationId, ReviewId, UserId};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// A review as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(with = "time::lenient")]
    pub review_date: Timestamp,
    pub user_id: UserId,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
}

/// Body of `POST /reviews/`. Exactly one of `location_id` / `activity_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<ActivityId>,
}

impl CreateReviewRequest {
    pub fn new(target: ItemRef, rating: u8, comment: Option<String>) -> Self {
        let (location_id, activity_id) = match target {
            ItemRef::Location(id) => (Some(id), None),
            ItemRef::Activity(id) => (None, Some(id)),
        };
        Self {
            rating,
            comment,
            location_id,
            activity_id,
        }
    }
}

pub fn is_valid_rating(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
