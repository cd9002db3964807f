//! Trip queries: search parameters, the outgoing request and the two shapes
//! of response the backend can produce.

use crate::error::{ValidationError, ValidationResult};
use crate::time::{self, Timestamp};
use crate::{Currency, QueryId, RouteDocument, UserId};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Structured trip-search parameters attached to every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub budget_currency: Currency,
}

impl QueryParameters {
    /// Length of the default travel window.
    pub const DEFAULT_WINDOW_DAYS: i64 = 7;

    /// Default parameters: a week starting `today`, unlimited budget in RUB.
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            start_date: today,
            end_date: today + Duration::days(Self::DEFAULT_WINDOW_DAYS),
            budget: None,
            budget_currency: Currency::default(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.end_date < self.start_date {
            return Err(ValidationError::invalid(
                "end_date",
                "must not be before start_date",
            ));
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(ValidationError::invalid("budget", "must be a number >= 0"));
            }
        }
        Ok(())
    }

    /// Human-readable summary used in the parameter confirmation entry.
    pub fn summary(&self) -> String {
        let budget = match self.budget {
            Some(amount) => format!("{} {}", amount, self.budget_currency),
            None => "unlimited".to_string(),
        };
        format!(
            "Dates ({} - {}), Budget ({})",
            self.start_date, self.end_date, budget
        )
    }
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self::starting(Utc::now().date_naive())
    }
}

/// Parse a budget typed by the user. Blank input means "no budget".
pub fn parse_budget(input: &str) -> ValidationResult<Option<f64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::invalid("budget", format!("'{}' is not a number", trimmed)))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::invalid("budget", "must be a number >= 0"));
    }
    Ok(Some(amount))
}

// ============================================================================
// REQUEST
// ============================================================================

/// Body of `POST /queries/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_text: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub budget_currency: Currency,
    pub destination: Vec<String>,
}

impl QueryRequest {
    pub fn new(
        query_text: impl Into<String>,
        params: &QueryParameters,
        destination: Vec<String>,
    ) -> Self {
        Self {
            query_text: query_text.into(),
            start_date: params.start_date,
            end_date: params.end_date,
            budget: params.budget,
            budget_currency: params.budget_currency,
            destination,
        }
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Either a clarification request or a generated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Clarification(ClarificationRequired),
    Route(RouteDocument),
}

/// Marker for the `status` field of a clarification response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClarificationStatus {
    #[serde(rename = "clarification_required")]
    ClarificationRequired,
}

/// The backend needs one more piece of input before it can build a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationRequired {
    pub status: ClarificationStatus,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ClarificationRequired {
    /// The field the client asks about. Only the first missing field is
    /// requested per round trip.
    pub fn first_missing_field(&self) -> ClarificationField {
        self.missing_fields
            .first()
            .map(|name| ClarificationField::from_wire(name))
            .unwrap_or_else(|| ClarificationField::Other("details".to_string()))
    }
}

/// A field the backend may ask the user to clarify.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClarificationField {
    /// Where the trip goes. Resolved by replaying the original query with
    /// `destination = [answer]`.
    Destination,
    /// Any field the client has no dedicated handling for.
    Other(String),
}

impl ClarificationField {
    pub fn from_wire(name: &str) -> Self {
        match name {
            "destination" => ClarificationField::Destination,
            other => ClarificationField::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClarificationField::Destination => "destination",
            ClarificationField::Other(name) => name,
        }
    }

    /// Prompt shown to the user. Known fields use fixed wording; unknown
    /// fields prefer the server's message and fall back to a template.
    pub fn prompt(&self, server_message: Option<&str>) -> String {
        match self {
            ClarificationField::Destination => "Where would you like to go?".to_string(),
            ClarificationField::Other(name) => server_message
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Please specify {}.", name)),
        }
    }

    /// Validation message for a blank answer.
    pub fn blank_answer_message(&self) -> String {
        match self {
            ClarificationField::Destination => "Please enter a destination.".to_string(),
            ClarificationField::Other(name) => format!("Please enter a value for {}.", name),
        }
    }
}

impl fmt::Display for ClarificationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// One stored query from `GET /queries/history/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHistoryEntry {
    pub id: QueryId,
    pub user_id: UserId,
    pub query_text: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(with = "time::lenient")]
    pub created_at: Timestamp,
}

impl QueryHistoryEntry {
    /// Route generated for this query, if the backend recorded one.
    pub fn route_id(&self) -> Option<crate::RouteId> {
        self.parameters
            .get("route_id")
            .and_then(serde_json::Value::as_i64)
            .map(crate::RouteId::from)
    }
}
