//! Account payloads: login, registration and the editable travel profile.

use crate::error::{ValidationError, ValidationResult};
use crate::time::{self, Timestamp};
use crate::{parse_budget, Currency, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator of the interests list as stored by the backend.
pub const INTEREST_SEPARATOR: char = ';';

/// Body of `POST /users/login` and `POST /users/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /users/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user_id: UserId,
}

/// User profile returned by registration and `GET /users/profile/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub travel_style: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub budget_currency: Option<String>,
    #[serde(with = "time::lenient")]
    pub created_at: Timestamp,
}

impl UserProfile {
    pub fn interest_list(&self) -> Vec<String> {
        self.interests.as_deref().map(split_interests).unwrap_or_default()
    }

    /// Editable copy of the profile, the starting point of an update.
    pub fn to_update(&self) -> UserProfileUpdate {
        UserProfileUpdate {
            interests: self.interests.clone(),
            travel_style: self.travel_style.clone(),
            budget: self.budget,
            budget_currency: self.budget_currency.clone(),
        }
    }
}

/// Split a stored interests string. Commas are accepted as well so typed
/// lists like `museums, food` survive.
pub fn split_interests(raw: &str) -> Vec<String> {
    raw.split(|c| c == INTEREST_SEPARATOR || c == ',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_interests<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(&INTEREST_SEPARATOR.to_string())
}

/// Body of `PUT /users/profile/{user_id}`. Every field is sent; `None`
/// clears the stored value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub interests: Option<String>,
    pub travel_style: Option<String>,
    pub budget: Option<f64>,
    pub budget_currency: Option<String>,
}

impl UserProfileUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(ValidationError::invalid("budget", "must be a number >= 0"));
            }
        }
        Ok(())
    }

    /// Set one field from user input. Blank input clears the field.
    pub fn set(&mut self, field: ProfileField, input: &str) -> ValidationResult<()> {
        let trimmed = input.trim();
        let text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        match field {
            ProfileField::Interests => {
                let joined = join_interests(&split_interests(trimmed));
                self.interests = (!joined.is_empty()).then_some(joined);
            }
            ProfileField::TravelStyle => self.travel_style = text,
            ProfileField::Budget => self.budget = parse_budget(trimmed)?,
            ProfileField::Currency => {
                self.budget_currency = match text {
                    Some(code) => {
                        let currency = Currency::from_str(&code).map_err(|err| {
                            ValidationError::invalid("budget_currency", err.to_string())
                        })?;
                        Some(currency.as_code().to_string())
                    }
                    None => None,
                }
            }
        }
        Ok(())
    }
}

/// Profile field editable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Interests,
    TravelStyle,
    Budget,
    Currency,
}

impl ProfileField {
    pub fn all() -> &'static [ProfileField] {
        &[
            ProfileField::Interests,
            ProfileField::TravelStyle,
            ProfileField::Budget,
            ProfileField::Currency,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Interests => "interests",
            ProfileField::TravelStyle => "style",
            ProfileField::Budget => "budget",
            ProfileField::Currency => "currency",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interests" => Ok(ProfileField::Interests),
            "style" | "travel_style" => Ok(ProfileField::TravelStyle),
            "budget" => Ok(ProfileField::Budget),
            "currency" | "budget_currency" => Ok(ProfileField::Currency),
            other => Err(format!("unknown profile field: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("a@b.c"));
        assert!(!rendered.contains("hunter2"));
    }

    fn profile() -> UserProfile {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "email": "ann@example.com",
            "interests": "museums; food;;hiking",
            "travel_style": "relaxed",
            "budget": 1500.0,
            "budget_currency": "EUR",
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn interests_split_on_separator_and_skip_blanks() {
        assert_eq!(profile().interest_list(), vec!["museums", "food", "hiking"]);
        assert_eq!(split_interests("art, wine"), vec!["art", "wine"]);
        assert_eq!(join_interests(&["art", " ", "wine "]), "art;wine");
    }

    #[test]
    fn update_starts_from_profile_and_serializes_nulls() {
        let mut update = profile().to_update();
        update.set(ProfileField::Budget, "").unwrap();
        update.set(ProfileField::Interests, "art, wine").unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({
                "interests": "art;wine",
                "travel_style": "relaxed",
                "budget": null,
                "budget_currency": "EUR"
            })
        );
    }

    #[test]
    fn set_rejects_bad_budget_and_currency() {
        let mut update = UserProfileUpdate::default();
        assert!(update.set(ProfileField::Budget, "-3").is_err());
        assert!(update.set(ProfileField::Currency, "yen").is_err());
        update.set(ProfileField::Currency, "usd").unwrap();
        assert_eq!(update.budget_currency.as_deref(), Some("USD"));
        assert_eq!(update.budget, None);
    }

    #[test]
    fn negative_budget_fails_validation() {
        let update = UserProfileUpdate {
            budget: Some(-1.0),
            ..UserProfileUpdate::default()
        };
        assert!(update.validate().is_err());
        assert!(UserProfileUpdate::default().validate().is_ok());
    }

    #[test]
    fn profile_field_names_round_trip() {
        for field in ProfileField::all() {
            assert_eq!(field.as_str().parse::<ProfileField>().unwrap(), *field);
        }
        assert_eq!(
            "travel_style".parse::<ProfileField>().unwrap(),
            ProfileField::TravelStyle
        );
        assert!("age".parse::<ProfileField>().is_err());
    }
}
