//! The user's travel profile and the recommendations derived from it.

use crate::api_client::ApiClientError;
use crate::session::SessionContext;
use crate::traits::TripBackend;
use std::sync::Arc;
use tripweave_core::{ProfileField, RecommendedItem, UserProfile, ValidationError};

pub const PROFILE_LOGIN_REQUIRED: &str = "User ID not available. Please log in.";
pub const RECOMMENDATIONS_LOGIN_REQUIRED: &str = "Please log in to see recommendations.";
pub const EMPTY_RECOMMENDATIONS_HINT: &str = "We don't know enough about you yet to recommend \
anything. Fill in your profile (especially your interests) with /profile set interests <list>.";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("A profile request is already in progress")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] ApiClientError),
}

/// View and edit the logged-in user's profile.
pub struct ProfilePanel {
    backend: Arc<dyn TripBackend>,
    session: SessionContext,
    profile: Option<UserProfile>,
    loading: bool,
    error: Option<String>,
}

impl ProfilePanel {
    pub fn new(backend: Arc<dyn TripBackend>, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            profile: None,
            loading: false,
            error: None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the profile of the session user. A failure drops any profile
    /// shown before.
    pub async fn load(&mut self) -> Result<&UserProfile, ProfileError> {
        if self.loading {
            return Err(ProfileError::Busy);
        }
        let Some(user_id) = self.session.user_id() else {
            self.profile = None;
            self.error = Some(PROFILE_LOGIN_REQUIRED.to_string());
            return Err(ProfileError::Unauthenticated);
        };

        self.loading = true;
        self.error = None;
        let result = self.backend.get_profile(user_id).await;
        self.loading = false;

        match result {
            Ok(profile) => {
                tracing::debug!(user_id = %user_id, "profile loaded");
                Ok(self.profile.insert(profile))
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to load profile");
                self.profile = None;
                self.error = Some(format!("Error loading profile: {}", err.detail()));
                Err(err.into())
            }
        }
    }

    /// Change one field and save the whole profile. The profile is loaded
    /// first unless the session user's profile is already shown. Invalid
    /// input is rejected before any request and leaves the shown profile
    /// untouched.
    pub async fn update_field(
        &mut self,
        field: ProfileField,
        value: &str,
    ) -> Result<&UserProfile, ProfileError> {
        if self.loading {
            return Err(ProfileError::Busy);
        }
        let Some(user_id) = self.session.user_id() else {
            self.error = Some(PROFILE_LOGIN_REQUIRED.to_string());
            return Err(ProfileError::Unauthenticated);
        };
        if self.profile.as_ref().map(|profile| profile.id) != Some(user_id) {
            self.load().await?;
        }
        let mut update = self
            .profile
            .as_ref()
            .map(UserProfile::to_update)
            .unwrap_or_default();
        if let Err(err) = update.set(field, value).and_then(|()| update.validate()) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        self.loading = true;
        self.error = None;
        let result = self.backend.update_profile(user_id, &update).await;
        self.loading = false;

        match result {
            Ok(profile) => {
                tracing::info!(user_id = %user_id, field = %field, "profile updated");
                Ok(self.profile.insert(profile))
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to save profile");
                self.error = Some(format!("Error saving profile: {}", err.detail()));
                Err(err.into())
            }
        }
    }
}

/// Personalized recommendations for the session user.
pub struct RecommendationList {
    backend: Arc<dyn TripBackend>,
    session: SessionContext,
    items: Vec<RecommendedItem>,
    loaded: bool,
    loading: bool,
    error: Option<String>,
}

impl RecommendationList {
    pub fn new(backend: Arc<dyn TripBackend>, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            items: Vec::new(),
            loaded: false,
            loading: false,
            error: None,
        }
    }

    /// Items in server order, best first.
    pub fn items(&self) -> &[RecommendedItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&RecommendedItem> {
        self.items.get(index)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The profile hint replaces the list when a successful load found
    /// nothing.
    pub fn profile_hint(&self) -> Option<&'static str> {
        (self.loaded && self.items.is_empty()).then_some(EMPTY_RECOMMENDATIONS_HINT)
    }

    pub async fn load(&mut self) -> Result<&[RecommendedItem], ProfileError> {
        if self.loading {
            return Err(ProfileError::Busy);
        }
        self.items.clear();
        self.loaded = false;
        let Some(user_id) = self.session.user_id() else {
            self.error = Some(RECOMMENDATIONS_LOGIN_REQUIRED.to_string());
            return Err(ProfileError::Unauthenticated);
        };

        self.loading = true;
        self.error = None;
        let result = self.backend.recommendations(user_id).await;
        self.loading = false;

        match result {
            Ok(items) => {
                tracing::debug!(user_id = %user_id, count = items.len(), "recommendations loaded");
                self.items = items;
                self.loaded = true;
                Ok(&self.items)
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to load recommendations");
                self.error = Some(format!("Failed to load recommendations: {}", err.detail()));
                Err(err.into())
            }
        }
    }
}
