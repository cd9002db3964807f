//! Reviews of a single location or activity.

use crate::api_client::ApiClientError;
use crate::session::SessionContext;
use crate::traits::TripBackend;
use std::sync::Arc;
use tripweave_core::{is_valid_rating, CreateReviewRequest, ItemRef, Review};

pub const RATING_REQUIRED: &str = "Please choose a rating.";
pub const LOGIN_REQUIRED: &str = "Could not determine the user. Please log in.";

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Rating is required")]
    RatingMissing,
    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("A review request is already in progress")]
    Busy,
    #[error(transparent)]
    Backend(#[from] ApiClientError),
}

/// Load, show and add reviews for one target.
pub struct ReviewPanel {
    backend: Arc<dyn TripBackend>,
    session: SessionContext,
    target: ItemRef,
    reviews: Vec<Review>,
    loading: bool,
    error: Option<String>,
    form_open: bool,
    form_error: Option<String>,
}

impl ReviewPanel {
    pub fn new(backend: Arc<dyn TripBackend>, session: SessionContext, target: ItemRef) -> Self {
        Self {
            backend,
            session,
            target,
            reviews: Vec::new(),
            loading: false,
            error: None,
            form_open: false,
            form_error: None,
        }
    }

    pub fn target(&self) -> ItemRef {
        self.target
    }

    /// Reviews, newest submission first once the user adds one.
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
        self.form_error = None;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
        self.form_error = None;
    }

    /// Fetch the reviews. A failure leaves an empty list and an inline error.
    pub async fn load(&mut self) -> Result<&[Review], ReviewError> {
        if self.loading {
            return Err(ReviewError::Busy);
        }
        self.loading = true;
        self.error = None;
        let result = self.backend.list_reviews(self.target).await;
        self.loading = false;
        match result {
            Ok(reviews) => {
                tracing::debug!(item = %self.target, count = reviews.len(), "reviews loaded");
                self.reviews = reviews;
                Ok(&self.reviews)
            }
            Err(err) => {
                tracing::warn!(item = %self.target, error = %err, "failed to load reviews");
                self.reviews.clear();
                self.error = Some(format!("Failed to load reviews: {}", err.detail()));
                Err(err.into())
            }
        }
    }

    /// Post a review for the target. The created review is put at the top of
    /// the list and the form closes.
    pub async fn submit(
        &mut self,
        rating: Option<u8>,
        comment: &str,
    ) -> Result<&Review, ReviewError> {
        if self.loading {
            return Err(ReviewError::Busy);
        }
        let Some(rating) = rating else {
            self.form_error = Some(RATING_REQUIRED.to_string());
            return Err(ReviewError::RatingMissing);
        };
        if !is_valid_rating(rating) {
            self.form_error = Some(RATING_REQUIRED.to_string());
            return Err(ReviewError::RatingOutOfRange(rating));
        }
        let Some(user_id) = self.session.user_id() else {
            self.form_error = Some(LOGIN_REQUIRED.to_string());
            return Err(ReviewError::Unauthenticated);
        };

        let comment = comment.trim();
        let comment = (!comment.is_empty()).then(|| comment.to_string());
        let request = CreateReviewRequest::new(self.target, rating, comment);

        self.loading = true;
        self.form_error = None;
        let result = self.backend.create_review(user_id, &request).await;
        self.loading = false;

        match result {
            Ok(review) => {
                tracing::info!(item = %self.target, review_id = %review.id, "review created");
                self.reviews.insert(0, review);
                self.form_open = false;
                Ok(&self.reviews[0])
            }
            Err(err) => {
                tracing::warn!(item = %self.target, error = %err, "failed to create review");
                self.form_error = Some(format!("Failed to submit review: {}", err.detail()));
                Err(err.into())
            }
        }
    }
}
