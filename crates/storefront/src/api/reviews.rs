//! Dish reviews.

use plateful_core::{ItemId, ReviewId};
use reqwest::Method;
use tracing::instrument;

use super::types::{NewReview, Review, ReviewUpdate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Reviews left on a menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is malformed.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn list_reviews(&self, item_id: &ItemId) -> Result<Vec<Review>, ApiError> {
        let url = self.url(&["menu", item_id.as_str(), "reviews"], &[]);
        self.send(
            self.request(Method::GET, url),
            &format!("menu item {item_id}"),
        )
        .await
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the review or the request fails.
    #[instrument(skip(self, review), fields(item_id = %review.item_id))]
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let url = self.url(&["reviews"], &[]);
        self.send(self.request(Method::POST, url).json(review), "reviews")
            .await
    }

    /// Replace the rating and comment of a review.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the review does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self, update), fields(review_id = %review_id))]
    pub async fn update_review(
        &self,
        review_id: &ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Review, ApiError> {
        let url = self.url(&["reviews", review_id.as_str()], &[]);
        self.send(
            self.request(Method::PUT, url).json(update),
            &format!("review {review_id}"),
        )
        .await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the review does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        let url = self.url(&["reviews", review_id.as_str()], &[]);
        self.send_empty(
            self.request(Method::DELETE, url),
            &format!("review {review_id}"),
        )
        .await
    }
}
