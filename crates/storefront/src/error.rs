//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` that front ends can report with a
//! single call. Internal failures (storage, backend) are captured to Sentry;
//! everything else is the user's to fix and only gets a friendly message.

use plateful_core::RatingError;
use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout could not complete.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session requirements not met.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Invalid review rating.
    #[error("Invalid rating: {0}")]
    Rating(#[from] RatingError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl StorefrontError {
    /// Whether this is an internal failure rather than a user mistake.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Api(_) => true,
            Self::Checkout(err) => err.is_internal(),
            _ => false,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) => "Could not save local data".to_string(),
            Self::Api(ApiError::NotFound(what)) => format!("Not found: {what}"),
            Self::Api(_) => "The ordering service is unavailable, please try again".to_string(),
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(_) => "Your order could not be placed, please try again".to_string(),
            Self::Session(err) => err.to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture internal failures to Sentry and log them.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "User-facing error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Ramen added to cart", Some(&[("item_id", "ramen")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StorefrontError::NotFound("menu item pad-thai".to_string());
        assert_eq!(err.to_string(), "Not found: menu item pad-thai");

        let err = StorefrontError::BadRequest("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be a number");
    }

    #[test]
    fn test_internal_classification() {
        let storage = StorefrontError::Storage(StorageError::InvalidKey("../x".to_string()));
        assert!(storage.is_internal());
        assert!(!StorefrontError::Checkout(CheckoutError::EmptyCart).is_internal());
        assert!(!StorefrontError::Session(SessionError::NotSignedIn).is_internal());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let storage = StorefrontError::Storage(StorageError::InvalidKey("../x".to_string()));
        assert_eq!(storage.user_message(), "Could not save local data");

        let api = StorefrontError::Api(ApiError::Status {
            status: 502,
            body: "upstream stack trace".to_string(),
        });
        assert!(!api.user_message().contains("stack trace"));

        let empty = StorefrontError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(empty.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_report_without_sentry_client() {
        StorefrontError::NotFound("x".to_string()).report();
        StorefrontError::Storage(StorageError::InvalidKey(String::new())).report();
    }
}
