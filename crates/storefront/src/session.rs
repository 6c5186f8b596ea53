//! The signed-in user.
//!
//! There is no password flow: signing in records a user id and role in the
//! key-value store so later commands can act on the user's behalf.

use plateful_core::{UserId, UserRole};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Errors from session checks.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action needs a signed-in user.
    #[error("not signed in, run `plateful login <user-id>` first")]
    NotSignedIn,

    /// The action needs the admin role.
    #[error("this action requires an admin account")]
    NotAdmin,

    /// The session could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Who is using the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SignedInUser>,
}

/// A signed-in user and their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Session {
    /// A session with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Read the session from storage.
    ///
    /// An unknown stored role is treated as a customer. A session that cannot
    /// be read is logged and treated as signed out, so `sign_out` can still
    /// overwrite it.
    #[instrument(skip_all)]
    pub async fn load(storage: &dyn KeyValueStore) -> Self {
        match read_user(storage).await {
            Ok(Some(user)) => {
                set_sentry_user(&user.user_id);
                Self { user: Some(user) }
            }
            Ok(None) => {
                debug!("No user signed in");
                Self::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session, continuing signed out");
                Self::anonymous()
            }
        }
    }

    /// Record `user_id` as signed in with `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    #[instrument(skip(storage), fields(user_id = %user_id, role = %role))]
    pub async fn sign_in(
        storage: &dyn KeyValueStore,
        user_id: UserId,
        role: UserRole,
    ) -> Result<Self, SessionError> {
        storage.set(keys::USER_ID, user_id.as_str()).await?;
        storage.set(keys::USER_ROLE, &role.to_string()).await?;
        set_sentry_user(&user_id);
        info!("Signed in");
        Ok(Self {
            user: Some(SignedInUser { user_id, role }),
        })
    }

    /// Forget the signed-in user. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be removed.
    #[instrument(skip_all)]
    pub async fn sign_out(storage: &dyn KeyValueStore) -> Result<Self, SessionError> {
        storage.remove(keys::USER_ID).await?;
        storage.remove(keys::USER_ROLE).await?;
        clear_sentry_user();
        info!("Signed out");
        Ok(Self::anonymous())
    }

    #[must_use]
    pub const fn user(&self) -> Option<&SignedInUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == UserRole::Admin)
    }

    /// The signed-in user id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if nobody is signed in.
    pub fn require_user(&self) -> Result<&UserId, SessionError> {
        self.user
            .as_ref()
            .map(|u| &u.user_id)
            .ok_or(SessionError::NotSignedIn)
    }

    /// The signed-in user id, if that user is an admin.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if nobody is signed in, or
    /// [`SessionError::NotAdmin`] if the user is a customer.
    pub fn require_admin(&self) -> Result<&UserId, SessionError> {
        let user = self.user.as_ref().ok_or(SessionError::NotSignedIn)?;
        if user.role == UserRole::Admin {
            Ok(&user.user_id)
        } else {
            Err(SessionError::NotAdmin)
        }
    }
}

async fn read_user(storage: &dyn KeyValueStore) -> Result<Option<SignedInUser>, StorageError> {
    let Some(user_id) = storage.get(keys::USER_ID).await? else {
        return Ok(None);
    };

    let role = match storage.get(keys::USER_ROLE).await? {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(role = %raw, "Unknown stored role, treating as customer");
            UserRole::Customer
        }),
        None => UserRole::Customer,
    };

    Ok(Some(SignedInUser {
        user_id: UserId::new(user_id),
        role,
    }))
}
