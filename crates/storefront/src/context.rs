//! Application context shared by every front-end command.

use std::sync::{Arc, PoisonError, RwLock};

use plateful_core::{UserId, UserRole};
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::cart::{CartHandle, CartStore};
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::notify::{Notifier, TracingNotifier};
use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore};

/// The composition root.
///
/// Owns the one cart store of the running session together with the storage
/// backend, API client and notifier it was built from. Cheaply cloneable via
/// `Arc`; consumers receive it (or a [`CartHandle`] from it) explicitly.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: StorefrontConfig,
    storage: Arc<dyn KeyValueStore>,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    cart: CartStore,
    session: RwLock<Session>,
}

impl AppContext {
    /// Build the context from configuration.
    ///
    /// State is persisted under `config.data_dir` and notifications go to the
    /// log.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub async fn new(config: StorefrontConfig) -> Result<Self> {
        Self::with_notifier(config, Arc::new(TracingNotifier)).await
    }

    /// Like [`AppContext::new`], delivering notifications to `notifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub async fn with_notifier(
        config: StorefrontConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        let api = ApiClient::new(&config.api)?;
        Ok(Self::with_parts(config, storage, api, notifier).await)
    }

    /// Build the context from explicit parts.
    ///
    /// Hydrates the cart and loads the session from `storage`. Unreadable
    /// state is logged and replaced by an empty cart or a signed-out session.
    #[instrument(skip_all)]
    pub async fn with_parts(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
        api: ApiClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = CartStore::hydrate(Arc::clone(&storage), Arc::clone(&notifier)).await;
        let session = Session::load(storage.as_ref()).await;
        info!(
            cart_lines = cart.lines().len(),
            signed_in = session.user().is_some(),
            "Context ready"
        );

        Self {
            inner: Arc::new(AppContextInner {
                config,
                storage,
                api,
                notifier,
                cart,
                session: RwLock::new(session),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// A connected handle to the session's cart.
    #[must_use]
    pub fn cart(&self) -> CartHandle {
        CartHandle::connected(self.inner.cart.clone())
    }

    /// Checkout over this context's cart and API client.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(
            self.cart(),
            Arc::new(self.inner.api.clone()),
            Arc::clone(&self.inner.notifier),
        )
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sign `user_id` in and remember it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub async fn sign_in(&self, user_id: UserId, role: UserRole) -> Result<Session> {
        let session = Session::sign_in(self.inner.storage.as_ref(), user_id, role).await?;
        self.replace_session(session.clone());
        Ok(session)
    }

    /// Sign the current user out.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be removed.
    pub async fn sign_out(&self) -> Result<()> {
        let session = Session::sign_out(self.inner.storage.as_ref()).await?;
        self.replace_session(session);
        Ok(())
    }

    /// Persist the cart and wait for the write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn flush(&self) -> Result<()> {
        self.inner.cart.flush().await?;
        Ok(())
    }

    fn replace_session(&self, session: Session) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use plateful_core::{CurrencyCode, ItemId, Product};
    use rust_decimal::Decimal;
    use url::Url;

    use super::*;
    use crate::config::ApiConfig;
    use crate::notify::ChannelNotifier;
    use crate::storage::{MemoryStore, keys};

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            api: ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap()),
            data_dir: std::env::temp_dir(),
            currency: CurrencyCode::USD,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    async fn context(storage: &MemoryStore) -> AppContext {
        let config = config();
        let api = ApiClient::new(&config.api).unwrap();
        AppContext::with_parts(
            config,
            Arc::new(storage.clone()),
            api,
            Arc::new(TracingNotifier),
        )
        .await
    }

    #[tokio::test]
    async fn test_cart_survives_restart() {
        let storage = MemoryStore::new();
        let first = context(&storage).await;
        let cart = first.cart();
        assert!(cart.is_connected());
        cart.add_item(Product::new(ItemId::new("A"), "Ramen", Decimal::new(1250, 2)));
        cart.add_item(Product::new(ItemId::new("A"), "Ramen", Decimal::new(1250, 2)));
        first.flush().await.unwrap();

        let second = context(&storage).await;
        assert_eq!(second.cart().lines(), first.cart().lines());
        assert_eq!(second.cart().total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_cart_handles_share_one_store() {
        let storage = MemoryStore::new();
        let ctx = context(&storage).await;
        ctx.cart()
            .add_item(Product::new(ItemId::new("A"), "Ramen", Decimal::ONE));
        assert_eq!(ctx.cart().total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_session_does_not_block_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(keys::USER_ID), [0xff, 0xfe, 0x00]).unwrap();
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..config()
        };
        let (notifier, _rx) = ChannelNotifier::new();

        let ctx = AppContext::with_notifier(config, Arc::new(notifier))
            .await
            .unwrap();
        assert!(ctx.session().user().is_none());

        ctx.sign_out().await.unwrap();
        ctx.sign_in(UserId::new("u1"), UserRole::Customer)
            .await
            .unwrap();
        assert!(ctx.session().user().is_some());
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let storage = MemoryStore::new();
        let ctx = context(&storage).await;
        assert!(ctx.session().user().is_none());

        ctx.sign_in(UserId::new("u1"), UserRole::Customer)
            .await
            .unwrap();
        assert_eq!(
            ctx.session().require_user().unwrap(),
            &UserId::new("u1")
        );
        assert_eq!(
            storage.get(keys::USER_ID).await.unwrap().as_deref(),
            Some("u1")
        );

        let restarted = context(&storage).await;
        assert!(restarted.session().user().is_some());

        restarted.sign_out().await.unwrap();
        assert!(restarted.session().user().is_none());
    }
}
