//! Menu browsing.

use plateful_core::ItemId;
use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::MenuItem;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the menu, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_menu(&self, category: Option<&str>) -> Result<Vec<MenuItem>, ApiError> {
        let key = CacheKey::Menu {
            category: category.map(str::to_owned),
        };
        if let Some(CacheValue::Menu(items)) = self.cached(&key).await {
            debug!("Cache hit for menu");
            return Ok(items);
        }

        let query: Vec<(&str, &str)> = category.map(|c| ("category", c)).into_iter().collect();
        let url = self.url(&["menu"], &query);
        let items: Vec<MenuItem> = self.send(self.request(Method::GET, url), "menu").await?;

        self.remember(key, CacheValue::Menu(items.clone())).await;
        Ok(items)
    }

    /// Get one menu item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the item does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_menu_item(&self, item_id: &ItemId) -> Result<MenuItem, ApiError> {
        let key = CacheKey::Item(item_id.clone());
        if let Some(CacheValue::Item(item)) = self.cached(&key).await {
            debug!("Cache hit for menu item");
            return Ok(*item);
        }

        let url = self.url(&["menu", item_id.as_str()], &[]);
        let item: MenuItem = self
            .send(
                self.request(Method::GET, url),
                &format!("menu item {item_id}"),
            )
            .await?;

        self.remember(key, CacheValue::Item(Box::new(item.clone())))
            .await;
        Ok(item)
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }
}
