//! Menu browsing against the fake backend.

use std::time::Duration;

use plateful_core::ItemId;
use plateful_integration_tests::{Backend, sample_menu};
use plateful_storefront::api::{ApiClient, ApiError};
use plateful_storefront::config::ApiConfig;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;

async fn client(backend: &Backend) -> ApiClient {
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    ApiClient::new(&ApiConfig::new(base_url)).expect("Failed to build client")
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_menu() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    let menu = api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(menu.len(), 3);
    assert_eq!(menu[0].item_id, ItemId::new("ramen"));
    assert_eq!(menu[0].unit_price, Decimal::new(125, 1));
    assert!(menu[0].available);
    assert!(!menu[2].available);
}

#[tokio::test]
async fn test_list_menu_by_category() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    let sides = api
        .list_menu(Some("sides"))
        .await
        .expect("Failed to list menu");
    assert_eq!(sides.len(), 1);
    assert_eq!(sides[0].display_name, "Gyoza");

    let none = api
        .list_menu(Some("drinks"))
        .await
        .expect("Failed to list menu");
    assert!(none.is_empty());
}

// ============================================================================
// Single items
// ============================================================================

#[tokio::test]
async fn test_get_menu_item_keeps_extra_attributes() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    let ramen = api
        .get_menu_item(&ItemId::new("ramen"))
        .await
        .expect("Failed to get item");
    assert_eq!(ramen.attributes.get("spiceLevel"), Some(&Value::from(2)));

    let product = ramen.to_product();
    assert_eq!(product.display_name, "Tonkotsu Ramen");
    assert_eq!(
        product.image_ref.as_deref(),
        Some("https://img.plateful.test/ramen.jpg")
    );
    assert_eq!(
        product.attributes.get("category"),
        Some(&Value::from("noodles"))
    );
}

#[tokio::test]
async fn test_missing_item_is_not_found() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    let err = api
        .get_menu_item(&ItemId::new("pad-thai"))
        .await
        .expect_err("Unknown item should fail");
    match err {
        ApiError::NotFound(what) => assert_eq!(what, "menu item pad-thai not found"),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_menu_responses_are_cached() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    api.list_menu(None).await.expect("Failed to list menu");
    api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(backend.menu_requests(), 1);

    // A different category is a different cache entry
    api.list_menu(Some("noodles"))
        .await
        .expect("Failed to list menu");
    assert_eq!(backend.menu_requests(), 2);

    api.get_menu_item(&ItemId::new("gyoza"))
        .await
        .expect("Failed to get item");
    api.get_menu_item(&ItemId::new("gyoza"))
        .await
        .expect("Failed to get item");
    assert_eq!(backend.menu_requests(), 3);

    api.invalidate_menu_cache().await;
    api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(backend.menu_requests(), 4);
}

#[tokio::test]
async fn test_zero_ttl_disables_cache() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let mut config = ApiConfig::new(base_url);
    config.menu_cache_ttl = Duration::ZERO;
    let api = ApiClient::new(&config).expect("Failed to build client");

    api.list_menu(None).await.expect("Failed to list menu");
    api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(backend.menu_requests(), 2);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let mut config = ApiConfig::new(base_url);
    config.token = Some(SecretString::from("pk_live_4f9a2c"));
    let api = ApiClient::new(&config).expect("Failed to build client");

    api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(
        backend.last_authorization().as_deref(),
        Some("Bearer pk_live_4f9a2c")
    );
}

#[tokio::test]
async fn test_no_token_no_header() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    api.list_menu(None).await.expect("Failed to list menu");
    assert_eq!(backend.last_authorization(), None);
}
