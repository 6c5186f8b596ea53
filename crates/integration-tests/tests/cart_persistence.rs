//! The cart and session survive a restart through the file store.

use plateful_core::{ItemId, UserId, UserRole};
use plateful_integration_tests::{Backend, config, context, drain, sample_menu};
use plateful_storefront::notify::NotificationKind;
use plateful_storefront::storage::{FileStore, KeyValueStore, keys};

#[tokio::test]
async fn test_cart_restored_in_fresh_context() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let saved = {
        let (ctx, mut notifications) = context(config(base_url.clone(), dir.path()))
            .await
            .expect("Failed to build context");
        let ramen = ctx
            .api()
            .get_menu_item(&ItemId::new("ramen"))
            .await
            .expect("Failed to get item");
        let gyoza = ctx
            .api()
            .get_menu_item(&ItemId::new("gyoza"))
            .await
            .expect("Failed to get item");

        let cart = ctx.cart();
        cart.add_item(ramen.to_product());
        cart.add_item(ramen.to_product());
        cart.add_item(gyoza.to_product());
        cart.update_quantity(&ItemId::new("ramen"), 5);
        ctx.sign_in(UserId::new("alice"), UserRole::Customer)
            .await
            .expect("Failed to sign in");
        ctx.flush().await.expect("Failed to flush");

        let kinds: Vec<_> = drain(&mut notifications)
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Added,
                NotificationKind::Incremented,
                NotificationKind::Added,
                NotificationKind::QuantityChanged,
            ]
        );
        cart.lines()
    };

    let (restored, _notifications) = context(config(base_url, dir.path()))
        .await
        .expect("Failed to build context");
    assert_eq!(restored.cart().lines(), saved);
    assert_eq!(restored.cart().total_quantity(), 6);
    assert_eq!(
        restored.session().require_user().expect("Signed in"),
        &UserId::new("alice")
    );

    // Pass-through attributes survive the round trip
    let ramen = restored
        .cart()
        .line(&ItemId::new("ramen"))
        .expect("Ramen in cart");
    assert_eq!(ramen.attributes["spiceLevel"], 2);
}

#[tokio::test]
async fn test_corrupt_cart_file_starts_empty() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    FileStore::new(dir.path())
        .set(keys::CART, "{not json")
        .await
        .expect("Failed to write");

    let (ctx, _notifications) = context(config(base_url, dir.path()))
        .await
        .expect("Failed to build context");
    assert!(ctx.cart().is_empty());
    assert_eq!(ctx.cart().total_quantity(), 0);
}

#[tokio::test]
async fn test_hydration_repairs_stored_lines() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    FileStore::new(dir.path())
        .set(
            keys::CART,
            r#"[{"itemId":"A","displayName":"Ramen","unitPrice":12.5,"quantity":2},
                {"itemId":"B","displayName":"Gyoza","unitPrice":6,"quantity":0},
                {"itemId":"A","displayName":"Ramen","unitPrice":12.5,"quantity":1}]"#,
        )
        .await
        .expect("Failed to write");

    let (ctx, _notifications) = context(config(base_url, dir.path()))
        .await
        .expect("Failed to build context");
    let lines = ctx.cart().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item_id, ItemId::new("A"));
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(ctx.cart().total_quantity(), 3);
}

#[tokio::test]
async fn test_sign_out_keeps_cart() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (ctx, _notifications) = context(config(base_url.clone(), dir.path()))
        .await
        .expect("Failed to build context");

    let gyoza = ctx
        .api()
        .get_menu_item(&ItemId::new("gyoza"))
        .await
        .expect("Failed to get item");
    ctx.cart().add_item(gyoza.to_product());
    ctx.sign_in(UserId::new("bob"), UserRole::Admin)
        .await
        .expect("Failed to sign in");
    ctx.sign_out().await.expect("Failed to sign out");
    ctx.flush().await.expect("Failed to flush");
    drop(ctx);

    let (restored, _notifications) = context(config(base_url, dir.path()))
        .await
        .expect("Failed to build context");
    assert!(restored.session().user().is_none());
    assert_eq!(restored.cart().total_quantity(), 1);
}

#[tokio::test]
async fn test_unreadable_session_still_starts() {
    let backend = Backend::with_menu(sample_menu());
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join(keys::USER_ID), [0xff, 0xfe, 0x00])
        .expect("Failed to write");

    let (ctx, _notifications) = context(config(base_url.clone(), dir.path()))
        .await
        .expect("Failed to build context");
    assert!(ctx.session().user().is_none());
    ctx.sign_out().await.expect("Failed to sign out");
    drop(ctx);

    let (restored, _notifications) = context(config(base_url, dir.path()))
        .await
        .expect("Failed to build context");
    assert!(restored.session().user().is_none());
    assert!(
        FileStore::new(dir.path())
            .get(keys::USER_ID)
            .await
            .expect("Failed to read")
            .is_none()
    );
}
