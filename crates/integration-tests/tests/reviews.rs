//! Review authoring against the fake backend.

use plateful_core::{ItemId, Rating, ReviewId, UserId};
use plateful_integration_tests::{Backend, sample_menu};
use plateful_storefront::api::{ApiClient, ApiError, NewReview, ReviewUpdate};
use plateful_storefront::config::ApiConfig;
use serde_json::json;

async fn client(backend: &Backend) -> ApiClient {
    let base_url = backend.spawn().await.expect("Failed to start fake backend");
    ApiClient::new(&ApiConfig::new(base_url)).expect("Failed to build client")
}

fn rating(score: i64) -> Rating {
    Rating::new(score).expect("Valid rating")
}

#[tokio::test]
async fn test_review_lifecycle() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;
    let ramen = ItemId::new("ramen");

    assert!(api.list_reviews(&ramen).await.expect("Failed to list").is_empty());

    let created = api
        .create_review(&NewReview {
            item_id: ramen.clone(),
            user_id: UserId::new("alice"),
            rating: rating(4),
            comment: Some("Rich broth".to_string()),
        })
        .await
        .expect("Failed to create review");
    assert_eq!(created.rating.value(), 4);
    assert_eq!(created.comment.as_deref(), Some("Rich broth"));
    assert!(created.updated_at.is_none());

    let updated = api
        .update_review(
            &created.review_id,
            &ReviewUpdate {
                rating: rating(5),
                comment: None,
            },
        )
        .await
        .expect("Failed to update review");
    assert_eq!(updated.review_id, created.review_id);
    assert_eq!(updated.rating.value(), 5);
    assert_eq!(updated.comment, None);
    assert!(updated.updated_at.is_some());

    let listed = api.list_reviews(&ramen).await.expect("Failed to list");
    assert_eq!(listed, vec![updated]);

    api.delete_review(&created.review_id)
        .await
        .expect("Failed to delete review");
    assert!(backend.reviews().is_empty());
}

#[tokio::test]
async fn test_review_body_shape() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    api.create_review(&NewReview {
        item_id: ItemId::new("gyoza"),
        user_id: UserId::new("bob"),
        rating: rating(3),
        comment: None,
    })
    .await
    .expect("Failed to create review");

    let stored = backend.reviews();
    assert_eq!(stored[0]["rating"], json!(3));
    assert!(stored[0].get("comment").is_none());
}

#[tokio::test]
async fn test_reviews_only_for_their_item() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;

    for (item, score) in [("ramen", 5), ("gyoza", 2), ("ramen", 3)] {
        api.create_review(&NewReview {
            item_id: ItemId::new(item),
            user_id: UserId::new("carol"),
            rating: rating(score),
            comment: None,
        })
        .await
        .expect("Failed to create review");
    }

    let ramen = api
        .list_reviews(&ItemId::new("ramen"))
        .await
        .expect("Failed to list");
    let scores: Vec<u8> = ramen.iter().map(|r| r.rating.value()).collect();
    assert_eq!(scores, vec![5, 3]);
}

#[tokio::test]
async fn test_missing_review_is_not_found() {
    let backend = Backend::with_menu(sample_menu());
    let api = client(&backend).await;
    let missing = ReviewId::new("r-404");

    let err = api
        .delete_review(&missing)
        .await
        .expect_err("Unknown review should fail");
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api
        .update_review(
            &missing,
            &ReviewUpdate {
                rating: rating(1),
                comment: None,
            },
        )
        .await
        .expect_err("Unknown review should fail");
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api
        .list_reviews(&ItemId::new("pad-thai"))
        .await
        .expect_err("Unknown item should fail");
    assert!(matches!(err, ApiError::NotFound(_)));
}
