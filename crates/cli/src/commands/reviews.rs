//! Review commands.

use plateful_core::{ItemId, Rating, ReviewId};
use plateful_storefront::AppContext;
use plateful_storefront::api::{NewReview, ReviewUpdate};
use plateful_storefront::error::Result;

/// Print the reviews of a dish.
#[allow(clippy::print_stdout)]
pub async fn list(ctx: &AppContext, item_id: &ItemId) -> Result<()> {
    let reviews = ctx.api().list_reviews(item_id).await?;
    if reviews.is_empty() {
        println!("No reviews yet");
        return Ok(());
    }

    let total: u32 = reviews.iter().map(|r| u32::from(r.rating.value())).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = f64::from(total) / reviews.len() as f64;
    println!("{} review(s), average {average:.1}/5", reviews.len());

    for review in &reviews {
        println!(
            "{}  {}  by {}  [{}]",
            review.rating.stars(),
            review.created_at.format("%Y-%m-%d"),
            review.user_id,
            review.review_id
        );
        if let Some(comment) = &review.comment {
            println!("    {comment}");
        }
    }
    Ok(())
}

/// Review a dish as the signed-in user.
#[allow(clippy::print_stdout)]
pub async fn add(
    ctx: &AppContext,
    item_id: ItemId,
    rating: i64,
    comment: Option<String>,
) -> Result<()> {
    let rating = Rating::new(rating)?;
    let session = ctx.session();
    let user_id = session.require_user()?.clone();

    let review = ctx
        .api()
        .create_review(&NewReview {
            item_id,
            user_id,
            rating,
            comment,
        })
        .await?;
    println!("Review {} saved", review.review_id);
    Ok(())
}

/// Change the rating and comment of a review.
#[allow(clippy::print_stdout)]
pub async fn edit(
    ctx: &AppContext,
    review_id: &ReviewId,
    rating: i64,
    comment: Option<String>,
) -> Result<()> {
    let rating = Rating::new(rating)?;
    ctx.session().require_user()?;

    let review = ctx
        .api()
        .update_review(review_id, &ReviewUpdate { rating, comment })
        .await?;
    println!("Review {} updated", review.review_id);
    Ok(())
}

/// Delete a review.
#[allow(clippy::print_stdout)]
pub async fn delete(ctx: &AppContext, review_id: &ReviewId) -> Result<()> {
    ctx.session().require_user()?;

    ctx.api().delete_review(review_id).await?;
    println!("Review {review_id} deleted");
    Ok(())
}
