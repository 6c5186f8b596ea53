//! Checkout and order history commands.

use plateful_core::OrderId;
use plateful_storefront::AppContext;
use plateful_storefront::api::Order;
use plateful_storefront::error::Result;

use super::money;

/// Place an order for the cart as the signed-in user.
#[allow(clippy::print_stdout)]
pub async fn checkout(ctx: &AppContext) -> Result<()> {
    let session = ctx.session();
    let user_id = session.require_user()?;

    let order = ctx.checkout().submit(user_id).await?;
    print_order(ctx, &order);
    Ok(())
}

/// List the signed-in user's orders.
#[allow(clippy::print_stdout)]
pub async fn list(ctx: &AppContext) -> Result<()> {
    let session = ctx.session();
    let user_id = session.require_user()?;

    let orders = ctx.api().list_orders(user_id).await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }
    for order in &orders {
        println!("{}", summary_line(ctx, order));
    }
    Ok(())
}

/// Show one order.
pub async fn show(ctx: &AppContext, order_id: &OrderId) -> Result<()> {
    let order = ctx.api().get_order(order_id).await?;
    print_order(ctx, &order);
    Ok(())
}

/// One-line order summary, shared with the admin listing.
pub fn summary_line(ctx: &AppContext, order: &Order) -> String {
    format!(
        "{:<12} {}  {:<16} {:>3} item(s)  {:>9}",
        order.order_id.as_str(),
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.status.as_str(),
        order.item_count(),
        money(ctx, order.total_amount).to_string()
    )
}

#[allow(clippy::print_stdout)]
fn print_order(ctx: &AppContext, order: &Order) {
    println!("Order {} ({})", order.order_id, order.status);
    println!("  Placed: {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    for item in &order.items {
        let name = item
            .display_name
            .as_deref()
            .unwrap_or_else(|| item.item_id.as_str());
        println!(
            "  {:>3} x {:<32} {:>9}",
            item.quantity,
            name,
            money(ctx, item.unit_price).to_string()
        );
    }
    println!("  Total: {}", money(ctx, order.total_amount));
}
