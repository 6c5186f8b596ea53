//! Order management commands for staff.

use plateful_core::{OrderId, OrderStatus};
use plateful_storefront::AppContext;
use plateful_storefront::error::{Result, StorefrontError};

use super::orders::summary_line;

/// List every order, optionally in one status.
#[allow(clippy::print_stdout)]
pub async fn orders(ctx: &AppContext, status: Option<&str>) -> Result<()> {
    ctx.session().require_admin()?;
    let status = status.map(parse_status).transpose()?;

    let orders = ctx.api().list_all_orders(status).await?;
    if orders.is_empty() {
        println!("No orders");
        return Ok(());
    }
    for order in &orders {
        println!("{}  {}", summary_line(ctx, order), order.user_id);
    }
    Ok(())
}

/// Move an order to a new status.
#[allow(clippy::print_stdout)]
pub async fn set_status(ctx: &AppContext, order_id: &OrderId, status: &str) -> Result<()> {
    ctx.session().require_admin()?;
    let status = parse_status(status)?;

    let order = ctx.api().update_order_status(order_id, status).await?;
    println!("Order {} is now {}", order.order_id, order.status);
    Ok(())
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse().map_err(StorefrontError::BadRequest)
}
