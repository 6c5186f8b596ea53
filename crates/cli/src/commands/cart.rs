//! Cart commands.

use plateful_core::ItemId;
use plateful_storefront::AppContext;
use plateful_storefront::error::{Result, StorefrontError};

use super::money;

/// Print the cart lines and totals.
#[allow(clippy::print_stdout)]
pub fn show(ctx: &AppContext) {
    let cart = ctx.cart();
    let lines = cart.lines();
    if lines.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in &lines {
        println!(
            "{:>3} x {:<32} {:>9}  ({})",
            line.quantity,
            line.display_name,
            money(ctx, line.line_total()).to_string(),
            line.item_id
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.total_quantity(),
        money(ctx, cart.subtotal())
    );
}

/// Add `quantity` units of a dish, looked up on the menu.
///
/// A quantity of zero or below changes nothing.
pub async fn add(ctx: &AppContext, item_id: &ItemId, quantity: i64) -> Result<()> {
    let item = ctx.api().get_menu_item(item_id).await?;
    if !item.available {
        return Err(StorefrontError::BadRequest(format!(
            "{} is not available right now",
            item.display_name
        )));
    }

    ctx.cart().add_item_with_quantity(item.to_product(), quantity);
    Ok(())
}

/// Remove a dish from the cart.
#[allow(clippy::print_stdout)]
pub fn remove(ctx: &AppContext, item_id: &ItemId) {
    if ctx.cart().remove_item(item_id).is_none() {
        println!("{item_id} is not in your cart");
    }
}

/// Set the quantity of a dish already in the cart.
#[allow(clippy::print_stdout)]
pub fn set(ctx: &AppContext, item_id: &ItemId, quantity: i64) {
    let cart = ctx.cart();
    let Some(line) = cart.line(item_id) else {
        println!("{item_id} is not in your cart");
        return;
    };
    if cart.update_quantity(item_id, quantity).is_none() {
        println!("{} is already at {}", line.display_name, line.quantity);
    }
}

/// Empty the cart.
pub fn clear(ctx: &AppContext) {
    ctx.cart().clear();
}
