//! Menu browsing commands.

use plateful_core::ItemId;
use plateful_storefront::AppContext;
use plateful_storefront::api::MenuItem;
use plateful_storefront::error::Result;

use super::money;

/// List dishes, optionally in one category.
#[allow(clippy::print_stdout)]
pub async fn list(ctx: &AppContext, category: Option<&str>) -> Result<()> {
    let items = ctx.api().list_menu(category).await?;
    if items.is_empty() {
        println!("No dishes found");
        return Ok(());
    }

    for item in &items {
        println!("{}", summary_line(ctx, item));
    }
    Ok(())
}

/// Show one dish in full.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &AppContext, item_id: &ItemId) -> Result<()> {
    let item = ctx.api().get_menu_item(item_id).await?;

    println!("{} ({})", item.display_name, item.item_id);
    println!("  Price:    {}", money(ctx, item.unit_price));
    if let Some(category) = &item.category {
        println!("  Category: {category}");
    }
    if !item.available {
        println!("  Currently unavailable");
    }
    if let Some(description) = &item.description {
        println!("  {description}");
    }
    for (key, value) in &item.attributes {
        println!("  {key}: {value}");
    }
    Ok(())
}

fn summary_line(ctx: &AppContext, item: &MenuItem) -> String {
    let mut line = format!(
        "{:<16} {:<32} {:>9}",
        item.item_id.as_str(),
        item.display_name,
        money(ctx, item.unit_price).to_string()
    );
    if let Some(category) = &item.category {
        line.push_str("  ");
        line.push_str(category);
    }
    if !item.available {
        line.push_str("  (unavailable)");
    }
    line
}
