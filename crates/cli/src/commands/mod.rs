//! Command implementations.
//!
//! Each command prints its result to stdout; failures are returned to `main`.

pub mod admin;
pub mod cart;
pub mod menu;
pub mod orders;
pub mod reviews;
pub mod session;

use plateful_core::Price;
use plateful_storefront::AppContext;
use plateful_storefront::notify::{Notification, NotificationKind};
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedReceiver;

/// Format an amount in the configured display currency.
fn money(ctx: &AppContext, amount: Decimal) -> Price {
    Price::new(amount, ctx.config().currency)
}

/// Print the notifications raised while the command ran.
///
/// Errors are skipped; the failing command reports them itself.
#[allow(clippy::print_stdout)]
pub fn print_notifications(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = rx.try_recv() {
        if notification.kind != NotificationKind::Error {
            println!("{}", notification.message);
        }
    }
}
