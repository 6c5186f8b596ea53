//! Sign-in commands.

use plateful_core::{UserId, UserRole};
use plateful_storefront::AppContext;
use plateful_storefront::error::Result;

/// Sign in as `user_id`.
#[allow(clippy::print_stdout)]
pub async fn login(ctx: &AppContext, user_id: UserId, admin: bool) -> Result<()> {
    let role = if admin {
        UserRole::Admin
    } else {
        UserRole::Customer
    };
    ctx.sign_in(user_id.clone(), role).await?;
    println!("Signed in as {user_id} ({role})");
    Ok(())
}

/// Sign out.
#[allow(clippy::print_stdout)]
pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.sign_out().await?;
    println!("Signed out");
    Ok(())
}

/// Print the signed-in user.
#[allow(clippy::print_stdout)]
pub fn whoami(ctx: &AppContext) {
    match ctx.session().user() {
        Some(user) => println!("{} ({})", user.user_id, user.role),
        None => println!("Not signed in"),
    }
}
