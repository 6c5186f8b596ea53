//! Plateful CLI - order food from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu
//! plateful menu list --category noodles
//! plateful menu show ramen
//!
//! # Build a cart and check out
//! plateful login alice
//! plateful cart add ramen -q 2
//! plateful cart set ramen 3
//! plateful checkout
//!
//! # Kitchen staff
//! plateful login chef --admin
//! plateful admin orders --status pending
//! plateful admin set-status o-42 preparing
//! ```
//!
//! # Commands
//!
//! - `menu` - Browse dishes
//! - `cart` - Inspect and change the cart
//! - `checkout` - Place an order for the cart
//! - `orders` - Order history
//! - `reviews` - Read and write dish reviews
//! - `login` / `logout` / `whoami` - Session
//! - `admin` - Manage every order (admin role)
//!
//! The cart and session persist under `PLATEFUL_DATA_DIR` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plateful_storefront::notify::ChannelNotifier;
use plateful_storefront::{AppContext, StorefrontConfig, StorefrontError};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "plateful")]
#[command(author, version, about = "Order food from the Plateful kitchen")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the menu
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout,
    /// Your order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Dish reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
    /// Sign in as a user
    Login {
        /// User identifier
        user_id: String,

        /// Sign in with the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Sign out (the cart is kept)
    Logout,
    /// Show who is signed in
    Whoami,
    /// Manage orders (admin role)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MenuAction {
    /// List dishes
    List {
        /// Only dishes in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one dish
    Show {
        /// Menu item ID
        item_id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a dish
    Add {
        /// Menu item ID
        item_id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a dish
    Remove {
        /// Menu item ID
        item_id: String,
    },
    /// Set the quantity of a dish already in the cart (0 removes it)
    Set {
        /// Menu item ID
        item_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show {
        /// Order ID
        order_id: String,
    },
}

#[derive(Subcommand)]
enum ReviewsAction {
    /// Reviews of a dish
    List {
        /// Menu item ID
        item_id: String,
    },
    /// Review a dish
    Add {
        /// Menu item ID
        item_id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: i64,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Change one of your reviews
    Edit {
        /// Review ID
        review_id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: i64,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Delete one of your reviews
    Delete {
        /// Review ID
        review_id: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order
    Orders {
        /// Only orders in this status
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Move an order to a new status
    SetStatus {
        /// Order ID
        order_id: String,

        /// New status (pending, preparing, ready, out_for_delivery, delivered, cancelled)
        status: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so command output stays on stdout.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plateful_storefront=info,plateful_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is needed before Sentry, which must precede tracing
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::debug!("Command failed: {e}");
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (notifier, mut notifications) = ChannelNotifier::new();
    let ctx = AppContext::with_notifier(config, Arc::new(notifier)).await?;

    let result = dispatch(&ctx, cli.command).await;

    // The cart is persisted whatever the outcome
    if let Err(e) = ctx.flush().await {
        tracing::warn!(error = %e, "Failed to persist cart");
    }
    commands::print_notifications(&mut notifications);

    result.map_err(|e| {
        e.report();
        e.user_message().into()
    })
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<(), StorefrontError> {
    match command {
        Commands::Menu { action } => match action {
            MenuAction::List { category } => commands::menu::list(ctx, category.as_deref()).await?,
            MenuAction::Show { item_id } => commands::menu::show(ctx, &item_id.into()).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx),
            CartAction::Add { item_id, quantity } => {
                commands::cart::add(ctx, &item_id.into(), quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(ctx, &item_id.into()),
            CartAction::Set { item_id, quantity } => {
                commands::cart::set(ctx, &item_id.into(), quantity);
            }
            CartAction::Clear => commands::cart::clear(ctx),
        },
        Commands::Checkout => commands::orders::checkout(ctx).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(ctx).await?,
            OrdersAction::Show { order_id } => {
                commands::orders::show(ctx, &order_id.into()).await?;
            }
        },
        Commands::Reviews { action } => match action {
            ReviewsAction::List { item_id } => {
                commands::reviews::list(ctx, &item_id.into()).await?;
            }
            ReviewsAction::Add {
                item_id,
                rating,
                comment,
            } => commands::reviews::add(ctx, item_id.into(), rating, comment).await?,
            ReviewsAction::Edit {
                review_id,
                rating,
                comment,
            } => commands::reviews::edit(ctx, &review_id.into(), rating, comment).await?,
            ReviewsAction::Delete { review_id } => {
                commands::reviews::delete(ctx, &review_id.into()).await?;
            }
        },
        Commands::Login { user_id, admin } => {
            commands::session::login(ctx, user_id.into(), admin).await?;
        }
        Commands::Logout => commands::session::logout(ctx).await?,
        Commands::Whoami => commands::session::whoami(ctx),
        Commands::Admin { action } => match action {
            AdminAction::Orders { status } => {
                commands::admin::orders(ctx, status.as_deref()).await?;
            }
            AdminAction::SetStatus { order_id, status } => {
                commands::admin::set_status(ctx, &order_id.into(), &status).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_quantity_parses() {
        let cli = Cli::try_parse_from(["plateful", "cart", "set", "ramen", "-1"]);
        assert!(cli.is_ok());
    }
}
