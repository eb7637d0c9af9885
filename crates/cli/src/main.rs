//! Paperclip CLI - Browse the catalog, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! paperclip catalog list --category Paper --sort price_asc
//! paperclip catalog show 64b7f0c1a2
//!
//! # Sign in and shop
//! paperclip account login -e ada@example.com
//! paperclip cart add 64b7f0c1a2
//! paperclip checkout place --name "Ada Lovelace" --phone "+1 555 010 2000" \
//!     --address "1 Analytical Way" --city Springfield
//!
//! # Back-office
//! paperclip admin dashboard
//! paperclip admin order-status 64b8aa 'shipped'
//! ```
//!
//! # Commands
//!
//! - `catalog` - Products, categories and reviews
//! - `cart` / `wishlist` - Local lists, reconciled with the catalog on view
//! - `account` - Sign-in, profile, order history, notifications
//! - `checkout` - Shipping quote and order placement
//! - `contact` / `quote` / `newsletter` - Public forms
//! - `admin` - Dashboard, orders, users, products, shipping zones
//!
//! Configuration comes from the environment; see
//! [`paperclip_storefront::StorefrontConfig`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use paperclip_storefront::{AppError, Shop, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Handlers write their results to stdout.
#[allow(clippy::print_stdout)]
mod commands;

#[derive(Parser)]
#[command(name = "paperclip")]
#[command(author, version, about = "Paperclip office-supply storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products, categories and reviews
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// View and edit the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// View and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::cart::WishlistAction,
    },
    /// Sign in, manage the profile and view orders
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Quote shipping and place an order
    Checkout {
        #[command(subcommand)]
        action: commands::checkout::CheckoutAction,
    },
    /// Send a message to the shop
    Contact(commands::content::ContactArgs),
    /// Request a bulk quote
    Quote(commands::content::QuoteArgs),
    /// Manage a newsletter subscription
    Newsletter {
        #[command(subcommand)]
        action: commands::content::NewsletterAction,
    },
    /// Back-office (admin accounts only)
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
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

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fail(&AppError::from(e)),
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paperclip_storefront=warn,paperclip=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let code = match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            fail(&e)
        }
    };
    drop(sentry_guard);
    code
}

#[allow(clippy::print_stderr)]
fn fail(err: &AppError) -> ExitCode {
    eprintln!("error: {}", err.user_message());
    ExitCode::FAILURE
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    let mut shop = Shop::open(config)?;
    shop.bootstrap().await;

    let out = commands::Output::new(config.currency);
    match cli.command {
        Commands::Catalog { action } => commands::catalog::run(&mut shop, &out, action).await,
        Commands::Cart { action } => commands::cart::run_cart(&mut shop, &out, action).await,
        Commands::Wishlist { action } => commands::cart::run_wishlist(&mut shop, &out, action).await,
        Commands::Account { action } => commands::account::run(&mut shop, &out, action).await,
        Commands::Checkout { action } => commands::checkout::run(&mut shop, &out, action).await,
        Commands::Contact(args) => commands::content::contact(&mut shop, args).await,
        Commands::Quote(args) => commands::content::quote(&mut shop, args).await,
        Commands::Newsletter { action } => commands::content::newsletter(&mut shop, action).await,
        Commands::Admin { action } => commands::admin::run(&mut shop, &out, action).await,
    }
}
