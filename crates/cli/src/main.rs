//! The Wind CLI - storefront and admin console in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! wind products --collection all --query "gender=Women&sortBy=priceAsc"
//! wind product 65f1c0ffee
//!
//! # Work with the cart (guest or signed in)
//! wind cart add 65f1c0ffee --size M --color Red --quantity 2
//! wind cart inc 65f1c0ffee --size M --color Red
//!
//! # Sign in; a non-empty guest cart is merged into the account
//! wind login -e shopper@example.com
//!
//! # Pay and place the order
//! wind checkout --address "1 Main St" --city Springfield --postal-code 12345 \
//!     --country US --payment-details '{"id":"CAPTURE-1","status":"COMPLETED"}'
//!
//! # Admin console (admin accounts only)
//! wind admin orders status 65f1dead Shipped
//! ```
//!
//! # Environment Variables
//!
//! See `the_wind_storefront::config` for the full list; `WIND_BACKEND_URL`
//! is required. `WIND_PASSWORD` can stand in for `--password`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use the_wind_storefront::{Storefront, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;
use commands::account::{LoginArgs, RegisterArgs};
use commands::admin::AdminAction;
use commands::cart::CartAction;
use commands::catalog::ProductsArgs;
use commands::checkout::CheckoutArgs;

#[derive(Parser)]
#[command(name = "wind")]
#[command(author, version, about = "The Wind storefront and admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products matching filters
    Products(ProductsArgs),
    /// Show one product and similar products
    Product {
        /// Product id
        id: String,
    },
    /// Show the newest products
    NewArrivals,
    /// Show the best-selling product
    BestSeller,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign out and empty the local cart
    Logout,
    /// Show the signed-in user or the guest id
    Whoami,
    /// Show order history, or one order
    Orders {
        /// Order id
        id: Option<String>,
    },
    /// Check out the current cart
    Checkout(CheckoutArgs),
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Upload a product image and print its URL
    Upload {
        /// Image file
        path: std::path::PathBuf,
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "the_wind_cli=info,the_wind_storefront=info,the_wind_admin=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry first so the tracing layer has a client to report to
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, config).await;

    if let Err(e) = result {
        e.report();
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let storefront = Storefront::open(config)?;

    match cli.command {
        Commands::Products(args) => commands::catalog::products(&storefront, args).await,
        Commands::Product { id } => commands::catalog::product(&storefront, &id).await,
        Commands::NewArrivals => commands::catalog::new_arrivals(&storefront).await,
        Commands::BestSeller => commands::catalog::best_seller(&storefront).await,
        Commands::Cart { action } => commands::cart::run(&storefront, action).await,
        Commands::Login(args) => commands::account::login(&storefront, args).await,
        Commands::Register(args) => commands::account::register(&storefront, args).await,
        Commands::Logout => commands::account::logout(&storefront),
        Commands::Whoami => commands::account::whoami(&storefront),
        Commands::Orders { id } => commands::orders::run(&storefront, id.as_deref()).await,
        Commands::Checkout(args) => commands::checkout::run(&storefront, args).await,
        Commands::Admin { action } => commands::admin::run(&storefront, action).await,
        Commands::Upload { path } => commands::admin::upload(&storefront, &path).await,
    }
}
