//! Cart commands.
//!
//! Every call goes out under the current identity: the signed-in user's
//! id plus the guest id.

use std::num::NonZeroU32;

use clap::{Args, Subcommand};
use the_wind_core::LineKey;
use the_wind_storefront::Storefront;

use super::{CliError, emit, say};

/// One cart line: product plus optional size and color.
#[derive(Args)]
pub struct LineArgs {
    /// Product id
    product_id: String,

    #[arg(long)]
    size: Option<String>,

    #[arg(long)]
    color: Option<String>,
}

impl LineArgs {
    fn key(&self) -> LineKey {
        let mut key = LineKey::new(self.product_id.as_str());
        if let Some(size) = &self.size {
            key = key.with_size(size);
        }
        if let Some(color) = &self.color {
            key = key.with_color(color);
        }
        key
    }
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Fetch the cart from the backend
    Show,
    /// Add a line, or more of an existing one
    Add {
        #[command(flatten)]
        line: LineArgs,
        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,
    },
    /// Set a line's quantity
    Update {
        #[command(flatten)]
        line: LineArgs,
        #[arg(short, long)]
        quantity: NonZeroU32,
    },
    /// One more of a line
    Inc {
        #[command(flatten)]
        line: LineArgs,
    },
    /// One fewer of a line; a single item is left alone
    Dec {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Forget the local cart without calling the backend
    Clear,
}

pub async fn run(storefront: &Storefront, action: CartAction) -> Result<(), CliError> {
    let cart = match action {
        CartAction::Show => storefront.refresh_cart().await?,
        CartAction::Add { line, quantity } => storefront.add_to_cart(&line.key(), quantity).await?,
        CartAction::Update { line, quantity } => {
            storefront.set_quantity(&line.key(), quantity).await?
        }
        CartAction::Inc { line } => adjust(storefront, &line, 1).await?,
        CartAction::Dec { line } => adjust(storefront, &line, -1).await?,
        CartAction::Remove { line } => storefront.remove_from_cart(&line.key()).await?,
        CartAction::Clear => {
            storefront.cart().clear();
            say("Cart cleared");
            return Ok(());
        }
    };
    emit(&cart)
}

async fn adjust(
    storefront: &Storefront,
    line: &LineArgs,
    delta: i64,
) -> Result<the_wind_core::Cart, CliError> {
    let key = line.key();
    match storefront.adjust_quantity(&key, delta).await? {
        Some(cart) => Ok(cart),
        None => {
            tracing::info!(product_id = %key.product_id, "Quantity unchanged");
            Ok(storefront.cart().cart())
        }
    }
}
