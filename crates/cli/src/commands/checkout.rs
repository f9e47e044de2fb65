//! Checkout command.
//!
//! Runs the whole flow in one go: create the checkout from the local cart,
//! hand the capture payload to the payment step, finalize, and clear the
//! cart. Nothing is sent unless payment is configured.

use clap::Args;
use serde_json::{Value, json};
use the_wind_core::ShippingAddress;
use the_wind_storefront::Storefront;
use the_wind_storefront::payment::PresetApproval;

use super::{CliError, emit};

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: String,

    #[arg(long)]
    country: String,

    /// Capture payload from the payment provider, as JSON
    #[arg(long, value_name = "JSON")]
    payment_details: String,
}

impl CheckoutArgs {
    fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            address: self.address.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

pub async fn run(storefront: &Storefront, args: CheckoutArgs) -> Result<(), CliError> {
    let payment_details: Value = serde_json::from_str(&args.payment_details)
        .map_err(|e| CliError::InvalidArgument(format!("payment details: {e}")))?;
    storefront
        .config()
        .payment
        .require_client_id()
        .map_err(CliError::Checkout)?;

    let checkout = storefront.begin_checkout(args.shipping_address()).await?;
    tracing::info!(checkout_id = %checkout.id, total = %checkout.total_price, "Paying");

    let confirmation = storefront
        .pay_with(&PresetApproval::new(payment_details))
        .await?;

    emit(&json!({
        "order": confirmation.order,
        "estimatedDelivery": confirmation.estimated_delivery,
    }))
}
