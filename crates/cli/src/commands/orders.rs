//! Order history commands.

use the_wind_core::OrderId;
use the_wind_storefront::Storefront;

use super::{CliError, emit};

pub async fn run(storefront: &Storefront, id: Option<&str>) -> Result<(), CliError> {
    let orders = storefront.orders();
    match id {
        Some(id) => emit(&orders.fetch_order_details(&OrderId::from(id)).await?),
        None => emit(&orders.fetch_my_orders().await?),
    }
}
