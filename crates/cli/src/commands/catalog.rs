//! Catalog commands.

use clap::Args;
use serde_json::json;
use the_wind_core::{FilterField, ProductId};
use the_wind_storefront::Storefront;
use the_wind_storefront::containers::collection_filters;

use super::{CliError, emit};

#[derive(Args)]
pub struct ProductsArgs {
    /// Collection route parameter; `all` means no collection filter
    #[arg(long)]
    collection: Option<String>,

    /// Filter query string, as found in a collection URL
    #[arg(long, default_value = "")]
    query: String,

    /// Extra filter as `field=value` (repeatable)
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    /// Search term
    #[arg(short, long)]
    search: Option<String>,

    /// Maximum number of products
    #[arg(long)]
    limit: Option<u32>,
}

/// Split `field=value` into a known filter field and its value.
fn parse_filter(raw: &str) -> Result<(FilterField, &str), CliError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgument(format!("expected field=value, got {raw}")))?;
    let field = field.parse::<FilterField>().map_err(CliError::InvalidArgument)?;
    Ok((field, value))
}

pub async fn products(storefront: &Storefront, args: ProductsArgs) -> Result<(), CliError> {
    let catalog = storefront.catalog();

    if let Some(term) = args.search.as_deref() {
        let products = catalog.search(term).await?;
        return emit(&products);
    }

    let mut filters = collection_filters(args.collection.as_deref(), &args.query);
    for raw in &args.filters {
        let (field, value) = parse_filter(raw)?;
        filters.set(field, value);
    }
    catalog.set_filters(&filters);

    let products = catalog.fetch_by_filters(&filters, args.limit).await?;
    tracing::debug!(query = %filters, count = products.len(), "Fetched products");
    emit(&products)
}

pub async fn product(storefront: &Storefront, id: &str) -> Result<(), CliError> {
    let catalog = storefront.catalog();
    let product = catalog.fetch_details(&ProductId::from(id)).await?;
    let similar = catalog.snapshot().similar_products;
    emit(&json!({
        "product": product,
        "similarProducts": similar,
    }))
}

pub async fn new_arrivals(storefront: &Storefront) -> Result<(), CliError> {
    let products = storefront.catalog().fetch_new_arrivals().await?;
    emit(&products)
}

pub async fn best_seller(storefront: &Storefront) -> Result<(), CliError> {
    let product = storefront.catalog().fetch_best_seller().await?;
    emit(&product)
}
