//! Admin console commands.
//!
//! # Usage
//!
//! ```bash
//! wind admin users add -n "Grace" -e grace@example.com -p secret1 -r admin
//! wind admin products update 65f1c0ffee --price 49.99 --image ./shoe.png
//! wind admin orders status 65f1dead Delivered
//! ```
//!
//! Every command needs a signed-in admin; others are refused before any
//! request goes out.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;
use the_wind_admin::AdminConsole;
use the_wind_core::{
    Email, NewProduct, NewUser, OrderId, OrderStatus, Price, ProductId, ProductUpdate, Role,
    UserId, UserUpdate,
};
use the_wind_storefront::Storefront;

use super::{CliError, emit, say};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List every user
    List,
    /// Create a user
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: Email,
        #[arg(short, long)]
        password: String,
        /// `admin` or `customer`
        #[arg(short, long, default_value = "customer")]
        role: Role,
    },
    /// Change a user's name, email or role
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: Email,
        #[arg(short, long)]
        role: Role,
    },
    /// Delete a user
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List every product
    List,
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        sku: String,
        #[arg(long, default_value = "0")]
        count_in_stock: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
    },
    /// Edit a product; unset options keep their current value
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        count_in_stock: Option<u32>,
        #[arg(long)]
        description: Option<String>,
        /// Image file to upload and append (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List every order with the dashboard totals
    List,
    /// Set an order's status
    Status {
        id: String,
        /// Processing, Shipped, Delivered or Cancelled
        status: OrderStatus,
    },
    /// Delete an order
    Delete { id: String },
}

fn console(storefront: &Storefront) -> Result<AdminConsole, CliError> {
    Ok(AdminConsole::require(
        storefront.session(),
        storefront.api().clone(),
    )?)
}

pub async fn run(storefront: &Storefront, action: AdminAction) -> Result<(), CliError> {
    let console = console(storefront)?;
    match action {
        AdminAction::Users { action } => users(&console, action).await,
        AdminAction::Products { action } => products(&console, action).await,
        AdminAction::Orders { action } => orders(&console, action).await,
    }
}

async fn users(console: &AdminConsole, action: UsersAction) -> Result<(), CliError> {
    let users = console.users();
    match action {
        UsersAction::List => emit(&users.fetch_all().await?),
        UsersAction::Add {
            name,
            email,
            password,
            role,
        } => {
            let user = NewUser {
                name,
                email,
                password,
                role,
            };
            emit(&users.create(&user).await?)
        }
        UsersAction::Update {
            id,
            name,
            email,
            role,
        } => {
            let update = UserUpdate { name, email, role };
            emit(&users.update(&UserId::from(id), &update).await?)
        }
        UsersAction::Delete { id } => {
            users.delete(&UserId::from(id.as_str())).await?;
            say(format!("Deleted user {id}"));
            Ok(())
        }
    }
}

async fn products(console: &AdminConsole, action: ProductsAction) -> Result<(), CliError> {
    let products = console.products();
    match action {
        ProductsAction::List => emit(&products.fetch_all().await?),
        ProductsAction::Create {
            name,
            price,
            sku,
            count_in_stock,
            description,
            category,
            brand,
        } => {
            let product = NewProduct {
                name,
                price: Price::new(price),
                count_in_stock,
                sku,
                description,
                category,
                brand,
            };
            emit(&products.create(&product).await?)
        }
        ProductsAction::Update {
            id,
            name,
            price,
            count_in_stock,
            description,
            images,
        } => {
            let id = ProductId::from(id);
            products.fetch_all().await?;
            let current = products
                .find(&id)
                .ok_or_else(|| CliError::InvalidArgument(format!("no product with id {id}")))?;

            let mut update = ProductUpdate::from_product(&current);
            if let Some(name) = name {
                update.name = Some(name);
            }
            if let Some(price) = price {
                update.price = Some(Price::new(price));
            }
            if let Some(count) = count_in_stock {
                update.count_in_stock = Some(count);
            }
            if let Some(description) = description {
                update.description = Some(description);
            }
            for path in &images {
                products.attach_image(&mut update, path).await?;
            }

            emit(&products.update(&id, &update).await?)
        }
        ProductsAction::Delete { id } => {
            products.delete(&ProductId::from(id.as_str())).await?;
            say(format!("Deleted product {id}"));
            Ok(())
        }
    }
}

async fn orders(console: &AdminConsole, action: OrdersAction) -> Result<(), CliError> {
    let orders = console.orders();
    match action {
        OrdersAction::List => {
            orders.fetch_all().await?;
            let state = orders.snapshot();
            emit(&json!({
                "orders": state.orders,
                "totalOrders": state.total_orders,
                "totalSales": state.total_sales,
            }))
        }
        OrdersAction::Status { id, status } => {
            emit(&orders.update_status(&OrderId::from(id), status).await?)
        }
        OrdersAction::Delete { id } => {
            orders.delete(&OrderId::from(id.as_str())).await?;
            say(format!("Deleted order {id}"));
            Ok(())
        }
    }
}

pub async fn upload(storefront: &Storefront, path: &Path) -> Result<(), CliError> {
    let console = console(storefront)?;
    let url = console
        .api()
        .upload_image_file(path)
        .await?;
    emit(&json!({ "imageUrl": url }))
}
