//! Back-office commands.
//!
//! Every command needs a confirmed admin session; the shop refuses them
//! otherwise without contacting the server.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use paperclip_core::admin::ProductForm;
use paperclip_core::shipping::{ShippingZone, ShippingZoneInput};
use paperclip_core::{OrderId, OrderStatus, ProductId, ShippingZoneId, UserId};
use paperclip_storefront::api::ImageUpload;
use paperclip_storefront::{Result, Shop};
use rust_decimal::Decimal;

use super::{Output, non_blank};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Headline numbers, recent orders and low stock
    Dashboard,
    /// List every order
    Orders,
    /// Change an order's status
    OrderStatus { id: String, status: OrderStatus },
    /// List users
    Users,
    /// Delete a user
    DeleteUser { id: String },
    /// Grant or revoke admin rights
    ToggleAdmin { id: String },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage shipping zones
    Zone {
        #[command(subcommand)]
        action: ZoneAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    Create {
        #[command(flatten)]
        fields: ProductArgs,

        /// Product image (jpg, png, webp or gif, at most 5 MiB)
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Update {
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    price: Decimal,

    /// Price before discount
    #[arg(long)]
    original_price: Option<Decimal>,

    #[arg(long, default_value_t = 0)]
    stock: u32,

    #[arg(long)]
    brand: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            category: args.category,
            price: args.price,
            original_price: args.original_price,
            stock: args.stock,
            brand: non_blank(args.brand),
            description: non_blank(args.description),
            tags: args.tags,
        }
    }
}

#[derive(Subcommand)]
pub enum ZoneAction {
    List,
    Create(ZoneArgs),
    Update {
        id: String,

        #[command(flatten)]
        fields: ZoneArgs,
    },
    Delete { id: String },
}

#[derive(Args)]
pub struct ZoneArgs {
    #[arg(long)]
    name: String,

    /// Comma-separated list of cities served
    #[arg(long, value_delimiter = ',', required = true)]
    cities: Vec<String>,

    #[arg(long)]
    cost: Decimal,

    /// Orders at or above this subtotal ship free
    #[arg(long)]
    free_over: Option<Decimal>,

    /// Delivery estimate, e.g. "2-3"
    #[arg(long)]
    days: Option<String>,

    /// Higher priority wins when zones overlap
    #[arg(long, default_value_t = 0)]
    priority: i32,

    /// Create the zone disabled
    #[arg(long)]
    inactive: bool,
}

impl From<ZoneArgs> for ShippingZoneInput {
    fn from(args: ZoneArgs) -> Self {
        Self {
            name: args.name,
            cities: args.cities,
            cost: args.cost,
            free_shipping_threshold: args.free_over,
            estimated_days: non_blank(args.days),
            priority: args.priority,
            active: !args.inactive,
        }
    }
}

pub async fn run(shop: &mut Shop, out: &Output, action: AdminAction) -> Result<()> {
    match action {
        AdminAction::Dashboard => {
            let stats = shop.dashboard().await?;
            println!("Revenue   {}", out.price(stats.total_revenue));
            println!("Orders    {} ({} pending)", stats.total_orders, stats.pending_orders);
            println!("Products  {}", stats.total_products);
            println!("Users     {}", stats.total_users);
            if !stats.recent_orders.is_empty() {
                println!("\nRecent orders");
                for order in &stats.recent_orders {
                    println!("  {}", out.order_line(order));
                }
            }
            if !stats.low_stock.is_empty() {
                println!("\nLow stock");
                for product in &stats.low_stock {
                    println!("  {:>4}  {}", product.stock, product.name);
                }
            }
        }
        AdminAction::Orders => {
            for order in &shop.all_orders().await? {
                println!("{}", out.order_line(order));
            }
        }
        AdminAction::OrderStatus { id, status } => {
            let order = shop.update_order_status(&OrderId::new(id), status).await?;
            println!("Order {} is now {}.", order.reference(), order.status);
        }
        AdminAction::Users => {
            for user in &shop.users().await? {
                let role = if user.is_admin { "admin" } else { "" };
                println!("{:<26} {:<24} {:<32} {role}", user.id.as_str(), user.name, user.email);
            }
        }
        AdminAction::DeleteUser { id } => {
            shop.delete_user(&UserId::new(id)).await?;
            println!("User deleted.");
        }
        AdminAction::ToggleAdmin { id } => {
            let user = shop.toggle_admin(&UserId::new(id)).await?;
            let state = if user.is_admin { "now" } else { "no longer" };
            println!("{} is {state} an admin.", user.name);
        }
        AdminAction::Product { action } => run_product(shop, out, action).await?,
        AdminAction::Zone { action } => run_zone(shop, out, action).await?,
    }
    Ok(())
}

async fn run_product(shop: &mut Shop, out: &Output, action: ProductAction) -> Result<()> {
    match action {
        ProductAction::Create { fields, image } => {
            let image = match image {
                Some(path) => Some(ImageUpload::from_path(&path).await?),
                None => None,
            };
            let product = shop.create_product(&fields.into(), image).await?;
            println!("Created {}", out.product_line(&product));
        }
        ProductAction::Update { id, fields } => {
            let product = shop.update_product(&ProductId::new(id), &fields.into()).await?;
            println!("Updated {}", out.product_line(&product));
        }
        ProductAction::Delete { id } => {
            shop.delete_product(&ProductId::new(id)).await?;
            println!("Product deleted.");
        }
    }
    Ok(())
}

async fn run_zone(shop: &mut Shop, out: &Output, action: ZoneAction) -> Result<()> {
    match action {
        ZoneAction::List => {
            for zone in &shop.shipping_zones().await? {
                print_zone(out, zone);
            }
        }
        ZoneAction::Create(fields) => {
            let zone = shop.create_shipping_zone(&fields.into()).await?;
            print_zone(out, &zone);
        }
        ZoneAction::Update { id, fields } => {
            let zone = shop
                .update_shipping_zone(&ShippingZoneId::new(id), &fields.into())
                .await?;
            print_zone(out, &zone);
        }
        ZoneAction::Delete { id } => {
            shop.delete_shipping_zone(&ShippingZoneId::new(id)).await?;
            println!("Shipping zone deleted.");
        }
    }
    Ok(())
}

fn print_zone(out: &Output, zone: &ShippingZone) {
    let status = if zone.active { "" } else { " (inactive)" };
    println!(
        "{} {}{status}: {} [{}]",
        zone.id,
        zone.name,
        out.price(zone.cost),
        zone.cities.join(", ")
    );
    if let Some(threshold) = zone.free_shipping_threshold {
        println!("    free over {}", out.price(threshold));
    }
}
