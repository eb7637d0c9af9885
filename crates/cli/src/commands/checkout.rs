//! Checkout commands.

use clap::{Args, Subcommand};
use paperclip_core::PaymentMethod;
use paperclip_core::order::ShippingDetails;
use paperclip_storefront::{Result, Shop};

use super::{Output, non_blank};

#[derive(Subcommand)]
pub enum CheckoutAction {
    /// Quote shipping for the current cart
    Quote {
        /// Delivery city
        #[arg(short, long)]
        city: String,
    },
    /// Place an order for the whole cart
    Place(PlaceArgs),
}

#[derive(Args)]
pub struct PlaceArgs {
    /// Recipient name
    #[arg(long)]
    name: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: Option<String>,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,

    /// `cash_on_delivery`, `card` or `bank_transfer`
    #[arg(long, default_value = "cash_on_delivery")]
    payment: PaymentMethod,
}

pub async fn run(shop: &mut Shop, out: &Output, action: CheckoutAction) -> Result<()> {
    match action {
        CheckoutAction::Quote { city } => {
            let summary = shop.checkout_quote(&city).await?;
            println!("Subtotal {}", out.price(summary.subtotal));
            match &summary.shipping.zone_name {
                Some(zone) => println!("Shipping {} ({zone})", out.price(summary.shipping_cost())),
                None => println!("Shipping {}", out.price(summary.shipping_cost())),
            }
            println!("Total    {}", out.price(summary.total));
            if let Some(days) = &summary.shipping.estimated_days {
                println!("Delivery in {days} days");
            }
            if let Some(remaining) = summary.shipping.remaining_for_free_shipping(summary.subtotal) {
                println!("Spend {} more for free shipping.", out.price(remaining));
            }
        }
        CheckoutAction::Place(args) => {
            let shipping = ShippingDetails {
                full_name: args.name,
                phone: args.phone,
                address: args.address,
                city: args.city,
                postal_code: non_blank(args.postal_code),
                notes: non_blank(args.notes),
            };
            let order = shop.place_order(&shipping, args.payment).await?;
            println!("Thank you! Order {} has been placed.", order.reference());
            out.order_detail(&order);
        }
    }
    Ok(())
}
