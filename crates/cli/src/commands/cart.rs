//! Cart and wishlist commands.
//!
//! Items are addressed by the key printed in the listing: the product id for
//! catalog products, `local:<uuid>` for client-only samples.

use clap::Subcommand;
use paperclip_core::{AddOutcome, ItemKey, ProductId, QuantityChange};
use paperclip_storefront::{AppError, Result, Shop};

use super::{Output, notice};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a catalog product
    Add {
        /// Product ID
        id: String,
    },
    /// Increase a line by one
    Inc { key: ItemKey },
    /// Decrease a line by one (never below 1)
    Dec { key: ItemKey },
    /// Set the quantity of a line
    Set {
        key: ItemKey,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a line
    Remove { key: ItemKey },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a catalog product, or remove it if already saved
    Toggle {
        /// Product ID
        id: String,
    },
    /// Remove an item
    Remove { key: ItemKey },
    /// Move an item into the cart
    Move { key: ItemKey },
}

pub async fn run_cart(shop: &mut Shop, out: &Output, action: CartAction) -> Result<()> {
    match action {
        CartAction::Show => {
            notice(shop.visit_cart().await?);
            show_cart(shop, out);
        }
        CartAction::Add { id } => {
            let product = shop.product(&ProductId::new(id)).await?;
            let name = product.name.clone();
            match shop.state_mut().add_to_cart(product) {
                AddOutcome::Inserted => println!("Added {name} to the cart."),
                AddOutcome::Incremented(qty) => println!("{name} now x{qty} in the cart."),
            }
        }
        CartAction::Inc { key } => {
            let change = shop.state_mut().increment_quantity(&key);
            report_change(&key, change)?;
        }
        CartAction::Dec { key } => {
            let change = shop.state_mut().decrement_quantity(&key);
            report_change(&key, change)?;
        }
        CartAction::Set { key, quantity } => {
            let change = shop.state_mut().set_quantity(&key, quantity);
            report_change(&key, change)?;
        }
        CartAction::Remove { key } => {
            let item = shop
                .state_mut()
                .remove_from_cart(&key)
                .ok_or_else(|| AppError::NotFound(format!("Cart item {key}")))?;
            println!("Removed {} from the cart.", item.product.name);
        }
        CartAction::Clear => {
            shop.state_mut().clear_cart();
            println!("Cart cleared.");
        }
    }
    Ok(())
}

fn show_cart(shop: &Shop, out: &Output) {
    let cart = shop.state().cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<26} {:>3} x {:<32} {:>12}",
            item.product.key.to_string(),
            item.quantity(),
            item.product.name,
            out.price(item.line_total()).to_string()
        );
    }
    println!("{} items, subtotal {}", cart.count(), out.price(cart.total()));
}

fn report_change(key: &ItemKey, change: QuantityChange) -> Result<()> {
    match change {
        QuantityChange::Updated(qty) => println!("Quantity is now {qty}."),
        QuantityChange::AtMinimum => println!("Quantity is already 1; use `cart remove` to drop it."),
        QuantityChange::NotFound => return Err(AppError::NotFound(format!("Cart item {key}"))),
    }
    Ok(())
}

pub async fn run_wishlist(shop: &mut Shop, out: &Output, action: WishlistAction) -> Result<()> {
    match action {
        WishlistAction::Show => {
            notice(shop.visit_wishlist().await?);
            let wishlist = shop.state().wishlist();
            if wishlist.is_empty() {
                println!("Your wishlist is empty.");
            }
            for product in wishlist.items() {
                println!("{}", out.product_line(product));
            }
        }
        WishlistAction::Toggle { id } => {
            let product = shop.product(&ProductId::new(id)).await?;
            let name = product.name.clone();
            if shop.state_mut().toggle_wishlist(product) {
                println!("Saved {name} to the wishlist.");
            } else {
                println!("Removed {name} from the wishlist.");
            }
        }
        WishlistAction::Remove { key } => {
            let product = shop
                .state_mut()
                .remove_from_wishlist(&key)
                .ok_or_else(|| AppError::NotFound(format!("Wishlist item {key}")))?;
            println!("Removed {} from the wishlist.", product.name);
        }
        WishlistAction::Move { key } => {
            shop.state_mut()
                .move_to_cart(&key)
                .ok_or_else(|| AppError::NotFound(format!("Wishlist item {key}")))?;
            println!("Moved to the cart.");
        }
    }
    Ok(())
}
