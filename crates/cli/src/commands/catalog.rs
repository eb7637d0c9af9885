//! Catalog browsing and product reviews.

use clap::{Args, Subcommand};
use paperclip_core::content::{ReviewForm, average_rating};
use paperclip_core::{ProductId, ProductQuery, SortOrder};
use paperclip_storefront::{Result, Shop};
use rust_decimal::Decimal;

use super::Output;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, with optional filters
    List(ListArgs),
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// List product categories
    Categories,
    /// List the reviews of a product
    Reviews {
        /// Product ID
        id: String,
    },
    /// Review a product (requires sign-in)
    Review {
        /// Product ID
        id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text
        #[arg(short, long)]
        comment: String,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,

    /// Restrict to a category
    #[arg(short, long)]
    category: Option<String>,

    /// Minimum price
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Maximum price
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Only products with stock
    #[arg(long)]
    in_stock: bool,

    /// Sort order (`newest`, `price_asc`, `price_desc`, `name`, `rating`)
    #[arg(long, default_value = "newest")]
    sort: SortOrder,

    /// Page number, starting at 1
    #[arg(short, long)]
    page: Option<u32>,

    /// Products per page
    #[arg(short, long)]
    limit: Option<u32>,
}

impl From<ListArgs> for ProductQuery {
    fn from(args: ListArgs) -> Self {
        Self {
            search: super::non_blank(args.search),
            category: super::non_blank(args.category),
            min_price: args.min_price,
            max_price: args.max_price,
            in_stock: args.in_stock,
            sort: args.sort,
            page: args.page,
            limit: args.limit,
        }
    }
}

pub async fn run(shop: &mut Shop, out: &Output, action: CatalogAction) -> Result<()> {
    match action {
        CatalogAction::List(args) => {
            let page = shop.products(&args.into()).await?;
            if page.products.is_empty() {
                println!("No products match.");
                return Ok(());
            }
            for product in &page.products {
                println!("{}", out.product_line(product));
            }
            println!("Page {} of {} ({} products)", page.page, page.pages.max(1), page.total);
        }
        CatalogAction::Show { id } => {
            let product = shop.product(&ProductId::new(id)).await?;
            println!("{}", product.name);
            println!("  Category: {}", product.category);
            if let Some(brand) = &product.brand {
                println!("  Brand:    {brand}");
            }
            print!("  Price:    {}", out.price(product.price));
            if let Some(original) = product.original_price.filter(|p| *p > product.price) {
                print!(" (was {})", out.price(original));
            }
            println!();
            println!("  Stock:    {}", product.stock);
            if let Some(rating) = product.rating {
                println!("  Rating:   {rating:.1}/5");
            }
            if !product.tags.is_empty() {
                println!("  Tags:     {}", product.tags.join(", "));
            }
            if let Some(description) = &product.description {
                println!();
                println!("{description}");
            }
        }
        CatalogAction::Categories => {
            for category in shop.categories().await? {
                println!("{category}");
            }
        }
        CatalogAction::Reviews { id } => {
            let reviews = shop.reviews(&ProductId::new(id)).await?;
            match average_rating(&reviews) {
                Some(avg) => println!("{} reviews, average {avg:.1}/5", reviews.len()),
                None => println!("No reviews yet."),
            }
            for review in &reviews {
                println!(
                    "{} {}/5 ({})  {}",
                    review.user_name,
                    review.rating,
                    review.created_at.format("%Y-%m-%d"),
                    review.comment
                );
            }
        }
        CatalogAction::Review { id, rating, comment } => {
            let form = ReviewForm { rating, comment };
            shop.add_review(&ProductId::new(id), &form).await?;
            println!("Thanks for your review.");
        }
    }
    Ok(())
}
