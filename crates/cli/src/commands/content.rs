//! Public forms: contact, bulk quote, newsletter.

use clap::{Args, Subcommand};
use paperclip_core::content::{ContactForm, QuoteForm};
use paperclip_storefront::{Result, Shop};

use super::non_blank;

#[derive(Args)]
pub struct ContactArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    email: String,

    #[arg(short, long)]
    subject: Option<String>,

    #[arg(short, long)]
    message: String,
}

#[derive(Args)]
pub struct QuoteArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    email: String,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Products wanted, free text
    #[arg(short, long)]
    products: String,

    #[arg(short, long)]
    quantity: Option<u32>,

    #[arg(short, long)]
    message: Option<String>,
}

#[derive(Subcommand)]
pub enum NewsletterAction {
    Subscribe { email: String },
    Unsubscribe { email: String },
}

pub async fn contact(shop: &mut Shop, args: ContactArgs) -> Result<()> {
    let form = ContactForm {
        name: args.name,
        email: args.email,
        subject: non_blank(args.subject),
        message: args.message,
    };
    shop.send_contact(&form).await?;
    println!("Message sent. We will get back to you soon.");
    Ok(())
}

pub async fn quote(shop: &mut Shop, args: QuoteArgs) -> Result<()> {
    let form = QuoteForm {
        name: args.name,
        email: args.email,
        company: non_blank(args.company),
        phone: non_blank(args.phone),
        products: args.products,
        quantity: args.quantity,
        message: non_blank(args.message),
    };
    shop.request_quote(&form).await?;
    println!("Quote request received.");
    Ok(())
}

pub async fn newsletter(shop: &mut Shop, action: NewsletterAction) -> Result<()> {
    match action {
        NewsletterAction::Subscribe { email } => {
            shop.subscribe_newsletter(&email).await?;
            println!("Subscribed {email}.");
        }
        NewsletterAction::Unsubscribe { email } => {
            shop.unsubscribe_newsletter(&email).await?;
            println!("Unsubscribed {email}.");
        }
    }
    Ok(())
}
