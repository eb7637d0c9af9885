//! Account commands: sign-in, profile, order history, notifications.

use std::path::PathBuf;

use clap::Subcommand;
use paperclip_core::account::{LoginForm, PasswordForm, ProfileForm, RegisterForm};
use paperclip_core::{NotificationId, OrderId};
use paperclip_storefront::api::ImageUpload;
use paperclip_storefront::{Result, SessionState, Shop};

use super::{Output, non_blank};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PAPERCLIP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PAPERCLIP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password (defaults to `--password`)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign out on this machine (cart and wishlist are kept)
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update name and phone number
    Profile {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Upload a profile picture
    Avatar {
        /// Image file (jpg, png, webp or gif, at most 5 MiB)
        path: PathBuf,
    },
    /// Change the password
    Password {
        #[arg(long, env = "PAPERCLIP_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long)]
        new: String,

        /// Repeat the new password (defaults to `--new`)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// List my orders
    Orders,
    /// Show one of my orders
    Order { id: String },
    /// Cancel one of my orders
    Cancel { id: String },
    /// List notifications, or mark them read
    Notifications {
        /// Mark this notification as read
        #[arg(long, conflicts_with = "all")]
        read: Option<String>,

        /// Mark all notifications as read
        #[arg(long)]
        all: bool,
    },
}

pub async fn run(shop: &mut Shop, out: &Output, action: AccountAction) -> Result<()> {
    match action {
        AccountAction::Login { email, password } => {
            let user = shop.login(&LoginForm { email, password }).await?;
            println!("Signed in as {} <{}>.", user.name, user.email);
        }
        AccountAction::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let form = RegisterForm {
                name,
                email,
                confirm_password: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            let user = shop.register(&form).await?;
            println!("Welcome, {}. Your account is ready.", user.name);
        }
        AccountAction::Logout => {
            shop.logout();
            println!("Signed out.");
        }
        AccountAction::Whoami => match shop.session() {
            SessionState::SignedOut => println!("Not signed in."),
            SessionState::Tentative(user) => {
                println!("{} <{}> (session not confirmed)", user.name, user.email);
            }
            SessionState::Confirmed(user) => {
                let role = if user.is_admin { " [admin]" } else { "" };
                println!("{} <{}>{role}", user.name, user.email);
            }
        },
        AccountAction::Profile { name, phone } => {
            let form = ProfileForm {
                name,
                phone: non_blank(phone),
            };
            let user = shop.update_profile(&form).await?;
            println!("Profile updated for {}.", user.name);
        }
        AccountAction::Avatar { path } => {
            let image = ImageUpload::from_path(&path).await?;
            shop.upload_avatar(image).await?;
            println!("Profile picture updated.");
        }
        AccountAction::Password { current, new, confirm } => {
            let form = PasswordForm {
                current_password: current,
                confirm_password: confirm.unwrap_or_else(|| new.clone()),
                new_password: new,
            };
            shop.change_password(&form).await?;
            println!("Password changed.");
        }
        AccountAction::Orders => {
            let orders = shop.my_orders().await?;
            if orders.is_empty() {
                println!("No orders yet.");
            }
            for order in &orders {
                println!("{}", out.order_line(order));
            }
        }
        AccountAction::Order { id } => {
            let order = shop.order(&OrderId::new(id)).await?;
            out.order_detail(&order);
        }
        AccountAction::Cancel { id } => {
            let order = shop.cancel_order(&OrderId::new(id)).await?;
            println!("Order {} is now {}.", order.reference(), order.status);
        }
        AccountAction::Notifications { read, all } => {
            if all {
                shop.mark_all_notifications_read().await?;
                println!("All notifications marked as read.");
            } else if let Some(id) = read {
                shop.mark_notification_read(&NotificationId::new(id)).await?;
                println!("Notification marked as read.");
            } else {
                let notifications = shop.notifications().await?;
                if notifications.is_empty() {
                    println!("No notifications.");
                }
                for n in &notifications {
                    let marker = if n.read { ' ' } else { '*' };
                    println!("{marker} {} {}: {}", n.id, n.title, n.message);
                }
            }
        }
    }
    Ok(())
}
