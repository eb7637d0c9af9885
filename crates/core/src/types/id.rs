//! Newtype IDs for server-assigned entity references.
//!
//! The backend hands out opaque string identifiers. The client never parses
//! or orders them; it only compares them for equality. `define_id!` keeps
//! identifiers from different entities from being mixed up.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define an opaque, server-assigned ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `Display`, `From<&str>`, `From<String>`
///
/// # Example
///
/// ```rust
/// # use paperclip_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(SupplierId);
///
/// let invoice = InvoiceId::new("665f1c2e");
/// let supplier = SupplierId::new("665f1c2e");
///
/// // Same text, different types, so this won't compile:
/// // let _: InvoiceId = supplier;
/// assert_eq!(invoice.as_str(), supplier.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a server-assigned identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);
define_id!(UserId);
define_id!(ReviewId);
define_id!(ShippingZoneId);
define_id!(NotificationId);

/// Identity of an item that only exists on this client.
///
/// Demo and mock products shown before the catalog loads carry one of these
/// instead of a [`ProductId`]. They can never be resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalItemId(Uuid);

impl LocalItemId {
    /// Mint a fresh random local identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LocalItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local:{}", self.0)
    }
}

/// Key that identifies a cart or wishlist entry.
///
/// Serialised flattened into the owning product: a server item carries an
/// `id` field, a client-only item a `local_id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    /// Identity assigned by the backend.
    Server {
        /// Server product id.
        id: ProductId,
    },
    /// Client-only identity.
    Local {
        /// Locally minted id.
        local_id: LocalItemId,
    },
}

impl ItemKey {
    /// Key for a server-assigned product id.
    #[must_use]
    pub const fn server(id: ProductId) -> Self {
        Self::Server { id }
    }

    /// Returns the server id, if this key has one.
    #[must_use]
    pub const fn server_id(&self) -> Option<&ProductId> {
        match self {
            Self::Server { id } => Some(id),
            Self::Local { .. } => None,
        }
    }

    /// Whether the backend knows about this item.
    #[must_use]
    pub const fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server { id } => write!(f, "{id}"),
            Self::Local { local_id } => write!(f, "{local_id}"),
        }
    }
}

/// Parses the `Display` form: `local:<uuid>` or a bare server id.
impl std::str::FromStr for ItemKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty item key".to_string());
        }
        match s.strip_prefix("local:") {
            Some(raw) => Uuid::parse_str(raw)
                .map(|uuid| LocalItemId(uuid).into())
                .map_err(|e| format!("invalid local item key: {e}")),
            None => Ok(Self::server(ProductId::new(s))),
        }
    }
}

impl From<ProductId> for ItemKey {
    fn from(id: ProductId) -> Self {
        Self::Server { id }
    }
}

impl From<LocalItemId> for ItemKey {
    fn from(local_id: LocalItemId) -> Self {
        Self::Local { local_id }
    }
}
