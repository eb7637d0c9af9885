//! Shipping zones and quotes.
//!
//! Zone matching happens on the server; the client only sends the
//! destination and subtotal and displays the quote it gets back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ShippingZoneId;
use crate::validation::{self, ValidationError};

/// A delivery zone as configured in the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZone {
    pub id: ShippingZoneId,
    pub name: String,
    #[serde(default)]
    pub cities: Vec<String>,
    pub cost: Decimal,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default)]
    pub estimated_days: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Body for creating or updating a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZoneInput {
    pub name: String,
    pub cities: Vec<String>,
    pub cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_days: Option<String>,
    pub priority: i32,
    pub active: bool,
}

impl ShippingZoneInput {
    /// # Errors
    ///
    /// Returns an error for a blank name, no cities, or negative amounts.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let name = validation::required_bounded("zone name", &self.name, 100)?.to_owned();
        let cities: Vec<String> = self
            .cities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect();
        if cities.is_empty() {
            return Err(ValidationError::Required("cities"));
        }
        validation::non_negative("shipping cost", self.cost)?;
        if let Some(threshold) = self.free_shipping_threshold {
            validation::non_negative("free shipping threshold", threshold)?;
        }
        Ok(Self {
            name,
            cities,
            cost: self.cost,
            free_shipping_threshold: self.free_shipping_threshold,
            estimated_days: validation::optional(self.estimated_days.as_deref()),
            priority: self.priority,
            active: self.active,
        })
    }
}

/// Body of `POST /shipping/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingQuoteRequest {
    pub city: String,
    pub subtotal: Decimal,
}

/// Shipping cost for a destination, as computed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    #[serde(default)]
    pub zone_name: Option<String>,
    pub cost: Decimal,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default)]
    pub estimated_days: Option<String>,
}

impl ShippingQuote {
    /// How much more the customer must spend to get free shipping.
    #[must_use]
    pub fn remaining_for_free_shipping(&self, subtotal: Decimal) -> Option<Decimal> {
        if self.free_shipping {
            return None;
        }
        self.free_shipping_threshold
            .filter(|threshold| *threshold > subtotal)
            .map(|threshold| threshold - subtotal)
    }
}
