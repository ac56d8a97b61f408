use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storders_core::ProductId;

/// Default currency for catalog prices.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A catalog entry: one orderable part.
///
/// `unit_price` carries four decimal places (semiconductor unit prices are
/// commonly quoted in fractions of a cent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub part_number: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub family: Option<String>,
    pub unit_price: Decimal,
    pub currency: String,
    pub stock_quantity: i32,
    pub lead_time_days: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a product to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub part_number: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub family: Option<String>,
    pub unit_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub stock_quantity: i32,
    pub lead_time_days: Option<i32>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Partial update: `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub part_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub family: Option<String>,
    pub unit_price: Option<Decimal>,
    pub currency: Option<String>,
    pub stock_quantity: Option<i32>,
    pub lead_time_days: Option<i32>,
    pub is_active: Option<bool>,
}

/// Point-in-time pricing answer for one product id.
///
/// This is the contract order creation consumes: the price is copied into the
/// order line, so later catalog changes never rewrite history. The active
/// flag is reported but NOT enforced — inactive products stay orderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit_price: Decimal,
    pub is_active: bool,
}

impl Product {
    /// Materialize a catalog entry from creation input. New products are active.
    pub fn create(id: ProductId, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            part_number: new.part_number,
            name: new.name,
            description: new.description,
            category: new.category,
            family: new.family,
            unit_price: new.unit_price,
            currency: new.currency,
            stock_quantity: new.stock_quantity,
            lead_time_days: new.lead_time_days,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their current value.
    pub fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.part_number {
            self.part_number = v;
        }
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = Some(v);
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.family {
            self.family = Some(v);
        }
        if let Some(v) = patch.unit_price {
            self.unit_price = v;
        }
        if let Some(v) = patch.currency {
            self.currency = v;
        }
        if let Some(v) = patch.stock_quantity {
            self.stock_quantity = v;
        }
        if let Some(v) = patch.lead_time_days {
            self.lead_time_days = Some(v);
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        self.updated_at = now;
    }

    /// Soft delete: the product stays resolvable for pricing and hydration.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            unit_price: self.unit_price,
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Product {
        Product::create(
            ProductId::new(),
            NewProduct {
                part_number: "STM32F407VGT6".to_string(),
                name: "STM32F407 MCU 168MHz 1MB Flash".to_string(),
                description: None,
                category: "Microcontrollers".to_string(),
                family: Some("STM32F4".to_string()),
                unit_price: dec!(8.5200),
                currency: DEFAULT_CURRENCY.to_string(),
                stock_quantity: 15000,
                lead_time_days: Some(12),
            },
            Utc::now(),
        )
    }

    #[test]
    fn new_products_are_active() {
        assert!(sample().is_active);
    }

    #[test]
    fn quote_copies_the_current_price() {
        let mut product = sample();
        let quote = product.quote();
        assert_eq!(quote.unit_price, dec!(8.5200));

        product.apply(
            ProductPatch {
                unit_price: Some(dec!(9.1000)),
                ..Default::default()
            },
            Utc::now(),
        );

        // An already-taken quote is unaffected by later price changes.
        assert_eq!(quote.unit_price, dec!(8.5200));
        assert_eq!(product.quote().unit_price, dec!(9.1000));
    }

    #[test]
    fn deactivated_products_still_quote() {
        let mut product = sample();
        product.deactivate(Utc::now());

        let quote = product.quote();
        assert!(!quote.is_active);
        assert_eq!(quote.unit_price, dec!(8.5200));
    }
}
