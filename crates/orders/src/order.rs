use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storders_core::{CustomerId, DomainError, OrderId, OrderItemId, ProductId};

/// Currency every order is denominated in. The catalog stores a per-product
/// currency but order totals are not converted; orders are always USD.
pub const ORDER_CURRENCY: &str = "USD";

/// Order status lifecycle.
///
/// `cancelled` and `delivered` are effectively terminal, but no transition
/// legality is enforced anywhere: any status may be set from any other.
/// Tightening this into a real state machine would be a behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire token (lowercase, as stored and serialized).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "status must be one of: pending, confirmed, processing, shipped, delivered, cancelled (got {other:?})"
            ))),
        }
    }
}

/// One requested line before pricing: what the caller asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    /// Positive; enforced at the API boundary, trusted here.
    pub quantity: i32,
}

/// Creation input for a whole order. `items` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Partial update: `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

/// One priced order line, exclusively owned by its order.
///
/// `unit_price` is a copy of the catalog price at the moment of order
/// creation; `line_total` is computed once and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderItem {
    /// Price a requested line from the catalog quote taken at creation time.
    ///
    /// Unit prices carry 4 decimal places; line totals are monetary amounts
    /// rounded to 2.
    pub fn priced(
        id: OrderItemId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
    ) -> Self {
        let line_total = (unit_price * Decimal::from(quantity)).round_dp(2);
        Self {
            id,
            product_id,
            quantity,
            unit_price,
            line_total,
        }
    }
}

/// Order aggregate root, always hydrated together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub currency: String,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub ordered_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Assemble the aggregate at creation time.
    ///
    /// Every created order starts `pending` with no shipment timestamps;
    /// the total is derived from the already-priced lines and never
    /// recomputed afterwards.
    pub fn create(
        id: OrderId,
        order_number: String,
        customer_id: CustomerId,
        shipping_address: Option<String>,
        notes: Option<String>,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> Self {
        let total_amount = Self::total_of(&items);
        Self {
            id,
            order_number,
            customer_id,
            status: OrderStatus::Pending,
            total_amount,
            currency: ORDER_CURRENCY.to_string(),
            shipping_address,
            notes,
            ordered_at: now,
            shipped_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
            items,
        }
    }

    /// Sum of the lines' totals. Commutative, so iteration order never
    /// changes the result.
    pub fn total_of(items: &[OrderItem]) -> Decimal {
        items.iter().map(|item| item.line_total).sum()
    }

    /// Apply a partial update.
    ///
    /// Timestamp side effects run before the field assignment and depend
    /// only on the new status value: the first transition to `shipped`
    /// stamps `shipped_at`, the first to `delivered` stamps `delivered_at`;
    /// a repeat transition never overwrites an existing stamp. No
    /// transition-legality check is performed.
    pub fn apply_update(&mut self, update: OrderUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            if status == OrderStatus::Shipped && self.shipped_at.is_none() {
                self.shipped_at = Some(now);
            } else if status == OrderStatus::Delivered && self.delivered_at.is_none() {
                self.delivered_at = Some(now);
            }
            self.status = status;
        }
        if let Some(v) = update.shipping_address {
            self.shipping_address = Some(v);
        }
        if let Some(v) = update.notes {
            self.notes = Some(v);
        }
        self.updated_at = now;
    }

    /// Cancellation is a status update, not a deletion; the number stays
    /// assigned and the items stay owned.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Cancelled),
                shipping_address: None,
                notes: None,
            },
            now,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn priced_item(quantity: i32, unit_price: Decimal) -> OrderItem {
        OrderItem::priced(OrderItemId::new(), ProductId::new(), quantity, unit_price)
    }

    fn sample_order(items: Vec<OrderItem>) -> Order {
        Order::create(
            OrderId::new(),
            "ST-ORD-202608-0001".to_string(),
            CustomerId::new(),
            Some("Munich, Germany".to_string()),
            None,
            items,
            Utc::now(),
        )
    }

    #[test]
    fn line_total_is_unit_price_times_quantity() {
        let item = priced_item(100, dec!(8.5200));
        assert_eq!(item.line_total, dec!(852.00));
    }

    #[test]
    fn line_total_rounds_to_cents() {
        let item = priced_item(3, dec!(1.3333));
        assert_eq!(item.line_total, dec!(4.00));
    }

    #[test]
    fn created_order_is_pending_with_derived_total() {
        let order = sample_order(vec![
            priced_item(100, dec!(8.5200)),
            priced_item(2, dec!(0.4200)),
        ]);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, dec!(852.84));
        assert_eq!(order.currency, ORDER_CURRENCY);
        assert!(order.shipped_at.is_none());
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn empty_order_is_permitted_with_zero_total() {
        let order = sample_order(vec![]);
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert!(order.items.is_empty());
    }

    #[test]
    fn shipped_at_is_stamped_exactly_once() {
        let mut order = sample_order(vec![priced_item(1, dec!(1.0000))]);

        let first = Utc::now();
        order.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Shipped),
                ..Default::default()
            },
            first,
        );
        assert_eq!(order.shipped_at, Some(first));

        let second = first + chrono::Duration::hours(1);
        order.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Shipped),
                ..Default::default()
            },
            second,
        );
        assert_eq!(order.shipped_at, Some(first));
        assert_eq!(order.updated_at, second);
    }

    #[test]
    fn delivered_at_is_independent_of_shipped() {
        let mut order = sample_order(vec![]);

        let at = Utc::now();
        order.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Delivered),
                ..Default::default()
            },
            at,
        );

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.delivered_at, Some(at));
        assert!(order.shipped_at.is_none());
    }

    #[test]
    fn any_status_is_reachable_from_any_other() {
        let mut order = sample_order(vec![]);

        order.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Delivered),
                ..Default::default()
            },
            Utc::now(),
        );
        // Going backwards is accepted; there is no state machine here.
        order.apply_update(
            OrderUpdate {
                status: Some(OrderStatus::Pending),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(order.status, OrderStatus::Pending);
        // The delivered stamp survives the regression.
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn partial_update_leaves_unspecified_fields_unchanged() {
        let mut order = sample_order(vec![priced_item(5, dec!(2.0000))]);
        let total_before = order.total_amount;

        order.apply_update(
            OrderUpdate {
                notes: Some("expedite".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping_address.as_deref(), Some("Munich, Germany"));
        assert_eq!(order.notes.as_deref(), Some("expedite"));
        // A status-only or field-only update never touches the total.
        assert_eq!(order.total_amount, total_before);
    }

    #[test]
    fn cancel_is_a_plain_status_update() {
        let mut order = sample_order(vec![]);
        order.cancel(Utc::now());
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.items.len(), 0);
    }

    #[test]
    fn status_tokens_are_lowercase_on_the_wire() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");

        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);

        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_line_totals(
            lines in proptest::collection::vec((1i32..=10_000, 1u64..=100_000_000), 0..12)
        ) {
            let items: Vec<OrderItem> = lines
                .iter()
                .map(|&(quantity, price_ten_thousandths)| {
                    // Unit prices carry 4 decimal places.
                    let unit_price = Decimal::new(price_ten_thousandths as i64, 4);
                    priced_item(quantity, unit_price)
                })
                .collect();

            let order = sample_order(items.clone());

            let expected: Decimal = items.iter().map(|i| i.line_total).sum();
            prop_assert_eq!(order.total_amount, expected);

            for (item, &(quantity, price_ten_thousandths)) in items.iter().zip(&lines) {
                let unit_price = Decimal::new(price_ten_thousandths as i64, 4);
                prop_assert_eq!(
                    item.line_total,
                    (unit_price * Decimal::from(quantity)).round_dp(2)
                );
            }
        }
    }
}
