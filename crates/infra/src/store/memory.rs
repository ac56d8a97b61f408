//! In-memory store implementation.
//!
//! Backs tests and dev wiring with the same observable semantics as the
//! Postgres store: all-or-nothing order creation, month-prefix counting for
//! order numbers, and hydrated reads. A single mutex serializes access, so
//! the count-and-insert path is trivially serial per month prefix.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use storders_catalog::{NewProduct, Product, ProductPatch};
use storders_core::{CustomerId, OrderId, OrderItemId, ProductId};
use storders_directory::{Customer, CustomerPatch, NewCustomer};
use storders_orders::{number, NewOrder, Order, OrderItem, OrderUpdate};

use super::{
    CustomerFilter, CustomerStore, HealthStore, OrderFilter, OrderStore, Page, ProductFilter,
    ProductStore, StoreError,
};

#[derive(Debug, Default)]
struct Inner {
    customers: HashMap<Uuid, Customer>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
}

/// In-memory store: one mutex-guarded map per table.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn window<T>(mut rows: Vec<T>, page: Page) -> Vec<T> {
    let offset = page.offset as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    rows.drain(..offset);
    rows.truncate(page.limit as usize);
    rows
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let customer = Customer::create(CustomerId::new(), new, Utc::now());
        let mut inner = self.inner.lock().unwrap();
        inner
            .customers
            .insert(*customer.id.as_uuid(), customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.customers.get(id.as_uuid()).cloned())
    }

    async fn list_customers(
        &self,
        filter: CustomerFilter,
        page: Page,
    ) -> Result<Vec<Customer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Customer> = inner
            .customers
            .values()
            .filter(|c| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&c.company_name, s) || contains_ci(&c.contact_name, s)
                })
            })
            .filter(|c| {
                filter
                    .country
                    .as_deref()
                    .is_none_or(|s| c.country.as_deref().is_some_and(|v| contains_ci(v, s)))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(window(rows, page))
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(customer) = inner.customers.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        customer.apply(patch, Utc::now());
        Ok(Some(customer.clone()))
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .products
            .values()
            .any(|p| p.part_number == new.part_number)
        {
            return Err(StoreError::Conflict(format!(
                "part number {} already exists",
                new.part_number
            )));
        }
        let product = Product::create(ProductId::new(), new, Utc::now());
        inner
            .products
            .insert(*product.id.as_uuid(), product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.products.get(id.as_uuid()).cloned())
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.is_active)
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|s| contains_ci(&p.category, s))
            })
            .filter(|p| {
                filter
                    .family
                    .as_deref()
                    .is_none_or(|s| p.family.as_deref().is_some_and(|v| contains_ci(v, s)))
            })
            .filter(|p| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&p.name, s)
                        || contains_ci(&p.part_number, s)
                        || p.description.as_deref().is_some_and(|v| contains_ci(v, s))
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(window(rows, page))
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(product) = inner.products.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        product.apply(patch, Utc::now());
        Ok(Some(product.clone()))
    }

    async fn deactivate_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(product) = inner.products.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        product.deactivate(Utc::now());
        Ok(Some(product.clone()))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();

        let prefix = number::month_prefix(now);
        let existing = inner
            .orders
            .values()
            .filter(|o| o.order_number.starts_with(&prefix))
            .count() as i64;
        let order_number = number::assign(&prefix, existing)?;

        // Resolve every line before touching the map: a missing product
        // must leave the store untouched.
        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let Some(product) = inner.products.get(line.product_id.as_uuid()) else {
                return Err(StoreError::ReferenceNotFound {
                    entity: "product",
                    id: *line.product_id.as_uuid(),
                });
            };
            items.push(OrderItem::priced(
                OrderItemId::new(),
                line.product_id,
                line.quantity,
                product.unit_price,
            ));
        }

        let order = Order::create(
            OrderId::new(),
            order_number,
            new.customer_id,
            new.shipping_address,
            new.notes,
            items,
            now,
        );
        inner.orders.insert(*order.id.as_uuid(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.get(id.as_uuid()).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.customer_id.is_none_or(|c| o.customer_id == c))
            .cloned()
            .collect();
        // Most recent first.
        rows.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        Ok(window(rows, page))
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(order) = inner.orders.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        order.apply_update(update, Utc::now());
        Ok(Some(order.clone()))
    }

    async fn cancel_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(order) = inner.orders.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        order.cancel(Utc::now());
        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use storders_orders::{NewOrderItem, OrderStatus};

    async fn seed_product(store: &InMemoryStore, part_number: &str, price: &str) -> ProductId {
        let product = store
            .create_product(NewProduct {
                part_number: part_number.to_string(),
                name: format!("{part_number} part"),
                description: None,
                category: "Microcontrollers".to_string(),
                family: None,
                unit_price: price.parse().unwrap(),
                currency: "USD".to_string(),
                stock_quantity: 1000,
                lead_time_days: None,
            })
            .await
            .unwrap();
        product.id
    }

    fn order_for(product_id: ProductId, quantity: i32) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new(),
            shipping_address: None,
            notes: None,
            items: vec![NewOrderItem {
                product_id,
                quantity,
            }],
        }
    }

    #[tokio::test]
    async fn sequential_creations_get_gapless_month_sequences() {
        let store = InMemoryStore::new();
        let product_id = seed_product(&store, "STM32G030F6P6", "0.7800").await;

        let mut suffixes = Vec::new();
        for _ in 0..3 {
            let order = store.create_order(order_for(product_id, 10)).await.unwrap();
            suffixes.push(order.order_number[order.order_number.len() - 4..].to_string());
        }

        assert_eq!(suffixes, vec!["0001", "0002", "0003"]);
    }

    #[tokio::test]
    async fn pricing_copies_the_catalog_price() {
        let store = InMemoryStore::new();
        let product_id = seed_product(&store, "STM32F407VGT6", "8.5200").await;

        let order = store
            .create_order(order_for(product_id, 100))
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(852.00));
        assert_eq!(order.items[0].unit_price, dec!(8.5200));

        // A later catalog price change leaves the persisted line untouched.
        store
            .update_product(
                product_id,
                ProductPatch {
                    unit_price: Some(dec!(9.9900)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let reread = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(reread.items[0].unit_price, dec!(8.5200));
    }

    #[tokio::test]
    async fn missing_product_persists_nothing() {
        let store = InMemoryStore::new();
        let known = seed_product(&store, "L7805CV", "0.4200").await;

        let new = NewOrder {
            customer_id: CustomerId::new(),
            shipping_address: None,
            notes: None,
            items: vec![
                NewOrderItem {
                    product_id: known,
                    quantity: 5,
                },
                NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                },
            ],
        };

        let err = store.create_order(new).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ReferenceNotFound { entity: "product", .. }
        ));

        let orders = store
            .list_orders(OrderFilter::default(), Page::default())
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_status_and_customer() {
        let store = InMemoryStore::new();
        let product_id = seed_product(&store, "LIS3DHTR", "1.1500").await;

        let kept = store.create_order(order_for(product_id, 1)).await.unwrap();
        let cancelled = store.create_order(order_for(product_id, 2)).await.unwrap();
        store.cancel_order(cancelled.id).await.unwrap();

        let pending = store
            .list_orders(
                OrderFilter {
                    status: Some(OrderStatus::Pending),
                    customer_id: None,
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, kept.id);

        let by_customer = store
            .list_orders(
                OrderFilter {
                    status: None,
                    customer_id: Some(kept.customer_id),
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_customer.len(), 1);
    }

    #[tokio::test]
    async fn update_and_cancel_of_unknown_order_touch_nothing() {
        let store = InMemoryStore::new();

        let updated = store
            .update_order(OrderId::new(), OrderUpdate::default())
            .await
            .unwrap();
        assert!(updated.is_none());

        let cancelled = store.cancel_order(OrderId::new()).await.unwrap();
        assert!(cancelled.is_none());
    }

    #[tokio::test]
    async fn shipped_status_stamps_shipped_at_through_the_store() {
        let store = InMemoryStore::new();
        let product_id = seed_product(&store, "HTS221TR", "1.6500").await;
        let order = store.create_order(order_for(product_id, 3)).await.unwrap();

        let shipped = store
            .update_order(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Shipped),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        let stamp = shipped.shipped_at.unwrap();

        let again = store
            .update_order(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Shipped),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.shipped_at, Some(stamp));
    }
}
