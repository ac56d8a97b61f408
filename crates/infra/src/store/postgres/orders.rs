//! Order lifecycle + query persistence (Postgres).
//!
//! Creation runs "count month prefix + assign number + resolve prices +
//! insert order and items" inside ONE transaction. Two concurrent creations
//! in the same month can still compute the same sequence; the unique
//! constraint on `order_number` turns the loser into a `Conflict`, and the
//! whole creation is replayed up to [`MAX_CREATE_ATTEMPTS`] times.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use storders_core::{CustomerId, OrderId, OrderItemId, ProductId};
use storders_orders::{number, NewOrder, Order, OrderItem, OrderStatus, OrderUpdate};

use super::{decode_error, map_sqlx_error, PostgresStore};
use crate::store::{OrderFilter, OrderStore, Page, StoreError, MAX_CREATE_ATTEMPTS};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, status, total_amount, currency, \
                             shipping_address, notes, ordered_at, shipped_at, delivered_at, \
                             created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price, line_total";

/// Decode an order row; items are attached separately by the hydration
/// helpers below.
fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let status_token: String = row
        .try_get("status")
        .map_err(|e| decode_error("order.status", e))?;
    let status = OrderStatus::from_str(&status_token)
        .map_err(|e| decode_error("order.status", e))?;

    let read = |e: sqlx::Error| decode_error("order_row", e);
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id").map_err(read)?),
        order_number: row.try_get("order_number").map_err(read)?,
        customer_id: CustomerId::from_uuid(row.try_get("customer_id").map_err(read)?),
        status,
        total_amount: row.try_get("total_amount").map_err(read)?,
        currency: row.try_get("currency").map_err(read)?,
        shipping_address: row.try_get("shipping_address").map_err(read)?,
        notes: row.try_get("notes").map_err(read)?,
        ordered_at: row.try_get("ordered_at").map_err(read)?,
        shipped_at: row.try_get("shipped_at").map_err(read)?,
        delivered_at: row.try_get("delivered_at").map_err(read)?,
        created_at: row.try_get("created_at").map_err(read)?,
        updated_at: row.try_get("updated_at").map_err(read)?,
        items: Vec::new(),
    })
}

fn item_from_row(row: &PgRow) -> Result<(Uuid, OrderItem), StoreError> {
    let read = |e: sqlx::Error| decode_error("order_item_row", e);
    let order_id: Uuid = row.try_get("order_id").map_err(read)?;
    let item = OrderItem {
        id: OrderItemId::from_uuid(row.try_get("id").map_err(read)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(read)?),
        quantity: row.try_get("quantity").map_err(read)?,
        unit_price: row.try_get("unit_price").map_err(read)?,
        line_total: row.try_get("line_total").map_err(read)?,
    };
    Ok((order_id, item))
}

/// Load one hydrated order inside `tx` (order row + items from the same
/// snapshot).
async fn fetch_order(
    tx: &mut Transaction<'_, Postgres>,
    id: OrderId,
) -> Result<Option<Order>, StoreError> {
    let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut order = order_from_row(&row)?;

    // UUIDv7 item ids are time-ordered, so this preserves insertion order.
    let item_rows = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC"
    ))
    .bind(id.as_uuid())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("get_order_items", e))?;

    for row in &item_rows {
        let (_, item) = item_from_row(row)?;
        order.items.push(item);
    }
    Ok(Some(order))
}

/// Persist the mutable order fields after a domain-side update.
async fn write_order(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE orders
        SET status = $2, shipping_address = $3, notes = $4,
            shipped_at = $5, delivered_at = $6, updated_at = $7
        WHERE id = $1
        "#,
    )
    .bind(order.id.as_uuid())
    .bind(order.status.as_str())
    .bind(&order.shipping_address)
    .bind(&order.notes)
    .bind(order.shipped_at)
    .bind(order.delivered_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update_order", e))?;
    Ok(())
}

impl PostgresStore {
    /// One creation attempt: the whole count + assign + price + insert
    /// sequence under a single transaction.
    async fn try_create_order(&self, new: &NewOrder) -> Result<Order, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let now = Utc::now();
        let prefix = number::month_prefix(now);

        let count_row = sqlx::query(
            "SELECT COUNT(*) AS existing FROM orders WHERE order_number LIKE $1",
        )
        .bind(format!("{prefix}%"))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("count_order_numbers", e))?;
        let existing: i64 = count_row
            .try_get("existing")
            .map_err(|e| decode_error("count_order_numbers", e))?;
        let order_number = number::assign(&prefix, existing)?;

        // Authoritative pricing: every line is resolved against the catalog
        // inside this transaction. A missing product fails the whole
        // creation before anything is written. The active flag is read but
        // deliberately not enforced.
        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let product_row = sqlx::query(
                "SELECT unit_price, is_active FROM products WHERE id = $1",
            )
            .bind(line.product_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("resolve_product", e))?;

            let Some(product_row) = product_row else {
                return Err(StoreError::ReferenceNotFound {
                    entity: "product",
                    id: *line.product_id.as_uuid(),
                });
            };
            let unit_price: Decimal = product_row
                .try_get("unit_price")
                .map_err(|e| decode_error("resolve_product", e))?;

            items.push(OrderItem::priced(
                OrderItemId::new(),
                line.product_id,
                line.quantity,
                unit_price,
            ));
        }

        let order = Order::create(
            OrderId::new(),
            order_number,
            new.customer_id,
            new.shipping_address.clone(),
            new.notes.clone(),
            items,
            now,
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, status, total_amount, currency,
                shipping_address, notes, ordered_at, shipped_at, delivered_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.customer_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(&order.shipping_address)
        .bind(&order.notes)
        .bind(order.ordered_at)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        // Re-read the aggregate as persisted.
        self.get_order(order.id).await?.ok_or_else(|| {
            StoreError::Database("created order vanished on re-read".to_string())
        })
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[instrument(
        skip(self, new),
        fields(customer_id = %new.customer_id, line_count = new.items.len()),
        err
    )]
    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut attempt = 1;
        loop {
            match self.try_create_order(&new).await {
                Err(StoreError::Conflict(msg)) => {
                    if attempt >= MAX_CREATE_ATTEMPTS {
                        return Err(StoreError::Transient(format!(
                            "order creation conflicted {MAX_CREATE_ATTEMPTS} times: {msg}"
                        )));
                    }
                    tracing::warn!(attempt, "order number conflict, retrying creation");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let order = fetch_order(&mut tx, id).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(order)
    }

    #[instrument(skip(self), err)]
    async fn list_orders(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, StoreError> {
        // A transaction gives the page and its item lists one snapshot.
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY ordered_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.customer_id.map(|c| *c.as_uuid()))
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(order_from_row(row)?);
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| *o.id.as_uuid()).collect();
        if !ids.is_empty() {
            let item_rows = sqlx::query(&format!(
                "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id ASC"
            ))
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_order_items", e))?;

            let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
            for row in &item_rows {
                let (order_id, item) = item_from_row(row)?;
                by_order.entry(order_id).or_default().push(item);
            }
            for order in &mut orders {
                if let Some(items) = by_order.remove(order.id.as_uuid()) {
                    order.items = items;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(orders)
    }

    #[instrument(skip(self, update), fields(order_id = %id), err)]
    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(mut order) = fetch_order(&mut tx, id).await? else {
            return Ok(None);
        };
        order.apply_update(update, Utc::now());
        write_order(&mut tx, &order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(Some(order))
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn cancel_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(mut order) = fetch_order(&mut tx, id).await? else {
            return Ok(None);
        };
        order.cancel(Utc::now());
        write_order(&mut tx, &order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(Some(order))
    }
}
