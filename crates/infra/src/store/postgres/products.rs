//! Product Catalog persistence (Postgres).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

use storders_catalog::{NewProduct, Product, ProductPatch};
use storders_core::ProductId;

use super::{map_sqlx_error, PostgresStore};
use crate::store::{Page, ProductFilter, ProductStore, StoreError};

const PRODUCT_COLUMNS: &str = "id, part_number, name, description, category, family, \
                               unit_price, currency, stock_quantity, lead_time_days, \
                               is_active, created_at, updated_at";

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        part_number: row.try_get("part_number")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        family: row.try_get("family")?,
        unit_price: row.try_get("unit_price")?,
        currency: row.try_get("currency")?,
        stock_quantity: row.try_get("stock_quantity")?,
        lead_time_days: row.try_get("lead_time_days")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn write_product(store: &PostgresStore, product: &Product) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE products
        SET part_number = $2, name = $3, description = $4, category = $5,
            family = $6, unit_price = $7, currency = $8, stock_quantity = $9,
            lead_time_days = $10, is_active = $11, updated_at = $12
        WHERE id = $1
        "#,
    )
    .bind(product.id.as_uuid())
    .bind(&product.part_number)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.family)
    .bind(product.unit_price)
    .bind(&product.currency)
    .bind(product.stock_quantity)
    .bind(product.lead_time_days)
    .bind(product.is_active)
    .bind(product.updated_at)
    .execute(store.pool())
    .await
    .map_err(|e| map_sqlx_error("update_product", e))?;
    Ok(())
}

#[async_trait]
impl ProductStore for PostgresStore {
    #[instrument(skip(self, new), fields(part_number = %new.part_number), err)]
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(ProductId::new(), new, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO products (
                id, part_number, name, description, category, family,
                unit_price, currency, stock_quantity, lead_time_days,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.part_number)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.family)
        .bind(product.unit_price)
        .bind(&product.currency)
        .bind(product.stock_quantity)
        .bind(product.lead_time_days)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.map(|r| product_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_product", e))
    }

    #[instrument(skip(self), err)]
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, StoreError> {
        // Listing is a storefront view: inactive (soft-deleted) products are
        // hidden here but stay visible to point lookups and order pricing.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR category ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR family ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL
                   OR name ILIKE '%' || $3 || '%'
                   OR part_number ILIKE '%' || $3 || '%'
                   OR description ILIKE '%' || $3 || '%')
            ORDER BY created_at ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.category.as_deref())
        .bind(filter.family.as_deref())
        .bind(filter.search.as_deref())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let Some(mut product) = self.get_product(id).await? else {
            return Ok(None);
        };
        product.apply(patch, Utc::now());
        write_product(self, &product).await?;
        Ok(Some(product))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn deactivate_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let Some(mut product) = self.get_product(id).await? else {
            return Ok(None);
        };
        product.deactivate(Utc::now());
        write_product(self, &product).await?;
        Ok(Some(product))
    }
}
